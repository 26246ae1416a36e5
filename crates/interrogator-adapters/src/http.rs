//! Shared HTTP transport factory.
//!
//! Grounded on `adapters/outbound/http.py`: one client is built once and shared
//! by every outbound adapter, wrapped in retry and rate-limit policy rather than
//! leaving each call site to reimplement backoff.

use std::time::Duration;

use reqwest_middleware::{ClientBuilder, ClientWithMiddleware};
use reqwest_retry::{policies::ExponentialBackoff, RetryTransientMiddleware};

/// Build the shared client used by both the central-API and object-store
/// adapters. `max_retries` bounds the exponential-backoff retry policy; a
/// request that is still failing after the budget is exhausted surfaces as a
/// `ConnectionFailed`/`RequestFailed` error at the call site.
pub fn build_http_client(max_retries: u32, request_timeout: Duration) -> ClientWithMiddleware {
    let retry_policy = ExponentialBackoff::builder().build_with_max_retries(max_retries);

    let inner = reqwest::Client::builder()
        .timeout(request_timeout)
        .build()
        .expect("reqwest client configuration is static and known-valid");

    ClientBuilder::new(inner)
        .with(RetryTransientMiddleware::new_with_policy(retry_policy))
        .build()
}
