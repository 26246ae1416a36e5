//! Dependency injection: wires adapters into an `Interrogator`/`Cleaner`.
//!
//! Grounded on `inject.py`'s `prepare_interrogator`: construct the central client
//! bound to the inbox storage alias, construct the object store client bound to
//! both the inbox and interrogation buckets, then hand both ports to the core
//! component.

use std::sync::Arc;
use std::time::Duration;

use base64::{engine::general_purpose::STANDARD, Engine as _};
use interrogator_adapters::{build_http_client, CentralClientAdapter, ObjectStoreAdapter};
use interrogator_core::ports::ObjectStoreError;
use interrogator_core::{Cleaner, Interrogator};
use secrecy::{ExposeSecret, Secret};
use thiserror::Error;

use crate::config::Config;

#[derive(Debug, Error)]
pub enum InjectError {
    #[error("failed to decode central_api_public_key as base64: {0}")]
    PublicKeyEncoding(#[from] base64::DecodeError),
    #[error("central_api_public_key must decode to exactly 32 bytes, got {actual}")]
    PublicKeyLength { actual: usize },
    #[error(transparent)]
    ObjectStore(#[from] ObjectStoreError),
}

pub fn prepare_interrogator(config: &Config) -> Result<Interrogator, InjectError> {
    let (central_client, object_store) = prepare_ports(config)?;
    let data_hub_private_key = Secret::new(config.data_hub_private_key.expose_secret().as_bytes().to_vec());

    Ok(Interrogator::new(
        config.inbox_storage_alias.clone(),
        data_hub_private_key,
        central_client,
        object_store,
    ))
}

pub fn prepare_cleaner(config: &Config) -> Result<Cleaner, InjectError> {
    let (central_client, object_store) = prepare_ports(config)?;
    Ok(Cleaner::new(central_client, object_store))
}

#[allow(clippy::type_complexity)]
fn prepare_ports(
    config: &Config,
) -> Result<
    (
        Arc<dyn interrogator_core::ports::CentralClientPort>,
        Arc<dyn interrogator_core::ports::ObjectStorePort>,
    ),
    InjectError,
> {
    let http = build_http_client(
        config.http_max_retries,
        Duration::from_secs(config.http_timeout_secs),
    );

    let public_key_bytes = STANDARD.decode(config.central_api_public_key.trim())?;
    let public_key: [u8; 32] = public_key_bytes
        .clone()
        .try_into()
        .map_err(|_| InjectError::PublicKeyLength {
            actual: public_key_bytes.len(),
        })?;

    let central_client = Arc::new(CentralClientAdapter::new(
        http.clone(),
        config.central_api_url.trim_end_matches('/').to_string(),
        config.inbox_storage_alias.clone(),
        config.data_hub_private_key.expose_secret().as_bytes(),
        public_key,
    ));

    let object_store = Arc::new(ObjectStoreAdapter::new(
        http,
        // object store base URL is derived per-bucket by the adapter from each
        // alias's configured endpoint; the shared client is reused across both.
        config
            .object_storages
            .get(&config.inbox_storage_alias)
            .map(|e| e.endpoint_url.clone())
            .unwrap_or_default(),
        &config.inbox_storage_alias,
        &config.interrogation_storage_alias,
        |alias| config.bucket_id_for_alias(alias),
    )?);

    Ok((central_client, object_store))
}
