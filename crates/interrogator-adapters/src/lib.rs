#![forbid(unsafe_code)]

pub mod central;
pub mod http;
pub mod object_store;

pub use central::CentralClientAdapter;
pub use http::build_http_client;
pub use object_store::ObjectStoreAdapter;
