pub mod central;
pub mod object_store;

pub use central::{CentralClientError, CentralClientPort};
pub use object_store::{ObjectStoreError, ObjectStorePort};
