//! Interrogation-bucket cleanup (SPEC_FULL.md §4.8).
//!
//! Grounded on `core/cleaner.py`: list what is in the interrogation bucket, ask
//! the central API which of it may be removed, delete only that subset.

use std::sync::Arc;

use tracing::warn;
use uuid::Uuid;

use crate::ports::{CentralClientError, CentralClientPort, ObjectStoreError, ObjectStorePort};

pub struct Cleaner {
    central_client: Arc<dyn CentralClientPort>,
    object_store: Arc<dyn ObjectStorePort>,
}

impl Cleaner {
    pub fn new(central_client: Arc<dyn CentralClientPort>, object_store: Arc<dyn ObjectStorePort>) -> Self {
        Self {
            central_client,
            object_store,
        }
    }

    pub async fn scan_and_clean(&self) -> Result<(), CleanerError> {
        let present = self.object_store.list_interrogation_objects().await?;
        let present_ids: Vec<Uuid> = present
            .iter()
            .filter_map(|key| Uuid::parse_str(key).ok())
            .collect();
        if present_ids.is_empty() {
            return Ok(());
        }

        let removable = self.central_client.get_removable_files(&present_ids).await?;
        for file_id in removable {
            let object_id = file_id.to_string();
            match self.object_store.remove_interrogation_object(&object_id).await {
                Ok(()) => {}
                Err(ObjectStoreError::ObjectNotFound { .. }) => {
                    warn!(object_id, "object already removed, skipping");
                }
                Err(err) => return Err(err.into()),
            }
        }
        Ok(())
    }
}

#[derive(Debug, thiserror::Error)]
pub enum CleanerError {
    #[error(transparent)]
    ObjectStore(#[from] ObjectStoreError),
    #[error(transparent)]
    CentralClient(#[from] CentralClientError),
}
