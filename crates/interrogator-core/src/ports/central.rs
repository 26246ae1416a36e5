//! Contract for talking to the central coordinator.
//!
//! Grounded on `ports/outbound/central.py` and `ports/inbound/central.py`: the
//! former names the method set, the latter names the batch-driver-facing shape
//! (fetch pending uploads, ask what may be removed, submit a report).

use async_trait::async_trait;
use thiserror::Error;
use uuid::Uuid;

use crate::models::{FileUpload, InterrogationReport};

#[derive(Debug, Error)]
pub enum CentralClientError {
    #[error("central API returned an unexpected status: {status}")]
    CentralApi { status: u16 },
    #[error("central API response did not match the expected shape: {0}")]
    ResponseFormat(String),
    #[error("connection to the central API failed: {0}")]
    ConnectionFailed(String),
    #[error("central API request failed after retries: {0}")]
    RequestFailed(String),
}

#[async_trait]
pub trait CentralClientPort: Send + Sync {
    /// List uploads pending interrogation for this worker's inbox alias.
    async fn fetch_new_uploads(&self) -> Result<Vec<FileUpload>, CentralClientError>;

    /// Ask which of the given interrogation-bucket object ids may be deleted.
    async fn get_removable_files(
        &self,
        file_ids: &[Uuid],
    ) -> Result<Vec<Uuid>, CentralClientError>;

    /// Submit the terminal outcome of interrogating one file.
    async fn submit_interrogation_report(
        &self,
        report: &InterrogationReport,
    ) -> Result<(), CentralClientError>;
}
