//! Contract for the S3-compatible object store.
//!
//! Grounded on `ports/outbound/s3.py`'s method set. Two Open Question resolutions
//! from DESIGN.md apply here: `complete_upload` takes `part_count` (the store
//! computes its own ETag; the interrogator compares it against a locally computed
//! expected value rather than handing the store one to verify), and bucket
//! resolution failures are represented as a distinct, non-retryable variant.

use async_trait::async_trait;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ObjectStoreError {
    #[error("storage alias {alias:?} is not configured")]
    StorageAliasNotConfigured { alias: String },
    #[error("object {object_id:?} was not found")]
    ObjectNotFound { object_id: String },
    #[error("failed to initiate multipart upload for {object_id:?}: {message}")]
    UploadInitFailed { object_id: String, message: String },
    #[error("failed to upload part {part_no} for {object_id:?}: {message}")]
    UploadFailed {
        object_id: String,
        part_no: u32,
        message: String,
    },
    #[error("part {part_no} for {object_id:?} was rejected: bad Content-MD5")]
    BadPartMd5 { object_id: String, part_no: u32 },
    #[error("failed to complete multipart upload for {object_id:?}: {message}")]
    UploadCompletionFailed { object_id: String, message: String },
    #[error("object store request failed: {0}")]
    RequestFailed(String),
}

#[async_trait]
pub trait ObjectStorePort: Send + Sync {
    /// Whether `object_id` currently exists in the inbox bucket.
    async fn object_exists_in_inbox(&self, object_id: &str) -> Result<bool, ObjectStoreError>;

    /// Fetch a half-open byte range `[start, stop)` from the inbox object.
    async fn fetch_inbox_part(
        &self,
        object_id: &str,
        start: u64,
        stop: u64,
    ) -> Result<Vec<u8>, ObjectStoreError>;

    /// Begin a multipart upload into the interrogation bucket. Returns an opaque
    /// upload id.
    async fn init_interrogation_upload(&self, object_id: &str) -> Result<String, ObjectStoreError>;

    /// Upload one part of an in-progress multipart upload. `part_md5_base64` is
    /// the base64-encoded raw MD5 of `part`, sent as `Content-MD5`.
    async fn upload_part(
        &self,
        upload_id: &str,
        object_id: &str,
        part_no: u32,
        part_md5_base64: &str,
        part: &[u8],
    ) -> Result<(), ObjectStoreError>;

    /// Complete a multipart upload and return the store-computed ETag.
    async fn complete_upload(
        &self,
        upload_id: &str,
        object_id: &str,
        part_count: u32,
    ) -> Result<String, ObjectStoreError>;

    /// Abort an in-progress multipart upload. Idempotent: aborting an
    /// already-aborted or already-completed upload is not an error.
    async fn abort_upload(&self, upload_id: &str, object_id: &str) -> Result<(), ObjectStoreError>;

    /// Remove an object from the interrogation bucket. Idempotent: removing a
    /// missing object succeeds (caller should log a warning, not treat it as an
    /// error).
    async fn remove_interrogation_object(&self, object_id: &str) -> Result<(), ObjectStoreError>;

    /// List every object key currently present in the interrogation bucket.
    async fn list_interrogation_objects(&self) -> Result<Vec<String>, ObjectStoreError>;
}
