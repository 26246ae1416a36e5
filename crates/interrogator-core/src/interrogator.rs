//! Per-file interrogation state machine and batch driver (SPEC_FULL.md §4.6–4.7).
//!
//! This is a close port of `core/interrogator.py`'s control flow, generalized to
//! Rust's explicit `Result`/`?` style in place of exceptions. One deliberate
//! behavior change from the original: on a plaintext-checksum mismatch the
//! original submits a failure report but falls through into completing the
//! upload anyway; here the mismatch aborts the multipart upload and returns
//! immediately, since there is nothing left to verify once the submitter's own
//! checksum has failed.

use std::sync::Arc;

use chrono::Utc;
use secrecy::{ExposeSecret, Secret};
use thiserror::Error;
use tracing::{debug, error, warn};
use uuid::Uuid;

use crate::checksums::ChecksumTracker;
use crate::constants::SECRET_LEN;
use crate::crypt4gh::{
    decrypt_segment, encrypt_segment, Crypt4GhEnvelopeDecoder, EnvelopeDecoder, EnvelopeError, SegmentError,
};
use crate::models::{FileUpload, InterrogationReport};
use crate::part_range::plan_part_ranges;
use crate::ports::{CentralClientError, CentralClientPort, ObjectStoreError, ObjectStorePort};

/// Bytes of the inbox object read up front to locate the envelope. Chosen large
/// enough to hold any realistic Crypt4GH header; if it proves too small for a
/// given file, envelope decoding fails closed with `EnvelopeTruncated`.
const ENVELOPE_PROBE_LEN: u64 = 4 * 1024;

#[derive(Debug, Error)]
pub enum InterrogatorError {
    /// Submitter's data problem: caught by the batch driver, turned into a
    /// failure report, and the batch continues.
    #[error("file {file_id} not found in inbox")]
    FileNotFound { file_id: Uuid },
    #[error("could not decrypt Crypt4GH envelope: {0}")]
    EnvelopeDecryption(#[from] EnvelopeError),
    #[error("could not decrypt part {part_no}: {source}")]
    PartDecryption { part_no: u32, source: SegmentError },
    #[error("SHA-256 checksum over unencrypted content does not match the value submitted with the file")]
    PlaintextChecksumMismatch,

    /// Fatal: an infrastructure or implementation fault. Propagates out of the
    /// batch driver.
    #[error("failed to re-encrypt part {part_no}: {source}")]
    Reencryption { part_no: u32, source: SegmentError },
    #[error("confirmatory decrypt of re-encrypted part {part_no} did not recover the original plaintext")]
    ConfirmatoryDecryptMismatch { part_no: u32 },
    #[error("computed ETag {expected} does not match store-reported ETag {actual}")]
    EtagMismatch { expected: String, actual: String },
    #[error(transparent)]
    ObjectStore(#[from] ObjectStoreError),
    #[error(transparent)]
    CentralClient(#[from] CentralClientError),
}

impl InterrogatorError {
    /// `Some(reason)` for submitter-data problems that should be reported and
    /// swallowed by the batch driver; `None` for faults that must propagate.
    fn as_interrogation_failure(&self) -> Option<String> {
        match self {
            InterrogatorError::FileNotFound { .. } => Some(self.to_string()),
            InterrogatorError::EnvelopeDecryption(_) => Some(self.to_string()),
            InterrogatorError::PartDecryption { .. } => Some(self.to_string()),
            InterrogatorError::PlaintextChecksumMismatch => Some(self.to_string()),
            _ => None,
        }
    }
}

pub struct Interrogator {
    inbox_storage_alias: String,
    data_hub_private_key: Secret<Vec<u8>>,
    central_client: Arc<dyn CentralClientPort>,
    object_store: Arc<dyn ObjectStorePort>,
    envelope_decoder: Arc<dyn EnvelopeDecoder>,
}

impl Interrogator {
    /// Construct an `Interrogator` using the real `crypt4gh`-backed envelope
    /// decoder. This is what production wiring (the CLI) should call.
    pub fn new(
        inbox_storage_alias: String,
        data_hub_private_key: Secret<Vec<u8>>,
        central_client: Arc<dyn CentralClientPort>,
        object_store: Arc<dyn ObjectStorePort>,
    ) -> Self {
        Self::with_envelope_decoder(
            inbox_storage_alias,
            data_hub_private_key,
            central_client,
            object_store,
            Arc::new(Crypt4GhEnvelopeDecoder),
        )
    }

    pub fn with_envelope_decoder(
        inbox_storage_alias: String,
        data_hub_private_key: Secret<Vec<u8>>,
        central_client: Arc<dyn CentralClientPort>,
        object_store: Arc<dyn ObjectStorePort>,
        envelope_decoder: Arc<dyn EnvelopeDecoder>,
    ) -> Self {
        Self {
            inbox_storage_alias,
            data_hub_private_key,
            central_client,
            object_store,
            envelope_decoder,
        }
    }

    /// Fetch every pending upload and interrogate them sequentially. A
    /// submitter-data failure produces one report and the batch continues; a
    /// fatal error aborts the batch and propagates.
    pub async fn interrogate_new_files(&self) -> Result<(), InterrogatorError> {
        let new_files = self.central_client.fetch_new_uploads().await?;
        for file in new_files {
            match self.interrogate_file(&file).await {
                Ok(()) => {}
                Err(err) => match err.as_interrogation_failure() {
                    Some(reason) => {
                        warn!(file_id = %file.id, reason = %reason, "interrogation failed");
                        self.report_failure(file.id, reason).await?;
                    }
                    None => {
                        error!(file_id = %file.id, error = %err, "fatal error interrogating file");
                        return Err(err);
                    }
                },
            }
        }
        Ok(())
    }

    /// Inspect and re-encrypt a single uploaded file. Exposed directly in
    /// addition to [`Interrogator::interrogate_new_files`] so callers that
    /// already have a `FileUpload` in hand (e.g. a retry path) don't need to
    /// round-trip through the central API's upload list.
    pub async fn interrogate_file(&self, file: &FileUpload) -> Result<(), InterrogatorError> {
        let object_id = file.id.to_string();

        if !self.object_store.object_exists_in_inbox(&object_id).await? {
            return Err(InterrogatorError::FileNotFound { file_id: file.id });
        }

        let probe_stop = ENVELOPE_PROBE_LEN.min(file.encrypted_size);
        let envelope_bytes = self
            .object_store
            .fetch_inbox_part(&object_id, 0, probe_stop)
            .await?;
        let (old_secret, envelope_len) = self
            .envelope_decoder
            .decode(&envelope_bytes, self.data_hub_private_key.expose_secret())?;

        let upload_id = self.object_store.init_interrogation_upload(&object_id).await?;
        let part_ranges = plan_part_ranges(file, envelope_len);

        let new_secret = generate_new_secret();
        let mut checksums = ChecksumTracker::new();

        // `part_ranges` are relative to the post-envelope ciphertext region;
        // translate to absolute offsets into the inbox object before fetching.
        for (part_no, range) in part_ranges.iter().enumerate() {
            let part_no = part_no as u32;
            let run_part = self
                .process_part(
                    &object_id,
                    &upload_id,
                    part_no,
                    envelope_len + range.start,
                    envelope_len + range.stop,
                    &old_secret,
                    &new_secret,
                    &mut checksums,
                )
                .await;

            if let Err(err) = run_part {
                self.object_store.abort_upload(&upload_id, &object_id).await.ok();
                return Err(err);
            }
        }

        let new_checksum = checksums.unencrypted_sha256_hex();
        if new_checksum != file.decrypted_sha256 {
            self.object_store.abort_upload(&upload_id, &object_id).await.ok();
            self.object_store
                .remove_interrogation_object(&object_id)
                .await
                .ok();
            return Err(InterrogatorError::PlaintextChecksumMismatch);
        }

        let expected_etag = checksums.etag_for_store();
        let actual_etag = self
            .object_store
            .complete_upload(&upload_id, &object_id, checksums.part_count() as u32)
            .await?;
        if expected_etag != actual_etag {
            return Err(InterrogatorError::EtagMismatch {
                expected: expected_etag,
                actual: actual_etag,
            });
        }

        self.report_success(
            file.id,
            new_secret,
            checksums.encrypted_parts_md5_base64(),
            checksums.encrypted_parts_sha256(),
        )
        .await
    }

    #[allow(clippy::too_many_arguments)]
    async fn process_part(
        &self,
        object_id: &str,
        upload_id: &str,
        part_no: u32,
        start: u64,
        stop: u64,
        old_secret: &[u8],
        new_secret: &Secret<Vec<u8>>,
        checksums: &mut ChecksumTracker,
    ) -> Result<(), InterrogatorError> {
        let part = self.object_store.fetch_inbox_part(object_id, start, stop).await?;

        let decrypted = decrypt_segment(&part, old_secret).map_err(|source| {
            InterrogatorError::PartDecryption { part_no, source }
        })?;
        debug!(object_id, part_no, "decrypted part");

        let reencrypted = encrypt_segment(&decrypted, new_secret.expose_secret())
            .map_err(|source| InterrogatorError::Reencryption { part_no, source })?;
        debug!(object_id, part_no, "re-encrypted part");

        // Confirmatory decrypt: a failure here is our own bug, not the
        // submitter's, so it is always fatal.
        let confirmed = decrypt_segment(&reencrypted, new_secret.expose_secret())
            .map_err(|_| InterrogatorError::ConfirmatoryDecryptMismatch { part_no })?;
        if confirmed != decrypted {
            return Err(InterrogatorError::ConfirmatoryDecryptMismatch { part_no });
        }

        checksums.update_encrypted(&reencrypted);
        checksums.update_unencrypted(&confirmed);

        let part_md5 = checksums
            .last_encrypted_md5_base64()
            .expect("update_encrypted was just called");
        self.object_store
            .upload_part(upload_id, object_id, part_no, &part_md5, &reencrypted)
            .await?;

        Ok(())
    }

    async fn report_success(
        &self,
        file_id: Uuid,
        new_secret: Secret<Vec<u8>>,
        encrypted_parts_md5: Vec<String>,
        encrypted_parts_sha256: Vec<String>,
    ) -> Result<(), InterrogatorError> {
        let report = InterrogationReport::success(
            file_id,
            self.inbox_storage_alias.clone(),
            Utc::now(),
            new_secret,
            encrypted_parts_md5,
            encrypted_parts_sha256,
        );
        self.central_client.submit_interrogation_report(&report).await?;
        Ok(())
    }

    async fn report_failure(&self, file_id: Uuid, reason: String) -> Result<(), InterrogatorError> {
        let report = InterrogationReport::failure(
            file_id,
            self.inbox_storage_alias.clone(),
            Utc::now(),
            reason,
        );
        self.central_client.submit_interrogation_report(&report).await?;
        Ok(())
    }
}

fn generate_new_secret() -> Secret<Vec<u8>> {
    let mut bytes = vec![0u8; SECRET_LEN];
    rand::RngCore::fill_bytes(&mut rand::thread_rng(), &mut bytes);
    Secret::new(bytes)
}
