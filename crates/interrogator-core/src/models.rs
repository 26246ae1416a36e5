//! Data shapes exchanged between the interrogator and its ports.
//!
//! `FileUpload` mirrors the central API's upload record; `InterrogationReport` is
//! the terminal outcome the worker reports back for one file.

use chrono::{DateTime, Utc};
use secrecy::Secret;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::constants::{NONCE_LEN, SEGMENT_CIPHERTEXT_LEN, SEGMENT_PLAINTEXT_LEN, TAG_LEN};

/// A file awaiting interrogation and re-encryption.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct FileUpload {
    pub id: Uuid,
    pub storage_alias: String,
    pub decrypted_sha256: String,
    pub decrypted_size: u64,
    pub encrypted_size: u64,
    /// Nominal multipart chunk size declared by the submitter. Informational only;
    /// actual parts are segment-aligned (see [`crate::part_range`]).
    pub part_size: u64,
}

impl FileUpload {
    /// Byte length of the Crypt4GH envelope preceding ciphertext, derived purely
    /// from the declared sizes.
    pub fn offset(&self) -> u64 {
        let full_segments = self.decrypted_size / SEGMENT_PLAINTEXT_LEN;
        let remainder = self.decrypted_size - full_segments * SEGMENT_PLAINTEXT_LEN;
        let mut ciphertext_size = full_segments * SEGMENT_CIPHERTEXT_LEN;
        if remainder > 0 {
            ciphertext_size += remainder + NONCE_LEN + TAG_LEN;
        }
        self.encrypted_size - ciphertext_size
    }

    /// Number of multipart-upload parts implied by `part_size`. Not consulted by
    /// the part-range planner; kept for wire parity with the central API.
    pub fn encrypted_part_count(&self) -> u64 {
        let ciphertext_size = self.encrypted_size - self.offset();
        ciphertext_size.div_ceil(self.part_size.max(1))
    }
}

/// A half-open byte range `[start, stop)` within the post-envelope ciphertext region
/// of an inbox object. Every range is exactly one Crypt4GH segment, except possibly
/// the last.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PartRange {
    pub start: u64,
    pub stop: u64,
}

impl PartRange {
    pub fn len(&self) -> u64 {
        self.stop - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.stop <= self.start
    }
}

/// Outcome of interrogating a single file, submitted to the central API.
#[derive(Debug, Serialize)]
pub struct InterrogationReport {
    pub file_id: Uuid,
    pub storage_alias: String,
    pub interrogated_at: DateTime<Utc>,
    pub passed: bool,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,

    /// Newly generated symmetric key, present only on success. Held as sensitive
    /// material; the adapter layer is responsible for wrapping it to the central
    /// public key before it leaves the process.
    #[serde(skip_serializing_if = "Option::is_none")]
    #[serde(serialize_with = "serialize_secret_opt")]
    pub secret: Option<Secret<Vec<u8>>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub encrypted_parts_md5: Option<Vec<String>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub encrypted_parts_sha256: Option<Vec<String>>,
}

impl InterrogationReport {
    pub fn success(
        file_id: Uuid,
        storage_alias: String,
        interrogated_at: DateTime<Utc>,
        secret: Secret<Vec<u8>>,
        encrypted_parts_md5: Vec<String>,
        encrypted_parts_sha256: Vec<String>,
    ) -> Self {
        Self {
            file_id,
            storage_alias,
            interrogated_at,
            passed: true,
            reason: None,
            secret: Some(secret),
            encrypted_parts_md5: Some(encrypted_parts_md5),
            encrypted_parts_sha256: Some(encrypted_parts_sha256),
        }
    }

    pub fn failure(
        file_id: Uuid,
        storage_alias: String,
        interrogated_at: DateTime<Utc>,
        reason: String,
    ) -> Self {
        Self {
            file_id,
            storage_alias,
            interrogated_at,
            passed: false,
            reason: Some(reason),
            secret: None,
            encrypted_parts_md5: None,
            encrypted_parts_sha256: None,
        }
    }
}

impl Clone for InterrogationReport {
    fn clone(&self) -> Self {
        use secrecy::ExposeSecret;
        Self {
            file_id: self.file_id,
            storage_alias: self.storage_alias.clone(),
            interrogated_at: self.interrogated_at,
            passed: self.passed,
            reason: self.reason.clone(),
            secret: self.secret.as_ref().map(|s| Secret::new(s.expose_secret().clone())),
            encrypted_parts_md5: self.encrypted_parts_md5.clone(),
            encrypted_parts_sha256: self.encrypted_parts_sha256.clone(),
        }
    }
}

/// `Secret` has no `Serialize` impl by design; the report never actually goes over
/// the wire in this shape (the adapter re-encrypts the secret to the central public
/// key and substitutes the ciphertext), but the field still needs a `Serialize` impl
/// for tests that exercise the in-process report shape.
fn serialize_secret_opt<S>(value: &Option<Secret<Vec<u8>>>, serializer: S) -> Result<S::Ok, S::Error>
where
    S: serde::Serializer,
{
    use secrecy::ExposeSecret;
    match value {
        Some(secret) => serializer.serialize_some(secret.expose_secret()),
        None => serializer.serialize_none(),
    }
}
