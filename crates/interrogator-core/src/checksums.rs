//! Per-part and whole-object checksum tracking (SPEC_FULL.md §4.5).
//!
//! Grounded on `Checksums` in the original interrogator (`update_encrypted`,
//! `update_unencrypted`, `encrypted_checksum_for_s3`) and on the incremental
//! digest-builder shape in the teacher's `crypto/digest.rs`. MD5 here is used
//! only as a non-cryptographic integrity digest matching the object store's
//! multipart ETag convention.

use md5::{Digest as _, Md5};
use sha2::Sha256;

/// Accumulates checksums for a single file's interrogation pass.
pub struct ChecksumTracker {
    encrypted_md5: Vec<[u8; 16]>,
    encrypted_sha256: Vec<String>,
    unencrypted: Sha256,
}

impl Default for ChecksumTracker {
    fn default() -> Self {
        Self::new()
    }
}

impl ChecksumTracker {
    pub fn new() -> Self {
        Self {
            encrypted_md5: Vec::new(),
            encrypted_sha256: Vec::new(),
            unencrypted: Sha256::new(),
        }
    }

    /// Record one encrypted part's digests. Call once per part, in part order.
    pub fn update_encrypted(&mut self, part: &[u8]) {
        let mut md5 = Md5::new();
        md5.update(part);
        let digest: [u8; 16] = md5.finalize().into();
        self.encrypted_md5.push(digest);
        self.encrypted_sha256.push(hex::encode(sha256_digest(part)));
    }

    /// Feed plaintext bytes into the rolling whole-object SHA-256. Must only be
    /// fed with plaintext that has survived the confirmatory decrypt.
    pub fn update_unencrypted(&mut self, plaintext: &[u8]) {
        self.unencrypted.update(plaintext);
    }

    /// Base64 encoding of the most recently recorded per-part MD5, suitable for
    /// the `Content-MD5` header of the corresponding part PUT.
    pub fn last_encrypted_md5_base64(&self) -> Option<String> {
        self.encrypted_md5
            .last()
            .map(|digest| base64::engine::general_purpose::STANDARD.encode(digest))
    }

    pub fn encrypted_parts_md5_base64(&self) -> Vec<String> {
        self.encrypted_md5
            .iter()
            .map(|digest| base64::engine::general_purpose::STANDARD.encode(digest))
            .collect()
    }

    pub fn encrypted_parts_sha256(&self) -> Vec<String> {
        self.encrypted_sha256.clone()
    }

    /// Finalize the rolling plaintext SHA-256 as a hex string. Consumes the tracker's
    /// rolling state; call only after every part has been processed.
    pub fn unencrypted_sha256_hex(self) -> String {
        hex::encode(self.unencrypted.finalize())
    }

    /// The object store's multipart ETag: `hex(md5(concat(raw_md5_parts))) + "-" + n`.
    pub fn etag_for_store(&self) -> String {
        let mut concat = Vec::with_capacity(self.encrypted_md5.len() * 16);
        for digest in &self.encrypted_md5 {
            concat.extend_from_slice(digest);
        }
        let mut outer = Md5::new();
        outer.update(&concat);
        let outer_digest: [u8; 16] = outer.finalize().into();
        format!("{}-{}", hex::encode(outer_digest), self.encrypted_md5.len())
    }

    pub fn part_count(&self) -> usize {
        self.encrypted_md5.len()
    }
}

fn sha256_digest(bytes: &[u8]) -> [u8; 32] {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    hasher.finalize().into()
}

use base64::Engine as _;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn etag_matches_aws_multipart_convention() {
        let mut tracker = ChecksumTracker::new();
        tracker.update_encrypted(b"part one bytes");
        tracker.update_encrypted(b"part two bytes");

        let etag = tracker.etag_for_store();
        assert!(etag.ends_with("-2"));
        assert_eq!(etag.len(), 32 + 1 + 1);
    }

    #[test]
    fn single_part_etag_has_correct_suffix() {
        let mut tracker = ChecksumTracker::new();
        tracker.update_encrypted(b"only part");
        assert!(tracker.etag_for_store().ends_with("-1"));
    }

    #[test]
    fn unencrypted_sha256_is_over_all_fed_plaintext() {
        let mut tracker = ChecksumTracker::new();
        tracker.update_unencrypted(b"hello ");
        tracker.update_unencrypted(b"world");
        let expected = {
            let mut hasher = Sha256::new();
            hasher.update(b"hello world");
            hex::encode(hasher.finalize())
        };
        assert_eq!(tracker.unencrypted_sha256_hex(), expected);
    }
}
