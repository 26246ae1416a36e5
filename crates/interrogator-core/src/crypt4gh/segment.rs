//! Single-segment Crypt4GH decrypt/encrypt (SPEC_FULL.md §4.4).
//!
//! Grounded on the teacher's `crypto/aead.rs` seal/open wrapper (nonce + empty-AAD
//! payload, fail-closed tag verification) and on the original interrogator's inline
//! `decrypt_algo`/`encrypt_algo` calls, which split a segment into
//! `nonce = part[:12]` / `ciphertext_and_tag = part[12:]` with no associated data.

use chacha20poly1305::aead::{Aead, KeyInit, Payload};
use chacha20poly1305::{ChaCha20Poly1305, Nonce};
use rand::RngCore;
use thiserror::Error;

use crate::constants::{NONCE_LEN, SECRET_LEN};

#[derive(Debug, Error)]
pub enum SegmentError {
    #[error("segment shorter than nonce + tag")]
    Truncated,
    #[error("invalid key length: expected {expected}, got {actual}")]
    InvalidKeyLen { expected: usize, actual: usize },
    #[error("AEAD authentication failed")]
    TagMismatch,
}

/// Decrypt one on-wire Crypt4GH segment: `nonce(12) || ciphertext || tag(16)`.
pub fn decrypt_segment(segment: &[u8], key: &[u8]) -> Result<Vec<u8>, SegmentError> {
    if segment.len() < NONCE_LEN as usize {
        return Err(SegmentError::Truncated);
    }
    let cipher = cipher_from_key(key)?;
    let (nonce_bytes, ciphertext_and_tag) = segment.split_at(NONCE_LEN as usize);
    let nonce = Nonce::from_slice(nonce_bytes);
    cipher
        .decrypt(
            nonce,
            Payload {
                msg: ciphertext_and_tag,
                aad: &[],
            },
        )
        .map_err(|_| SegmentError::TagMismatch)
}

/// Encrypt one plaintext segment, drawing a fresh random nonce. Returns
/// `nonce(12) || ciphertext || tag(16)`.
pub fn encrypt_segment(plaintext: &[u8], key: &[u8]) -> Result<Vec<u8>, SegmentError> {
    let cipher = cipher_from_key(key)?;

    let mut nonce_bytes = [0u8; NONCE_LEN as usize];
    rand::thread_rng().fill_bytes(&mut nonce_bytes);
    let nonce = Nonce::from_slice(&nonce_bytes);

    let ciphertext_and_tag = cipher
        .encrypt(nonce, Payload { msg: plaintext, aad: &[] })
        .map_err(|_| SegmentError::TagMismatch)?;

    let mut out = Vec::with_capacity(nonce_bytes.len() + ciphertext_and_tag.len());
    out.extend_from_slice(&nonce_bytes);
    out.extend_from_slice(&ciphertext_and_tag);
    Ok(out)
}

fn cipher_from_key(key: &[u8]) -> Result<ChaCha20Poly1305, SegmentError> {
    if key.len() != SECRET_LEN {
        return Err(SegmentError::InvalidKeyLen {
            expected: SECRET_LEN,
            actual: key.len(),
        });
    }
    ChaCha20Poly1305::new_from_slice(key).map_err(|_| SegmentError::InvalidKeyLen {
        expected: SECRET_LEN,
        actual: key.len(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(byte: u8) -> Vec<u8> {
        vec![byte; SECRET_LEN]
    }

    #[test]
    fn round_trip_recovers_plaintext() {
        let plaintext = b"the quick brown fox jumps over the lazy dog";
        let k = key(7);
        let segment = encrypt_segment(plaintext, &k).unwrap();
        let recovered = decrypt_segment(&segment, &k).unwrap();
        assert_eq!(recovered, plaintext);
    }

    #[test]
    fn tampered_tag_is_rejected() {
        let k = key(1);
        let mut segment = encrypt_segment(b"some plaintext bytes", &k).unwrap();
        let last = segment.len() - 1;
        segment[last] ^= 0xFF;
        assert!(matches!(decrypt_segment(&segment, &k), Err(SegmentError::TagMismatch)));
    }

    #[test]
    fn wrong_key_is_rejected() {
        let segment = encrypt_segment(b"payload", &key(3)).unwrap();
        assert!(matches!(
            decrypt_segment(&segment, &key(9)),
            Err(SegmentError::TagMismatch)
        ));
    }

    #[test]
    fn successive_encryptions_use_distinct_nonces() {
        let k = key(4);
        let a = encrypt_segment(b"same plaintext", &k).unwrap();
        let b = encrypt_segment(b"same plaintext", &k).unwrap();
        assert_ne!(&a[..12], &b[..12]);
    }
}
