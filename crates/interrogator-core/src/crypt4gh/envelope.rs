//! Crypt4GH envelope decoding.
//!
//! Grounded on the real `crypt4gh` crate's low-level header API as exercised in
//! the umccr-htsget-rs storage layer (`header::deconstruct_header_info` /
//! `header::deconstruct_header_body`), and on the original interrogator's
//! `_extract_envelope_content`, which reads the envelope from a `BytesIO` and
//! takes the stream position after parsing as the content offset.

use crypt4gh::header::{deconstruct_header_body, deconstruct_header_info, DecryptedHeaderPackets};
use crypt4gh::Keys;
use std::io::{Cursor, Read};
use thiserror::Error;

const HEADER_INFO_LEN: usize = 16;

#[derive(Debug, Error)]
pub enum EnvelopeError {
    #[error("envelope is shorter than the fixed header-info block")]
    Truncated,
    #[error("malformed envelope header: {0}")]
    MalformedHeader(String),
    #[error("no session key could be unwrapped for this recipient key")]
    NoUsableSessionKey,
}

/// Decode a Crypt4GH envelope from the leading bytes of an inbox object.
///
/// Returns the file's 32-byte session key and the number of bytes the envelope
/// occupied (the content offset). `private_key` is this worker's X25519 private
/// key, used as recipient key 0.
pub fn decode_envelope(
    envelope_bytes: &[u8],
    private_key: &[u8],
) -> Result<(Vec<u8>, u64), EnvelopeError> {
    let mut cursor = Cursor::new(envelope_bytes);

    let mut info_buf = [0u8; HEADER_INFO_LEN];
    cursor
        .read_exact(&mut info_buf)
        .map_err(|_| EnvelopeError::Truncated)?;
    let header_info =
        deconstruct_header_info(&info_buf).map_err(|e| EnvelopeError::MalformedHeader(e.to_string()))?;

    let mut packet_bytes = 0u64;
    let mut encrypted_packets = Vec::with_capacity(header_info.packets_count as usize);
    for _ in 0..header_info.packets_count {
        let mut len_buf = [0u8; 4];
        cursor
            .read_exact(&mut len_buf)
            .map_err(|_| EnvelopeError::Truncated)?;
        let packet_len = u32::from_le_bytes(len_buf);
        let body_len = packet_len
            .checked_sub(4)
            .ok_or_else(|| EnvelopeError::MalformedHeader("packet length < 4".into()))?;
        packet_bytes += 4 + u64::from(body_len);

        let mut packet = vec![0u8; body_len as usize];
        cursor
            .read_exact(&mut packet)
            .map_err(|_| EnvelopeError::Truncated)?;
        encrypted_packets.push(packet);
    }

    let keys = vec![Keys {
        method: 0,
        privkey: private_key.to_vec(),
        recipient_pubkey: Vec::new(),
    }];

    let DecryptedHeaderPackets {
        data_enc_packets: session_keys,
        ..
    } = deconstruct_header_body(encrypted_packets, &keys, &None)
        .map_err(|e| EnvelopeError::MalformedHeader(e.to_string()))?;

    let session_key = session_keys
        .into_iter()
        .next()
        .ok_or(EnvelopeError::NoUsableSessionKey)?;

    let offset = HEADER_INFO_LEN as u64 + packet_bytes;
    Ok((session_key, offset))
}
