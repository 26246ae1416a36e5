pub mod envelope;
pub mod segment;

pub use envelope::{decode_envelope, EnvelopeError};
pub use segment::{decrypt_segment, encrypt_segment, SegmentError};

/// Boundary around envelope decoding, mirroring the way the central/object-store
/// ports are expressed as traits. Production code uses
/// [`Crypt4GhEnvelopeDecoder`]; tests substitute a decoder that does not require
/// a genuine Crypt4GH header.
pub trait EnvelopeDecoder: Send + Sync {
    fn decode(&self, envelope_bytes: &[u8], private_key: &[u8]) -> Result<(Vec<u8>, u64), EnvelopeError>;
}

/// The real decoder, backed by the `crypt4gh` crate.
#[derive(Default)]
pub struct Crypt4GhEnvelopeDecoder;

impl EnvelopeDecoder for Crypt4GhEnvelopeDecoder {
    fn decode(&self, envelope_bytes: &[u8], private_key: &[u8]) -> Result<(Vec<u8>, u64), EnvelopeError> {
        decode_envelope(envelope_bytes, private_key)
    }
}
