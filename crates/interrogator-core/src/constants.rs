//! Fixed parameters of the Crypt4GH segment format and the central-API bearer token.

/// Plaintext size of every segment but (possibly) the last one.
pub const SEGMENT_PLAINTEXT_LEN: u64 = 65_536;

/// ChaCha20-Poly1305 IETF nonce length, prefixed to every ciphertext segment.
pub const NONCE_LEN: u64 = 12;

/// Poly1305 authentication tag length, suffixed to every ciphertext segment.
pub const TAG_LEN: u64 = 16;

/// On-wire size of a full segment: `nonce || ciphertext || tag`.
pub const SEGMENT_CIPHERTEXT_LEN: u64 = NONCE_LEN + SEGMENT_PLAINTEXT_LEN + TAG_LEN;

/// Symmetric key length used for both the old and the freshly generated secret.
pub const SECRET_LEN: usize = 32;

/// Lifetime of a minted bearer token, matching the central API's clock skew tolerance.
pub const AUTH_TOKEN_VALID_SECS: i64 = 60;

pub const JWT_ISSUER: &str = "GHGA";
pub const JWT_AUDIENCE: &str = "GHGA";
