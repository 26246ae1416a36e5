//! Central coordinator client.
//!
//! Grounded on `adapters/outbound/central.py`: one HTTP client, bearer-token auth
//! minted fresh per request, three endpoints (list pending uploads, ask which
//! interrogation-bucket objects are removable, submit a report).

use base64::{
    engine::general_purpose::{STANDARD, URL_SAFE_NO_PAD},
    Engine as _,
};
use chrono::Utc;
use crypto_box::aead::{Aead, AeadCore, OsRng};
use crypto_box::{PublicKey, SalsaBox, SecretKey};
use jsonwebtoken::{encode, Algorithm, EncodingKey, Header};
use reqwest_middleware::ClientWithMiddleware;
use secrecy::ExposeSecret;
use serde::Serialize;
use tracing::debug;
use uuid::Uuid;

use interrogator_core::constants::{AUTH_TOKEN_VALID_SECS, JWT_AUDIENCE, JWT_ISSUER};
use interrogator_core::models::{FileUpload, InterrogationReport};
use interrogator_core::ports::{CentralClientError, CentralClientPort};

#[derive(Serialize)]
struct Claims {
    iss: &'static str,
    aud: &'static str,
    sub: String,
    iat: i64,
    exp: i64,
}

/// Outbound shape of an [`InterrogationReport`]. Differs from the in-process type
/// in one field: `secret` travels as a base64url string holding the sealed-box
/// ciphertext of the raw key, never the key itself.
#[derive(Serialize)]
struct ReportWire<'a> {
    file_id: Uuid,
    storage_alias: &'a str,
    interrogated_at: chrono::DateTime<Utc>,
    passed: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    reason: &'a Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    secret: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    encrypted_parts_md5: &'a Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    encrypted_parts_sha256: &'a Option<Vec<String>>,
}

pub struct CentralClientAdapter {
    http: ClientWithMiddleware,
    base_url: String,
    inbox_storage_alias: String,
    /// HMAC-SHA256 signing key, derived from the data hub's Crypt4GH private key
    /// via HKDF-SHA256 (see Open Question 3 in DESIGN.md) rather than a second
    /// configured secret.
    jwt_signing_key: Vec<u8>,
    central_public_key: PublicKey,
}

impl CentralClientAdapter {
    pub fn new(
        http: ClientWithMiddleware,
        base_url: String,
        inbox_storage_alias: String,
        data_hub_private_key: &[u8],
        central_public_key_bytes: [u8; 32],
    ) -> Self {
        let hk = hkdf::Hkdf::<sha2::Sha256>::new(None, data_hub_private_key);
        let mut jwt_signing_key = vec![0u8; 32];
        hk.expand(b"dhfs-worker-jwt-hs256", &mut jwt_signing_key)
            .expect("32 bytes is a valid HKDF-SHA256 output length");

        Self {
            http,
            base_url,
            inbox_storage_alias,
            jwt_signing_key,
            central_public_key: PublicKey::from(central_public_key_bytes),
        }
    }

    fn mint_auth_token(&self) -> Result<String, CentralClientError> {
        let now = Utc::now().timestamp();
        let claims = Claims {
            iss: JWT_ISSUER,
            aud: JWT_AUDIENCE,
            sub: self.inbox_storage_alias.clone(),
            iat: now,
            exp: now + AUTH_TOKEN_VALID_SECS as i64,
        };
        encode(
            &Header::new(Algorithm::HS256),
            &claims,
            &EncodingKey::from_secret(&self.jwt_signing_key),
        )
        .map_err(|e| CentralClientError::ResponseFormat(format!("failed to mint auth token: {e}")))
    }

    /// Base64url-encode the raw secret, then seal it to the central public key.
    /// Anonymous-sender sealed box: an ephemeral X25519 keypair is generated per
    /// call, a shared secret is derived against the central public key, and the
    /// payload is sealed under that shared secret with a fresh random nonce. The
    /// ephemeral public key and nonce are prepended so the central API can open it
    /// without needing a reply channel to this worker. The returned bytes are the
    /// exact wire value once base64-encoded by the caller.
    fn wrap_secret(&self, raw_secret: &[u8]) -> Vec<u8> {
        let encoded = URL_SAFE_NO_PAD.encode(raw_secret);

        let ephemeral_secret = SecretKey::generate(&mut OsRng);
        let ephemeral_public = ephemeral_secret.public_key();
        let sealed_box = SalsaBox::new(&self.central_public_key, &ephemeral_secret);
        let nonce = SalsaBox::generate_nonce(&mut OsRng);
        let ciphertext = sealed_box
            .encrypt(&nonce, encoded.as_bytes())
            .expect("sealing a short base64 string into a SalsaBox cannot fail");

        let mut wrapped = Vec::with_capacity(32 + 24 + ciphertext.len());
        wrapped.extend_from_slice(ephemeral_public.as_bytes());
        wrapped.extend_from_slice(nonce.as_slice());
        wrapped.extend_from_slice(&ciphertext);
        wrapped
    }

    fn bearer_request(
        &self,
        method: reqwest::Method,
        path: &str,
    ) -> Result<reqwest_middleware::RequestBuilder, CentralClientError> {
        let token = self.mint_auth_token()?;
        Ok(self
            .http
            .request(method, format!("{}{}", self.base_url, path))
            .bearer_auth(token))
    }
}

#[async_trait::async_trait]
impl CentralClientPort for CentralClientAdapter {
    async fn fetch_new_uploads(&self) -> Result<Vec<FileUpload>, CentralClientError> {
        let path = format!("/storages/{}/uploads", self.inbox_storage_alias);
        let response = self
            .bearer_request(reqwest::Method::GET, &path)?
            .send()
            .await
            .map_err(|e| CentralClientError::ConnectionFailed(e.to_string()))?;

        if response.status() != reqwest::StatusCode::OK {
            return Err(CentralClientError::CentralApi {
                status: response.status().as_u16(),
            });
        }

        response
            .json::<Vec<FileUpload>>()
            .await
            .map_err(|e| CentralClientError::ResponseFormat(e.to_string()))
    }

    async fn get_removable_files(&self, file_ids: &[Uuid]) -> Result<Vec<Uuid>, CentralClientError> {
        let query: Vec<(&str, String)> = file_ids
            .iter()
            .map(|id| ("file_id", id.to_string()))
            .collect();
        let response = self
            .bearer_request(reqwest::Method::GET, "/uploads/can_remove")?
            .query(&query)
            .send()
            .await
            .map_err(|e| CentralClientError::ConnectionFailed(e.to_string()))?;

        if response.status() != reqwest::StatusCode::OK {
            return Err(CentralClientError::CentralApi {
                status: response.status().as_u16(),
            });
        }

        response
            .json::<Vec<Uuid>>()
            .await
            .map_err(|e| CentralClientError::ResponseFormat(e.to_string()))
    }

    async fn submit_interrogation_report(
        &self,
        report: &InterrogationReport,
    ) -> Result<(), CentralClientError> {
        let secret = report.secret.as_ref().map(|s| {
            let wrapped = self.wrap_secret(s.expose_secret());
            STANDARD.encode(wrapped)
        });

        let wire = ReportWire {
            file_id: report.file_id,
            storage_alias: &report.storage_alias,
            interrogated_at: report.interrogated_at,
            passed: report.passed,
            reason: &report.reason,
            secret,
            encrypted_parts_md5: &report.encrypted_parts_md5,
            encrypted_parts_sha256: &report.encrypted_parts_sha256,
        };

        let response = self
            .bearer_request(reqwest::Method::POST, "/interrogation_reports")?
            .json(&wire)
            .send()
            .await
            .map_err(|e| CentralClientError::ConnectionFailed(e.to_string()))?;

        if !matches!(
            response.status(),
            reqwest::StatusCode::OK | reqwest::StatusCode::CREATED
        ) {
            return Err(CentralClientError::CentralApi {
                status: response.status().as_u16(),
            });
        }
        debug!(file_id = %report.file_id, passed = report.passed, "submitted interrogation report");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};
    use serde::Deserialize;
    use std::time::Duration;

    #[derive(Deserialize)]
    struct DecodedClaims {
        iss: String,
        aud: String,
        sub: String,
        iat: i64,
        exp: i64,
    }

    #[test]
    fn minted_token_satisfies_the_bearer_token_law() {
        let secret = crypto_box::SecretKey::generate(&mut OsRng);
        let adapter = CentralClientAdapter::new(
            crate::http::build_http_client(1, Duration::from_secs(5)),
            "http://example.invalid".to_string(),
            "inbox".to_string(),
            b"0123456789abcdef0123456789abcdef",
            *secret.public_key().as_bytes(),
        );

        let token = adapter.mint_auth_token().expect("token minting should succeed");

        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_audience(&["GHGA"]);
        validation.set_required_spec_claims(&["iss", "aud", "sub", "iat", "exp"]);
        let decoded = decode::<DecodedClaims>(
            &token,
            &DecodingKey::from_secret(&adapter.jwt_signing_key),
            &validation,
        )
        .expect("token should decode and verify under its own signing key");

        assert_eq!(decoded.claims.iss, "GHGA");
        assert_eq!(decoded.claims.aud, "GHGA");
        assert_eq!(decoded.claims.sub, "inbox");
        assert_eq!(decoded.claims.exp - decoded.claims.iat, 60);
    }
}
