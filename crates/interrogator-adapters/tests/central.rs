//! Integration tests for `CentralClientAdapter` against a mocked HTTP server.

use std::time::Duration;

use interrogator_adapters::{build_http_client, CentralClientAdapter};
use interrogator_core::models::InterrogationReport;
use interrogator_core::ports::CentralClientPort;
use secrecy::Secret;

const PRIVATE_KEY: &[u8] = b"0123456789abcdef0123456789abcdef";

fn central_public_key() -> [u8; 32] {
    let secret = crypto_box::SecretKey::generate(&mut crypto_box::aead::OsRng);
    *secret.public_key().as_bytes()
}

fn adapter(base_url: String) -> CentralClientAdapter {
    let http = build_http_client(1, Duration::from_secs(5));
    CentralClientAdapter::new(
        http,
        base_url,
        "inbox".to_string(),
        PRIVATE_KEY,
        central_public_key(),
    )
}

#[tokio::test]
async fn fetch_new_uploads_parses_successful_response() {
    let mut server = mockito::Server::new_async().await;
    let body = serde_json::json!([{
        "id": "3fa85f64-5717-4562-b3fc-2c963f66afa6",
        "storage_alias": "inbox",
        "decrypted_sha256": "abc123",
        "decrypted_size": 100,
        "encrypted_size": 200,
        "part_size": 5242880
    }]);
    let mock = server
        .mock("GET", "/storages/inbox/uploads")
        .match_header("authorization", mockito::Matcher::Regex("Bearer .+".into()))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(body.to_string())
        .create_async()
        .await;

    let client = adapter(server.url());
    let uploads = client.fetch_new_uploads().await.expect("request should succeed");

    mock.assert_async().await;
    assert_eq!(uploads.len(), 1);
    assert_eq!(uploads[0].decrypted_size, 100);
}

#[tokio::test]
async fn fetch_new_uploads_surfaces_non_success_status() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("GET", "/storages/inbox/uploads")
        .with_status(503)
        .create_async()
        .await;

    let client = adapter(server.url());
    let err = client.fetch_new_uploads().await.unwrap_err();
    assert!(matches!(
        err,
        interrogator_core::ports::CentralClientError::CentralApi { status: 503 }
    ));
}

#[tokio::test]
async fn get_removable_files_returns_central_supplied_list() {
    let mut server = mockito::Server::new_async().await;
    let id = "3fa85f64-5717-4562-b3fc-2c963f66afa6";
    server
        .mock("GET", mockito::Matcher::Regex("^/uploads/can_remove".into()))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(format!("[\"{id}\"]"))
        .create_async()
        .await;

    let client = adapter(server.url());
    let ids = client
        .get_removable_files(&[uuid::Uuid::parse_str(id).unwrap()])
        .await
        .expect("request should succeed");
    assert_eq!(ids.len(), 1);
}

#[tokio::test]
async fn submit_interrogation_report_sends_wrapped_secret() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("POST", "/interrogation_reports")
        .with_status(201)
        .create_async()
        .await;

    let client = adapter(server.url());
    let report = InterrogationReport::success(
        uuid::Uuid::new_v4(),
        "inbox".to_string(),
        chrono::Utc::now(),
        Secret::new(vec![7u8; 32]),
        vec!["md5-part".to_string()],
        vec!["sha256-part".to_string()],
    );

    client
        .submit_interrogation_report(&report)
        .await
        .expect("request should succeed");
    mock.assert_async().await;
}
