//! Integration tests for `ObjectStoreAdapter` against a mocked HTTP server.

use std::collections::HashMap;
use std::time::Duration;

use interrogator_adapters::{build_http_client, ObjectStoreAdapter};
use interrogator_core::ports::{ObjectStoreError, ObjectStorePort};

fn adapter(base_url: String) -> ObjectStoreAdapter {
    let http = build_http_client(1, Duration::from_secs(5));
    let mut buckets = HashMap::new();
    buckets.insert("inbox".to_string(), "inbox-bucket".to_string());
    buckets.insert("interrogation".to_string(), "interrogation-bucket".to_string());

    ObjectStoreAdapter::new(http, base_url, "inbox", "interrogation", move |alias| {
        buckets.get(alias).cloned()
    })
    .expect("both aliases are configured")
}

#[tokio::test]
async fn construction_fails_fast_on_unconfigured_alias() {
    let err = ObjectStoreAdapter::new(
        build_http_client(1, Duration::from_secs(5)),
        "http://localhost".to_string(),
        "inbox",
        "interrogation",
        |_alias| None,
    )
    .unwrap_err();
    assert!(matches!(err, ObjectStoreError::StorageAliasNotConfigured { .. }));
}

#[tokio::test]
async fn object_exists_in_inbox_reflects_head_status() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("HEAD", "/buckets/inbox-bucket/objects/file-1")
        .with_status(200)
        .create_async()
        .await;

    let client = adapter(server.url());
    assert!(client.object_exists_in_inbox("file-1").await.unwrap());
    mock.assert_async().await;
}

#[tokio::test]
async fn fetch_inbox_part_requests_range_against_presigned_url() {
    let mut server = mockito::Server::new_async().await;
    let download_url_mock = server
        .mock("GET", "/buckets/inbox-bucket/objects/file-1/download-url")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(serde_json::json!({ "url": format!("{}/raw/file-1", server.url()) }).to_string())
        .create_async()
        .await;
    let range_mock = server
        .mock("GET", "/raw/file-1")
        .match_header("range", "bytes=0-99")
        .with_status(206)
        .with_body(vec![1u8; 100])
        .create_async()
        .await;

    let client = adapter(server.url());
    let part = client.fetch_inbox_part("file-1", 0, 100).await.unwrap();

    download_url_mock.assert_async().await;
    range_mock.assert_async().await;
    assert_eq!(part.len(), 100);
}

#[tokio::test]
async fn upload_part_surfaces_bad_md5_as_typed_error() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock(
            "GET",
            "/buckets/interrogation-bucket/objects/file-1/multipart/upload-1/parts/0/upload-url",
        )
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(serde_json::json!({ "url": format!("{}/raw/put", server.url()) }).to_string())
        .create_async()
        .await;
    server
        .mock("PUT", "/raw/put")
        .with_status(400)
        .create_async()
        .await;

    let client = adapter(server.url());
    let err = client
        .upload_part("upload-1", "file-1", 0, "deadbeef==", &[1, 2, 3])
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        ObjectStoreError::BadPartMd5 { part_no: 0, .. }
    ));
}

#[tokio::test]
async fn remove_interrogation_object_treats_missing_object_as_not_found() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("DELETE", "/buckets/interrogation-bucket/objects/file-1")
        .with_status(404)
        .create_async()
        .await;

    let client = adapter(server.url());
    let err = client.remove_interrogation_object("file-1").await.unwrap_err();
    assert!(matches!(err, ObjectStoreError::ObjectNotFound { .. }));
}
