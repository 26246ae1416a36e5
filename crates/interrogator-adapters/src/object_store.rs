//! S3-compatible object store client.
//!
//! Grounded on `adapters/outbound/s3.py`: existence check, ranged download via a
//! presigned URL, and the multipart upload lifecycle (init/part-PUT/complete/abort)
//! against the interrogation bucket, plus delete and list for the cleaner. The
//! inbox and interrogation buckets are looked up once at construction time per
//! `_get_bucket_and_storage`; an unconfigured alias is represented the same way
//! the Python raises `StorageAliasNotConfiguredError`.

use reqwest_middleware::ClientWithMiddleware;
use serde::Deserialize;
use tracing::info;

use interrogator_core::ports::{ObjectStoreError, ObjectStorePort};

#[derive(Deserialize)]
struct PresignedUrl {
    url: String,
}

#[derive(Deserialize)]
struct InitUploadResponse {
    upload_id: String,
}

#[derive(Deserialize)]
struct CompleteUploadResponse {
    etag: String,
}

#[derive(Deserialize)]
struct ListObjectsResponse {
    object_ids: Vec<String>,
}

pub struct ObjectStoreAdapter {
    http: ClientWithMiddleware,
    base_url: String,
    inbox_bucket_id: String,
    interrogation_bucket_id: String,
}

impl ObjectStoreAdapter {
    /// `bucket_for_alias` mirrors `_get_bucket_and_storage`: resolve both
    /// configured aliases up front so a missing one fails fast at construction
    /// rather than partway through a batch.
    pub fn new(
        http: ClientWithMiddleware,
        base_url: String,
        inbox_storage_alias: &str,
        interrogation_storage_alias: &str,
        bucket_for_alias: impl Fn(&str) -> Option<String>,
    ) -> Result<Self, ObjectStoreError> {
        let inbox_bucket_id =
            bucket_for_alias(inbox_storage_alias).ok_or_else(|| ObjectStoreError::StorageAliasNotConfigured {
                alias: inbox_storage_alias.to_string(),
            })?;
        let interrogation_bucket_id = bucket_for_alias(interrogation_storage_alias).ok_or_else(|| {
            ObjectStoreError::StorageAliasNotConfigured {
                alias: interrogation_storage_alias.to_string(),
            }
        })?;

        Ok(Self {
            http,
            base_url,
            inbox_bucket_id,
            interrogation_bucket_id,
        })
    }

    fn objects_path(&self, bucket_id: &str, object_id: &str) -> String {
        format!("{}/buckets/{}/objects/{}", self.base_url, bucket_id, object_id)
    }

    async fn presigned_download_url(&self, object_id: &str) -> Result<String, ObjectStoreError> {
        let response = self
            .http
            .get(format!(
                "{}/download-url",
                self.objects_path(&self.inbox_bucket_id, object_id)
            ))
            .send()
            .await
            .map_err(|e| ObjectStoreError::RequestFailed(e.to_string()))?;
        let body: PresignedUrl = response
            .json()
            .await
            .map_err(|e| ObjectStoreError::RequestFailed(e.to_string()))?;
        Ok(body.url)
    }
}

#[async_trait::async_trait]
impl ObjectStorePort for ObjectStoreAdapter {
    async fn object_exists_in_inbox(&self, object_id: &str) -> Result<bool, ObjectStoreError> {
        let response = self
            .http
            .head(self.objects_path(&self.inbox_bucket_id, object_id))
            .send()
            .await
            .map_err(|e| ObjectStoreError::RequestFailed(e.to_string()))?;
        Ok(response.status().is_success())
    }

    async fn fetch_inbox_part(&self, object_id: &str, start: u64, stop: u64) -> Result<Vec<u8>, ObjectStoreError> {
        let download_url = self.presigned_download_url(object_id).await?;
        // the internal planner uses half-open [start, stop); the wire range header
        // is inclusive-inclusive.
        let range_header = format!("bytes={}-{}", start, stop.saturating_sub(1));

        let response = self
            .http
            .get(download_url)
            .header(reqwest::header::RANGE, range_header)
            .header(reqwest::header::CACHE_CONTROL, "no-store")
            .send()
            .await
            .map_err(|e| ObjectStoreError::RequestFailed(e.to_string()))?;

        if response.status() == reqwest::StatusCode::NOT_FOUND {
            return Err(ObjectStoreError::ObjectNotFound {
                object_id: object_id.to_string(),
            });
        }
        if !response.status().is_success() {
            return Err(ObjectStoreError::RequestFailed(format!(
                "unexpected status {} fetching part of {object_id:?}",
                response.status()
            )));
        }

        response
            .bytes()
            .await
            .map(|b| b.to_vec())
            .map_err(|e| ObjectStoreError::RequestFailed(e.to_string()))
    }

    async fn init_interrogation_upload(&self, object_id: &str) -> Result<String, ObjectStoreError> {
        let response = self
            .http
            .post(format!(
                "{}/multipart",
                self.objects_path(&self.interrogation_bucket_id, object_id)
            ))
            .send()
            .await
            .map_err(|e| ObjectStoreError::RequestFailed(e.to_string()))?;

        if !response.status().is_success() {
            return Err(ObjectStoreError::UploadInitFailed {
                object_id: object_id.to_string(),
                message: format!("status {}", response.status()),
            });
        }

        let body: InitUploadResponse = response
            .json()
            .await
            .map_err(|e| ObjectStoreError::UploadInitFailed {
                object_id: object_id.to_string(),
                message: e.to_string(),
            })?;
        info!(object_id, upload_id = %body.upload_id, "created multipart upload");
        Ok(body.upload_id)
    }

    async fn upload_part(
        &self,
        upload_id: &str,
        object_id: &str,
        part_no: u32,
        part_md5_base64: &str,
        part: &[u8],
    ) -> Result<(), ObjectStoreError> {
        let upload_url_response = self
            .http
            .get(format!(
                "{}/multipart/{}/parts/{}/upload-url",
                self.objects_path(&self.interrogation_bucket_id, object_id),
                upload_id,
                part_no
            ))
            .query(&[("md5", part_md5_base64)])
            .send()
            .await
            .map_err(|e| ObjectStoreError::RequestFailed(e.to_string()))?;
        let upload_url: PresignedUrl = upload_url_response
            .json()
            .await
            .map_err(|e| ObjectStoreError::UploadFailed {
                object_id: object_id.to_string(),
                part_no,
                message: e.to_string(),
            })?;

        let response = self
            .http
            .put(upload_url.url)
            .header(reqwest::header::CONTENT_MD5, part_md5_base64)
            .body(part.to_vec())
            .send()
            .await
            .map_err(|e| ObjectStoreError::RequestFailed(e.to_string()))?;

        if response.status() == reqwest::StatusCode::BAD_REQUEST {
            return Err(ObjectStoreError::BadPartMd5 {
                object_id: object_id.to_string(),
                part_no,
            });
        }
        if !response.status().is_success() {
            return Err(ObjectStoreError::UploadFailed {
                object_id: object_id.to_string(),
                part_no,
                message: format!("status {}", response.status()),
            });
        }
        Ok(())
    }

    async fn complete_upload(&self, upload_id: &str, object_id: &str, part_count: u32) -> Result<String, ObjectStoreError> {
        let response = self
            .http
            .post(format!(
                "{}/multipart/{}/complete",
                self.objects_path(&self.interrogation_bucket_id, object_id),
                upload_id
            ))
            .json(&serde_json::json!({ "part_count": part_count }))
            .send()
            .await
            .map_err(|e| ObjectStoreError::UploadCompletionFailed {
                object_id: object_id.to_string(),
                message: e.to_string(),
            })?;

        if !response.status().is_success() {
            return Err(ObjectStoreError::UploadCompletionFailed {
                object_id: object_id.to_string(),
                message: format!("status {}", response.status()),
            });
        }

        let body: CompleteUploadResponse = response
            .json()
            .await
            .map_err(|e| ObjectStoreError::UploadCompletionFailed {
                object_id: object_id.to_string(),
                message: e.to_string(),
            })?;
        Ok(body.etag.trim_matches('"').to_string())
    }

    async fn abort_upload(&self, upload_id: &str, object_id: &str) -> Result<(), ObjectStoreError> {
        let response = self
            .http
            .delete(format!(
                "{}/multipart/{}",
                self.objects_path(&self.interrogation_bucket_id, object_id),
                upload_id
            ))
            .send()
            .await
            .map_err(|e| ObjectStoreError::RequestFailed(e.to_string()))?;

        if !response.status().is_success() && response.status() != reqwest::StatusCode::NOT_FOUND {
            return Err(ObjectStoreError::RequestFailed(format!(
                "failed to abort upload {upload_id} for {object_id:?}: status {}",
                response.status()
            )));
        }
        Ok(())
    }

    async fn remove_interrogation_object(&self, object_id: &str) -> Result<(), ObjectStoreError> {
        let response = self
            .http
            .delete(self.objects_path(&self.interrogation_bucket_id, object_id))
            .send()
            .await
            .map_err(|e| ObjectStoreError::RequestFailed(e.to_string()))?;

        if response.status() == reqwest::StatusCode::NOT_FOUND {
            return Err(ObjectStoreError::ObjectNotFound {
                object_id: object_id.to_string(),
            });
        }
        if !response.status().is_success() {
            return Err(ObjectStoreError::RequestFailed(format!(
                "failed to remove {object_id:?}: status {}",
                response.status()
            )));
        }
        Ok(())
    }

    async fn list_interrogation_objects(&self) -> Result<Vec<String>, ObjectStoreError> {
        let response = self
            .http
            .get(format!(
                "{}/buckets/{}/objects",
                self.base_url, self.interrogation_bucket_id
            ))
            .send()
            .await
            .map_err(|e| ObjectStoreError::RequestFailed(e.to_string()))?;

        if !response.status().is_success() {
            return Err(ObjectStoreError::RequestFailed(format!(
                "failed to list interrogation bucket objects: status {}",
                response.status()
            )));
        }

        let body: ListObjectsResponse = response
            .json()
            .await
            .map_err(|e| ObjectStoreError::RequestFailed(e.to_string()))?;
        Ok(body.object_ids)
    }
}
