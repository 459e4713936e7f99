//! # Remote Drive Blob Store
//!
//! Uploads images to a Google-Drive-compatible file API and records the
//! share link. Reads rewrite share links into CDN URLs via
//! `wheeler_core::media`.
//!
//! ## Protocol
//!
//! 1. `POST {base}/upload/drive/v3/files?uploadType=media&fields=id` with the
//!    raw bytes. Returns `{"id": "..."}`.
//! 2. `PATCH {base}/drive/v3/files/{id}?fields=id[&addParents=<folder>]` with
//!    `{"name": "<file name>"}` to name the file and file it in the
//!    configured folder.
//!
//! The bearer access token is supplied by the operator; token refresh is
//! outside this adapter.

use std::fmt;
use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;

use crate::naming::sanitize_file_name;
use crate::{BlobError, BlobStore, StoredBlob, Upload};

/// Default Drive API origin.
pub const DEFAULT_API_BASE: &str = "https://www.googleapis.com";

/// Configuration for [`DriveBlobStore`].
#[derive(Clone)]
pub struct DriveConfig {
    /// API origin, e.g. `https://www.googleapis.com`.
    pub api_base: String,
    /// OAuth bearer token with write access to the folder.
    pub access_token: String,
    /// Folder that receives uploads. `None` leaves files in the drive root.
    pub folder_id: Option<String>,
    /// Request timeout in seconds (default: 30).
    pub timeout_secs: u64,
}

impl DriveConfig {
    pub fn new(access_token: impl Into<String>, folder_id: Option<String>) -> Self {
        Self {
            api_base: DEFAULT_API_BASE.to_string(),
            access_token: access_token.into(),
            folder_id,
            timeout_secs: 30,
        }
    }

    pub fn with_api_base(mut self, api_base: impl Into<String>) -> Self {
        self.api_base = api_base.into();
        self
    }
}

impl fmt::Debug for DriveConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DriveConfig")
            .field("api_base", &self.api_base)
            .field("access_token", &"[REDACTED]")
            .field("folder_id", &self.folder_id)
            .field("timeout_secs", &self.timeout_secs)
            .finish()
    }
}

#[derive(Debug, Deserialize)]
struct FileResource {
    id: String,
}

/// HTTP client for the remote file API.
#[derive(Debug)]
pub struct DriveBlobStore {
    client: reqwest::Client,
    api_base: String,
    folder_id: Option<String>,
}

impl DriveBlobStore {
    pub fn new(config: DriveConfig) -> Result<Self, BlobError> {
        if config.access_token.trim().is_empty() {
            return Err(BlobError::Config("drive access token is empty".into()));
        }

        let mut headers = reqwest::header::HeaderMap::new();
        let mut auth = reqwest::header::HeaderValue::from_str(&format!(
            "Bearer {}",
            config.access_token
        ))
        .map_err(|_| BlobError::Config("invalid access token characters".into()))?;
        auth.set_sensitive(true);
        headers.insert(reqwest::header::AUTHORIZATION, auth);

        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .default_headers(headers)
            .build()
            .map_err(|e| BlobError::Config(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            api_base: config.api_base.trim_end_matches('/').to_string(),
            folder_id: config.folder_id,
        })
    }

    /// Share link recorded for an uploaded file.
    pub fn share_link(file_id: &str) -> String {
        format!("https://drive.google.com/file/d/{file_id}/view")
    }

    async fn send(
        &self,
        request: reqwest::RequestBuilder,
        operation: &'static str,
    ) -> Result<reqwest::Response, BlobError> {
        let resp = request
            .send()
            .await
            .map_err(|source| BlobError::Http { operation, source })?;

        if !resp.status().is_success() {
            let status = resp.status().as_u16();
            let body = resp.text().await.unwrap_or_default();
            return Err(BlobError::Api {
                operation,
                status,
                body,
            });
        }
        Ok(resp)
    }
}

#[async_trait]
impl BlobStore for DriveBlobStore {
    fn backend(&self) -> &'static str {
        "drive"
    }

    async fn put(&self, upload: Upload) -> Result<StoredBlob, BlobError> {
        let size = upload.bytes.len();
        let content_type = upload
            .content_type
            .clone()
            .unwrap_or_else(|| "application/octet-stream".to_string());

        let resp = self
            .send(
                self.client
                    .post(format!("{}/upload/drive/v3/files", self.api_base))
                    .query(&[("uploadType", "media"), ("fields", "id")])
                    .header(reqwest::header::CONTENT_TYPE, content_type)
                    .body(upload.bytes),
                "drive_upload",
            )
            .await?;
        let file: FileResource = resp.json().await.map_err(|source| {
            BlobError::Deserialization {
                operation: "drive_upload",
                source,
            }
        })?;

        let mut query = vec![("fields", "id".to_string())];
        if let Some(folder) = &self.folder_id {
            query.push(("addParents", folder.clone()));
        }
        self.send(
            self.client
                .patch(format!("{}/drive/v3/files/{}", self.api_base, file.id))
                .query(&query)
                .json(&serde_json::json!({ "name": sanitize_file_name(&upload.file_name) })),
            "drive_rename",
        )
        .await?;

        tracing::info!(file_id = %file.id, size, "uploaded blob to remote drive");

        Ok(StoredBlob {
            reference: Self::share_link(&file.id),
            scope: upload.scope,
            size,
        })
    }
}
