use super::token::TokenProvider;
use super::{describe_failure, DriveApi};
use crate::domain::error::{AppError, Result};
use async_trait::async_trait;
use reqwest::header::{CONTENT_TYPE, LOCATION};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::debug;

#[derive(Serialize)]
struct FileMetadata<'a> {
    name: &'a str,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    parents: Vec<&'a str>,
}

#[derive(Deserialize)]
struct FileResource {
    id: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct PermissionBody {
    #[serde(rename = "type")]
    kind: &'static str,
    role: &'static str,
    allow_file_discovery: bool,
}

/// Google Drive v3 client: resumable uploads and link sharing.
pub struct GoogleDriveClient {
    client: reqwest::Client,
    tokens: Arc<TokenProvider>,
    base_url: String,
    upload_base_url: String,
}

impl GoogleDriveClient {
    pub fn new(
        client: reqwest::Client,
        tokens: Arc<TokenProvider>,
        base_url: &str,
        upload_base_url: &str,
    ) -> Self {
        Self {
            client,
            tokens,
            base_url: base_url.trim_end_matches('/').to_string(),
            upload_base_url: upload_base_url.trim_end_matches('/').to_string(),
        }
    }

    /// Opens a resumable session and returns its upload URI.
    async fn start_session(
        &self,
        token: &str,
        metadata: &FileMetadata<'_>,
        mime_type: &str,
        length: usize,
    ) -> Result<String> {
        let url = format!("{}/files?uploadType=resumable", self.upload_base_url);
        let response = self
            .client
            .post(&url)
            .bearer_auth(token)
            .header("X-Upload-Content-Type", mime_type)
            .header("X-Upload-Content-Length", length.to_string())
            .json(metadata)
            .send()
            .await
            .map_err(|e| AppError::DriveError(format!("Upload session request failed: {}", e)))?;

        if !response.status().is_success() {
            return Err(AppError::DriveError(describe_failure(response).await));
        }

        response
            .headers()
            .get(LOCATION)
            .and_then(|value| value.to_str().ok())
            .map(str::to_string)
            .ok_or_else(|| AppError::DriveError("Upload session has no Location header".to_string()))
    }
}

#[async_trait]
impl DriveApi for GoogleDriveClient {
    async fn create_file(
        &self,
        name: &str,
        mime_type: &str,
        bytes: Vec<u8>,
        parent: Option<&str>,
    ) -> Result<String> {
        let token = self.tokens.access_token().await?;
        let metadata = FileMetadata {
            name,
            parents: parent.into_iter().collect(),
        };

        let session_uri = self
            .start_session(&token, &metadata, mime_type, bytes.len())
            .await?;
        debug!(name = %name, "Opened resumable upload session");

        let response = self
            .client
            .put(&session_uri)
            .bearer_auth(&token)
            .header(CONTENT_TYPE, mime_type)
            .body(bytes)
            .send()
            .await
            .map_err(|e| AppError::DriveError(format!("Upload failed: {}", e)))?;

        if !response.status().is_success() {
            return Err(AppError::DriveError(describe_failure(response).await));
        }

        let file: FileResource = response
            .json()
            .await
            .map_err(|e| AppError::DriveError(format!("Failed to parse JSON: {}", e)))?;

        Ok(file.id)
    }

    async fn share_publicly(&self, file_id: &str) -> Result<()> {
        let token = self.tokens.access_token().await?;
        let url = format!("{}/files/{}/permissions", self.base_url, file_id);
        let body = PermissionBody {
            kind: "anyone",
            role: "reader",
            allow_file_discovery: false,
        };

        let response = self
            .client
            .post(&url)
            .bearer_auth(token)
            .json(&body)
            .send()
            .await
            .map_err(|e| AppError::DriveError(format!("Permission request failed: {}", e)))?;

        if !response.status().is_success() {
            return Err(AppError::DriveError(describe_failure(response).await));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_permission_body_wire_shape() {
        let body = PermissionBody {
            kind: "anyone",
            role: "reader",
            allow_file_discovery: false,
        };
        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"type": "anyone", "role": "reader", "allowFileDiscovery": false})
        );
    }

    #[test]
    fn test_metadata_omits_parents_without_folder() {
        let root = FileMetadata {
            name: "photo.jpg",
            parents: None.into_iter().collect(),
        };
        let foldered = FileMetadata {
            name: "photo.jpg",
            parents: Some("folder-1").into_iter().collect(),
        };
        assert_eq!(
            serde_json::to_value(&root).unwrap(),
            serde_json::json!({"name": "photo.jpg"})
        );
        assert_eq!(
            serde_json::to_value(&foldered).unwrap(),
            serde_json::json!({"name": "photo.jpg", "parents": ["folder-1"]})
        );
    }
}
