use crate::models::{NewDriveFile, StoredFile};
use crate::services::google_api::{GoogleApiError, check_response};
use crate::services::google_auth::AccessTokenProvider;
use async_trait::async_trait;
use bytes::{BufMut, Bytes, BytesMut};
use futures::stream::{self, StreamExt};
use std::path::Path;
use std::sync::Arc;
use tokio_util::io::ReaderStream;

#[async_trait]
pub trait DriveStorage: Send + Sync {
    /// Creates a file from the bytes at `source` and returns the Drive entry.
    async fn create_file(
        &self,
        metadata: &NewDriveFile,
        source: &Path,
    ) -> Result<StoredFile, GoogleApiError>;
}

pub struct GoogleDriveStorage {
    http: reqwest::Client,
    auth: Arc<dyn AccessTokenProvider>,
    upload_url: String,
}

impl GoogleDriveStorage {
    pub fn new(http: reqwest::Client, auth: Arc<dyn AccessTokenProvider>, base_url: &str) -> Self {
        Self {
            http,
            auth,
            upload_url: format!("{}/upload/drive/v3/files", base_url.trim_end_matches('/')),
        }
    }
}

/// Framing around the media part of a `multipart/related` upload: the JSON
/// metadata part plus the media part header, and the closing boundary.
pub fn related_parts(
    boundary: &str,
    metadata: &NewDriveFile,
) -> Result<(Bytes, Bytes), GoogleApiError> {
    let metadata_json = serde_json::to_vec(metadata)
        .map_err(|e| GoogleApiError::Malformed(format!("file metadata: {}", e)))?;

    let mut prefix = BytesMut::with_capacity(metadata_json.len() + 192);
    prefix.put_slice(format!("--{}\r\n", boundary).as_bytes());
    prefix.put_slice(b"Content-Type: application/json; charset=UTF-8\r\n\r\n");
    prefix.put_slice(&metadata_json);
    prefix.put_slice(format!("\r\n--{}\r\n", boundary).as_bytes());
    prefix.put_slice(format!("Content-Type: {}\r\n\r\n", metadata.mime_type).as_bytes());

    let suffix = Bytes::from(format!("\r\n--{}--\r\n", boundary));

    Ok((prefix.freeze(), suffix))
}

#[async_trait]
impl DriveStorage for GoogleDriveStorage {
    async fn create_file(
        &self,
        metadata: &NewDriveFile,
        source: &Path,
    ) -> Result<StoredFile, GoogleApiError> {
        let file = tokio::fs::File::open(source).await?;
        let file_len = file.metadata().await?.len();

        let boundary = format!("faculty_upload_{}", uuid::Uuid::new_v4().simple());
        let (prefix, suffix) = related_parts(&boundary, metadata)?;
        let content_length = prefix.len() as u64 + file_len + suffix.len() as u64;

        // Media is read from disk chunk by chunk while the request is sent
        let body = stream::iter([Ok::<_, std::io::Error>(prefix)])
            .chain(ReaderStream::new(file))
            .chain(stream::iter([Ok(suffix)]));

        let token = self.auth.access_token().await?;

        tracing::info!(
            "Uploading {} ({} bytes, {}) to Drive",
            metadata.name,
            file_len,
            metadata.mime_type
        );

        let response = self
            .http
            .post(&self.upload_url)
            .query(&[
                ("uploadType", "multipart"),
                ("fields", "id,name,mimeType,parents"),
                ("supportsAllDrives", "true"),
            ])
            .bearer_auth(token)
            .header(
                reqwest::header::CONTENT_TYPE,
                format!("multipart/related; boundary={}", boundary),
            )
            .header(reqwest::header::CONTENT_LENGTH, content_length)
            .body(reqwest::Body::wrap_stream(body))
            .send()
            .await?;

        let stored: StoredFile = check_response(response)
            .await?
            .json()
            .await
            .map_err(|e| GoogleApiError::Malformed(format!("Drive create response: {}", e)))?;

        if stored.id.is_empty() {
            return Err(GoogleApiError::Malformed(
                "Drive create response has no file id".to_string(),
            ));
        }

        Ok(stored)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_related_parts_layout() {
        let metadata = NewDriveFile {
            name: "policy.pdf".to_string(),
            parents: vec!["folder-1".to_string()],
            mime_type: "application/pdf".to_string(),
        };
        let (prefix, suffix) = related_parts("b0", &metadata).unwrap();
        let text = format!(
            "{}%PDF-1.4{}",
            String::from_utf8(prefix.to_vec()).unwrap(),
            String::from_utf8(suffix.to_vec()).unwrap()
        );

        assert!(text.starts_with("--b0\r\nContent-Type: application/json; charset=UTF-8\r\n\r\n"));
        assert!(text.contains(r#""name":"policy.pdf""#));
        assert!(text.contains(r#""parents":["folder-1"]"#));
        assert!(text.contains(r#""mimeType":"application/pdf""#));
        assert!(text.contains("Content-Type: application/pdf\r\n\r\n%PDF-1.4\r\n"));
        assert!(text.ends_with("\r\n--b0--\r\n"));
    }
}
