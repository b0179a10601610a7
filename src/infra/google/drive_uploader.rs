// Google Drive backed FileStore. Uploads go into a shared folder and are then
// opened up to "anyone with the link" so Discord can render the picture.

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde_json::json;
use std::sync::Arc;

use super::service_account::{AuthError, ServiceAccountAuth};
use crate::core::links::direct_view_url;
use crate::core::records::{FileStore, UploadError};

const DRIVE_API: &str = "https://www.googleapis.com/drive/v3";
const DRIVE_UPLOAD_API: &str = "https://www.googleapis.com/upload/drive/v3";
const BOUNDARY: &str = "couple-homepage-upload-boundary";

#[derive(Debug, Deserialize)]
struct CreatedFile {
    id: String,
}

pub struct DriveUploader {
    client: Client,
    auth: Arc<ServiceAccountAuth>,
}

impl DriveUploader {
    pub fn new(auth: Arc<ServiceAccountAuth>) -> Self {
        Self {
            client: Client::new(),
            auth,
        }
    }

    async fn create(
        &self,
        token: &str,
        blob: Vec<u8>,
        filename: &str,
        folder_id: &str,
    ) -> Result<String, String> {
        let metadata = json!({ "name": filename, "parents": [folder_id] });
        let body = multipart_body(&metadata.to_string(), mime_for(filename), &blob, BOUNDARY);

        let response = self
            .client
            .post(format!("{DRIVE_UPLOAD_API}/files"))
            .bearer_auth(token)
            .query(&[
                ("uploadType", "multipart"),
                ("fields", "id"),
                ("supportsAllDrives", "true"),
            ])
            .header(
                reqwest::header::CONTENT_TYPE,
                format!("multipart/related; boundary={BOUNDARY}"),
            )
            .body(body)
            .send()
            .await
            .map_err(|e| e.to_string())?;

        if !response.status().is_success() {
            let status = response.status();
            let text = response.text().await.unwrap_or_default();
            return Err(format!("{status}: {text}"));
        }

        let created: CreatedFile = response.json().await.map_err(|e| e.to_string())?;
        Ok(created.id)
    }

    async fn share_with_anyone(&self, token: &str, file_id: &str) -> Result<(), String> {
        let response = self
            .client
            .post(format!("{DRIVE_API}/files/{file_id}/permissions"))
            .bearer_auth(token)
            .query(&[("supportsAllDrives", "true")])
            .json(&json!({ "role": "reader", "type": "anyone" }))
            .send()
            .await
            .map_err(|e| e.to_string())?;

        if !response.status().is_success() {
            let status = response.status();
            let text = response.text().await.unwrap_or_default();
            return Err(format!("{status}: {text}"));
        }
        Ok(())
    }
}

#[async_trait]
impl FileStore for DriveUploader {
    async fn upload(
        &self,
        blob: Vec<u8>,
        filename: &str,
        folder_id: &str,
    ) -> Result<String, UploadError> {
        let token = self.auth.get_access_token().await.map_err(|e| match e {
            AuthError::Credential(cred) => UploadError::Credential(cred),
            AuthError::Token(reason) => UploadError::Create {
                filename: filename.to_string(),
                reason,
            },
        })?;

        let size = blob.len();
        let file_id = self
            .create(&token, blob, filename, folder_id)
            .await
            .map_err(|reason| UploadError::Create {
                filename: filename.to_string(),
                reason,
            })?;

        // The file exists from here on. A failed share leaves it private.
        self.share_with_anyone(&token, &file_id)
            .await
            .map_err(|reason| UploadError::Share {
                file_id: file_id.clone(),
                reason,
            })?;

        tracing::info!(filename, file_id = %file_id, bytes = size, "Uploaded photo to Drive");
        Ok(direct_view_url(&file_id))
    }
}

/// Content type from the file extension. Unknown extensions are sent as bytes.
pub fn mime_for(filename: &str) -> &'static str {
    let extension = filename
        .rsplit_once('.')
        .map(|(_, ext)| ext.to_ascii_lowercase())
        .unwrap_or_default();

    match extension.as_str() {
        "jpg" | "jpeg" => "image/jpeg",
        "png" => "image/png",
        "gif" => "image/gif",
        "webp" => "image/webp",
        "heic" => "image/heic",
        _ => "application/octet-stream",
    }
}

/// A two part `multipart/related` body: JSON metadata, then the raw file.
pub fn multipart_body(metadata: &str, mime: &str, blob: &[u8], boundary: &str) -> Vec<u8> {
    let mut body = Vec::with_capacity(blob.len() + metadata.len() + 256);
    body.extend_from_slice(
        format!(
            "--{boundary}\r\nContent-Type: application/json; charset=UTF-8\r\n\r\n{metadata}\r\n"
        )
        .as_bytes(),
    );
    body.extend_from_slice(format!("--{boundary}\r\nContent-Type: {mime}\r\n\r\n").as_bytes());
    body.extend_from_slice(blob);
    body.extend_from_slice(format!("\r\n--{boundary}--\r\n").as_bytes());
    body
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::credentials::CredentialResolver;
    use crate::infra::google::service_account::SHEETS_AND_DRIVE_SCOPES;

    #[test]
    fn mime_follows_the_extension() {
        assert_eq!(mime_for("us.JPG"), "image/jpeg");
        assert_eq!(mime_for("beach.photo.png"), "image/png");
        assert_eq!(mime_for("README"), "application/octet-stream");
    }

    #[test]
    fn multipart_body_wraps_metadata_and_blob() {
        let body = multipart_body(r#"{"name":"a.png"}"#, "image/png", &[0, 159, 255], "xyz");

        let mut expected = b"--xyz\r\nContent-Type: application/json; charset=UTF-8\r\n\r\n\
{\"name\":\"a.png\"}\r\n--xyz\r\nContent-Type: image/png\r\n\r\n"
            .to_vec();
        expected.extend_from_slice(&[0, 159, 255]);
        expected.extend_from_slice(b"\r\n--xyz--\r\n");

        assert_eq!(body, expected);
    }

    #[tokio::test]
    async fn missing_credentials_are_reported_as_credential_errors() {
        let auth = Arc::new(ServiceAccountAuth::new(
            Arc::new(CredentialResolver::new(vec![])),
            SHEETS_AND_DRIVE_SCOPES,
        ));
        let uploader = DriveUploader::new(auth);

        let err = uploader
            .upload(vec![1, 2, 3], "us.jpg", "folder")
            .await
            .unwrap_err();
        assert!(matches!(err, UploadError::Credential(_)));
    }
}
