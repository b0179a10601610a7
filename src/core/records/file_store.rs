use crate::core::credentials::CredentialError;
use async_trait::async_trait;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum UploadError {
    #[error(transparent)]
    Credential(#[from] CredentialError),

    #[error("Failed to upload '{filename}': {reason}")]
    Create { filename: String, reason: String },

    /// The file exists remotely but is not shared, so its URL will not load.
    /// Nothing cleans it up.
    #[error("File {file_id} was uploaded but could not be made public: {reason}")]
    Share { file_id: String, reason: String },
}

/// Port for the hosted blob store that serves the photo wall.
#[async_trait]
pub trait FileStore: Send + Sync {
    /// Creates the file inside `folder_id`, grants public read access and
    /// returns the direct-view URL. Both remote calls must succeed.
    async fn upload(
        &self,
        blob: Vec<u8>,
        filename: &str,
        folder_id: &str,
    ) -> Result<String, UploadError>;
}
