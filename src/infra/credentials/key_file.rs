use async_trait::async_trait;
use std::io::ErrorKind;
use std::path::PathBuf;

use crate::core::credentials::{CredentialProvider, ProviderOutcome, ServiceAccountKey};

/// Reads a service-account JSON key from disk.
pub struct KeyFileProvider {
    path: PathBuf,
}

impl KeyFileProvider {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait]
impl CredentialProvider for KeyFileProvider {
    fn name(&self) -> &'static str {
        "key-file"
    }

    async fn provide(&self) -> ProviderOutcome {
        let contents = match tokio::fs::read_to_string(&self.path).await {
            Ok(contents) => contents,
            Err(e) if e.kind() == ErrorKind::NotFound => return ProviderOutcome::Absent,
            Err(e) => {
                return ProviderOutcome::Unusable(format!("{}: {e}", self.path.display()));
            }
        };

        match ServiceAccountKey::from_json(&contents) {
            Ok(key) => ProviderOutcome::Found(key),
            Err(reason) => ProviderOutcome::Unusable(format!("{}: {reason}", self.path.display())),
        }
    }
}
