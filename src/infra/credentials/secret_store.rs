use async_trait::async_trait;
use serde_json::Value;

use crate::core::credentials::{CredentialProvider, ProviderOutcome, ServiceAccountKey};

/// Reads the key from an injected secrets document shaped like
/// `{"gcp": {"json_file": ...}}`. `json_file` may hold the key as a JSON
/// string or as an embedded object.
pub struct SecretStoreProvider {
    raw: Option<String>,
}

impl SecretStoreProvider {
    pub fn new(raw: Option<String>) -> Self {
        Self { raw }
    }
}

#[async_trait]
impl CredentialProvider for SecretStoreProvider {
    fn name(&self) -> &'static str {
        "secret-store"
    }

    async fn provide(&self) -> ProviderOutcome {
        let Some(raw) = self.raw.as_deref().filter(|r| !r.trim().is_empty()) else {
            return ProviderOutcome::Absent;
        };

        let document: Value = match serde_json::from_str(raw) {
            Ok(value) => value,
            Err(e) => return ProviderOutcome::Unusable(format!("secrets are not JSON: {e}")),
        };

        let parsed = match document.pointer("/gcp/json_file") {
            None => return ProviderOutcome::Absent,
            Some(Value::String(json)) => ServiceAccountKey::from_json(json),
            Some(object @ Value::Object(_)) => ServiceAccountKey::from_value(object.clone()),
            Some(_) => Err("gcp.json_file must be a JSON string or object".to_string()),
        };

        match parsed {
            Ok(key) => ProviderOutcome::Found(key),
            Err(reason) => ProviderOutcome::Unusable(format!("gcp.json_file: {reason}")),
        }
    }
}
