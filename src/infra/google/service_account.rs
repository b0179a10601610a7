// =============================================================================
// SERVICE ACCOUNT AUTHENTICATION
// =============================================================================
//
// Exchanges a signed JWT for an OAuth2 access token (the "JWT bearer" grant).
//
// **Setup:**
// 1. Create a service account in Google Cloud Console and download its JSON key
// 2. Enable the Google Sheets API and the Google Drive API for the project
// 3. Share the `OurLoveMoney` spreadsheet and the photo folder with the
//    service account email (looks like: name@project.iam.gserviceaccount.com)
// 4. Either drop the key next to the bot as `secrets.json`, or put it into
//    `HOMEPAGE_SECRETS` as `{"gcp": {"json_file": "<the key JSON>"}}`

use jsonwebtoken::{encode, Algorithm, EncodingKey, Header};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::{Duration, SystemTime, UNIX_EPOCH};
use thiserror::Error;
use tokio::sync::RwLock;

use crate::core::credentials::{CredentialError, CredentialResolver};
use crate::core::records::TableError;

/// Read/write access to spreadsheets plus Drive (name lookup, uploads, sharing).
pub const SHEETS_AND_DRIVE_SCOPES: &str =
    "https://www.googleapis.com/auth/spreadsheets https://www.googleapis.com/auth/drive";

#[derive(Debug, Error)]
pub enum AuthError {
    #[error(transparent)]
    Credential(#[from] CredentialError),

    #[error("Token exchange failed: {0}")]
    Token(String),
}

impl From<AuthError> for TableError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::Credential(e) => TableError::Credential(e),
            AuthError::Token(reason) => TableError::Remote(reason),
        }
    }
}

/// JWT claims for Google OAuth2.
#[derive(Debug, Serialize)]
struct JwtClaims {
    /// Issuer (service account email).
    iss: String,

    /// Space separated scopes.
    scope: String,

    /// Audience (token endpoint).
    aud: String,

    /// Issued at (Unix timestamp).
    iat: u64,

    /// Expiration (Unix timestamp, max 1 hour from iat).
    exp: u64,
}

/// Response from Google's token endpoint.
#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default)]
    expires_in: Option<u64>,
}

/// Cached access token with expiration.
struct CachedToken {
    token: String,
    expires_at: SystemTime,
}

/// Authenticator that handles OAuth2 with service account credentials.
///
/// The key itself comes from the [`CredentialResolver`] on first use, so a
/// missing key only fails the commands that need Google, not start-up.
pub struct ServiceAccountAuth {
    resolver: Arc<CredentialResolver>,
    scope: String,
    client: Client,
    cached_token: RwLock<Option<CachedToken>>,
}

impl ServiceAccountAuth {
    pub fn new(resolver: Arc<CredentialResolver>, scope: impl Into<String>) -> Self {
        Self {
            resolver,
            scope: scope.into(),
            client: Client::new(),
            cached_token: RwLock::new(None),
        }
    }

    /// Gets a valid access token, refreshing if necessary.
    pub async fn get_access_token(&self) -> Result<String, AuthError> {
        // Check if we have a valid cached token
        {
            let cached = self.cached_token.read().await;
            if let Some(token) = cached.as_ref() {
                if token.expires_at > SystemTime::now() + Duration::from_secs(60) {
                    return Ok(token.token.clone());
                }
            }
        }

        let (token, lifetime) = self.fetch_new_token().await?;

        {
            let mut cached = self.cached_token.write().await;
            *cached = Some(CachedToken {
                token: token.clone(),
                expires_at: SystemTime::now() + lifetime,
            });
        }

        Ok(token)
    }

    /// Fetches a new access token from Google.
    async fn fetch_new_token(&self) -> Result<(String, Duration), AuthError> {
        let credentials = self.resolver.resolve().await?;
        let now = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map_err(|e| AuthError::Token(e.to_string()))?
            .as_secs();

        let claims = JwtClaims {
            iss: credentials.client_email.clone(),
            scope: self.scope.clone(),
            aud: credentials.token_uri.clone(),
            iat: now,
            exp: now + 3600,
        };

        let header = Header::new(Algorithm::RS256);
        let key = EncodingKey::from_rsa_pem(credentials.private_key.as_bytes())
            .map_err(|e| AuthError::Token(format!("unusable private key: {e}")))?;
        let jwt = encode(&header, &claims, &key)
            .map_err(|e| AuthError::Token(format!("failed to sign JWT: {e}")))?;

        let response = self
            .client
            .post(&credentials.token_uri)
            .form(&[
                ("grant_type", "urn:ietf:params:oauth:grant-type:jwt-bearer"),
                ("assertion", &jwt),
            ])
            .send()
            .await
            .map_err(|e| AuthError::Token(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            let text = response.text().await.unwrap_or_default();
            return Err(AuthError::Token(format!("{status}: {text}")));
        }

        let token_response: TokenResponse = response
            .json()
            .await
            .map_err(|e| AuthError::Token(e.to_string()))?;

        tracing::debug!(
            client_email = %credentials.client_email,
            "Fetched Google access token"
        );

        Ok((
            token_response.access_token,
            token_lifetime(token_response.expires_in),
        ))
    }
}

/// How long to trust a fresh token. Google normally says 3600s; stay a few
/// minutes under whatever it reports.
fn token_lifetime(expires_in: Option<u64>) -> Duration {
    let reported = expires_in.unwrap_or(3600);
    Duration::from_secs(reported.saturating_sub(5 * 60).max(60))
}
