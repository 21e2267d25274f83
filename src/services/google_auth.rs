use crate::services::google_api::{GoogleApiError, check_response};
use anyhow::{Context, Result, anyhow};
use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{Algorithm, EncodingKey, Header, encode};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tokio::sync::Mutex;

pub const DRIVE_SCOPE: &str = "https://www.googleapis.com/auth/drive";
pub const SHEETS_SCOPE: &str = "https://www.googleapis.com/auth/spreadsheets";
pub const DEFAULT_TOKEN_URI: &str = "https://oauth2.googleapis.com/token";

const JWT_BEARER_GRANT: &str = "urn:ietf:params:oauth:grant-type:jwt-bearer";
const ASSERTION_LIFETIME_SECS: i64 = 3600;
// Refresh a little early so a token never expires mid-request
const REFRESH_MARGIN_SECS: i64 = 60;

fn default_token_uri() -> String {
    DEFAULT_TOKEN_URI.to_string()
}

/// The subset of a Google service-account key file this service needs.
#[derive(Debug, Clone, Deserialize)]
pub struct ServiceAccountKey {
    #[serde(rename = "type")]
    pub key_type: String,
    #[serde(default)]
    pub project_id: Option<String>,
    #[serde(default)]
    pub private_key_id: Option<String>,
    pub private_key: String,
    pub client_email: String,
    #[serde(default = "default_token_uri")]
    pub token_uri: String,
}

impl ServiceAccountKey {
    pub fn from_json(json: &str) -> Result<Self> {
        let key: Self =
            serde_json::from_str(json).context("Service account credential is not valid JSON")?;
        if key.key_type != "service_account" {
            return Err(anyhow!(
                "Expected a service_account credential, found type '{}'",
                key.key_type
            ));
        }
        Ok(key)
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let json = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read credential file {}", path.display()))?;
        Self::from_json(&json)
            .with_context(|| format!("Invalid credential file {}", path.display()))
    }
}

/// Source of OAuth bearer tokens for the Google API clients.
#[async_trait]
pub trait AccessTokenProvider: Send + Sync {
    async fn access_token(&self) -> Result<String, GoogleApiError>;
}

#[derive(Debug, Serialize, Deserialize)]
pub struct AssertionClaims {
    pub iss: String,
    pub scope: String,
    pub aud: String,
    pub iat: i64,
    pub exp: i64,
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default = "default_expires_in")]
    expires_in: i64,
}

fn default_expires_in() -> i64 {
    ASSERTION_LIFETIME_SECS
}

#[derive(Debug, Deserialize)]
struct OAuthErrorBody {
    error: String,
    #[serde(default)]
    error_description: Option<String>,
}

struct CachedToken {
    value: String,
    expires_at: DateTime<Utc>,
}

impl CachedToken {
    fn is_fresh(&self, now: DateTime<Utc>) -> bool {
        now + Duration::seconds(REFRESH_MARGIN_SECS) < self.expires_at
    }
}

/// Two-legged OAuth for a service account: signs a JWT assertion and trades
/// it for a bearer token, which is cached until shortly before it expires.
pub struct ServiceAccountAuth {
    http: reqwest::Client,
    key: ServiceAccountKey,
    encoding_key: EncodingKey,
    scope: String,
    cached: Mutex<Option<CachedToken>>,
}

impl ServiceAccountAuth {
    /// Fails when the private key is not a usable RSA PEM.
    pub fn new(http: reqwest::Client, key: ServiceAccountKey, scopes: &[&str]) -> Result<Self> {
        let encoding_key = EncodingKey::from_rsa_pem(key.private_key.as_bytes())
            .context("Service account private key is not a valid RSA PEM")?;

        Ok(Self {
            http,
            key,
            encoding_key,
            scope: scopes.join(" "),
            cached: Mutex::new(None),
        })
    }

    pub fn client_email(&self) -> &str {
        &self.key.client_email
    }

    pub fn sign_assertion(&self, now: DateTime<Utc>) -> Result<String, GoogleApiError> {
        let mut header = Header::new(Algorithm::RS256);
        header.kid = self.key.private_key_id.clone();

        let claims = AssertionClaims {
            iss: self.key.client_email.clone(),
            scope: self.scope.clone(),
            aud: self.key.token_uri.clone(),
            iat: now.timestamp(),
            exp: now.timestamp() + ASSERTION_LIFETIME_SECS,
        };

        Ok(encode(&header, &claims, &self.encoding_key)?)
    }

    async fn fetch_token(&self, now: DateTime<Utc>) -> Result<CachedToken, GoogleApiError> {
        let assertion = self.sign_assertion(now)?;

        let response = self
            .http
            .post(&self.key.token_uri)
            .form(&[("grant_type", JWT_BEARER_GRANT), ("assertion", assertion.as_str())])
            .send()
            .await?;

        let status = response.status();
        if status.is_client_error() {
            let body = response.text().await.unwrap_or_default();
            return Err(match serde_json::from_str::<OAuthErrorBody>(&body) {
                Ok(err) => GoogleApiError::Unauthorized(match err.error_description {
                    Some(desc) => format!("{}: {}", err.error, desc),
                    None => err.error,
                }),
                Err(_) => crate::services::google_api::classify(status, &body),
            });
        }

        let token: TokenResponse = check_response(response)
            .await?
            .json()
            .await
            .map_err(|e| GoogleApiError::Malformed(format!("token response: {}", e)))?;

        Ok(CachedToken {
            value: token.access_token,
            expires_at: now + Duration::seconds(token.expires_in),
        })
    }
}

#[async_trait]
impl AccessTokenProvider for ServiceAccountAuth {
    async fn access_token(&self) -> Result<String, GoogleApiError> {
        // Held across the exchange so concurrent requests share one refresh
        let mut cached = self.cached.lock().await;
        let now = Utc::now();

        if let Some(token) = &*cached
            && token.is_fresh(now)
        {
            return Ok(token.value.clone());
        }

        tracing::debug!("Requesting access token for {}", self.key.client_email);
        let token = self.fetch_token(now).await?;
        let value = token.value.clone();
        *cached = Some(token);
        Ok(value)
    }
}
