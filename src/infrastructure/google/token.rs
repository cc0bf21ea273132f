use crate::domain::error::{AppError, Result};
use crate::infrastructure::google::credentials::ServiceAccountKey;
use chrono::{DateTime, TimeDelta, Utc};
use jsonwebtoken::{Algorithm, EncodingKey, Header};
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;
use tracing::debug;

pub const SCOPES: [&str; 2] = [
    "https://www.googleapis.com/auth/spreadsheets",
    "https://www.googleapis.com/auth/drive.file",
];

const JWT_BEARER_GRANT: &str = "urn:ietf:params:oauth:grant-type:jwt-bearer";
const ASSERTION_LIFETIME_SECS: i64 = 3600;
const EXPIRY_BUFFER_SECS: i64 = 60;

#[derive(Debug, Serialize)]
struct AssertionClaims<'a> {
    iss: &'a str,
    scope: String,
    aud: &'a str,
    iat: i64,
    exp: i64,
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

#[derive(Debug, Clone)]
struct CachedToken {
    value: String,
    expires_at: DateTime<Utc>,
}

impl CachedToken {
    fn is_near_expiry(&self, buffer_secs: i64) -> bool {
        self.expires_at <= Utc::now() + TimeDelta::seconds(buffer_secs)
    }
}

/// Service-account OAuth: signs a JWT assertion and trades it for an access token.
pub struct TokenProvider {
    client: reqwest::Client,
    key: ServiceAccountKey,
    encoding_key: EncodingKey,
    token_uri: String,
    cached: Mutex<Option<CachedToken>>,
}

impl TokenProvider {
    pub fn new(client: reqwest::Client, key: ServiceAccountKey, default_token_uri: &str) -> Result<Self> {
        let encoding_key = EncodingKey::from_rsa_pem(key.private_key.as_bytes())
            .map_err(|e| AppError::AuthError(format!("Invalid private key: {}", e)))?;
        let token_uri = key
            .token_uri
            .clone()
            .filter(|uri| !uri.trim().is_empty())
            .unwrap_or_else(|| default_token_uri.to_string());

        Ok(Self {
            client,
            key,
            encoding_key,
            token_uri,
            cached: Mutex::new(None),
        })
    }

    pub fn client_email(&self) -> &str {
        &self.key.client_email
    }

    /// A valid access token, reused until shortly before it expires.
    pub async fn access_token(&self) -> Result<String> {
        let mut cached = self.cached.lock().await;
        if let Some(token) = cached.as_ref() {
            if !token.is_near_expiry(EXPIRY_BUFFER_SECS) {
                return Ok(token.value.clone());
            }
        }

        let fresh = self.fetch_token().await?;
        let value = fresh.value.clone();
        *cached = Some(fresh);
        Ok(value)
    }

    fn sign_assertion(&self, now: DateTime<Utc>) -> Result<String> {
        let claims = AssertionClaims {
            iss: &self.key.client_email,
            scope: SCOPES.join(" "),
            aud: &self.token_uri,
            iat: now.timestamp(),
            exp: now.timestamp() + ASSERTION_LIFETIME_SECS,
        };
        jsonwebtoken::encode(&Header::new(Algorithm::RS256), &claims, &self.encoding_key)
            .map_err(|e| AppError::AuthError(format!("Failed to sign assertion: {}", e)))
    }

    async fn fetch_token(&self) -> Result<CachedToken> {
        let now = Utc::now();
        let assertion = self.sign_assertion(now)?;

        let response = self
            .client
            .post(&self.token_uri)
            .form(&[("grant_type", JWT_BEARER_GRANT), ("assertion", assertion.as_str())])
            .send()
            .await
            .map_err(|e| AppError::AuthError(format!("Token request failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let text = response.text().await.unwrap_or_default();
            return Err(AppError::AuthError(format!(
                "Token endpoint error ({}): {}",
                status, text
            )));
        }

        let token: TokenResponse = response
            .json()
            .await
            .map_err(|e| AppError::AuthError(format!("Failed to parse token response: {}", e)))?;

        debug!(client_email = %self.key.client_email, expires_in = token.expires_in, "Fetched access token");

        Ok(CachedToken {
            value: token.access_token,
            expires_at: now + TimeDelta::seconds(token.expires_in),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cached_token_expiry_buffer() {
        let fresh = CachedToken {
            value: "t".to_string(),
            expires_at: Utc::now() + TimeDelta::hours(1),
        };
        let stale = CachedToken {
            value: "t".to_string(),
            expires_at: Utc::now() + TimeDelta::seconds(30),
        };
        assert!(!fresh.is_near_expiry(EXPIRY_BUFFER_SECS));
        assert!(stale.is_near_expiry(EXPIRY_BUFFER_SECS));
    }

    #[test]
    fn test_invalid_pem_is_auth_error() {
        let key = ServiceAccountKey {
            client_email: "bot@example.iam.gserviceaccount.com".to_string(),
            private_key: "not a pem".to_string(),
            token_uri: None,
        };
        let result = TokenProvider::new(reqwest::Client::new(), key, "https://oauth2.googleapis.com/token");
        assert!(matches!(result, Err(AppError::AuthError(_))));
    }

    #[test]
    fn test_scopes_cover_sheets_and_drive_files() {
        let scope = SCOPES.join(" ");
        assert!(scope.contains("auth/spreadsheets"));
        assert!(scope.contains("auth/drive.file"));
    }
}
