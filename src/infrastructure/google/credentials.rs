use crate::domain::error::{AppError, Result};
use crate::infrastructure::config::AppConfig;
use base64::Engine as _;
use serde::Deserialize;
use std::fs;
use std::path::Path;
use tracing::{info, warn};

/// The fields of a Google service-account key file this app needs.
#[derive(Debug, Clone, Deserialize)]
pub struct ServiceAccountKey {
    pub client_email: String,
    pub private_key: String,
    #[serde(default)]
    pub token_uri: Option<String>,
}

impl ServiceAccountKey {
    pub fn from_json(json: &str) -> Result<Self> {
        let mut key: ServiceAccountKey = serde_json::from_str(json)
            .map_err(|e| AppError::AuthError(format!("Invalid service account JSON: {}", e)))?;
        // Hosting dashboards often store the PEM with literal `\n` sequences.
        key.private_key = key.private_key.replace("\\n", "\n");
        if key.client_email.trim().is_empty() || key.private_key.trim().is_empty() {
            return Err(AppError::AuthError(
                "Service account key lacks client_email or private_key".to_string(),
            ));
        }
        Ok(key)
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(AppError::AuthError(format!(
                "Credentials not found. Set GOOGLE_CREDENTIALS_JSON or place {}",
                path.display()
            )));
        }
        let content = fs::read_to_string(path)?;
        Self::from_json(&content)
    }

    /// Environment blob first, then the credentials file.
    pub fn resolve(config: &AppConfig) -> Result<Self> {
        if let Some(blob) = config
            .google_credentials_json
            .as_deref()
            .filter(|b| !b.trim().is_empty())
        {
            match Self::from_json(&decode_blob(blob)) {
                Ok(key) => {
                    info!(client_email = %key.client_email, "Loaded service account from environment");
                    return Ok(key);
                }
                Err(err) => warn!(error = %err, "Error loading credentials from environment"),
            }
        }

        let key = Self::from_file(&config.credentials_path)?;
        info!(
            client_email = %key.client_email,
            path = %config.credentials_path.display(),
            "Loaded service account from file"
        );
        Ok(key)
    }
}

/// Accept either raw JSON or base64-encoded JSON.
pub fn decode_blob(blob: &str) -> String {
    let trimmed = blob.trim();
    if let Ok(bytes) = base64::engine::general_purpose::STANDARD.decode(trimmed) {
        if let Ok(text) = String::from_utf8(bytes) {
            if text.trim_start().starts_with('{') {
                return text;
            }
        }
    }
    trimmed.to_string()
}
