//! Layered configuration loading using figment.
//!
//! Sources, highest priority last:
//! 1. Built-in defaults
//! 2. `daptar.toml` in the working directory
//! 3. `DAPTAR_*` environment variables
//! 4. The raw `GOOGLE_SHEET_ID`, `GOOGLE_DRIVE_FOLDER_ID` and
//!    `GOOGLE_CREDENTIALS_JSON` variables used by existing deployments

use crate::domain::error::{AppError, Result};
use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

pub const CONFIG_FILE: &str = "daptar.toml";

const RAW_ENV_KEYS: [&str; 3] = [
    "GOOGLE_SHEET_ID",
    "GOOGLE_DRIVE_FOLDER_ID",
    "GOOGLE_CREDENTIALS_JSON",
];

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AppConfig {
    #[serde(default)]
    pub google_sheet_id: String,

    /// Parent folder for uploaded attachments. Drive root when unset.
    #[serde(default)]
    pub google_drive_folder_id: Option<String>,

    /// Service-account key, raw JSON or base64 of it.
    #[serde(default)]
    pub google_credentials_json: Option<String>,

    #[serde(default = "default_credentials_path")]
    pub credentials_path: PathBuf,

    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,

    /// Scratch directory for uploads in flight. System temp dir when unset.
    #[serde(default)]
    pub upload_dir: Option<PathBuf>,

    /// TrueType font embedded in PDF reports when the file exists.
    /// Helvetica, which cannot show Devanagari, is used otherwise.
    #[serde(default = "default_pdf_font_path")]
    pub pdf_font_path: Option<PathBuf>,

    #[serde(default)]
    pub api: ApiEndpoints,
}

/// Google endpoints, overridable for staging proxies.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ApiEndpoints {
    #[serde(default = "default_sheets_base")]
    pub sheets_base: String,
    #[serde(default = "default_drive_base")]
    pub drive_base: String,
    #[serde(default = "default_drive_upload_base")]
    pub drive_upload_base: String,
    /// Used only when the service-account key carries no `token_uri`.
    #[serde(default = "default_token_uri")]
    pub token_uri: String,
}

fn default_credentials_path() -> PathBuf {
    PathBuf::from("credentials.json")
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    5000
}

fn default_pdf_font_path() -> Option<PathBuf> {
    Some(PathBuf::from("NotoSansDevanagari-Regular.ttf"))
}

fn default_sheets_base() -> String {
    "https://sheets.googleapis.com/v4".to_string()
}

fn default_drive_base() -> String {
    "https://www.googleapis.com/drive/v3".to_string()
}

fn default_drive_upload_base() -> String {
    "https://www.googleapis.com/upload/drive/v3".to_string()
}

fn default_token_uri() -> String {
    "https://oauth2.googleapis.com/token".to_string()
}

impl Default for ApiEndpoints {
    fn default() -> Self {
        Self {
            sheets_base: default_sheets_base(),
            drive_base: default_drive_base(),
            drive_upload_base: default_drive_upload_base(),
            token_uri: default_token_uri(),
        }
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            google_sheet_id: String::new(),
            google_drive_folder_id: None,
            google_credentials_json: None,
            credentials_path: default_credentials_path(),
            host: default_host(),
            port: default_port(),
            upload_dir: None,
            pdf_font_path: default_pdf_font_path(),
            api: ApiEndpoints::default(),
        }
    }
}

impl AppConfig {
    /// Load from every source. Does not read `.env`; see [`AppConfig::read_dotenv`].
    pub fn load() -> Result<Self> {
        Self::figment()
            .extract()
            .map_err(|e| AppError::ConfigError(e.to_string()))
    }

    /// Read `.env` into the process environment. A missing file is not an error.
    pub fn read_dotenv() -> Option<dotenvy::Error> {
        dotenvy::dotenv().err().filter(|err| !err.not_found())
    }

    pub fn figment() -> Figment {
        let mut figment = Figment::from(Serialized::defaults(Self::default()));

        let local_path = PathBuf::from(CONFIG_FILE);
        if local_path.exists() {
            figment = figment.merge(Toml::file(local_path));
        }

        figment
            .merge(Env::prefixed("DAPTAR_").split("__"))
            .merge(Env::raw().only(&RAW_ENV_KEYS))
    }

    pub fn upload_dir(&self) -> PathBuf {
        self.upload_dir.clone().unwrap_or_else(std::env::temp_dir)
    }

    pub fn drive_folder(&self) -> Option<&str> {
        self.google_drive_folder_id
            .as_deref()
            .map(str::trim)
            .filter(|id| !id.is_empty())
    }

    pub fn validate(&self) -> Result<()> {
        if self.google_sheet_id.trim().is_empty() {
            return Err(AppError::ConfigError(
                "GOOGLE_SHEET_ID is not set".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use figment::Jail;

    #[test]
    fn test_defaults_without_sources() {
        Jail::expect_with(|_jail| {
            let config: AppConfig = AppConfig::figment().extract()?;
            assert_eq!(config.port, 5000);
            assert_eq!(config.host, "127.0.0.1");
            assert_eq!(config.credentials_path, PathBuf::from("credentials.json"));
            assert!(config.drive_folder().is_none());
            assert_eq!(
                config.pdf_font_path,
                Some(PathBuf::from("NotoSansDevanagari-Regular.ttf"))
            );
            assert!(config.validate().is_err());
            Ok(())
        });
    }

    #[test]
    fn test_raw_google_variables_are_read() {
        Jail::expect_with(|jail| {
            jail.set_env("GOOGLE_SHEET_ID", "sheet-123");
            jail.set_env("GOOGLE_DRIVE_FOLDER_ID", "folder-9");
            jail.set_env("GOOGLE_CREDENTIALS_JSON", "{\"client_email\":\"x\"}");

            let config: AppConfig = AppConfig::figment().extract()?;
            assert_eq!(config.google_sheet_id, "sheet-123");
            assert_eq!(config.drive_folder(), Some("folder-9"));
            assert!(config.google_credentials_json.is_some());
            assert!(config.validate().is_ok());
            Ok(())
        });
    }

    #[test]
    fn test_toml_then_prefixed_env_override() {
        Jail::expect_with(|jail| {
            jail.create_file(
                CONFIG_FILE,
                r#"
google_sheet_id = "from-toml"
port = 8080

[api]
sheets_base = "http://localhost:9000/v4"
"#,
            )?;
            jail.set_env("DAPTAR_PORT", "9090");
            jail.set_env("DAPTAR_PDF_FONT_PATH", "fonts/Mukta-Regular.ttf");

            let config: AppConfig = AppConfig::figment().extract()?;
            assert_eq!(config.pdf_font_path, Some(PathBuf::from("fonts/Mukta-Regular.ttf")));
            assert_eq!(config.google_sheet_id, "from-toml");
            assert_eq!(config.port, 9090);
            assert_eq!(config.api.sheets_base, "http://localhost:9000/v4");
            assert_eq!(config.api.drive_base, "https://www.googleapis.com/drive/v3");
            Ok(())
        });
    }

    #[test]
    fn test_malformed_dotenv_is_reported() {
        Jail::expect_with(|jail| {
            jail.create_file(".env", "this line has no assignment\n")?;
            assert!(AppConfig::read_dotenv().is_some());
            Ok(())
        });
    }

    #[test]
    fn test_blank_folder_is_treated_as_unset() {
        let config = AppConfig {
            google_drive_folder_id: Some("  ".to_string()),
            ..AppConfig::default()
        };
        assert!(config.drive_folder().is_none());
    }
}
