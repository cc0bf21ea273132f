use std::error::Error;
use std::path::PathBuf;
use std::sync::Arc;

use tracing::{error, info, warn};

use crate::infrastructure::config::AppConfig;
use crate::infrastructure::fonts::FontFile;
use crate::infrastructure::record_store::RecordStore;
use crate::infrastructure::storage::ensure_dir;

/// Long-lived services shared by every request.
pub struct Services {
    /// `None` when the spreadsheet could not be reached at startup.
    pub store: Option<Arc<RecordStore>>,
    pub upload_dir: PathBuf,
    /// Embedded in PDF reports; `None` falls back to Helvetica.
    pub pdf_font: Option<FontFile>,
}

pub fn setup(config: &AppConfig) -> Result<Services, Box<dyn Error>> {
    let upload_dir = config.upload_dir();
    ensure_dir(&upload_dir).map_err(|err| {
        error!(
            error = %err,
            upload_dir = %upload_dir.display(),
            "Failed to create upload dir"
        );
        err
    })?;

    let store = connect_store(config);
    let pdf_font = load_pdf_font(config);

    Ok(Services {
        store,
        upload_dir,
        pdf_font,
    })
}

fn load_pdf_font(config: &AppConfig) -> Option<FontFile> {
    let path = config.pdf_font_path.as_ref()?;
    if !path.is_file() {
        warn!(
            path = %path.display(),
            "PDF font not found; reports use Helvetica and cannot show Devanagari"
        );
        return None;
    }
    match FontFile::load(path) {
        Ok(font) => {
            info!(path = %path.display(), font = %font.name(), "PDF font loaded");
            Some(font)
        }
        Err(err) => {
            warn!(error = %err, path = %path.display(), "Failed to load PDF font");
            None
        }
    }
}

fn connect_store(config: &AppConfig) -> Option<Arc<RecordStore>> {
    match RecordStore::connect(config) {
        Ok(store) => {
            if config.drive_folder().is_none() {
                warn!("GOOGLE_DRIVE_FOLDER_ID not set; uploads land in the service account's root");
            }
            info!("Spreadsheet adapter ready");
            Some(Arc::new(store))
        }
        Err(err) => {
            error!(error = %err, "Error connecting to Google Sheets");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_setup_without_sheet_id_runs_disconnected() {
        let dir = std::env::temp_dir().join(format!("daptar-boot-{}", uuid::Uuid::new_v4()));
        let config = AppConfig {
            upload_dir: Some(dir.clone()),
            pdf_font_path: None,
            ..AppConfig::default()
        };

        let services = setup(&config).unwrap();

        assert!(services.store.is_none());
        assert!(services.pdf_font.is_none());
        assert!(dir.is_dir());
        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn test_pdf_font_loaded_when_present() {
        let dir = std::env::temp_dir().join(format!("daptar-boot-{}", uuid::Uuid::new_v4()));
        std::fs::create_dir_all(&dir).unwrap();
        let font_path = dir.join("Devanagari.ttf");
        std::fs::write(&font_path, crate::infrastructure::fonts::test_font_bytes()).unwrap();
        let broken_path = dir.join("Broken.ttf");
        std::fs::write(&broken_path, b"not a font").unwrap();

        let with_font = |path: &std::path::Path| AppConfig {
            pdf_font_path: Some(path.to_path_buf()),
            ..AppConfig::default()
        };

        let font = load_pdf_font(&with_font(font_path.as_path())).unwrap();
        assert_eq!(font.name(), "Devanagari");
        assert!(load_pdf_font(&with_font(broken_path.as_path())).is_none());
        assert!(load_pdf_font(&with_font(dir.join("missing.ttf").as_path())).is_none());
        let _ = std::fs::remove_dir_all(&dir);
    }
}
