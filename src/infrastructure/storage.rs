use once_cell::sync::Lazy;
use regex::Regex;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::warn;

static UNSAFE_FILENAME_CHARS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[^\p{L}\p{N}\p{M}._-]+").unwrap());

/// A scratch file for one upload in flight; removed on drop.
#[derive(Debug)]
pub struct TempUpload {
    path: PathBuf,
}

impl TempUpload {
    /// Reserve `{dir}/{uuid}_{sanitized name}`. The file itself is created by the caller.
    pub fn reserve(dir: &Path, original_name: &str) -> std::io::Result<Self> {
        ensure_dir(dir)?;
        let name = format!("{}_{}", uuid::Uuid::new_v4(), sanitize_filename(original_name));
        Ok(Self {
            path: dir.join(name),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for TempUpload {
    fn drop(&mut self) {
        if let Err(err) = fs::remove_file(&self.path) {
            if err.kind() != std::io::ErrorKind::NotFound {
                warn!(error = %err, path = %self.path.display(), "Failed to remove temp upload");
            }
        }
    }
}

/// Keep only the final path component, with anything unusual collapsed to `_`.
pub fn sanitize_filename(name: &str) -> String {
    let base = name
        .rsplit(&['/', '\\'][..])
        .next()
        .unwrap_or_default()
        .trim();
    let cleaned = UNSAFE_FILENAME_CHARS.replace_all(base, "_");
    let cleaned = cleaned.trim_matches(|c| c == '.' || c == '_');
    if cleaned.is_empty() {
        "upload".to_string()
    } else {
        cleaned.to_string()
    }
}

pub fn ensure_dir(path: &Path) -> std::io::Result<()> {
    if !path.exists() {
        fs::create_dir_all(path)?;
    }
    Ok(())
}
