use crate::application::FileUpload;
use crate::domain::error::{AppError, Result};
use crate::infrastructure::storage::TempUpload;
use actix_multipart::Multipart;
use futures_util::TryStreamExt;
use std::path::Path;
use tokio::io::AsyncWriteExt;
use tracing::debug;

/// Upper bound for a single non-file field.
const MAX_TEXT_FIELD_BYTES: usize = 64 * 1024;

/// A multipart body split into text fields and spooled attachments.
#[derive(Debug, Default)]
pub struct Intake {
    pub fields: Vec<(String, String)>,
    pub uploads: Vec<FileUpload>,
}

fn multipart_error(err: impl std::fmt::Display) -> AppError {
    AppError::ValidationError(format!("Invalid multipart body: {}", err))
}

/// Text fields are buffered; file parts stream into temp files under `upload_dir`.
/// Empty file inputs are dropped.
pub async fn read_multipart(mut payload: Multipart, upload_dir: &Path) -> Result<Intake> {
    let mut intake = Intake::default();

    while let Some(mut field) = payload.try_next().await.map_err(multipart_error)? {
        let disposition = field.content_disposition();
        let name = disposition
            .and_then(|d| d.get_name())
            .unwrap_or_default()
            .to_string();
        let file_name = disposition
            .and_then(|d| d.get_filename())
            .map(str::to_string);
        let content_type = field.content_type().map(|m| m.to_string());

        let Some(file_name) = file_name else {
            let mut bytes = Vec::new();
            while let Some(chunk) = field.try_next().await.map_err(multipart_error)? {
                if bytes.len() + chunk.len() > MAX_TEXT_FIELD_BYTES {
                    return Err(AppError::ValidationError(format!(
                        "Field {} is too large",
                        name
                    )));
                }
                bytes.extend_from_slice(&chunk);
            }
            intake
                .fields
                .push((name, String::from_utf8_lossy(&bytes).into_owned()));
            continue;
        };

        if file_name.trim().is_empty() {
            while field.try_next().await.map_err(multipart_error)?.is_some() {}
            continue;
        }

        let temp = TempUpload::reserve(upload_dir, &file_name)?;
        let mut file = tokio::fs::File::create(temp.path()).await?;
        let mut size = 0usize;
        while let Some(chunk) = field.try_next().await.map_err(multipart_error)? {
            size += chunk.len();
            file.write_all(&chunk).await?;
        }
        file.flush().await?;

        if size == 0 {
            continue;
        }
        debug!(field = %name, file_name = %file_name, size, "Spooled upload");
        intake.uploads.push(FileUpload {
            field: name,
            file_name,
            content_type,
            temp,
        });
    }

    Ok(intake)
}
