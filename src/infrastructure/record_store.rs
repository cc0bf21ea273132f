//! Spreadsheet-as-database adapter.
//!
//! Wraps the Sheets and Drive transports. Every remote failure is logged and
//! reduced to an empty result, `false`, or `None`, so callers treat an
//! unreachable service as a no-op.

use crate::domain::error::Result;
use crate::domain::inspection::{
    Answer, ComplianceEntry, ComplianceUpdate, Inspection, InspectionFile, Question,
};
use crate::domain::sheet::{rows_from_values, SheetRow, Table};
use crate::infrastructure::config::AppConfig;
use crate::infrastructure::google::credentials::ServiceAccountKey;
use crate::infrastructure::google::drive::GoogleDriveClient;
use crate::infrastructure::google::sheets::GoogleSheetsClient;
use crate::infrastructure::google::token::TokenProvider;
use crate::infrastructure::google::{fallback_link, sharing_link, DriveApi, SheetsApi};
use serde::Serialize;
use std::path::Path;
use std::sync::Arc;
use tracing::{error, info, warn};

/// Column index of the first updatable cell; A and B form the lookup key.
const UPDATE_FIRST_COL: usize = 2;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UploadedLink {
    pub file_id: String,
    pub link: String,
}

pub struct RecordStore {
    sheets: Arc<dyn SheetsApi + Send + Sync>,
    drive: Arc<dyn DriveApi + Send + Sync>,
    drive_folder: Option<String>,
}

impl RecordStore {
    pub fn new(
        sheets: Arc<dyn SheetsApi + Send + Sync>,
        drive: Arc<dyn DriveApi + Send + Sync>,
        drive_folder: Option<String>,
    ) -> Self {
        Self {
            sheets,
            drive,
            drive_folder,
        }
    }

    /// Build the Google-backed store from configuration and service-account credentials.
    pub fn connect(config: &AppConfig) -> Result<Self> {
        config.validate()?;
        let key = ServiceAccountKey::resolve(config)?;

        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(120))
            .build()
            .unwrap_or_else(|_| reqwest::Client::new());

        let tokens = Arc::new(TokenProvider::new(client.clone(), key, &config.api.token_uri)?);
        info!(
            client_email = %tokens.client_email(),
            sheet_id = %config.google_sheet_id,
            "Connected spreadsheet adapter"
        );

        let sheets = GoogleSheetsClient::new(
            client.clone(),
            tokens.clone(),
            &config.api.sheets_base,
            &config.google_sheet_id,
        );
        let drive = GoogleDriveClient::new(
            client,
            tokens,
            &config.api.drive_base,
            &config.api.drive_upload_base,
        );

        Ok(Self::new(
            Arc::new(sheets),
            Arc::new(drive),
            config.drive_folder().map(str::to_string),
        ))
    }

    /// Header-keyed rows of a table; empty on any failure.
    pub async fn fetch_rows(&self, table: Table) -> Vec<SheetRow> {
        let range = table.range();
        match self.sheets.get_values(&range).await {
            Ok(values) => rows_from_values(&values),
            Err(err) => {
                error!(error = %err, range = %range, "Failed to read sheet data");
                Vec::new()
            }
        }
    }

    /// Append one row in the given column order. `false` on failure.
    pub async fn append_row(&self, table: Table, values: Vec<String>) -> bool {
        let range = table.range();
        match self.sheets.append_values(&range, values).await {
            Ok(()) => true,
            Err(err) => {
                error!(error = %err, range = %range, "Failed to append row");
                false
            }
        }
    }

    /// Overwrite columns C.. of the first data row whose columns A and B
    /// equal `key_a` and `key_b` exactly.
    pub async fn update_matching_row(
        &self,
        table: Table,
        key_a: &str,
        key_b: &str,
        updates: Vec<String>,
    ) -> bool {
        if updates.is_empty() {
            return false;
        }

        let range = table.range();
        let values = match self.sheets.get_values(&range).await {
            Ok(values) => values,
            Err(err) => {
                error!(error = %err, range = %range, "Failed to read rows for update");
                return false;
            }
        };

        let Some(row_number) = find_row_number(&values, key_a, key_b) else {
            warn!(table = %table, key = %key_a, "Could not find row to update");
            return false;
        };

        let last_col = UPDATE_FIRST_COL + updates.len() - 1;
        let target = table.row_range(row_number, UPDATE_FIRST_COL, last_col);
        match self.sheets.update_values(&target, updates).await {
            Ok(()) => true,
            Err(err) => {
                error!(error = %err, range = %target, "Failed to update row");
                false
            }
        }
    }

    /// Upload a local file and make it link-readable.
    ///
    /// A failed permission grant still returns a link, in direct-download form.
    pub async fn upload_file(&self, path: &Path, file_name: &str, mime_type: &str) -> Option<UploadedLink> {
        let bytes = match tokio::fs::read(path).await {
            Ok(bytes) => bytes,
            Err(err) => {
                error!(error = %err, path = %path.display(), "Failed to read upload");
                return None;
            }
        };

        let file_id = match self
            .drive
            .create_file(file_name, mime_type, bytes, self.drive_folder.as_deref())
            .await
        {
            Ok(id) => id,
            Err(err) => {
                error!(error = %err, file_name = %file_name, "Error uploading to Drive");
                return None;
            }
        };

        let link = match self.drive.share_publicly(&file_id).await {
            Ok(()) => {
                info!(file_id = %file_id, "Set public read permission");
                sharing_link(&file_id)
            }
            Err(err) => {
                warn!(error = %err, file_id = %file_id, "Could not set file permissions");
                fallback_link(&file_id)
            }
        };

        info!(file_id = %file_id, link = %link, "Generated link for file");
        Some(UploadedLink { file_id, link })
    }

    pub async fn inspections(&self) -> Vec<Inspection> {
        self.fetch_rows(Table::Inspections)
            .await
            .iter()
            .map(Inspection::from_row)
            .collect()
    }

    pub async fn questions(&self) -> Vec<Question> {
        self.fetch_rows(Table::MasterQuestions)
            .await
            .iter()
            .map(Question::from_row)
            .filter(|q| !q.id.trim().is_empty())
            .collect()
    }

    pub async fn answers(&self) -> Vec<Answer> {
        self.fetch_rows(Table::InspectionAnswers)
            .await
            .iter()
            .map(Answer::from_row)
            .collect()
    }

    pub async fn compliance_entries(&self) -> Vec<ComplianceEntry> {
        self.fetch_rows(Table::Compliance)
            .await
            .iter()
            .map(ComplianceEntry::from_row)
            .collect()
    }

    pub async fn files(&self) -> Vec<InspectionFile> {
        self.fetch_rows(Table::InspectionFiles)
            .await
            .iter()
            .map(InspectionFile::from_row)
            .collect()
    }

    pub async fn update_compliance(&self, log_id: &str, remark: &str, update: &ComplianceUpdate) -> bool {
        self.update_matching_row(Table::Compliance, log_id, remark, update.to_cells())
            .await
    }
}

#[cfg(test)]
impl RecordStore {
    /// Store over fresh in-memory tables that hold only their header rows.
    pub fn in_memory() -> (
        Arc<crate::infrastructure::google::memory::MemorySheets>,
        Arc<crate::infrastructure::google::memory::MemoryDrive>,
        RecordStore,
    ) {
        use crate::infrastructure::google::memory::{MemoryDrive, MemorySheets};
        let sheets = Arc::new(MemorySheets::with_headers());
        let drive = Arc::new(MemoryDrive::default());
        let store = RecordStore::new(sheets.clone(), drive.clone(), Some("folder-1".to_string()));
        (sheets, drive, store)
    }
}

/// 1-based sheet row number of the first data row keyed by (`key_a`, `key_b`).
fn find_row_number(values: &[Vec<String>], key_a: &str, key_b: &str) -> Option<usize> {
    values
        .iter()
        .enumerate()
        .skip(1)
        .find(|(_, row)| row.len() >= 2 && row[0] == key_a && row[1] == key_b)
        .map(|(index, _)| index + 1)
}
