pub mod credentials;
pub mod drive;
#[cfg(test)]
pub mod memory;
pub mod sheets;
pub mod token;

use crate::domain::error::Result;
use async_trait::async_trait;

/// Raw cell access to one spreadsheet.
#[async_trait]
pub trait SheetsApi {
    /// All cells in an A1 range, row-major. Trailing empty cells may be absent.
    async fn get_values(&self, range: &str) -> Result<Vec<Vec<String>>>;
    /// Append one row after the last non-empty row of the range.
    async fn append_values(&self, range: &str, row: Vec<String>) -> Result<()>;
    /// Overwrite the cells of a bounded range with one row.
    async fn update_values(&self, range: &str, row: Vec<String>) -> Result<()>;
}

/// Remote object storage for attachments.
#[async_trait]
pub trait DriveApi {
    /// Store `bytes` as a new file and return its id.
    async fn create_file(
        &self,
        name: &str,
        mime_type: &str,
        bytes: Vec<u8>,
        parent: Option<&str>,
    ) -> Result<String>;
    /// Grant anyone-with-the-link read access.
    async fn share_publicly(&self, file_id: &str) -> Result<()>;
}

pub fn sharing_link(file_id: &str) -> String {
    format!("https://drive.google.com/file/d/{}/view?usp=sharing", file_id)
}

/// Direct-download form, used when the file could not be shared.
pub fn fallback_link(file_id: &str) -> String {
    format!("https://drive.google.com/uc?id={}", file_id)
}

/// `API error (status): body` for a non-success response.
pub(crate) async fn describe_failure(response: reqwest::Response) -> String {
    let status = response.status();
    let text = response.text().await.unwrap_or_default();
    format!("API error ({}): {}", status, text)
}
