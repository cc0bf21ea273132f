//! In-memory stand-ins for the Sheets and Drive transports, used by tests.

use super::{DriveApi, SheetsApi};
use crate::domain::error::{AppError, Result};
use crate::domain::sheet::Table;
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

/// Parsed `Sheet!C7:E7` or `Sheet!A:E`. Columns are 0-based, rows 1-based.
#[derive(Debug, PartialEq, Eq)]
struct A1Range {
    sheet: String,
    first_col: usize,
    last_col: usize,
    row: Option<usize>,
}

fn column_index(letters: &str) -> Option<usize> {
    if letters.is_empty() {
        return None;
    }
    let mut n = 0usize;
    for c in letters.chars() {
        if !c.is_ascii_uppercase() {
            return None;
        }
        n = n * 26 + (c as usize - 'A' as usize + 1);
    }
    Some(n - 1)
}

fn split_cell(cell: &str) -> Option<(usize, Option<usize>)> {
    let letters: String = cell.chars().take_while(|c| c.is_ascii_alphabetic()).collect();
    let digits = &cell[letters.len()..];
    let col = column_index(&letters)?;
    let row = if digits.is_empty() {
        None
    } else {
        Some(digits.parse().ok()?)
    };
    Some((col, row))
}

fn parse_range(range: &str) -> Result<A1Range> {
    let invalid = || AppError::SheetsError(format!("Unable to parse range: {}", range));
    let (sheet, cells) = range.split_once('!').ok_or_else(invalid)?;
    let (start, end) = cells.split_once(':').unwrap_or((cells, cells));
    let (first_col, row) = split_cell(start).ok_or_else(invalid)?;
    let (last_col, _) = split_cell(end).ok_or_else(invalid)?;
    Ok(A1Range {
        sheet: sheet.to_string(),
        first_col,
        last_col,
        row,
    })
}

fn trim_trailing_empty(mut row: Vec<String>) -> Vec<String> {
    while row.last().is_some_and(|cell| cell.is_empty()) {
        row.pop();
    }
    row
}

#[derive(Default)]
pub struct MemorySheets {
    tabs: Mutex<HashMap<String, Vec<Vec<String>>>>,
    failing: AtomicBool,
}

impl MemorySheets {
    /// Every table present with just its header row.
    pub fn with_headers() -> Self {
        let sheets = Self::default();
        for table in Table::ALL {
            sheets.seed(table, &[table.headers()]);
        }
        sheets
    }

    pub fn seed(&self, table: Table, rows: &[&[&str]]) {
        let mut tabs = self.tabs.lock().unwrap();
        let tab = tabs.entry(table.sheet_name().to_string()).or_default();
        for row in rows {
            tab.push(row.iter().map(|c| c.to_string()).collect());
        }
    }

    pub fn rows(&self, table: Table) -> Vec<Vec<String>> {
        self.tabs
            .lock()
            .unwrap()
            .get(table.sheet_name())
            .cloned()
            .unwrap_or_default()
    }

    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    fn check(&self) -> Result<()> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(AppError::SheetsError("API error (503): unavailable".to_string()));
        }
        Ok(())
    }
}

#[async_trait]
impl SheetsApi for MemorySheets {
    async fn get_values(&self, range: &str) -> Result<Vec<Vec<String>>> {
        self.check()?;
        let range = parse_range(range)?;
        let tabs = self.tabs.lock().unwrap();
        let Some(tab) = tabs.get(&range.sheet) else {
            return Err(AppError::SheetsError(format!(
                "Unable to parse range: {}",
                range.sheet
            )));
        };
        Ok(tab
            .iter()
            .map(|row| {
                let end = (range.last_col + 1).min(row.len());
                let start = range.first_col.min(end);
                trim_trailing_empty(row[start..end].to_vec())
            })
            .collect())
    }

    async fn append_values(&self, range: &str, row: Vec<String>) -> Result<()> {
        self.check()?;
        let range = parse_range(range)?;
        let mut tabs = self.tabs.lock().unwrap();
        tabs.entry(range.sheet).or_default().push(row);
        Ok(())
    }

    async fn update_values(&self, range: &str, row: Vec<String>) -> Result<()> {
        self.check()?;
        let parsed = parse_range(range)?;
        let row_number = parsed
            .row
            .ok_or_else(|| AppError::SheetsError(format!("Unbounded update range: {}", range)))?;
        let mut tabs = self.tabs.lock().unwrap();
        let tab = tabs.entry(parsed.sheet).or_default();
        while tab.len() < row_number {
            tab.push(Vec::new());
        }
        let target = &mut tab[row_number - 1];
        for (offset, value) in row.into_iter().enumerate() {
            let col = parsed.first_col + offset;
            if col > parsed.last_col {
                break;
            }
            if target.len() <= col {
                target.resize(col + 1, String::new());
            }
            target[col] = value;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredFile {
    pub id: String,
    pub name: String,
    pub mime_type: String,
    pub size: usize,
    pub parent: Option<String>,
    pub shared: bool,
}

#[derive(Default)]
pub struct MemoryDrive {
    files: Mutex<Vec<StoredFile>>,
    fail_uploads: AtomicBool,
    fail_permissions: AtomicBool,
}

impl MemoryDrive {
    pub fn files(&self) -> Vec<StoredFile> {
        self.files.lock().unwrap().clone()
    }

    pub fn set_fail_uploads(&self, failing: bool) {
        self.fail_uploads.store(failing, Ordering::SeqCst);
    }

    pub fn set_fail_permissions(&self, failing: bool) {
        self.fail_permissions.store(failing, Ordering::SeqCst);
    }
}

#[async_trait]
impl DriveApi for MemoryDrive {
    async fn create_file(
        &self,
        name: &str,
        mime_type: &str,
        bytes: Vec<u8>,
        parent: Option<&str>,
    ) -> Result<String> {
        if self.fail_uploads.load(Ordering::SeqCst) {
            return Err(AppError::DriveError("API error (500): backend".to_string()));
        }
        let mut files = self.files.lock().unwrap();
        let id = format!("file-{}", files.len() + 1);
        files.push(StoredFile {
            id: id.clone(),
            name: name.to_string(),
            mime_type: mime_type.to_string(),
            size: bytes.len(),
            parent: parent.map(str::to_string),
            shared: false,
        });
        Ok(id)
    }

    async fn share_publicly(&self, file_id: &str) -> Result<()> {
        if self.fail_permissions.load(Ordering::SeqCst) {
            return Err(AppError::DriveError("API error (403): sharing disabled".to_string()));
        }
        let mut files = self.files.lock().unwrap();
        let file = files
            .iter_mut()
            .find(|f| f.id == file_id)
            .ok_or_else(|| AppError::NotFound(file_id.to_string()))?;
        file.shared = true;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_whole_column_range() {
        assert_eq!(
            parse_range("Compliance!A:E").unwrap(),
            A1Range {
                sheet: "Compliance".to_string(),
                first_col: 0,
                last_col: 4,
                row: None
            }
        );
    }

    #[test]
    fn test_parse_bounded_row_range() {
        let range = parse_range("Compliance!C12:E12").unwrap();
        assert_eq!(range.first_col, 2);
        assert_eq!(range.last_col, 4);
        assert_eq!(range.row, Some(12));
    }

    #[test]
    fn test_parse_rejects_missing_sheet() {
        assert!(parse_range("A:E").is_err());
    }
}
