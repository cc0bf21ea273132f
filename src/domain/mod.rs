pub mod error;
pub mod inspection;

// Spreadsheet row mapping
pub mod sheet;
