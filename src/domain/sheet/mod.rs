// ============================================================
// SHEET DOMAIN LAYER
// ============================================================
// Tabular mapping between spreadsheet ranges and keyed rows
// No I/O, no async

mod sheet_row;
mod table;

pub use sheet_row::{rows_from_values, SheetRow};
pub use table::Table;
