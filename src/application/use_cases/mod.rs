pub mod compliance;
pub mod export;
pub mod inspection;
pub mod reports;
