pub mod use_cases;

pub use use_cases::compliance::{ComplianceForm, ComplianceUseCase};
pub use use_cases::export::ExportUseCase;
pub use use_cases::inspection::{FileUpload, InspectionForm, InspectionUseCase};
pub use use_cases::reports::ReportsUseCase;
