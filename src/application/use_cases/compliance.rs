use crate::domain::error::{AppError, Result};
use crate::domain::inspection::{ComplianceEntry, ComplianceUpdate};
use crate::infrastructure::record_store::RecordStore;
use serde::Deserialize;
use std::sync::Arc;
use tracing::info;
use validator::Validate;

/// Posted from the compliance page. `log_id` and `remark` locate the row.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[serde(default)]
pub struct ComplianceForm {
    #[validate(length(min = 1, message = "log_id is required"))]
    pub log_id: String,
    #[validate(length(min = 1, message = "remark is required"))]
    pub remark: String,
    pub senior_remark: String,
    pub explanation: String,
    pub status: String,
}

impl ComplianceForm {
    pub fn update(&self) -> ComplianceUpdate {
        ComplianceUpdate {
            senior_opinion: self.senior_remark.clone(),
            explanation: self.explanation.clone(),
            status: self.status.clone(),
        }
    }
}

pub struct ComplianceUseCase {
    store: Arc<RecordStore>,
}

impl ComplianceUseCase {
    pub fn new(store: Arc<RecordStore>) -> Self {
        Self { store }
    }

    pub async fn list(&self) -> Vec<ComplianceEntry> {
        self.store.compliance_entries().await
    }

    pub async fn update(&self, form: &ComplianceForm) -> Result<()> {
        form.validate()?;

        if !self
            .store
            .update_compliance(&form.log_id, &form.remark, &form.update())
            .await
        {
            return Err(AppError::SheetsError(format!(
                "Compliance row for {} was not updated",
                form.log_id
            )));
        }

        info!(log_id = %form.log_id, status = %form.status, "Compliance updated");
        Ok(())
    }
}
