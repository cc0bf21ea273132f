use crate::domain::error::{AppError, Result};
use crate::domain::inspection::{
    find_latest, latest_answers, latest_inspections, new_inspection_id, Answer, ComplianceEntry,
    Inspection, InspectionFile, Question, STATUS_PENDING,
};
use crate::domain::sheet::Table;
use crate::infrastructure::record_store::RecordStore;
use crate::infrastructure::storage::TempUpload;
use chrono::Local;
use serde::Serialize;
use std::collections::HashSet;
use std::sync::Arc;
use tracing::{info, warn};

pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";
const FILE_FIELD_PREFIX: &str = "file_";
const ANSWER_FIELD_PREFIX: &str = "q_";
const REMARK_FIELD_PREFIX: &str = "remark_";
const DEFAULT_MIME: &str = "application/octet-stream";

/// Text fields of a new or edited inspection.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InspectionForm {
    pub saja_name: String,
    pub officer_name: String,
    pub registration_date: String,
    /// Edit only. Blank keeps the previous status.
    pub grade: String,
    pub answers: Vec<(String, String)>,
    pub remarks: Vec<(String, String)>,
}

impl InspectionForm {
    /// Collect from raw form pairs (`saja_name`, `vro_name`, `q_{id}`, `remark_{id}`, ...).
    pub fn from_fields(fields: &[(String, String)]) -> Self {
        let mut form = Self::default();
        for (name, value) in fields {
            match name.as_str() {
                "saja_name" => form.saja_name = value.clone(),
                "vro_name" => form.officer_name = value.clone(),
                "registration_date" => form.registration_date = value.clone(),
                "grade" => form.grade = value.clone(),
                _ => {
                    if let Some(id) = name.strip_prefix(ANSWER_FIELD_PREFIX) {
                        set_value(&mut form.answers, id, value);
                    } else if let Some(id) = name.strip_prefix(REMARK_FIELD_PREFIX) {
                        set_value(&mut form.remarks, id, value);
                    }
                }
            }
        }
        form
    }

    pub fn answer(&self, question_id: &str) -> &str {
        lookup(&self.answers, question_id)
    }

    pub fn remark(&self, question_id: &str) -> &str {
        lookup(&self.remarks, question_id)
    }
}

fn set_value(values: &mut Vec<(String, String)>, key: &str, value: &str) {
    match values.iter_mut().find(|(k, _)| k == key) {
        Some(entry) => entry.1 = value.to_string(),
        None => values.push((key.to_string(), value.to_string())),
    }
}

fn lookup<'a>(values: &'a [(String, String)], key: &str) -> &'a str {
    values
        .iter()
        .find(|(k, _)| k == key)
        .map(|(_, v)| v.as_str())
        .unwrap_or("")
}

/// One attachment already spooled to local disk.
#[derive(Debug)]
pub struct FileUpload {
    /// Form field name, `file_{question_id}`.
    pub field: String,
    pub file_name: String,
    pub content_type: Option<String>,
    pub temp: TempUpload,
}

impl FileUpload {
    pub fn question_id(&self) -> &str {
        self.field
            .strip_prefix(FILE_FIELD_PREFIX)
            .unwrap_or(&self.field)
    }
}

/// Everything stored for one inspection id.
#[derive(Debug, Clone, Serialize)]
pub struct InspectionDetail {
    pub inspection: Inspection,
    pub answers: Vec<Answer>,
    pub files: Vec<InspectionFile>,
    pub compliance: Vec<ComplianceEntry>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Submission {
    pub inspection_id: String,
    pub files_uploaded: usize,
    pub remarks_logged: usize,
}

pub struct InspectionUseCase {
    store: Arc<RecordStore>,
}

impl InspectionUseCase {
    pub fn new(store: Arc<RecordStore>) -> Self {
        Self { store }
    }

    /// Latest version of every inspection.
    pub async fn list(&self) -> Vec<Inspection> {
        latest_inspections(self.store.inspections().await)
    }

    /// Master question list, or the built-in pair when the sheet has none.
    pub async fn questions(&self) -> Vec<Question> {
        let questions = self.store.questions().await;
        if questions.is_empty() {
            warn!("Master question list empty, using fallback questions");
            return Question::fallback_questions();
        }
        questions
    }

    pub async fn find(&self, id: &str) -> Result<Inspection> {
        let inspections = self.store.inspections().await;
        find_latest(&inspections, id)
            .cloned()
            .ok_or_else(|| AppError::NotFound(format!("Inspection {}", id)))
    }

    pub async fn detail(&self, id: &str) -> Result<InspectionDetail> {
        let inspection = self.find(id).await?;
        let answers = latest_answers(self.store.answers().await, id);
        let files = self
            .store
            .files()
            .await
            .into_iter()
            .filter(|f| f.inspection_id == id)
            .collect();
        let compliance = self
            .store
            .compliance_entries()
            .await
            .into_iter()
            .filter(|c| c.log_id == id)
            .collect();

        Ok(InspectionDetail {
            inspection,
            answers,
            files,
            compliance,
        })
    }

    pub async fn submit(&self, form: &InspectionForm, uploads: Vec<FileUpload>) -> Result<Submission> {
        let id = new_inspection_id();
        self.write(id, form, uploads, None).await
    }

    /// Re-submit under an existing id. Appends a new version; earlier rows stay.
    pub async fn resubmit(
        &self,
        id: &str,
        form: &InspectionForm,
        uploads: Vec<FileUpload>,
    ) -> Result<Submission> {
        let previous = self.find(id).await?;
        self.write(id.to_string(), form, uploads, Some(previous)).await
    }

    async fn write(
        &self,
        id: String,
        form: &InspectionForm,
        uploads: Vec<FileUpload>,
        previous: Option<Inspection>,
    ) -> Result<Submission> {
        let is_edit = previous.is_some();
        let files = self.upload_all(&id, uploads).await;
        for file in &files {
            self.store
                .append_row(Table::InspectionFiles, file.to_cells())
                .await;
        }

        let status = match &previous {
            Some(prev) if form.grade.trim().is_empty() => prev.status.clone(),
            Some(_) => form.grade.trim().to_string(),
            None => STATUS_PENDING.to_string(),
        };
        let primary_file_link = files
            .first()
            .map(|f| f.file_url.clone())
            .or_else(|| previous.map(|prev| prev.primary_file_link))
            .unwrap_or_default();

        let inspection = Inspection {
            id: id.clone(),
            saja_name: form.saja_name.clone(),
            officer_name: form.officer_name.clone(),
            registration_date: form.registration_date.clone(),
            submitted_at: Local::now().format(TIMESTAMP_FORMAT).to_string(),
            status,
            primary_file_link,
        };
        if !self
            .store
            .append_row(Table::Inspections, inspection.to_cells())
            .await
        {
            return Err(AppError::SheetsError(format!(
                "Failed to save inspection {}",
                id
            )));
        }

        // Compliance rows are located by (id, remark), so an identical pair
        // written twice would leave the second row unreachable.
        let mut logged_remarks: HashSet<String> = if is_edit {
            self.store
                .compliance_entries()
                .await
                .into_iter()
                .filter(|entry| entry.log_id == id)
                .map(|entry| entry.officer_remark)
                .collect()
        } else {
            HashSet::new()
        };

        let mut remarks_logged = 0;
        for question in self.questions().await {
            let answer = Answer {
                inspection_id: id.clone(),
                question_id: question.id.clone(),
                answer: form.answer(&question.id).to_string(),
                remark: form.remark(&question.id).to_string(),
            };
            self.store
                .append_row(Table::InspectionAnswers, answer.to_cells())
                .await;

            if !answer.remark.trim().is_empty() && logged_remarks.insert(answer.remark.clone()) {
                let entry = ComplianceEntry::pending(&id, &answer.remark);
                if self.store.append_row(Table::Compliance, entry.to_cells()).await {
                    remarks_logged += 1;
                }
            }
        }

        info!(
            inspection_id = %id,
            files = files.len(),
            remarks = remarks_logged,
            "Inspection submitted"
        );

        Ok(Submission {
            inspection_id: id,
            files_uploaded: files.len(),
            remarks_logged,
        })
    }

    /// Uploads one by one; each temp file is removed as its guard drops.
    async fn upload_all(&self, inspection_id: &str, uploads: Vec<FileUpload>) -> Vec<InspectionFile> {
        let mut files = Vec::new();
        for upload in uploads {
            let mime = upload.content_type.as_deref().unwrap_or(DEFAULT_MIME);
            let Some(uploaded) = self
                .store
                .upload_file(upload.temp.path(), &upload.file_name, mime)
                .await
            else {
                warn!(file_name = %upload.file_name, "Skipping attachment that failed to upload");
                continue;
            };
            files.push(InspectionFile {
                inspection_id: inspection_id.to_string(),
                question_id: upload.question_id().to_string(),
                file_name: upload.file_name.clone(),
                file_url: uploaded.link,
            });
        }
        files
    }
}
