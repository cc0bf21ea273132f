use crate::domain::sheet::SheetRow;
use serde::{Deserialize, Serialize};

pub const STATUS_PENDING: &str = "Pending";
pub const UPLOAD_REQUIRED_YES: &str = "हो";

/// Header names, kept in one place so reads and writes agree with `Table::headers`.
pub mod columns {
    pub const ID: &str = "ID";
    pub const SAJA: &str = "सजा";
    pub const OFFICER: &str = "नाव";
    pub const REGISTRATION_DATE: &str = "नोंदणी दिनांक";
    pub const SUBMITTED_AT: &str = "तारीख";
    pub const GRADE: &str = "एकूण ग्रेड";
    pub const FILE_LINK: &str = "फाईल लिंक";

    pub const DEPARTMENT: &str = "विभाग";
    pub const QUESTION: &str = "प्रश्न";
    pub const UPLOAD_REQUIRED: &str = "अपलोड आवश्यक";

    pub const LOG_ID: &str = "Log_ID";
    pub const OFFICER_REMARK: &str = "अधिकारी शेरा";
    pub const SENIOR_OPINION: &str = "वरिष्ठ मत";
    pub const EXPLANATION: &str = "स्पष्टीकरण";
    pub const STATUS: &str = "स्थिती";

    pub const INSPECTION_ID: &str = "Inspection_ID";
    pub const QUESTION_ID: &str = "Question_ID";
    pub const ANSWER: &str = "Answer";
    pub const REMARK: &str = "Remark";
    pub const FILE_NAME: &str = "File_Name";
    pub const FILE_URL: &str = "File_URL";
}

/// Summary row of one inspection visit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Inspection {
    pub id: String,
    pub saja_name: String,
    pub officer_name: String,
    pub registration_date: String,
    pub submitted_at: String,
    /// `Pending` until graded, then the grade itself.
    pub status: String,
    pub primary_file_link: String,
}

impl Inspection {
    pub fn from_row(row: &SheetRow) -> Self {
        Self {
            id: row.get(columns::ID).to_string(),
            saja_name: row.get(columns::SAJA).to_string(),
            officer_name: row.get(columns::OFFICER).to_string(),
            registration_date: row.get(columns::REGISTRATION_DATE).to_string(),
            submitted_at: row.get(columns::SUBMITTED_AT).to_string(),
            status: row.get(columns::GRADE).to_string(),
            primary_file_link: row.get(columns::FILE_LINK).to_string(),
        }
    }

    pub fn to_cells(&self) -> Vec<String> {
        vec![
            self.id.clone(),
            self.saja_name.clone(),
            self.officer_name.clone(),
            self.registration_date.clone(),
            self.submitted_at.clone(),
            self.status.clone(),
            self.primary_file_link.clone(),
        ]
    }

    pub fn is_pending(&self) -> bool {
        self.status == STATUS_PENDING
    }
}

/// Master question list entry. Read-only reference data.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Question {
    pub id: String,
    pub department: String,
    pub text: String,
    pub upload_required: bool,
}

impl Question {
    pub fn from_row(row: &SheetRow) -> Self {
        Self {
            id: row.get(columns::ID).to_string(),
            department: row.get(columns::DEPARTMENT).to_string(),
            text: row.get(columns::QUESTION).to_string(),
            upload_required: row.get(columns::UPLOAD_REQUIRED).trim() == UPLOAD_REQUIRED_YES,
        }
    }

    /// Used when the master list is empty or unreachable.
    pub fn fallback_questions() -> Vec<Question> {
        vec![
            Question {
                id: "1".to_string(),
                department: "सामान्य".to_string(),
                text: "दप्तर अद्ययावत आहे का?".to_string(),
                upload_required: true,
            },
            Question {
                id: "2".to_string(),
                department: "सामान्य".to_string(),
                text: "नोंदवही पूर्ण आहे का?".to_string(),
                upload_required: false,
            },
        ]
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Answer {
    pub inspection_id: String,
    pub question_id: String,
    pub answer: String,
    pub remark: String,
}

impl Answer {
    pub fn from_row(row: &SheetRow) -> Self {
        Self {
            inspection_id: row.get(columns::INSPECTION_ID).to_string(),
            question_id: row.get(columns::QUESTION_ID).to_string(),
            answer: row.get(columns::ANSWER).to_string(),
            remark: row.get(columns::REMARK).to_string(),
        }
    }

    pub fn to_cells(&self) -> Vec<String> {
        vec![
            self.inspection_id.clone(),
            self.question_id.clone(),
            self.answer.clone(),
            self.remark.clone(),
        ]
    }
}

/// Officer remark awaiting (or carrying) a compliance response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComplianceEntry {
    /// Inspection id the remark belongs to.
    pub log_id: String,
    pub officer_remark: String,
    pub senior_opinion: String,
    pub explanation: String,
    pub status: String,
}

impl ComplianceEntry {
    pub fn pending(log_id: &str, officer_remark: &str) -> Self {
        Self {
            log_id: log_id.to_string(),
            officer_remark: officer_remark.to_string(),
            senior_opinion: String::new(),
            explanation: String::new(),
            status: STATUS_PENDING.to_string(),
        }
    }

    pub fn from_row(row: &SheetRow) -> Self {
        Self {
            log_id: row.get(columns::LOG_ID).to_string(),
            officer_remark: row.get(columns::OFFICER_REMARK).to_string(),
            senior_opinion: row.get(columns::SENIOR_OPINION).to_string(),
            explanation: row.get(columns::EXPLANATION).to_string(),
            status: row.get(columns::STATUS).to_string(),
        }
    }

    pub fn to_cells(&self) -> Vec<String> {
        vec![
            self.log_id.clone(),
            self.officer_remark.clone(),
            self.senior_opinion.clone(),
            self.explanation.clone(),
            self.status.clone(),
        ]
    }

    pub fn is_pending(&self) -> bool {
        self.status == STATUS_PENDING
    }
}

/// The three trailing compliance columns (C..E) that may change after creation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComplianceUpdate {
    pub senior_opinion: String,
    pub explanation: String,
    pub status: String,
}

impl ComplianceUpdate {
    pub fn to_cells(&self) -> Vec<String> {
        vec![
            self.senior_opinion.clone(),
            self.explanation.clone(),
            self.status.clone(),
        ]
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InspectionFile {
    pub inspection_id: String,
    pub question_id: String,
    pub file_name: String,
    pub file_url: String,
}

impl InspectionFile {
    pub fn from_row(row: &SheetRow) -> Self {
        Self {
            inspection_id: row.get(columns::INSPECTION_ID).to_string(),
            question_id: row.get(columns::QUESTION_ID).to_string(),
            file_name: row.get(columns::FILE_NAME).to_string(),
            file_url: row.get(columns::FILE_URL).to_string(),
        }
    }

    pub fn to_cells(&self) -> Vec<String> {
        vec![
            self.inspection_id.clone(),
            self.question_id.clone(),
            self.file_name.clone(),
            self.file_url.clone(),
        ]
    }
}

/// Eight lowercase hex chars from four random bytes.
pub fn new_inspection_id() -> String {
    let uuid = uuid::Uuid::new_v4();
    hex::encode(&uuid.as_bytes()[..4])
}

/// One entry per id, the last row winning, ordered by first appearance.
///
/// The edit path appends a fresh row under an existing id, so the sheet
/// can hold several versions of one inspection.
pub fn latest_inspections(rows: Vec<Inspection>) -> Vec<Inspection> {
    let mut latest: Vec<Inspection> = Vec::new();
    for row in rows {
        match latest.iter_mut().find(|existing| existing.id == row.id) {
            Some(existing) => *existing = row,
            None => latest.push(row),
        }
    }
    latest
}

pub fn find_latest<'a>(rows: &'a [Inspection], id: &str) -> Option<&'a Inspection> {
    rows.iter().rev().find(|row| row.id == id)
}

/// Latest answer per question for one inspection, in first-answered order.
pub fn latest_answers(rows: Vec<Answer>, inspection_id: &str) -> Vec<Answer> {
    let mut latest: Vec<Answer> = Vec::new();
    for row in rows.into_iter().filter(|a| a.inspection_id == inspection_id) {
        match latest
            .iter_mut()
            .find(|existing| existing.question_id == row.question_id)
        {
            Some(existing) => *existing = row,
            None => latest.push(row),
        }
    }
    latest
}
