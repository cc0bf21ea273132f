//! Per-inspection report export.
//!
//! Both writers lay out the same `InspectionReport`; neither shares drawing
//! code with the other.

mod docx;
mod font;
mod pdf;

use crate::application::use_cases::inspection::{InspectionDetail, InspectionUseCase};
use crate::domain::error::Result;
use crate::domain::inspection::{ComplianceEntry, Inspection, InspectionFile, Question};
use crate::infrastructure::fonts::FontFile;
use crate::infrastructure::record_store::RecordStore;
use std::sync::Arc;
use tracing::info;

pub const REPORT_TITLE: &str = "Inspection Report - GMA System";
pub const PDF_MIME: &str = "application/pdf";
pub const DOCX_MIME: &str =
    "application/vnd.openxmlformats-officedocument.wordprocessingml.document";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportAnswer {
    pub question: String,
    pub department: String,
    pub answer: String,
    pub remark: String,
}

#[derive(Debug, Clone)]
pub struct InspectionReport {
    pub inspection: Inspection,
    pub answers: Vec<ReportAnswer>,
    pub files: Vec<InspectionFile>,
    pub compliance: Vec<ComplianceEntry>,
}

impl InspectionReport {
    /// Join stored answers with their question text.
    pub fn build(detail: InspectionDetail, questions: &[Question]) -> Self {
        let answers = detail
            .answers
            .into_iter()
            .map(|answer| {
                let question = questions.iter().find(|q| q.id == answer.question_id);
                ReportAnswer {
                    question: question
                        .map(|q| q.text.clone())
                        .unwrap_or_else(|| format!("Question {}", answer.question_id)),
                    department: question.map(|q| q.department.clone()).unwrap_or_default(),
                    answer: answer.answer,
                    remark: answer.remark,
                }
            })
            .collect();

        Self {
            inspection: detail.inspection,
            answers,
            files: detail.files,
            compliance: detail.compliance,
        }
    }

    /// Label/value pairs for the header table.
    pub fn details(&self) -> Vec<(&'static str, &str)> {
        let i = &self.inspection;
        vec![
            ("Inspection ID", i.id.as_str()),
            ("Saja/Village", i.saja_name.as_str()),
            ("Officer", i.officer_name.as_str()),
            ("Registration Date", i.registration_date.as_str()),
            ("Submitted", i.submitted_at.as_str()),
            ("Grade", i.status.as_str()),
        ]
    }
}

pub fn attachment_name(inspection_id: &str, extension: &str) -> String {
    format!("Report_{}.{}", inspection_id, extension)
}

pub struct ExportUseCase {
    inspections: InspectionUseCase,
    pdf_font: Option<FontFile>,
}

impl ExportUseCase {
    pub fn new(store: Arc<RecordStore>) -> Self {
        Self {
            inspections: InspectionUseCase::new(store),
            pdf_font: None,
        }
    }

    /// Embed `font` in PDF output instead of the built-in Helvetica.
    pub fn with_pdf_font(mut self, font: Option<FontFile>) -> Self {
        self.pdf_font = font;
        self
    }

    pub async fn report(&self, id: &str) -> Result<InspectionReport> {
        let detail = self.inspections.detail(id).await?;
        let questions = self.inspections.questions().await;
        Ok(InspectionReport::build(detail, &questions))
    }

    pub async fn pdf(&self, id: &str) -> Result<Vec<u8>> {
        let report = self.report(id).await?;
        let bytes = pdf::render(&report, self.pdf_font.as_ref())?;
        info!(inspection_id = %id, bytes = bytes.len(), "Rendered PDF report");
        Ok(bytes)
    }

    pub async fn docx(&self, id: &str) -> Result<Vec<u8>> {
        let report = self.report(id).await?;
        let bytes = docx::render(&report)?;
        info!(inspection_id = %id, bytes = bytes.len(), "Rendered Word report");
        Ok(bytes)
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::domain::inspection::Answer;
    use crate::domain::sheet::Table;
    use pretty_assertions::assert_eq;

    pub(crate) fn sample_report() -> InspectionReport {
        InspectionReport {
            inspection: Inspection {
                id: "ab12cd34".to_string(),
                saja_name: "वडगाव".to_string(),
                officer_name: "Patil".to_string(),
                registration_date: "2024-03-01".to_string(),
                submitted_at: "2024-03-02 10:00:00".to_string(),
                status: "A".to_string(),
                primary_file_link: String::new(),
            },
            answers: vec![
                ReportAnswer {
                    question: "दप्तर अद्ययावत आहे का?".to_string(),
                    department: "सामान्य".to_string(),
                    answer: "हो".to_string(),
                    remark: String::new(),
                },
                ReportAnswer {
                    question: "Is the land register complete for the current year?".to_string(),
                    department: "Revenue".to_string(),
                    answer: "No".to_string(),
                    remark: "Entries after page 40 are missing signatures (to be fixed)".repeat(3),
                },
            ],
            files: vec![InspectionFile {
                inspection_id: "ab12cd34".to_string(),
                question_id: "1".to_string(),
                file_name: "scan.png".to_string(),
                file_url: "https://drive.google.com/file/d/x/view?usp=sharing".to_string(),
            }],
            compliance: vec![ComplianceEntry::pending("ab12cd34", "Entries missing signatures")],
        }
    }

    #[test]
    fn test_build_joins_question_text() {
        let detail = InspectionDetail {
            inspection: sample_report().inspection,
            answers: vec![
                Answer {
                    inspection_id: "ab12cd34".to_string(),
                    question_id: "1".to_string(),
                    answer: "हो".to_string(),
                    remark: String::new(),
                },
                Answer {
                    inspection_id: "ab12cd34".to_string(),
                    question_id: "77".to_string(),
                    answer: "नाही".to_string(),
                    remark: String::new(),
                },
            ],
            files: Vec::new(),
            compliance: Vec::new(),
        };

        let report = InspectionReport::build(detail, &Question::fallback_questions());

        assert_eq!(report.answers[0].question, "दप्तर अद्ययावत आहे का?");
        assert_eq!(report.answers[0].department, "सामान्य");
        assert_eq!(report.answers[1].question, "Question 77");
    }

    #[test]
    fn test_details_order() {
        let report = sample_report();
        let labels: Vec<&str> = report.details().iter().map(|(label, _)| *label).collect();
        assert_eq!(
            labels,
            vec!["Inspection ID", "Saja/Village", "Officer", "Registration Date", "Submitted", "Grade"]
        );
    }

    #[test]
    fn test_attachment_name() {
        assert_eq!(attachment_name("ab12cd34", "pdf"), "Report_ab12cd34.pdf");
    }

    #[tokio::test]
    async fn test_export_renders_both_formats() {
        let (sheets, _, store) = RecordStore::in_memory();
        sheets.seed(Table::Inspections, &[&["ab12cd34", "S", "O", "", "", "Pending", ""]]);
        sheets.seed(Table::Compliance, &[&["ab12cd34", "torn", "", "", "Pending"]]);
        let export = ExportUseCase::new(Arc::new(store));

        let pdf = export.pdf("ab12cd34").await.unwrap();
        let docx = export.docx("ab12cd34").await.unwrap();

        assert!(pdf.starts_with(b"%PDF-"));
        assert!(docx.starts_with(b"PK"));
        assert!(export.pdf("missing").await.is_err());
    }

    #[tokio::test]
    async fn test_export_uses_configured_font() {
        let (sheets, _, store) = RecordStore::in_memory();
        sheets.seed(Table::Inspections, &[&["ab12cd34", "कसबा", "O", "", "", "Pending", ""]]);
        let font = FontFile::from_bytes("TestSans", crate::infrastructure::fonts::test_font_bytes()).unwrap();
        let export = ExportUseCase::new(Arc::new(store)).with_pdf_font(Some(font));

        let pdf = export.pdf("ab12cd34").await.unwrap();

        let doc = lopdf::Document::load_mem(&pdf).unwrap();
        let embedded = doc.objects.values().any(|object| {
            object
                .as_dict()
                .and_then(|dict| dict.get(b"Encoding"))
                .and_then(lopdf::Object::as_name)
                .map_or(false, |name| name == b"Identity-H")
        });
        assert!(embedded);
    }
}
