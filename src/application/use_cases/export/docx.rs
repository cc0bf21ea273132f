use super::{InspectionReport, REPORT_TITLE};
use crate::domain::error::{AppError, Result};
use docx_rs::{AlignmentType, Docx, Paragraph, Run, Table, TableCell, TableRow};
use std::io::Cursor;

/// Half-points.
const TITLE_SIZE: usize = 32;
const HEADING_SIZE: usize = 26;

fn text_paragraph(text: &str, bold: bool) -> Paragraph {
    let run = Run::new().add_text(text);
    Paragraph::new().add_run(if bold { run.bold() } else { run })
}

fn heading(text: &str) -> Paragraph {
    Paragraph::new().add_run(Run::new().add_text(text).bold().size(HEADING_SIZE))
}

fn cell(text: &str, bold: bool) -> TableCell {
    TableCell::new().add_paragraph(text_paragraph(text, bold))
}

/// `grid` widths are in twentieths of a point.
fn table(header: &[&str], rows: &[Vec<&str>], grid: Vec<usize>) -> Table {
    let mut table_rows = Vec::with_capacity(rows.len() + 1);
    if !header.is_empty() {
        table_rows.push(TableRow::new(header.iter().map(|h| cell(h, true)).collect()));
    }
    for row in rows {
        table_rows.push(TableRow::new(row.iter().map(|c| cell(c, false)).collect()));
    }
    Table::new(table_rows).set_grid(grid)
}

fn build(report: &InspectionReport) -> Docx {
    let mut docx = Docx::new().add_paragraph(
        Paragraph::new()
            .add_run(Run::new().add_text(REPORT_TITLE).bold().size(TITLE_SIZE))
            .align(AlignmentType::Center),
    );

    let details: Vec<Vec<&str>> = report
        .details()
        .into_iter()
        .map(|(label, value)| vec![label, value])
        .collect();
    docx = docx.add_table(table(&[], &details, vec![2800, 6200]));

    docx = docx.add_paragraph(heading("Answers"));
    if report.answers.is_empty() {
        docx = docx.add_paragraph(text_paragraph("No answers recorded.", false));
    } else {
        let rows: Vec<Vec<&str>> = report
            .answers
            .iter()
            .map(|a| vec![a.question.as_str(), a.answer.as_str(), a.remark.as_str()])
            .collect();
        docx = docx.add_table(table(
            &["Question", "Answer", "Remark"],
            &rows,
            vec![4600, 1600, 2800],
        ));
    }

    docx = docx.add_paragraph(heading("Files"));
    if report.files.is_empty() {
        docx = docx.add_paragraph(text_paragraph("No files attached.", false));
    }
    for file in &report.files {
        docx = docx.add_paragraph(
            Paragraph::new()
                .add_run(Run::new().add_text(format!("{}: ", file.file_name)).bold())
                .add_run(Run::new().add_text(&file.file_url)),
        );
    }

    docx = docx.add_paragraph(heading("Remarks & Compliance"));
    if report.compliance.is_empty() {
        docx = docx.add_paragraph(text_paragraph("No remarks recorded.", false));
    } else {
        let rows: Vec<Vec<&str>> = report
            .compliance
            .iter()
            .map(|c| {
                vec![
                    c.officer_remark.as_str(),
                    c.senior_opinion.as_str(),
                    c.explanation.as_str(),
                    c.status.as_str(),
                ]
            })
            .collect();
        docx = docx.add_table(table(
            &["Issue", "Senior Opinion", "Explanation", "Status"],
            &rows,
            vec![2800, 2100, 2600, 1500],
        ));
    }

    docx
}

pub(super) fn render(report: &InspectionReport) -> Result<Vec<u8>> {
    let mut cursor = Cursor::new(Vec::new());
    build(report)
        .build()
        .pack(&mut cursor)
        .map_err(|e| AppError::RenderError(format!("Failed to write Word document: {}", e)))?;
    Ok(cursor.into_inner())
}
