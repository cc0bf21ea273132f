use super::font::{Font, GlyphSet, Typeface};
use super::{InspectionReport, REPORT_TITLE};
use crate::domain::error::{AppError, Result};
use crate::infrastructure::fonts::FontFile;
use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Document, Object, Stream};

const PAGE_WIDTH: i64 = 595;
const PAGE_HEIGHT: i64 = 842;
const MARGIN: i64 = 50;
const CONTENT_WIDTH: i64 = PAGE_WIDTH - 2 * MARGIN;
const CELL_PADDING: i64 = 4;

const TITLE_SIZE: i64 = 15;
const HEADING_SIZE: i64 = 12;
const BODY_SIZE: i64 = 10;
const LINE_HEIGHT: i64 = 14;

struct Column<'a> {
    label: &'a str,
    width: i64,
}

/// Accumulates content-stream operations page by page, top to bottom.
struct Layout<'f> {
    typeface: &'f Typeface<'f>,
    pages: Vec<Vec<Operation>>,
    ops: Vec<Operation>,
    y: i64,
    glyphs: GlyphSet,
}

impl<'f> Layout<'f> {
    fn new(typeface: &'f Typeface<'f>) -> Self {
        Self {
            typeface,
            pages: Vec::new(),
            ops: Vec::new(),
            y: PAGE_HEIGHT - MARGIN,
            glyphs: GlyphSet::new(),
        }
    }

    fn new_page(&mut self) {
        self.pages.push(std::mem::take(&mut self.ops));
        self.y = PAGE_HEIGHT - MARGIN;
    }

    /// Break the page unless `height` points still fit.
    fn ensure_space(&mut self, height: i64) -> bool {
        if self.y - height < MARGIN && self.y < PAGE_HEIGHT - MARGIN {
            self.new_page();
            return true;
        }
        false
    }

    fn text(&mut self, x: i64, y: i64, font: Font, size: i64, text: &str) {
        self.ops.push(Operation::new("BT", vec![]));
        self.ops.push(Operation::new(
            "Tf",
            vec![font.resource().into(), size.into()],
        ));
        self.ops.push(Operation::new("Td", vec![x.into(), y.into()]));
        let operand = self.typeface.encode(text, &mut self.glyphs);
        self.ops.push(Operation::new("Tj", vec![operand]));
        self.ops.push(Operation::new("ET", vec![]));
    }

    fn rule(&mut self, y: i64) {
        self.ops.push(Operation::new("w", vec![1.into()]));
        self.ops.push(Operation::new("m", vec![MARGIN.into(), y.into()]));
        self.ops.push(Operation::new(
            "l",
            vec![(MARGIN + CONTENT_WIDTH).into(), y.into()],
        ));
        self.ops.push(Operation::new("S", vec![]));
    }

    fn gap(&mut self, points: i64) {
        self.y -= points;
    }

    fn title(&mut self, text: &str) {
        let width = self.typeface.text_width(text, Font::Bold, TITLE_SIZE);
        let x = MARGIN + (CONTENT_WIDTH - width).max(0) / 2;
        self.y -= TITLE_SIZE;
        self.text(x, self.y, Font::Bold, TITLE_SIZE, text);
        self.gap(LINE_HEIGHT);
    }

    fn heading(&mut self, text: &str) {
        self.ensure_space(HEADING_SIZE + 2 * LINE_HEIGHT);
        self.gap(LINE_HEIGHT / 2);
        self.y -= HEADING_SIZE;
        self.text(MARGIN, self.y, Font::Bold, HEADING_SIZE, text);
        self.gap(LINE_HEIGHT / 2);
    }

    fn paragraph(&mut self, font: Font, text: &str) {
        for line in self.typeface.wrap(text, font, BODY_SIZE, CONTENT_WIDTH) {
            self.ensure_space(LINE_HEIGHT);
            self.y -= LINE_HEIGHT;
            self.text(MARGIN, self.y + 3, font, BODY_SIZE, &line);
        }
    }

    fn wrap_cells(&self, columns: &[Column<'_>], cells: &[&str], font: Font) -> Vec<Vec<String>> {
        columns
            .iter()
            .zip(cells)
            .map(|(col, cell)| {
                self.typeface
                    .wrap(cell, font, BODY_SIZE, col.width - 2 * CELL_PADDING)
            })
            .collect()
    }

    fn line_count(wrapped: &[Vec<String>]) -> usize {
        wrapped.iter().map(Vec::len).max().unwrap_or(1).max(1)
    }

    fn row_height(wrapped: &[Vec<String>]) -> i64 {
        Self::line_count(wrapped) as i64 * LINE_HEIGHT + CELL_PADDING
    }

    /// Whole lines that still fit above the bottom margin.
    fn lines_left(&self) -> usize {
        ((self.y - MARGIN - CELL_PADDING) / LINE_HEIGHT).max(0) as usize
    }

    /// Draw one row. A row that cannot fit on a fresh page is split, and its
    /// remaining lines continue below `header` on the next page.
    fn draw_row(
        &mut self,
        columns: &[Column<'_>],
        wrapped: &[Vec<String>],
        font: Font,
        header: Option<&[Vec<String>]>,
    ) {
        let height = Self::row_height(wrapped);
        if height <= PAGE_HEIGHT - 2 * MARGIN && self.ensure_space(height) {
            self.draw_header(columns, header);
        }

        let total = Self::line_count(wrapped);
        let mut start = 0;
        while start < total {
            if self.lines_left() == 0 {
                self.new_page();
                self.draw_header(columns, header);
            }
            let end = (start + self.lines_left().max(1)).min(total);

            let mut x = MARGIN;
            for (col, lines) in columns.iter().zip(wrapped) {
                for (index, line) in lines.iter().enumerate().take(end).skip(start) {
                    let y = self.y - ((index - start) as i64 + 1) * LINE_HEIGHT + 3;
                    self.text(x + CELL_PADDING, y, font, BODY_SIZE, line);
                }
                x += col.width;
            }
            self.y -= (end - start) as i64 * LINE_HEIGHT + CELL_PADDING;
            self.rule(self.y);
            start = end;
        }
    }

    fn draw_header(&mut self, columns: &[Column<'_>], header: Option<&[Vec<String>]>) {
        if let Some(header) = header {
            self.draw_row(columns, header, Font::Bold, None);
        }
    }

    /// The header row repeats at the top of every page the table spans.
    fn table(&mut self, columns: &[Column<'_>], rows: &[Vec<&str>]) {
        let labels: Vec<&str> = columns.iter().map(|c| c.label).collect();
        let header = columns
            .iter()
            .any(|c| !c.label.is_empty())
            .then(|| self.wrap_cells(columns, &labels, Font::Bold));

        if let Some(header) = &header {
            self.ensure_space(2 * Self::row_height(header));
            self.draw_row(columns, header, Font::Bold, None);
        }
        for cells in rows {
            let wrapped = self.wrap_cells(columns, cells, Font::Regular);
            self.draw_row(columns, &wrapped, Font::Regular, header.as_deref());
        }
    }

    fn finish(mut self) -> (Vec<Vec<Operation>>, GlyphSet) {
        if !self.ops.is_empty() || self.pages.is_empty() {
            self.pages.push(self.ops);
        }
        (self.pages, self.glyphs)
    }
}

fn lay_out<'f>(report: &InspectionReport, typeface: &'f Typeface<'f>) -> Layout<'f> {
    let mut layout = Layout::new(typeface);
    layout.title(REPORT_TITLE);

    let detail_rows: Vec<Vec<&str>> = report
        .details()
        .into_iter()
        .map(|(label, value)| vec![label, value])
        .collect();
    layout.table(
        &[
            Column { label: "", width: 140 },
            Column { label: "", width: CONTENT_WIDTH - 140 },
        ],
        &detail_rows,
    );

    layout.heading("Answers");
    if report.answers.is_empty() {
        layout.paragraph(Font::Regular, "No answers recorded.");
    } else {
        let rows: Vec<Vec<&str>> = report
            .answers
            .iter()
            .map(|a| vec![a.question.as_str(), a.answer.as_str(), a.remark.as_str()])
            .collect();
        layout.table(
            &[
                Column { label: "Question", width: 245 },
                Column { label: "Answer", width: 90 },
                Column { label: "Remark", width: CONTENT_WIDTH - 335 },
            ],
            &rows,
        );
    }

    layout.heading("Files");
    if report.files.is_empty() {
        layout.paragraph(Font::Regular, "No files attached.");
    }
    for file in &report.files {
        layout.paragraph(Font::Bold, &file.file_name);
        layout.paragraph(Font::Regular, &file.file_url);
    }

    layout.heading("Remarks & Compliance");
    if report.compliance.is_empty() {
        layout.paragraph(Font::Regular, "No remarks recorded.");
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
        layout.table(
            &[
                Column { label: "Issue", width: 160 },
                Column { label: "Senior Opinion", width: 110 },
                Column { label: "Explanation", width: 145 },
                Column { label: "Status", width: CONTENT_WIDTH - 415 },
            ],
            &rows,
        );
    }

    layout
}

/// Render with `font` embedded when given, else with Helvetica.
pub(super) fn render(report: &InspectionReport, font: Option<&FontFile>) -> Result<Vec<u8>> {
    let typeface = match font {
        Some(file) => Typeface::embedded(file)?,
        None => Typeface::Standard,
    };
    let (pages, glyphs) = lay_out(report, &typeface).finish();

    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();
    let fonts = typeface.register(&mut doc, &glyphs);
    let resources_id = doc.add_object(dictionary! {
        "Font" => fonts,
    });

    let mut kids: Vec<Object> = Vec::with_capacity(pages.len());
    for operations in pages {
        let content = Content { operations }
            .encode()
            .map_err(|e| AppError::RenderError(format!("Failed to encode page: {}", e)))?;
        let content_id = doc.add_object(Stream::new(dictionary! {}, content));
        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "Contents" => content_id,
        });
        kids.push(page_id.into());
    }

    let page_count = kids.len() as i64;
    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => kids,
            "Count" => page_count,
            "Resources" => resources_id,
            "MediaBox" => vec![0.into(), 0.into(), PAGE_WIDTH.into(), PAGE_HEIGHT.into()],
        }),
    );
    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);
    doc.compress();

    let mut bytes = Vec::new();
    doc.save_to(&mut bytes)
        .map_err(|e| AppError::RenderError(format!("Failed to write PDF: {}", e)))?;
    Ok(bytes)
}
