// ============================================================
// NAMED RANGES
// ============================================================
// The spreadsheet tabs used as tables, with their header layout

use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Table {
    Inspections,
    MasterQuestions,
    Compliance,
    InspectionAnswers,
    InspectionFiles,
}

impl Table {
    #[cfg(test)]
    pub const ALL: [Table; 5] = [
        Table::Inspections,
        Table::MasterQuestions,
        Table::Compliance,
        Table::InspectionAnswers,
        Table::InspectionFiles,
    ];

    pub fn sheet_name(&self) -> &'static str {
        match self {
            Table::Inspections => "Inspections",
            Table::MasterQuestions => "Master_Q",
            Table::Compliance => "Compliance",
            Table::InspectionAnswers => "Inspection_Answers",
            Table::InspectionFiles => "Inspection_Files",
        }
    }

    /// Expected header row, in column order.
    pub fn headers(&self) -> &'static [&'static str] {
        match self {
            Table::Inspections => &[
                "ID",
                "सजा",
                "नाव",
                "नोंदणी दिनांक",
                "तारीख",
                "एकूण ग्रेड",
                "फाईल लिंक",
            ],
            Table::MasterQuestions => &["ID", "विभाग", "प्रश्न", "अपलोड आवश्यक"],
            Table::Compliance => &["Log_ID", "अधिकारी शेरा", "वरिष्ठ मत", "स्पष्टीकरण", "स्थिती"],
            Table::InspectionAnswers => &["Inspection_ID", "Question_ID", "Answer", "Remark"],
            Table::InspectionFiles => &["Inspection_ID", "Question_ID", "File_Name", "File_URL"],
        }
    }

    pub fn width(&self) -> usize {
        self.headers().len()
    }

    /// Whole-column A1 range covering every header column, e.g. `Compliance!A:E`.
    pub fn range(&self) -> String {
        format!("{}!A:{}", self.sheet_name(), column_letter(self.width() - 1))
    }

    /// Bounded A1 range on a single 1-based sheet row.
    pub fn row_range(&self, row_number: usize, first_col: usize, last_col: usize) -> String {
        format!(
            "{}!{}{}:{}{}",
            self.sheet_name(),
            column_letter(first_col),
            row_number,
            column_letter(last_col),
            row_number
        )
    }
}

impl fmt::Display for Table {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.sheet_name())
    }
}

/// Spreadsheet column letter for a 0-based index: 0 -> A, 25 -> Z, 26 -> AA.
pub fn column_letter(index: usize) -> String {
    let mut n = index + 1;
    let mut letters = Vec::new();
    while n > 0 {
        let rem = (n - 1) % 26;
        letters.push(b'A' + rem as u8);
        n = (n - 1) / 26;
    }
    letters.reverse();
    String::from_utf8(letters).unwrap_or_default()
}
