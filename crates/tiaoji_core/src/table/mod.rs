//! Tabular import/export for school records.
//!
//! # Responsibility
//! - Define the column schema shared by import, export and the template.
//! - Turn raw text tables into canonical records through typed per-column
//!   parsing with structured errors.
//!
//! # Invariants
//! - Header text is the wire format; columns are matched by exact (trimmed)
//!   header name, never by position.
//! - An import either yields every valid row or fails as a whole.

use crate::model::school::ScoreYear;

pub mod csv_io;
pub mod export;
pub mod import;

pub const COL_NAME: &str = "学校名称";
pub const COL_ADDRESS: &str = "学校地址";
pub const COL_MAJOR: &str = "调剂专业";
pub const COL_RECRUITMENT: &str = "招生人数";
pub const COL_EMAIL: &str = "邮箱";
pub const COL_PHONE: &str = "电话";
pub const COL_REMARK: &str = "备注";

/// `(year, max column, min column)` in newest-first table order.
pub const SCORE_COLUMNS: [(ScoreYear, &str, &str); 4] = [
    (ScoreYear::Y2024, "2024最高分", "2024最低分"),
    (ScoreYear::Y2023, "2023最高分", "2023最低分"),
    (ScoreYear::Y2022, "2022最高分", "2022最低分"),
    (ScoreYear::Y2021, "2021最高分", "2021最低分"),
];

/// Columns an import must contain, in table order.
pub const REQUIRED_COLUMNS: [&str; 14] = [
    COL_NAME,
    COL_ADDRESS,
    COL_MAJOR,
    COL_RECRUITMENT,
    SCORE_COLUMNS[0].1,
    SCORE_COLUMNS[0].2,
    SCORE_COLUMNS[1].1,
    SCORE_COLUMNS[1].2,
    SCORE_COLUMNS[2].1,
    SCORE_COLUMNS[2].2,
    SCORE_COLUMNS[3].1,
    SCORE_COLUMNS[3].2,
    COL_EMAIL,
    COL_PHONE,
];

/// Full export header: required columns followed by the remark.
pub fn export_headers() -> Vec<&'static str> {
    let mut headers = REQUIRED_COLUMNS.to_vec();
    headers.push(COL_REMARK);
    headers
}

/// Raw text table as read from a CSV (or any row-oriented source).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ImportTable {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl ImportTable {
    pub fn new(headers: Vec<String>, rows: Vec<Vec<String>>) -> Self {
        Self { headers, rows }
    }

    /// Index of the first column whose trimmed header equals `name`.
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.headers.iter().position(|header| header.trim() == name)
    }
}
