//! Typed parsing of import tables into school records.
//!
//! Rules:
//! - Required columns are checked first; a missing column rejects the file.
//! - Rows with a blank school name are skipped before any cell is parsed.
//! - Blank cells default to `""` for text, `0` for scores and `0` for the
//!   recruitment count.
//! - Recruitment count: non-negative integer, else the original text is kept.
//! - Score cells must be integers (integral floats such as `350.0` are
//!   accepted); every bad cell is collected and the whole batch fails.

use super::{
    ImportTable, COL_ADDRESS, COL_EMAIL, COL_MAJOR, COL_NAME, COL_PHONE, COL_RECRUITMENT,
    COL_REMARK, REQUIRED_COLUMNS, SCORE_COLUMNS,
};
use crate::model::school::{
    Contact, RecruitmentCount, School, SchoolId, ScoreRange, ScoreYear, YearScores,
};
use std::error::Error;
use std::fmt::{Display, Formatter};

pub type ImportResult<T> = Result<T, ImportError>;

/// One cell that could not be parsed into its column type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CellError {
    /// 1-based data row number (the header line is not counted).
    pub row: usize,
    pub column: &'static str,
    pub value: String,
}

impl Display for CellError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "row {} column `{}` value `{}` is not an integer",
            self.row, self.column, self.value
        )
    }
}

#[derive(Debug)]
pub enum ImportError {
    /// Required columns absent from the header, in schema order.
    MissingColumns(Vec<String>),
    /// Columns are present but no row carries a school name.
    Empty,
    /// Score cells that failed integer parsing.
    RowCoercion(Vec<CellError>),
    /// The source could not be read as a table.
    Csv(csv::Error),
}

impl Display for ImportError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MissingColumns(columns) => write!(
                f,
                "import is missing required columns: {}",
                columns.join(", ")
            ),
            Self::Empty => write!(f, "import contains no valid school rows"),
            Self::RowCoercion(errors) => {
                write!(f, "import has {} invalid score cell(s)", errors.len())?;
                for (index, cell) in errors.iter().enumerate() {
                    let sep = if index == 0 { ": " } else { "; " };
                    write!(f, "{sep}{cell}")?;
                }
                Ok(())
            }
            Self::Csv(err) => write!(f, "failed to read import table: {err}"),
        }
    }
}

impl Error for ImportError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Csv(err) => Some(err),
            _ => None,
        }
    }
}

impl From<csv::Error> for ImportError {
    fn from(value: csv::Error) -> Self {
        Self::Csv(value)
    }
}

struct ColumnMap {
    name: usize,
    address: usize,
    major: usize,
    recruitment: usize,
    scores: [(ScoreYear, usize, usize); 4],
    email: usize,
    phone: usize,
    remark: Option<usize>,
}

impl ColumnMap {
    fn resolve(table: &ImportTable) -> ImportResult<Self> {
        let missing = REQUIRED_COLUMNS
            .iter()
            .filter(|column| table.column_index(column).is_none())
            .map(|column| column.to_string())
            .collect::<Vec<_>>();
        if !missing.is_empty() {
            return Err(ImportError::MissingColumns(missing));
        }

        let index = |column: &str| table.column_index(column).unwrap_or_default();
        Ok(Self {
            name: index(COL_NAME),
            address: index(COL_ADDRESS),
            major: index(COL_MAJOR),
            recruitment: index(COL_RECRUITMENT),
            scores: SCORE_COLUMNS.map(|(year, max_col, min_col)| (year, index(max_col), index(min_col))),
            email: index(COL_EMAIL),
            phone: index(COL_PHONE),
            remark: table.column_index(COL_REMARK),
        })
    }
}

/// Parses `table` into new records with ids `first_id, first_id + 1, ...`.
///
/// # Errors
/// - `MissingColumns` when the header does not cover the schema.
/// - `RowCoercion` listing every bad score cell.
/// - `Empty` when no row has a school name.
pub fn parse_import(
    table: &ImportTable,
    first_id: SchoolId,
    created_at: &str,
) -> ImportResult<Vec<School>> {
    let columns = ColumnMap::resolve(table)?;
    let mut schools = Vec::new();
    let mut cell_errors = Vec::new();

    for (row_index, row) in table.rows.iter().enumerate() {
        let cell = |index: usize| row.get(index).map(|value| value.trim()).unwrap_or("");

        let name = cell(columns.name);
        if name.is_empty() {
            continue;
        }

        let mut scores = YearScores::default();
        for (offset, (year, max_index, min_index)) in columns.scores.iter().enumerate() {
            let (_, max_col, min_col) = SCORE_COLUMNS[offset];
            let max = parse_score_cell(cell(*max_index), row_index + 1, max_col, &mut cell_errors);
            let min = parse_score_cell(cell(*min_index), row_index + 1, min_col, &mut cell_errors);
            scores.set(*year, ScoreRange::new(max, min));
        }

        let recruitment_raw = cell(columns.recruitment);
        let recruitment_count = if recruitment_raw.is_empty() {
            RecruitmentCount::Exact(0)
        } else {
            RecruitmentCount::parse_lenient(recruitment_raw)
        };

        schools.push(School {
            id: first_id.saturating_add(schools.len() as SchoolId),
            name: name.to_string(),
            address: cell(columns.address).to_string(),
            major: cell(columns.major).to_string(),
            recruitment_count,
            scores,
            contact: Contact {
                email: cell(columns.email).to_string(),
                phone: cell(columns.phone).to_string(),
            },
            remark: columns.remark.map(|index| cell(index).to_string()),
            created_at: created_at.to_string(),
        });
    }

    if !cell_errors.is_empty() {
        return Err(ImportError::RowCoercion(cell_errors));
    }
    if schools.is_empty() {
        return Err(ImportError::Empty);
    }
    Ok(schools)
}

fn parse_score_cell(
    raw: &str,
    row: usize,
    column: &'static str,
    errors: &mut Vec<CellError>,
) -> i32 {
    match parse_score(raw) {
        Some(value) => value,
        None => {
            errors.push(CellError {
                row,
                column,
                value: raw.to_string(),
            });
            0
        }
    }
}

/// Integer score from a table cell; blank means 0.
pub fn parse_score(raw: &str) -> Option<i32> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Some(0);
    }
    if let Ok(value) = trimmed.parse::<i32>() {
        return Some(value);
    }
    let value = trimmed.parse::<f64>().ok()?;
    let in_range = value >= f64::from(i32::MIN) && value <= f64::from(i32::MAX);
    if value.is_finite() && value.fract() == 0.0 && in_range {
        Some(value as i32)
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::parse_score;

    #[test]
    fn parse_score_accepts_integers_blank_and_integral_floats() {
        assert_eq!(parse_score("350"), Some(350));
        assert_eq!(parse_score(" "), Some(0));
        assert_eq!(parse_score("350.0"), Some(350));
        assert_eq!(parse_score("350.5"), None);
        assert_eq!(parse_score("abc"), None);
        assert_eq!(parse_score("NaN"), None);
    }
}
