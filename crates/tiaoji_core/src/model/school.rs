//! School record domain model.
//!
//! # Responsibility
//! - Define the canonical admissions-transfer record and its value types.
//! - Model the mixed exact/range recruitment count as a tagged variant.
//!
//! # Invariants
//! - `id` is stable for the record lifetime.
//! - `scores` always holds 2021..=2024; missing years are zero-filled.
//! - A numeric recruitment count is never negative.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::error::Error;
use std::fmt::{Display, Formatter};
use time::macros::format_description;
use time::OffsetDateTime;

static RANGE_LOWER_BOUND_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\s*(\d+)\s*-").expect("valid range regex"));

/// Stable identifier for one school record.
pub type SchoolId = u64;

/// Year keys tracked for historical score lines.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ScoreYear {
    Y2021,
    Y2022,
    Y2023,
    Y2024,
}

impl ScoreYear {
    /// All tracked years in chronological order.
    pub const ALL: [ScoreYear; 4] = [
        ScoreYear::Y2021,
        ScoreYear::Y2022,
        ScoreYear::Y2023,
        ScoreYear::Y2024,
    ];

    /// Returns the wire key (`"2021"`..`"2024"`).
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Y2021 => "2021",
            Self::Y2022 => "2022",
            Self::Y2023 => "2023",
            Self::Y2024 => "2024",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value.trim() {
            "2021" => Some(Self::Y2021),
            "2022" => Some(Self::Y2022),
            "2023" => Some(Self::Y2023),
            "2024" => Some(Self::Y2024),
            _ => None,
        }
    }
}

impl Display for ScoreYear {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Highest and lowest admitted score for one year.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreRange {
    pub max: i32,
    pub min: i32,
}

impl ScoreRange {
    pub fn new(max: i32, min: i32) -> Self {
        Self { max, min }
    }
}

/// Four-year score table.
///
/// Serialized as an object keyed by year, newest year first, which matches the
/// hand-edited files this store reads.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct YearScores {
    #[serde(rename = "2024", default)]
    pub y2024: ScoreRange,
    #[serde(rename = "2023", default)]
    pub y2023: ScoreRange,
    #[serde(rename = "2022", default)]
    pub y2022: ScoreRange,
    #[serde(rename = "2021", default)]
    pub y2021: ScoreRange,
}

impl YearScores {
    /// Builds the full four-year shape, zero-filling years absent from `partial`.
    pub fn from_partial(partial: &BTreeMap<ScoreYear, ScoreRange>) -> Self {
        let mut scores = Self::default();
        for (year, range) in partial {
            scores.set(*year, *range);
        }
        scores
    }

    pub fn get(&self, year: ScoreYear) -> ScoreRange {
        match year {
            ScoreYear::Y2021 => self.y2021,
            ScoreYear::Y2022 => self.y2022,
            ScoreYear::Y2023 => self.y2023,
            ScoreYear::Y2024 => self.y2024,
        }
    }

    pub fn set(&mut self, year: ScoreYear, range: ScoreRange) {
        let slot = match year {
            ScoreYear::Y2021 => &mut self.y2021,
            ScoreYear::Y2022 => &mut self.y2022,
            ScoreYear::Y2023 => &mut self.y2023,
            ScoreYear::Y2024 => &mut self.y2024,
        };
        *slot = range;
    }
}

/// Recruitment quota: an exact headcount or a free-text range such as `"2-4"`.
///
/// Serialized untagged, so the file holds either a JSON number or a string.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RecruitmentCount {
    Exact(u32),
    Range(String),
}

impl RecruitmentCount {
    /// Parses table input: a non-negative integer becomes `Exact`, anything
    /// else keeps its original text as `Range`.
    pub fn parse_lenient(raw: &str) -> Self {
        match raw.trim().parse::<u32>() {
            Ok(value) => Self::Exact(value),
            Err(_) => Self::Range(raw.to_string()),
        }
    }

    /// Representative integer used for arithmetic and ordering.
    ///
    /// - `Exact(n)` -> `n`
    /// - all-digit text -> that number
    /// - `"a-b"` -> lower bound `a`
    /// - any other text -> `0`
    pub fn coerced(&self) -> u64 {
        match self {
            Self::Exact(value) => u64::from(*value),
            Self::Range(text) => {
                let trimmed = text.trim();
                if !trimmed.is_empty() && trimmed.chars().all(|c| c.is_ascii_digit()) {
                    return trimmed.parse().unwrap_or(0);
                }
                RANGE_LOWER_BOUND_RE
                    .captures(trimmed)
                    .and_then(|caps| caps.get(1))
                    .and_then(|m| m.as_str().parse().ok())
                    .unwrap_or(0)
            }
        }
    }

    /// Card-style label: exact counts get a `人` suffix, ranges are shown verbatim.
    pub fn display_label(&self) -> String {
        match self {
            Self::Exact(value) => format!("{value}人"),
            Self::Range(text) => text.clone(),
        }
    }
}

impl Default for RecruitmentCount {
    fn default() -> Self {
        Self::Exact(0)
    }
}

impl Display for RecruitmentCount {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Exact(value) => write!(f, "{value}"),
            Self::Range(text) => f.write_str(text),
        }
    }
}

/// Contact channels published by the school.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Contact {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub phone: String,
}

/// Canonical persisted admissions-transfer record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct School {
    pub id: SchoolId,
    pub name: String,
    #[serde(default)]
    pub address: String,
    #[serde(default)]
    pub major: String,
    pub recruitment_count: RecruitmentCount,
    #[serde(default)]
    pub scores: YearScores,
    #[serde(default)]
    pub contact: Contact,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub remark: Option<String>,
    /// `YYYY-MM-DD HH:MM:SS`, set once at creation.
    pub created_at: String,
}

impl School {
    /// Validates record-level invariants.
    pub fn validate(&self) -> Result<(), SchoolValidationError> {
        if self.name.trim().is_empty() {
            return Err(SchoolValidationError::EmptyName);
        }
        Ok(())
    }

    /// Label used by charts and pickers: `name - major`, or `name` alone.
    pub fn display_label(&self) -> String {
        if self.major.trim().is_empty() {
            self.name.clone()
        } else {
            format!("{} - {}", self.name, self.major)
        }
    }
}

/// Caller input for creating one school record.
///
/// Identity and creation time are assigned by the service.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NewSchool {
    pub name: String,
    pub address: String,
    pub major: String,
    pub recruitment_count: RecruitmentCount,
    /// Partial score table; absent years are zero-filled.
    pub scores: BTreeMap<ScoreYear, ScoreRange>,
    pub contact: Contact,
    pub remark: Option<String>,
}

impl NewSchool {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    pub fn validate(&self) -> Result<(), SchoolValidationError> {
        if self.name.trim().is_empty() {
            return Err(SchoolValidationError::EmptyName);
        }
        Ok(())
    }

    /// Materializes the canonical record with the given identity.
    pub fn into_school(self, id: SchoolId, created_at: impl Into<String>) -> School {
        School {
            id,
            name: self.name.trim().to_string(),
            address: self.address,
            major: self.major,
            recruitment_count: self.recruitment_count,
            scores: YearScores::from_partial(&self.scores),
            contact: self.contact,
            remark: self.remark,
            created_at: created_at.into(),
        }
    }
}

/// Validation failures for single-record writes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SchoolValidationError {
    /// `name` is missing or whitespace only.
    EmptyName,
    /// A record with this id already exists or the id is not above the
    /// collection high-water mark.
    IdConflict(SchoolId),
}

impl Display for SchoolValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyName => write!(f, "school name cannot be empty"),
            Self::IdConflict(id) => write!(f, "school id {id} conflicts with existing records"),
        }
    }
}

impl Error for SchoolValidationError {}

/// Current wall-clock time in the `created_at` format.
///
/// Falls back to UTC when the local offset cannot be determined.
pub fn timestamp_now() -> String {
    let now = OffsetDateTime::now_local().unwrap_or_else(|_| OffsetDateTime::now_utc());
    now.format(format_description!(
        "[year]-[month]-[day] [hour]:[minute]:[second]"
    ))
    .unwrap_or_else(|_| now.unix_timestamp().to_string())
}
