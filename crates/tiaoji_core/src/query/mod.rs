//! Read-only query operations over a collection snapshot.
//!
//! # Responsibility
//! - Derive list views (filter, sort, paginate) and chart data sources.
//! - Compute recruitment statistics with dual numeric/display values.
//!
//! # Invariants
//! - Every function takes `&[School]` and returns owned results; inputs are
//!   never mutated and nothing is persisted.

use crate::model::school::SchoolId;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub mod chart;
pub mod stats;
pub mod view;

pub use chart::{compare_schools, score_trend_series, ComparisonRow, TrendPoint};
pub use stats::{aggregate_recruitment_stats, recruitment_ranking, RankingEntry, RecruitmentStats};
pub use view::{
    below_thresholds, filter, paginate, sort, OverflowPolicy, Page, PageRequest, SortKey,
    ViewQuery,
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QueryError {
    /// More schools selected than a comparison allows.
    TooManySelections { max: usize, requested: usize },
    /// A selected id is not in the collection.
    UnknownSchool(SchoolId),
}

impl Display for QueryError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::TooManySelections { max, requested } => write!(
                f,
                "at most {max} schools can be compared, got {requested}"
            ),
            Self::UnknownSchool(id) => write!(f, "school not found: {id}"),
        }
    }
}

impl Error for QueryError {}
