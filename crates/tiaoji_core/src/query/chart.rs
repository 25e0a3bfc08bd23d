//! Chart data sources. Drawing happens elsewhere.

use super::QueryError;
use crate::config::MAX_COMPARE_SCHOOLS;
use crate::model::school::{School, SchoolId, ScoreYear};
use std::collections::BTreeSet;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TrendPoint {
    pub year: ScoreYear,
    pub max: i32,
    pub min: i32,
}

/// Score lines for one school, 2021 first.
pub fn score_trend_series(school: &School) -> Vec<TrendPoint> {
    ScoreYear::ALL
        .iter()
        .map(|year| {
            let range = school.scores.get(*year);
            TrendPoint {
                year: *year,
                max: range.max,
                min: range.min,
            }
        })
        .collect()
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComparisonRow {
    pub id: SchoolId,
    pub label: String,
    pub major: String,
    pub year: ScoreYear,
    pub max: i32,
    pub min: i32,
}

/// One year's score lines for up to five selected schools, in collection
/// order.
pub fn compare_schools(
    records: &[School],
    ids: &[SchoolId],
    year: ScoreYear,
) -> Result<Vec<ComparisonRow>, QueryError> {
    let selected = ids.iter().copied().collect::<BTreeSet<_>>();
    if selected.len() > MAX_COMPARE_SCHOOLS {
        return Err(QueryError::TooManySelections {
            max: MAX_COMPARE_SCHOOLS,
            requested: selected.len(),
        });
    }
    if let Some(missing) = selected
        .iter()
        .find(|id| !records.iter().any(|school| school.id == **id))
    {
        return Err(QueryError::UnknownSchool(*missing));
    }

    Ok(records
        .iter()
        .filter(|school| selected.contains(&school.id))
        .map(|school| {
            let range = school.scores.get(year);
            ComparisonRow {
                id: school.id,
                label: school.display_label(),
                major: school.major.clone(),
                year,
                max: range.max,
                min: range.min,
            }
        })
        .collect())
}
