//! Recruitment-count statistics.
//!
//! Arithmetic runs on [`RecruitmentCount::coerced`]; the max/min display
//! values keep the original representation of the record that won. Range
//! text can hold any digit string, so totals saturate at `u64::MAX`.

use crate::model::school::{RecruitmentCount, School, SchoolId};

#[derive(Debug, Clone, PartialEq)]
pub struct RecruitmentStats {
    pub total: u64,
    pub average: f64,
    /// Original value of the first record with the largest coerced count.
    pub max_display: RecruitmentCount,
    /// Original value of the first record with the smallest coerced count.
    pub min_display: RecruitmentCount,
}

/// Returns `None` for an empty collection.
pub fn aggregate_recruitment_stats(records: &[School]) -> Option<RecruitmentStats> {
    let first = records.first()?;
    let mut total = 0u64;
    let mut max = (first.recruitment_count.coerced(), &first.recruitment_count);
    let mut min = max;

    for school in records {
        let value = school.recruitment_count.coerced();
        total = total.saturating_add(value);
        if value > max.0 {
            max = (value, &school.recruitment_count);
        }
        if value < min.0 {
            min = (value, &school.recruitment_count);
        }
    }

    Some(RecruitmentStats {
        total,
        average: total as f64 / records.len() as f64,
        max_display: max.1.clone(),
        min_display: min.1.clone(),
    })
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RankingEntry {
    pub id: SchoolId,
    pub label: String,
    pub coerced: u64,
    pub original: RecruitmentCount,
}

/// Top `limit` schools by coerced recruitment count, descending; ties keep
/// collection order.
pub fn recruitment_ranking(records: &[School], limit: usize) -> Vec<RankingEntry> {
    let mut entries = records
        .iter()
        .map(|school| RankingEntry {
            id: school.id,
            label: school.display_label(),
            coerced: school.recruitment_count.coerced(),
            original: school.recruitment_count.clone(),
        })
        .collect::<Vec<_>>();
    entries.sort_by(|a, b| b.coerced.cmp(&a.coerced));
    entries.truncate(limit);
    entries
}
