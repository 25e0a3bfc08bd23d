//! List-view derivation: filter, sort, paginate.

use crate::config::DEFAULT_PAGE_SIZE;
use crate::model::school::{School, ScoreYear};

/// Supported list orderings. All sorts are stable.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum SortKey {
    #[default]
    NameAsc,
    NameDesc,
    Max2024Desc,
    Min2024Desc,
}

/// What to do when the requested page is past the last page, e.g. after a
/// deletion shrank the collection.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum OverflowPolicy {
    /// Show the last page.
    #[default]
    ClampToLast,
    /// Jump back to page 1.
    ResetToFirst,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PageRequest {
    /// 1-based; 0 is treated as 1.
    pub page: usize,
    /// 0 falls back to the default page size.
    pub page_size: usize,
    pub overflow: OverflowPolicy,
}

impl PageRequest {
    pub fn new(page: usize, page_size: usize) -> Self {
        Self {
            page,
            page_size,
            overflow: OverflowPolicy::default(),
        }
    }

    pub fn with_overflow(mut self, overflow: OverflowPolicy) -> Self {
        self.overflow = overflow;
        self
    }
}

impl Default for PageRequest {
    fn default() -> Self {
        Self::new(1, DEFAULT_PAGE_SIZE)
    }
}

/// One page of a derived view plus its metadata.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Page {
    pub items: Vec<School>,
    pub total_items: usize,
    pub total_pages: usize,
    pub current_page: usize,
    pub page_size: usize,
}

/// Full list-view parameters; also the session cache key.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct ViewQuery {
    pub name_substring: Option<String>,
    /// `0` disables the score filter.
    pub min_score_2024: i32,
    pub sort: SortKey,
    pub page: PageRequest,
}

impl ViewQuery {
    /// Applies filter, sort and pagination in that order.
    pub fn run(&self, records: &[School]) -> Page {
        let filtered = filter(
            records,
            self.name_substring.as_deref(),
            self.min_score_2024,
        );
        paginate(&sort(&filtered, self.sort), self.page)
    }
}

/// Keeps records matching the name substring and 2024 minimum-score floor.
///
/// - Name matching is case-insensitive; a blank substring matches everything.
/// - A record passes the score filter when `scores[2024].min >= min_score_2024`.
///   A threshold of `0` (or below) means "no score filter", so filtering at
///   exactly 0 is not expressible.
pub fn filter(records: &[School], name_substring: Option<&str>, min_score_2024: i32) -> Vec<School> {
    let needle = name_substring
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .map(str::to_lowercase);

    records
        .iter()
        .filter(|school| match &needle {
            Some(needle) => school.name.to_lowercase().contains(needle.as_str()),
            None => true,
        })
        .filter(|school| {
            min_score_2024 <= 0 || school.scores.get(ScoreYear::Y2024).min >= min_score_2024
        })
        .cloned()
        .collect()
}

/// Returns a stably sorted copy; ties keep their input order.
pub fn sort(records: &[School], key: SortKey) -> Vec<School> {
    let mut sorted = records.to_vec();
    match key {
        SortKey::NameAsc => sorted.sort_by(|a, b| a.name.cmp(&b.name)),
        SortKey::NameDesc => sorted.sort_by(|a, b| b.name.cmp(&a.name)),
        SortKey::Max2024Desc => sorted.sort_by(|a, b| {
            let year = ScoreYear::Y2024;
            b.scores.get(year).max.cmp(&a.scores.get(year).max)
        }),
        SortKey::Min2024Desc => sorted.sort_by(|a, b| {
            let year = ScoreYear::Y2024;
            b.scores.get(year).min.cmp(&a.scores.get(year).min)
        }),
    }
    sorted
}

/// Slices `[(page - 1) * size, page * size)` out of `records`.
///
/// `total_pages = ceil(total_items / page_size)`; an empty input has zero
/// pages and reports `current_page = 1`.
pub fn paginate(records: &[School], request: PageRequest) -> Page {
    let page_size = if request.page_size == 0 {
        DEFAULT_PAGE_SIZE
    } else {
        request.page_size
    };
    let total_items = records.len();
    let total_pages = total_items.div_ceil(page_size);

    let mut current_page = request.page.max(1);
    if current_page > total_pages {
        current_page = match request.overflow {
            OverflowPolicy::ClampToLast => total_pages.max(1),
            OverflowPolicy::ResetToFirst => 1,
        };
    }

    let start = (current_page - 1) * page_size;
    let end = (start + page_size).min(total_items);
    let items = records.get(start..end).map(<[School]>::to_vec).unwrap_or_default();

    Page {
        items,
        total_items,
        total_pages,
        current_page,
        page_size,
    }
}

/// Records whose 2024 line falls below either threshold.
///
/// Selects `2024.min < min_below` (when `min_below > 0`) or
/// `2024.max < max_below` (when `max_below > 0`); both `<= 0` selects nothing.
pub fn below_thresholds(records: &[School], min_below: i32, max_below: i32) -> Vec<School> {
    if min_below <= 0 && max_below <= 0 {
        return Vec::new();
    }
    records
        .iter()
        .filter(|school| {
            let range = school.scores.get(ScoreYear::Y2024);
            (min_below > 0 && range.min < min_below) || (max_below > 0 && range.max < max_below)
        })
        .cloned()
        .collect()
}
