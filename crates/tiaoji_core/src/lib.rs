//! Core domain logic for the admissions-transfer (调剂) school store.
//! This crate is the single source of truth for business invariants.

pub mod config;
pub mod logging;
pub mod model;
pub mod query;
pub mod service;
pub mod session;
pub mod store;
pub mod table;

pub use config::{ConfigError, StoreConfig};
pub use logging::{default_log_level, init_logging, logging_status, LogSettings};
pub use model::collection::Collection;
pub use model::school::{
    Contact, NewSchool, RecruitmentCount, School, SchoolId, SchoolValidationError, ScoreRange,
    ScoreYear, YearScores,
};
pub use query::{
    aggregate_recruitment_stats, below_thresholds, compare_schools, filter, paginate,
    recruitment_ranking, score_trend_series, sort, ComparisonRow, OverflowPolicy, Page,
    PageRequest, QueryError, RankingEntry, RecruitmentStats, SortKey, TrendPoint, ViewQuery,
};
pub use service::school_service::{ImportPreview, SchoolService, ServiceError, ServiceResult};
pub use session::Session;
pub use store::{InMemoryStore, JsonFileStore, RecordStore, StagedWrite, StoreError, StoreResult};
pub use table::import::{parse_import, CellError, ImportError, ImportResult};
pub use table::ImportTable;

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
