//! Record store contracts and persistence implementations.
//!
//! # Responsibility
//! - Own the persisted representation of the school collection.
//! - Load and save the whole collection as one unit.
//!
//! # Invariants
//! - A missing store loads as an empty collection; an unreadable one is an
//!   error, never silently treated as empty.
//! - `save` either replaces the previous state completely or leaves it intact.
//! - Single-writer assumption: two processes saving concurrently is not
//!   guarded against.

use crate::model::collection::Collection;
use crate::model::school::School;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::io;
use std::path::PathBuf;

mod json_file;
mod memory;

pub use json_file::{JsonFileStore, StagedWrite};
pub use memory::InMemoryStore;

pub type StoreResult<T> = Result<T, StoreError>;

#[derive(Debug)]
pub enum StoreError {
    /// File-system access failed while reading or writing.
    Io { path: PathBuf, source: io::Error },
    /// The collection could not be encoded.
    Serialize(serde_json::Error),
    /// The persisted bytes exist but do not decode into a valid collection.
    CorruptState { path: PathBuf, message: String },
}

impl Display for StoreError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io { path, source } => {
                write!(f, "failed to access `{}`: {source}", path.display())
            }
            Self::Serialize(err) => write!(f, "failed to serialize collection: {err}"),
            Self::CorruptState { path, message } => write!(
                f,
                "persisted collection at `{}` is unreadable: {message}",
                path.display()
            ),
        }
    }
}

impl Error for StoreError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Io { source, .. } => Some(source),
            Self::Serialize(err) => Some(err),
            Self::CorruptState { .. } => None,
        }
    }
}

impl From<serde_json::Error> for StoreError {
    fn from(value: serde_json::Error) -> Self {
        Self::Serialize(value)
    }
}

/// Whole-collection persistence boundary.
pub trait RecordStore {
    fn load(&self) -> StoreResult<Collection>;
    fn save(&self, records: &[School]) -> StoreResult<()>;
}

impl<T: RecordStore + ?Sized> RecordStore for &T {
    fn load(&self) -> StoreResult<Collection> {
        (**self).load()
    }

    fn save(&self, records: &[School]) -> StoreResult<()> {
        (**self).save(records)
    }
}

/// Checks decoded records before they are handed to callers.
fn validate_loaded(records: &[School]) -> Result<(), String> {
    let mut seen = std::collections::HashSet::with_capacity(records.len());
    for school in records {
        school
            .validate()
            .map_err(|err| format!("record {}: {err}", school.id))?;
        if !seen.insert(school.id) {
            return Err(format!("duplicate school id {}", school.id));
        }
    }
    Ok(())
}
