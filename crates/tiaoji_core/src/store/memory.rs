//! In-memory record store for tests and embedding.

use super::{RecordStore, StoreError, StoreResult};
use crate::model::collection::Collection;
use crate::model::school::School;
use std::cell::{Cell, RefCell};
use std::io;
use std::path::PathBuf;

/// Process-local store that can be told to fail writes.
#[derive(Debug, Default)]
pub struct InMemoryStore {
    records: RefCell<Vec<School>>,
    fail_writes: Cell<bool>,
    save_count: Cell<usize>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_records(records: Vec<School>) -> Self {
        Self {
            records: RefCell::new(records),
            ..Self::default()
        }
    }

    /// Makes every following `save` fail with an I/O error.
    pub fn set_fail_writes(&self, fail: bool) {
        self.fail_writes.set(fail);
    }

    /// Number of successful saves so far.
    pub fn save_count(&self) -> usize {
        self.save_count.get()
    }

    /// Copy of the currently persisted records.
    pub fn persisted(&self) -> Vec<School> {
        self.records.borrow().clone()
    }
}

impl RecordStore for InMemoryStore {
    fn load(&self) -> StoreResult<Collection> {
        Ok(Collection::from_records(self.records.borrow().clone()))
    }

    fn save(&self, records: &[School]) -> StoreResult<()> {
        if self.fail_writes.get() {
            return Err(StoreError::Io {
                path: PathBuf::from("<memory>"),
                source: io::Error::other("write rejected by in-memory store"),
            });
        }
        *self.records.borrow_mut() = records.to_vec();
        self.save_count.set(self.save_count.get() + 1);
        Ok(())
    }
}
