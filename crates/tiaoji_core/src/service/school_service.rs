//! School mutation service.
//!
//! # Responsibility
//! - Provide add/delete/import entry points over a caller-owned collection.
//! - Assign ids and creation timestamps.
//!
//! # Invariants
//! - New ids are strictly greater than every id the collection has handed out.
//! - Every successful mutation is persisted before it becomes visible in the
//!   caller's collection.
//! - `prepare_import` never persists; `commit_import` is the explicit write.

use crate::model::collection::Collection;
use crate::model::school::{timestamp_now, NewSchool, School, SchoolId, SchoolValidationError};
use crate::query::below_thresholds;
use crate::store::{RecordStore, StoreError};
use crate::table::import::{parse_import, ImportResult};
use crate::table::ImportTable;
use log::{info, warn};
use std::collections::HashSet;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub type ServiceResult<T> = Result<T, ServiceError>;

#[derive(Debug)]
pub enum ServiceError {
    /// Input rejected before any state changed.
    Validation(SchoolValidationError),
    /// The store could not load or durably write the collection.
    Store(StoreError),
}

impl Display for ServiceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::Store(err) => write!(f, "{err}"),
        }
    }
}

impl Error for ServiceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Store(err) => Some(err),
        }
    }
}

impl From<SchoolValidationError> for ServiceError {
    fn from(value: SchoolValidationError) -> Self {
        Self::Validation(value)
    }
}

impl From<StoreError> for ServiceError {
    fn from(value: StoreError) -> Self {
        Self::Store(value)
    }
}

/// Parsed import waiting for the caller's confirmation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportPreview {
    pub records: Vec<School>,
    pub message: String,
}

/// Use-case service wrapper for school mutations.
pub struct SchoolService<S: RecordStore> {
    store: S,
}

impl<S: RecordStore> SchoolService<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Loads the persisted collection.
    pub fn load(&self) -> ServiceResult<Collection> {
        Ok(self.store.load()?)
    }

    /// Persists `collection` unchanged.
    pub fn save(&self, collection: &Collection) -> ServiceResult<()> {
        Ok(self.store.save(collection.records())?)
    }

    /// Validates, assigns the next id, persists and returns the new record.
    pub fn add_school(
        &self,
        collection: &mut Collection,
        input: NewSchool,
    ) -> ServiceResult<School> {
        if let Err(err) = input.validate() {
            warn!("event=school_add module=service status=rejected reason={err}");
            return Err(err.into());
        }

        let id = collection.next_id();
        if id <= collection.last_assigned_id() {
            warn!("event=school_add module=service status=rejected reason=id_exhausted");
            return Err(SchoolValidationError::IdConflict(id).into());
        }

        let school = input.into_school(id, timestamp_now());
        let mut next = collection.clone();
        next.push(school.clone());
        self.persist(collection, next)?;

        info!("event=school_add module=service status=ok id={}", school.id);
        Ok(school)
    }

    /// Removes the record with `id`; persists only when something was removed.
    pub fn delete_one(&self, collection: &mut Collection, id: SchoolId) -> ServiceResult<bool> {
        let Some(index) = collection.records().iter().position(|school| school.id == id) else {
            return Ok(false);
        };

        let mut next = collection.clone();
        next.remove_indices(vec![index]);
        self.persist(collection, next)?;

        info!("event=school_delete module=service status=ok id={id}");
        Ok(true)
    }

    /// Removes every record whose id is in `ids`; returns how many were removed.
    ///
    /// The result does not depend on the iteration order of `ids`.
    pub fn delete_batch(
        &self,
        collection: &mut Collection,
        ids: impl IntoIterator<Item = SchoolId>,
    ) -> ServiceResult<usize> {
        let ids = ids.into_iter().collect::<HashSet<_>>();
        if ids.is_empty() {
            return Ok(0);
        }

        let indices = collection
            .records()
            .iter()
            .enumerate()
            .filter(|(_, school)| ids.contains(&school.id))
            .map(|(index, _)| index)
            .collect::<Vec<_>>();
        if indices.is_empty() {
            return Ok(0);
        }

        let mut next = collection.clone();
        let removed = next.remove_indices(indices);
        self.persist(collection, next)?;

        info!("event=school_delete_batch module=service status=ok removed={removed}");
        Ok(removed)
    }

    /// Deletes the records selected by [`below_thresholds`].
    pub fn delete_below_thresholds(
        &self,
        collection: &mut Collection,
        min_below: i32,
        max_below: i32,
    ) -> ServiceResult<usize> {
        let ids = below_thresholds(collection.records(), min_below, max_below)
            .into_iter()
            .map(|school| school.id)
            .collect::<Vec<_>>();
        self.delete_batch(collection, ids)
    }

    /// Empties the collection and persists unconditionally.
    pub fn delete_all(&self, collection: &mut Collection) -> ServiceResult<bool> {
        let removed = collection.len();
        let mut next = collection.clone();
        next.clear();
        self.persist(collection, next)?;

        info!("event=school_delete_all module=service status=ok removed={removed}");
        Ok(true)
    }

    /// Parses an import table into new records without persisting them.
    ///
    /// Ids continue from the collection's high-water mark.
    pub fn prepare_import(
        &self,
        collection: &Collection,
        table: &ImportTable,
    ) -> ImportResult<ImportPreview> {
        match parse_import(table, collection.next_id(), &timestamp_now()) {
            Ok(records) => {
                info!(
                    "event=import_prepare module=import status=ok rows={} parsed={}",
                    table.rows.len(),
                    records.len()
                );
                let message = format!("parsed {} school record(s)", records.len());
                Ok(ImportPreview { records, message })
            }
            Err(err) => {
                warn!(
                    "event=import_prepare module=import status=rejected rows={} error={}",
                    table.rows.len(),
                    err
                );
                Err(err)
            }
        }
    }

    /// Appends previewed records and persists; returns the number added.
    ///
    /// # Errors
    /// - `IdConflict` when a record id is not above the collection's
    ///   high-water mark or appears twice (for example a stale preview).
    pub fn commit_import(
        &self,
        collection: &mut Collection,
        records: Vec<School>,
    ) -> ServiceResult<usize> {
        if records.is_empty() {
            return Ok(0);
        }

        let mut seen = HashSet::with_capacity(records.len());
        for school in &records {
            school.validate()?;
            if school.id <= collection.last_assigned_id() || !seen.insert(school.id) {
                return Err(SchoolValidationError::IdConflict(school.id).into());
            }
        }

        let added = records.len();
        let mut next = collection.clone();
        for school in records {
            next.push(school);
        }
        self.persist(collection, next)?;

        info!("event=import_commit module=import status=ok added={added}");
        Ok(added)
    }

    fn persist(&self, collection: &mut Collection, next: Collection) -> ServiceResult<()> {
        self.store.save(next.records())?;
        *collection = next;
        Ok(())
    }
}
