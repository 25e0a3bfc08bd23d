//! Caller-owned snapshot of the collection with explicit refresh and caching.
//!
//! # Responsibility
//! - Hold the collection a display layer works on between user actions.
//! - Memoize derived views by `(query, version)` and statistics by version.
//!
//! # Invariants
//! - `version` increases on every refresh and every mutation that changed
//!   state; caches never outlive the version they were computed for.
//! - Staleness is only acted on through `refresh_if_stale`; nothing reloads
//!   implicitly.

use crate::model::collection::Collection;
use crate::model::school::{NewSchool, School, SchoolId};
use crate::query::{aggregate_recruitment_stats, Page, RecruitmentStats, ViewQuery};
use crate::service::school_service::{ImportPreview, SchoolService, ServiceResult};
use crate::store::RecordStore;
use crate::table::import::ImportResult;
use crate::table::ImportTable;
use log::{debug, info};
use std::collections::HashMap;
use std::time::{Duration, Instant};

pub struct Session<S: RecordStore> {
    service: SchoolService<S>,
    collection: Collection,
    version: u64,
    loaded_at: Instant,
    ttl: Duration,
    view_cache: HashMap<(ViewQuery, u64), Page>,
    stats_cache: Option<(u64, Option<RecruitmentStats>)>,
}

impl<S: RecordStore> Session<S> {
    /// Loads the collection and starts a session at version 1.
    pub fn open(service: SchoolService<S>, ttl: Duration) -> ServiceResult<Self> {
        let collection = service.load()?;
        info!(
            "event=session_open module=session status=ok records={}",
            collection.len()
        );
        Ok(Self {
            service,
            collection,
            version: 1,
            loaded_at: Instant::now(),
            ttl,
            view_cache: HashMap::new(),
            stats_cache: None,
        })
    }

    pub fn collection(&self) -> &Collection {
        &self.collection
    }

    pub fn records(&self) -> &[School] {
        self.collection.records()
    }

    pub fn version(&self) -> u64 {
        self.version
    }

    pub fn service(&self) -> &SchoolService<S> {
        &self.service
    }

    pub fn is_stale(&self) -> bool {
        self.loaded_at.elapsed() >= self.ttl
    }

    /// Reloads from the store. On failure the current snapshot is kept.
    ///
    /// The id high-water mark survives the reload, so ids deleted during this
    /// session are not handed out again.
    pub fn refresh(&mut self) -> ServiceResult<()> {
        let mut collection = self.service.load()?;
        collection.raise_high_water(self.collection.last_assigned_id());
        self.collection = collection;
        self.loaded_at = Instant::now();
        self.bump();
        info!(
            "event=session_refresh module=session status=ok version={} records={}",
            self.version,
            self.collection.len()
        );
        Ok(())
    }

    /// Refreshes when the snapshot is older than the TTL; returns whether it did.
    pub fn refresh_if_stale(&mut self) -> ServiceResult<bool> {
        if !self.is_stale() {
            return Ok(false);
        }
        self.refresh()?;
        Ok(true)
    }

    /// Filter, sort and paginate the snapshot, memoized per version.
    pub fn view(&mut self, query: &ViewQuery) -> Page {
        let key = (query.clone(), self.version);
        if let Some(page) = self.view_cache.get(&key) {
            debug!("event=session_view module=session status=cache_hit");
            return page.clone();
        }
        let page = query.run(self.collection.records());
        self.view_cache.insert(key, page.clone());
        page
    }

    /// Number of memoized views for the current version.
    pub fn cached_views(&self) -> usize {
        self.view_cache.len()
    }

    pub fn stats(&mut self) -> Option<RecruitmentStats> {
        match &self.stats_cache {
            Some((version, stats)) if *version == self.version => stats.clone(),
            _ => {
                let stats = aggregate_recruitment_stats(self.collection.records());
                self.stats_cache = Some((self.version, stats.clone()));
                stats
            }
        }
    }

    pub fn add_school(&mut self, input: NewSchool) -> ServiceResult<School> {
        let school = self.service.add_school(&mut self.collection, input)?;
        self.bump();
        Ok(school)
    }

    pub fn delete_one(&mut self, id: SchoolId) -> ServiceResult<bool> {
        let removed = self.service.delete_one(&mut self.collection, id)?;
        if removed {
            self.bump();
        }
        Ok(removed)
    }

    pub fn delete_batch(
        &mut self,
        ids: impl IntoIterator<Item = SchoolId>,
    ) -> ServiceResult<usize> {
        let removed = self.service.delete_batch(&mut self.collection, ids)?;
        if removed > 0 {
            self.bump();
        }
        Ok(removed)
    }

    pub fn delete_below_thresholds(&mut self, min_below: i32, max_below: i32) -> ServiceResult<usize> {
        let removed =
            self.service
                .delete_below_thresholds(&mut self.collection, min_below, max_below)?;
        if removed > 0 {
            self.bump();
        }
        Ok(removed)
    }

    pub fn delete_all(&mut self) -> ServiceResult<bool> {
        let done = self.service.delete_all(&mut self.collection)?;
        self.bump();
        Ok(done)
    }

    pub fn prepare_import(&self, table: &ImportTable) -> ImportResult<ImportPreview> {
        self.service.prepare_import(&self.collection, table)
    }

    pub fn commit_import(&mut self, records: Vec<School>) -> ServiceResult<usize> {
        let added = self.service.commit_import(&mut self.collection, records)?;
        if added > 0 {
            self.bump();
        }
        Ok(added)
    }

    fn bump(&mut self) {
        self.version += 1;
        self.view_cache.clear();
        self.stats_cache = None;
    }
}
