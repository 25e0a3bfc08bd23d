//! JSON file record store.
//!
//! # Responsibility
//! - Persist the collection as one pretty-printed UTF-8 JSON array.
//! - Replace the canonical file atomically (temp file, fsync, rename).
//!
//! # Invariants
//! - The canonical file is only ever replaced by `rename`, never truncated.
//! - Temp files live next to the canonical file and are never read back.

use super::{validate_loaded, RecordStore, StoreError, StoreResult};
use crate::config::DATA_FILE_NAME;
use crate::model::collection::Collection;
use crate::model::school::School;
use log::{error, info, warn};
use serde::Serialize;
use serde_json::ser::PrettyFormatter;
use std::fs::{self, File, OpenOptions};
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use std::time::Instant;
use uuid::Uuid;

/// File-backed store rooted at one canonical JSON path.
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Store at `<data_dir>/schools.json`.
    pub fn in_dir(data_dir: impl AsRef<Path>) -> Self {
        Self::new(data_dir.as_ref().join(DATA_FILE_NAME))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Creates the data directory and an empty collection file when absent.
    pub fn ensure_initialized(&self) -> StoreResult<()> {
        if self.path.exists() {
            return Ok(());
        }
        info!("event=store_init module=store status=start");
        self.save(&[])
    }

    /// Writes `records` to a fresh temp file without touching the canonical
    /// file. Call [`StagedWrite::commit`] to publish it.
    pub fn stage(&self, records: &[School]) -> StoreResult<StagedWrite> {
        let bytes = encode(records)?;
        let dir = self.parent_dir();
        fs::create_dir_all(&dir).map_err(|source| StoreError::Io {
            path: dir.clone(),
            source,
        })?;

        let staged = StagedWrite {
            temp_path: dir.join(self.temp_file_name()),
            target: self.path.clone(),
            committed: false,
        };
        write_synced(&staged.temp_path, &bytes).map_err(|source| StoreError::Io {
            path: staged.temp_path.clone(),
            source,
        })?;
        Ok(staged)
    }

    fn parent_dir(&self) -> PathBuf {
        self.path
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_default()
    }

    fn temp_file_name(&self) -> String {
        let base = self
            .path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| DATA_FILE_NAME.to_string());
        format!(".{base}.{}.tmp", Uuid::new_v4().simple())
    }
}

impl RecordStore for JsonFileStore {
    fn load(&self) -> StoreResult<Collection> {
        let started_at = Instant::now();
        let bytes = match fs::read(&self.path) {
            Ok(bytes) => bytes,
            Err(err) if err.kind() == ErrorKind::NotFound => {
                info!("event=store_load module=store status=ok records=0 source=absent");
                return Ok(Collection::new());
            }
            Err(source) => {
                error!(
                    "event=store_load module=store status=error error_code=read_failed error={}",
                    source
                );
                return Err(StoreError::Io {
                    path: self.path.clone(),
                    source,
                });
            }
        };

        let records = serde_json::from_slice::<Vec<School>>(&bytes)
            .map_err(|err| err.to_string())
            .and_then(|records| validate_loaded(&records).map(|()| records))
            .map_err(|message| {
                error!(
                    "event=store_load module=store status=error error_code=corrupt_state error={}",
                    message
                );
                StoreError::CorruptState {
                    path: self.path.clone(),
                    message,
                }
            })?;

        info!(
            "event=store_load module=store status=ok records={} duration_ms={}",
            records.len(),
            started_at.elapsed().as_millis()
        );
        Ok(Collection::from_records(records))
    }

    fn save(&self, records: &[School]) -> StoreResult<()> {
        let started_at = Instant::now();
        let result = self.stage(records).and_then(StagedWrite::commit);
        match &result {
            Ok(()) => info!(
                "event=store_save module=store status=ok records={} duration_ms={}",
                records.len(),
                started_at.elapsed().as_millis()
            ),
            Err(err) => error!(
                "event=store_save module=store status=error records={} duration_ms={} error={}",
                records.len(),
                started_at.elapsed().as_millis(),
                err
            ),
        }
        result
    }
}

/// A fully written temp file waiting to replace the canonical file.
///
/// Dropping it without `commit` removes the temp file and leaves the
/// canonical file untouched.
#[derive(Debug)]
pub struct StagedWrite {
    temp_path: PathBuf,
    target: PathBuf,
    committed: bool,
}

impl StagedWrite {
    pub fn temp_path(&self) -> &Path {
        &self.temp_path
    }

    /// Publishes the staged bytes with a single rename.
    pub fn commit(mut self) -> StoreResult<()> {
        fs::rename(&self.temp_path, &self.target).map_err(|source| StoreError::Io {
            path: self.target.clone(),
            source,
        })?;
        self.committed = true;
        Ok(())
    }
}

impl Drop for StagedWrite {
    fn drop(&mut self) {
        if self.committed {
            return;
        }
        if let Err(err) = fs::remove_file(&self.temp_path) {
            if err.kind() != ErrorKind::NotFound {
                warn!(
                    "event=store_temp_cleanup module=store status=error error={}",
                    err
                );
            }
        }
    }
}

fn encode(records: &[School]) -> StoreResult<Vec<u8>> {
    let mut bytes = Vec::new();
    let mut serializer =
        serde_json::Serializer::with_formatter(&mut bytes, PrettyFormatter::with_indent(b"    "));
    records.serialize(&mut serializer)?;
    bytes.push(b'\n');
    Ok(bytes)
}

fn write_synced(path: &Path, bytes: &[u8]) -> std::io::Result<()> {
    let mut file: File = OpenOptions::new().write(true).create_new(true).open(path)?;
    file.write_all(bytes)?;
    file.sync_all()
}
