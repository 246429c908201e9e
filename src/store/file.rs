// src/store/file.rs
use std::{
    fs,
    io,
    path::PathBuf,
};

use chrono::{DateTime, FixedOffset};
use tracing::debug;

use super::{GameStore, MemoryStore};
use crate::error::{Error, Result};
use crate::model::GameRecord;

/// JSON document on disk, held in memory between `open` and `flush`.
#[derive(Debug)]
pub struct FileStore {
    path: PathBuf,
    inner: MemoryStore,
    dirty: bool,
}

impl FileStore {
    /// Load `path`; a missing file is an empty store.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let inner = match fs::read_to_string(&path) {
            Ok(text) if text.trim().is_empty() => MemoryStore::new(),
            Ok(text) => {
                let records: Vec<GameRecord> = serde_json::from_str(&text)
                    .map_err(|source| Error::StoreFormat { path: path.clone(), source })?;
                records.into_iter().collect()
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => MemoryStore::new(),
            Err(source) => return Err(Error::Store { path, source }),
        };
        debug!(path = %path.display(), records = inner.len(), "store opened");
        Ok(Self { path, inner, dirty: false })
    }

    pub fn len(&self) -> usize {
        self.inner.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    fn write_atomic(&self, contents: &str) -> io::Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        let tmp = self.path.with_extension("json.tmp");
        fs::write(&tmp, contents)?;
        fs::rename(&tmp, &self.path)
    }
}

impl GameStore for FileStore {
    fn find_by_external_id(&self, external_id: &str) -> Result<Option<GameRecord>> {
        self.inner.find_by_external_id(external_id)
    }

    fn upsert_by_external_id(&mut self, record: GameRecord) -> Result<()> {
        self.dirty = true;
        self.inner.upsert_by_external_id(record)
    }

    fn query_joinable_future(&self, now: DateTime<FixedOffset>) -> Result<Vec<GameRecord>> {
        self.inner.query_joinable_future(now)
    }

    fn mark_notified(&mut self, external_ids: &[String]) -> Result<()> {
        self.dirty = true;
        self.inner.mark_notified(external_ids)
    }

    fn flush(&mut self) -> Result<()> {
        if !self.dirty {
            return Ok(());
        }
        let records: Vec<&GameRecord> = self.inner.records().collect();
        let json = serde_json::to_string_pretty(&records)
            .map_err(|source| Error::StoreFormat { path: self.path.clone(), source })?;
        self.write_atomic(&json)
            .map_err(|source| Error::Store { path: self.path.clone(), source })?;
        self.dirty = false;
        debug!(path = %self.path.display(), records = records.len(), "store flushed");
        Ok(())
    }
}
