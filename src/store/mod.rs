// src/store/mod.rs
//! Persisted session state, keyed by external id.

mod file;
mod memory;

pub use file::FileStore;
pub use memory::MemoryStore;

use chrono::{DateTime, FixedOffset};

use crate::error::Result;
use crate::model::GameRecord;

pub trait GameStore {
    fn find_by_external_id(&self, external_id: &str) -> Result<Option<GameRecord>>;

    /// Insert or overwrite by `external_id`. Records are never removed.
    fn upsert_by_external_id(&mut self, record: GameRecord) -> Result<()>;

    /// Stored-joinable sessions starting after `now`, earliest first.
    fn query_joinable_future(&self, now: DateTime<FixedOffset>) -> Result<Vec<GameRecord>>;

    /// Like [`GameStore::query_joinable_future`], minus those already announced.
    fn query_unnotified_joinable_future(&self, now: DateTime<FixedOffset>) -> Result<Vec<GameRecord>> {
        Ok(self
            .query_joinable_future(now)?
            .into_iter()
            .filter(|r| !r.notification_sent)
            .collect())
    }

    fn mark_notified(&mut self, external_ids: &[String]) -> Result<()>;

    /// Make pending writes durable.
    fn flush(&mut self) -> Result<()> {
        Ok(())
    }
}

/// Shared filter + order used by the concrete stores.
pub(crate) fn joinable_future<'a, I>(records: I, now: DateTime<FixedOffset>) -> Vec<GameRecord>
where
    I: Iterator<Item = &'a GameRecord>,
{
    let mut out: Vec<GameRecord> = records
        .filter(|r| r.joinable() && r.is_future(now))
        .cloned()
        .collect();
    out.sort_by_key(|r| r.scheduled_at);
    out
}
