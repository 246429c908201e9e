// src/store/memory.rs
use std::collections::BTreeMap;

use chrono::{DateTime, FixedOffset};

use super::{GameStore, joinable_future};
use crate::error::Result;
use crate::model::GameRecord;

#[derive(Clone, Debug, Default)]
pub struct MemoryStore {
    records: BTreeMap<String, GameRecord>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn records(&self) -> impl Iterator<Item = &GameRecord> {
        self.records.values()
    }
}

impl FromIterator<GameRecord> for MemoryStore {
    fn from_iter<T: IntoIterator<Item = GameRecord>>(iter: T) -> Self {
        Self {
            records: iter.into_iter().map(|r| (r.external_id.clone(), r)).collect(),
        }
    }
}

impl GameStore for MemoryStore {
    fn find_by_external_id(&self, external_id: &str) -> Result<Option<GameRecord>> {
        Ok(self.records.get(external_id).cloned())
    }

    fn upsert_by_external_id(&mut self, record: GameRecord) -> Result<()> {
        self.records.insert(record.external_id.clone(), record);
        Ok(())
    }

    fn query_joinable_future(&self, now: DateTime<FixedOffset>) -> Result<Vec<GameRecord>> {
        Ok(joinable_future(self.records.values(), now))
    }

    fn mark_notified(&mut self, external_ids: &[String]) -> Result<()> {
        for id in external_ids {
            if let Some(r) = self.records.get_mut(id) {
                r.notification_sent = true;
            }
        }
        Ok(())
    }
}
