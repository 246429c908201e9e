// src/engine/types.rs
use std::collections::HashMap;

use chrono::{DateTime, FixedOffset, NaiveDate};

/// Layout of a fetched page.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PageShape {
    /// Day headers with time-of-day tabs; many sessions keyed by slot.
    Summary,
    /// One session on its own page.
    Single,
}

impl PageShape {
    pub fn detect(has_day_headers: bool, blocks: usize) -> Self {
        if has_day_headers || blocks > 1 { PageShape::Summary } else { PageShape::Single }
    }
}

/// Slot id → start time, built from day headers and their tabs.
#[derive(Clone, Debug, Default)]
pub struct SlotTable {
    /// Date of the most recent day header; tabs attach to it.
    pub day: Option<NaiveDate>,
    pub starts: HashMap<u32, DateTime<FixedOffset>>,
}

impl SlotTable {
    pub fn get(&self, slot: u32) -> Option<DateTime<FixedOffset>> {
        if slot == 0 {
            return None;
        }
        self.starts.get(&slot).copied()
    }
}

/// Outcome of reading a `subcaption-h4` paragraph.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum InlineDate {
    Found(DateTime<FixedOffset>),
    /// Weekday and hours only; the date has to come from elsewhere.
    TimeOnly,
    NoMatch,
}
