// src/model.rs
use std::fmt;

use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};

/// One scheduled session, keyed by the site's own identifier.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameRecord {
    pub external_id: String,
    pub url: String,
    pub title: String,
    /// Moscow civil time. `None` when no resolver found a date.
    pub scheduled_at: Option<DateTime<FixedOffset>>,
    #[serde(default)]
    pub setting: String,
    #[serde(default)]
    pub system: String,
    #[serde(default)]
    pub genre: String,
    #[serde(default)]
    pub host_name: String,
    #[serde(default)]
    pub host_link: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub notes: String,
    pub seats_total: u32,
    pub seats_free: u32,
    /// Only ever written by [`GameRecord::refresh_joinable`].
    joinable: bool,
    #[serde(default)]
    pub notification_sent: bool,
    /// Time-of-day tab on summary pages; 0 means none.
    #[serde(skip)]
    pub slot: u32,
}

impl GameRecord {
    pub fn new(external_id: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            external_id: external_id.into(),
            url: url.into(),
            ..Self::default()
        }
    }

    pub fn joinable(&self) -> bool {
        self.joinable
    }

    pub fn is_future(&self, now: DateTime<FixedOffset>) -> bool {
        self.scheduled_at.is_some_and(|at| at > now)
    }

    /// Recompute the derived flag: future-dated with free seats out of a positive total.
    pub fn refresh_joinable(&mut self, now: DateTime<FixedOffset>) {
        self.joinable = self.is_future(now) && self.seats_total > 0 && self.seats_free > 0;
    }

    /// The session vanished from the site: no seats left to take.
    pub fn mark_cancelled(&mut self, now: DateTime<FixedOffset>) {
        self.seats_free = 0;
        self.refresh_joinable(now);
    }
}

/// Observer-visible change of a session between two runs.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Transition {
    New,
    BecameJoinable,
    Cancelled,
}

impl fmt::Display for Transition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Transition::New => "new",
            Transition::BecameJoinable => "became-joinable",
            Transition::Cancelled => "cancelled",
        })
    }
}
