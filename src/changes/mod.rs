// src/changes/mod.rs
//! Diff a fresh scrape against stored state and fire observers.

use std::collections::{HashMap, HashSet};

use chrono::{DateTime, FixedOffset};
use tracing::{debug, info};

use crate::error::Result;
use crate::model::{GameRecord, Transition};
use crate::notify::Observer;
use crate::store::GameStore;

/// What one reconcile pass did.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ReconcileSummary {
    pub inserted: usize,
    pub updated: usize,
    /// `(external_id, transition)` in firing order.
    pub transitions: Vec<(String, Transition)>,
}

impl ReconcileSummary {
    pub fn count(&self, t: Transition) -> usize {
        self.transitions.iter().filter(|(_, x)| *x == t).count()
    }
}

/// Transition for a record present in this run. Cancellation is decided
/// by absence, never here.
pub fn classify(stored: Option<&GameRecord>, fresh: &GameRecord) -> Option<Transition> {
    if !fresh.joinable() {
        return None;
    }
    match stored {
        None => Some(Transition::New),
        Some(prev) if prev.seats_free == 0 || !prev.joinable() => Some(Transition::BecameJoinable),
        Some(_) => None,
    }
}

/// Collapse repeated ids, keeping first-seen order. A copy with a date
/// replaces one without.
pub fn dedupe(records: Vec<GameRecord>) -> Vec<GameRecord> {
    let mut out: Vec<GameRecord> = Vec::with_capacity(records.len());
    let mut pos: HashMap<String, usize> = HashMap::new();
    for r in records {
        match pos.get(&r.external_id) {
            Some(&i) => {
                if out[i].scheduled_at.is_none() && r.scheduled_at.is_some() {
                    out[i] = r;
                } else {
                    debug!(game_id = %r.external_id, "duplicate record dropped");
                }
            }
            None => {
                pos.insert(r.external_id.clone(), out.len());
                out.push(r);
            }
        }
    }
    out
}

/// Holds the observers registered for one run.
#[derive(Default)]
pub struct Reconciler {
    observers: Vec<Box<dyn Observer>>,
}

impl Reconciler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, observer: Box<dyn Observer>) {
        self.observers.push(observer);
    }

    pub fn with(mut self, observer: Box<dyn Observer>) -> Self {
        self.register(observer);
        self
    }

    /// Persist `fresh`, cancel stored sessions that disappeared, flush the
    /// store and then notify. Nothing is announced if persisting fails.
    pub fn reconcile(
        &self,
        store: &mut dyn GameStore,
        fresh: Vec<GameRecord>,
        now: DateTime<FixedOffset>,
    ) -> Result<ReconcileSummary> {
        let mut summary = ReconcileSummary::default();
        let mut fired: Vec<(GameRecord, Transition)> = Vec::new();
        let mut present: HashSet<String> = HashSet::new();

        for mut rec in dedupe(fresh) {
            let stored = store.find_by_external_id(&rec.external_id)?;
            match &stored {
                Some(prev) => {
                    rec.notification_sent = prev.notification_sent;
                    summary.updated += 1;
                }
                None => summary.inserted += 1,
            }
            rec.refresh_joinable(now);
            let transition = classify(stored.as_ref(), &rec);

            present.insert(rec.external_id.clone());
            store.upsert_by_external_id(rec.clone())?;
            if let Some(t) = transition {
                fired.push((rec, t));
            }
        }

        // read only after every fresh record is written
        for prev in store.query_joinable_future(now)? {
            if present.contains(&prev.external_id) {
                continue;
            }
            let bookable = prev.joinable() && prev.seats_total > 0;
            let mut gone = prev;
            gone.mark_cancelled(now);
            store.upsert_by_external_id(gone.clone())?;
            if bookable {
                fired.push((gone, Transition::Cancelled));
            }
        }

        store.flush()?;

        for (rec, t) in &fired {
            info!(game_id = %rec.external_id, title = %rec.title, transition = %t, "transition");
            for obs in &self.observers {
                obs.notify(rec, *t);
            }
            summary.transitions.push((rec.external_id.clone(), *t));
        }

        info!(
            inserted = summary.inserted,
            updated = summary.updated,
            new = summary.count(Transition::New),
            became_joinable = summary.count(Transition::BecameJoinable),
            cancelled = summary.count(Transition::Cancelled),
            "reconciled"
        );
        Ok(summary)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::time::msk;
    use chrono::TimeZone;

    fn now() -> DateTime<FixedOffset> {
        msk().with_ymd_and_hms(2025, 4, 10, 12, 0, 0).unwrap()
    }

    fn game(id: &str, total: u32, free: u32) -> GameRecord {
        let mut r = GameRecord::new(id, "https://rolecon.ru/game/1");
        r.scheduled_at = Some(msk().with_ymd_and_hms(2025, 4, 19, 10, 0, 0).unwrap());
        r.seats_total = total;
        r.seats_free = free;
        r.refresh_joinable(now());
        r
    }

    #[test]
    fn classify_table() {
        let open = game("a", 6, 3);
        let full = game("a", 6, 0);
        assert_eq!(classify(None, &open), Some(Transition::New));
        assert_eq!(classify(None, &full), None);
        assert_eq!(classify(Some(&full), &open), Some(Transition::BecameJoinable));
        assert_eq!(classify(Some(&open), &open), None);
        assert_eq!(classify(Some(&open), &full), None);

        let mut stale = game("a", 6, 2);
        stale.scheduled_at = None;
        stale.refresh_joinable(now());
        assert_eq!(classify(Some(&stale), &open), Some(Transition::BecameJoinable));
    }

    #[test]
    fn dedupe_prefers_dated_copy() {
        let mut undated = game("a", 6, 3);
        undated.scheduled_at = None;
        undated.title = s!("summary copy");
        let mut dated = game("a", 6, 3);
        dated.title = s!("own page");
        let other = game("b", 4, 1);

        let out = dedupe(vec![undated, other, dated]);
        assert_eq!(out.len(), 2);
        assert_eq!(out[0].external_id, "a");
        assert_eq!(out[0].title, "own page");
        assert_eq!(out[1].external_id, "b");
    }
}
