// src/notify/observers.rs
use std::sync::Arc;

use tracing::{error, info};

use super::{MessageDispatcher, Observer, format::transition_message};
use crate::model::{GameRecord, Transition};

/// Announces one kind of transition to a fixed set of destinations.
/// Delivery failures are logged and never abort the run.
pub struct TransitionObserver {
    kind: Transition,
    dispatcher: Arc<dyn MessageDispatcher>,
    destinations: Vec<String>,
}

impl TransitionObserver {
    pub fn new(kind: Transition, dispatcher: Arc<dyn MessageDispatcher>, destinations: Vec<String>) -> Self {
        Self { kind, dispatcher, destinations }
    }

    pub fn new_games(dispatcher: Arc<dyn MessageDispatcher>, destinations: Vec<String>) -> Self {
        Self::new(Transition::New, dispatcher, destinations)
    }

    pub fn freed_seats(dispatcher: Arc<dyn MessageDispatcher>, destinations: Vec<String>) -> Self {
        Self::new(Transition::BecameJoinable, dispatcher, destinations)
    }

    pub fn cancellations(dispatcher: Arc<dyn MessageDispatcher>, destinations: Vec<String>) -> Self {
        Self::new(Transition::Cancelled, dispatcher, destinations)
    }

    /// One observer per transition kind, all sharing `dispatcher`.
    pub fn all(dispatcher: Arc<dyn MessageDispatcher>, destinations: &[String]) -> Vec<Box<dyn Observer>> {
        [Transition::New, Transition::BecameJoinable, Transition::Cancelled]
            .into_iter()
            .map(|t| Box::new(Self::new(t, Arc::clone(&dispatcher), destinations.to_vec())) as Box<dyn Observer>)
            .collect()
    }
}

impl Observer for TransitionObserver {
    fn notify(&self, record: &GameRecord, transition: Transition) {
        if transition != self.kind {
            return;
        }
        info!(game_id = %record.external_id, %transition, "transition event fired");
        let text = transition_message(record, transition);
        for dest in &self.destinations {
            if let Err(e) = self.dispatcher.send(dest, &text) {
                error!(game_id = %record.external_id, destination = %dest, error = %e, "notification failed");
            }
        }
    }
}
