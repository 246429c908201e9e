// src/notify/mod.rs
//! Observers, message dispatch and digests.

pub mod digest;
pub mod format;
pub mod observers;
pub mod telegram;

pub use observers::TransitionObserver;
pub use telegram::{Destination, TelegramDispatcher};

use tracing::{debug, info};

use crate::error::Result;
use crate::model::{GameRecord, Transition};

/// Delivers pre-formatted text to a named destination.
pub trait MessageDispatcher: Send + Sync {
    fn send(&self, destination: &str, text: &str) -> Result<()>;

    /// False when messages never leave the process, so nothing may be
    /// recorded as announced.
    fn is_live(&self) -> bool {
        true
    }
}

/// Receives every transition; each implementation picks what it cares about.
pub trait Observer {
    fn notify(&self, record: &GameRecord, transition: Transition);
}

/// Writes messages to the log instead of sending them.
#[derive(Clone, Copy, Debug, Default)]
pub struct LogDispatcher;

impl MessageDispatcher for LogDispatcher {
    fn send(&self, destination: &str, text: &str) -> Result<()> {
        info!(destination, "message:\n{text}");
        Ok(())
    }

    fn is_live(&self) -> bool {
        false
    }
}

/// Every part to every destination, in order. Stops at the first failure.
pub fn deliver(dispatcher: &dyn MessageDispatcher, destinations: &[String], parts: &[String]) -> Result<()> {
    for dest in destinations {
        for part in parts {
            dispatcher.send(dest, part)?;
        }
        debug!(destination = %dest, parts_count = parts.len(), "notification sent");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use std::sync::Mutex;

    #[derive(Default)]
    struct Recorder {
        sent: Mutex<Vec<(String, String)>>,
        fail_on: Option<&'static str>,
    }

    impl MessageDispatcher for Recorder {
        fn send(&self, destination: &str, text: &str) -> Result<()> {
            if self.fail_on == Some(destination) {
                return Err(Error::Dispatch { destination: s!(destination), reason: s!("blocked") });
            }
            self.sent.lock().unwrap().push((s!(destination), s!(text)));
            Ok(())
        }
    }

    #[test]
    fn deliver_fans_out_in_order() {
        let rec = Recorder::default();
        deliver(&rec, &[s!("1"), s!("2,5")], &[s!("a"), s!("b")]).unwrap();
        let sent = rec.sent.lock().unwrap();
        let got: Vec<(&str, &str)> = sent.iter().map(|(d, t)| (d.as_str(), t.as_str())).collect();
        assert_eq!(got, vec![("1", "a"), ("1", "b"), ("2,5", "a"), ("2,5", "b")]);
    }

    #[test]
    fn deliver_stops_at_first_failure() {
        let rec = Recorder { fail_on: Some("2"), ..Default::default() };
        assert!(deliver(&rec, &[s!("1"), s!("2"), s!("3")], &[s!("a")]).is_err());
        assert_eq!(rec.sent.lock().unwrap().len(), 1);
    }

    #[test]
    fn observer_reacts_to_its_own_kind_only() {
        let rec = std::sync::Arc::new(Recorder::default());
        let obs = TransitionObserver::cancellations(rec.clone(), vec![s!("chat")]);
        let game = GameRecord::new("g1", "https://rolecon.ru/game/1");
        obs.notify(&game, Transition::New);
        obs.notify(&game, Transition::Cancelled);
        let sent = rec.sent.lock().unwrap();
        assert_eq!(sent.len(), 1);
        assert!(sent[0].1.starts_with("❌"));
    }
}
