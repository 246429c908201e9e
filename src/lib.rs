// src/lib.rs
//! Rolecon calendar watcher.
//!
//! Pipeline: [`scrape`] loads the calendar and fetches every session page,
//! [`engine`] turns pages into [`GameRecord`]s, [`changes`] diffs them
//! against the [`store`] and fires [`notify`] observers.

#[macro_use]
pub mod macros;

pub mod changes;
pub mod cli;
pub mod config;
pub mod core;
pub mod engine;
pub mod error;
pub mod log;
pub mod model;
pub mod notify;
pub mod progress;
pub mod runner;
pub mod scrape;
pub mod store;

pub use error::{Error, Result};
pub use model::{GameRecord, Transition};
