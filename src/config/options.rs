// src/config/options.rs
use std::path::PathBuf;
use std::str::FromStr;

use super::consts::*;
use crate::error::{Error, Result};

/// Tie-break for sessions sharing a timestamp in digests.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum DigestSort {
    /// Timestamp only; equal timestamps keep store order.
    Chronological,
    /// Timestamp, then most free seats first, then title.
    #[default]
    FreeSeatsThenTitle,
}

impl FromStr for DigestSort {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "chronological" | "time" => Ok(DigestSort::Chronological),
            "seats" | "free-seats" => Ok(DigestSort::FreeSeatsThenTitle),
            other => Err(Error::Config(format!("unknown digest sort: {other}"))),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FetchOptions {
    pub workers: usize,
    pub pause_ms: u64,
    pub jitter_ms: u64,
}

impl Default for FetchOptions {
    fn default() -> Self {
        Self {
            workers: WORKERS,
            pause_ms: REQUEST_PAUSE_MS,
            jitter_ms: JITTER_MS,
        }
    }
}

#[derive(Clone, Debug)]
pub struct Config {
    pub debug: bool,
    pub site_root: String,
    /// Absent token means notifications only go to the log.
    pub bot_token: Option<String>,
    /// `chat[,thread]` destinations for per-session notifications.
    pub notification_chats: Vec<String>,
    pub store_path: PathBuf,
    pub fetch: FetchOptions,
    pub digest_sort: DigestSort,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            debug: false,
            site_root: s!(SITE_ROOT),
            bot_token: None,
            notification_chats: Vec::new(),
            store_path: PathBuf::from(STORE_DIR).join(STORE_FILE),
            fetch: FetchOptions::default(),
            digest_sort: DigestSort::default(),
        }
    }
}

impl Config {
    /// Read `.env` (if any) and the process environment.
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());
        let mut cfg = Config::default();

        if let Some(v) = get("BOT_DEBUG") {
            cfg.debug = v.eq_ignore_ascii_case("true") || v == "1";
        }
        cfg.bot_token = get("BOT_TELEGRAM_TOKEN");
        if let Some(v) = get("BOT_NOTIFICATION_CHAT_ID") {
            cfg.notification_chats = split_destinations(&v);
        }
        if let Some(v) = get("BOT_STORE_PATH") {
            cfg.store_path = PathBuf::from(v);
        }
        if let Some(v) = get("BOT_SITE_ROOT") {
            cfg.site_root = v.trim_end_matches('/').to_string();
        }
        if let Some(v) = get("BOT_FETCH_WORKERS") {
            let n: usize = v
                .parse()
                .map_err(|_| Error::Config(format!("BOT_FETCH_WORKERS is not a number: {v}")))?;
            if n == 0 {
                return Err(Error::Config(s!("BOT_FETCH_WORKERS must be at least 1")));
            }
            cfg.fetch.workers = n;
        }
        if let Some(v) = get("BOT_DIGEST_SORT") {
            cfg.digest_sort = v.parse()?;
        }

        Ok(cfg)
    }
}

/// `chat_1,thread_1;chat_2` → `["chat_1,thread_1", "chat_2"]`
pub fn split_destinations(s: &str) -> Vec<String> {
    s.split(';')
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .map(String::from)
        .collect()
}
