// src/scrape/calendar.rs
use std::collections::HashMap;

use chrono::{DateTime, FixedOffset, NaiveDate, TimeDelta};
use serde::Deserialize;
use tracing::debug;

use super::session::{Csrf, SessionClient};
use crate::config::consts::CALENDAR_PATH;
use crate::core::sanitize::absolutize;
use crate::error::{Error, Result};

/// One entry of the JSON calendar feed.
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
pub struct EventMetadata {
    #[serde(default)]
    pub id: i64,
    #[serde(default)]
    pub title: String,
    /// Site-relative page path.
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub start: String,
    #[serde(default)]
    pub end: String,
    #[serde(default, rename = "allDay")]
    pub all_day: bool,
    #[serde(default, rename = "className")]
    pub class_name: Vec<String>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DateWindow {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateWindow {
    pub fn ahead(now: DateTime<FixedOffset>, days: i64) -> Self {
        let start = now.date_naive();
        Self { start, end: start + TimeDelta::days(days) }
    }
}

/// Feed entries plus an absolute-URL lookup, with repeated URLs collapsed.
#[derive(Clone, Debug, Default)]
pub struct CalendarIndex {
    pub events: Vec<EventMetadata>,
    /// Absolute page URLs in feed order, no repeats.
    pub urls: Vec<String>,
    pub by_url: HashMap<String, EventMetadata>,
}

impl CalendarIndex {
    pub fn build(root: &url::Url, events: Vec<EventMetadata>) -> Self {
        let mut urls = Vec::with_capacity(events.len());
        let mut by_url = HashMap::with_capacity(events.len());
        for ev in &events {
            let full = absolutize(root, &ev.url);
            if by_url.contains_key(&full) {
                debug!(url = %full, id = ev.id, "calendar repeats a page, keeping the first entry");
                continue;
            }
            urls.push(full.clone());
            by_url.insert(full, ev.clone());
        }
        Self { events, urls, by_url }
    }

    pub fn get(&self, url: &str) -> Option<&EventMetadata> {
        self.by_url.get(url)
    }
}

pub fn calendar_url(root: &url::Url, window: DateWindow) -> String {
    let mut url = absolutize(root, CALENDAR_PATH);
    url.push_str(&format!(
        "?start={}&end={}",
        window.start.format("%Y-%m-%d"),
        window.end.format("%Y-%m-%d")
    ));
    url
}

/// Parse the feed body. An empty array is an error: the live site always
/// lists something, so nothing at all means a broken feed.
pub fn parse_feed(url: &str, body: &str) -> Result<Vec<EventMetadata>> {
    let events: Vec<EventMetadata> =
        serde_json::from_str(body).map_err(|source| Error::Json { url: s!(url), source })?;
    if events.is_empty() {
        return Err(Error::EmptyCalendar { url: s!(url) });
    }
    for ev in &events {
        debug!(id = ev.id, title = %ev.title, url = %ev.url, start = %ev.start, end = %ev.end, "calendar event");
    }
    Ok(events)
}

pub fn load_index(client: &SessionClient, csrf: &Csrf, window: DateWindow) -> Result<CalendarIndex> {
    let url = calendar_url(client.root(), window);
    debug!(url = %url, "requesting calendar");
    let body = client.get_with_csrf(&url, csrf)?;
    let events = parse_feed(&url, &body)?;
    Ok(CalendarIndex::build(client.root(), events))
}
