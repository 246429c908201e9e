// src/engine/engine.rs
use std::collections::HashMap;

use chrono::{DateTime, FixedOffset};
use scraper::{ElementRef, Html};
use tracing::{debug, warn};
use url::Url;

use super::{
    dates::{apply_metadata_fallback, collect_slots, range_start, tab_range_starts},
    fields::{is_day_header, is_event_block, read_block},
    types::{PageShape, SlotTable},
};
use crate::core::html::{class_of, is_tag, subtree};
use crate::error::{Error, Result};
use crate::model::GameRecord;
use crate::scrape::{CalendarIndex, EventMetadata, FetchResult, Page, session::looks_like_html};

/// Turns fetched pages into session records.
#[derive(Clone, Debug)]
pub struct Extractor {
    root: Url,
}

impl Extractor {
    pub fn new(root: Url) -> Self {
        Self { root }
    }

    /// Every page of a run, in page order.
    pub fn extract_all(&self, fetched: &FetchResult, now: DateTime<FixedOffset>) -> Result<Vec<GameRecord>> {
        let mut out = Vec::new();
        for page in &fetched.pages {
            out.extend(self.extract(page, &fetched.index, now)?);
        }
        Ok(out)
    }

    pub fn extract(&self, page: &Page, index: &CalendarIndex, now: DateTime<FixedOffset>) -> Result<Vec<GameRecord>> {
        self.extract_with(page, index.get(&page.url), now)
    }

    /// Extract with an explicit calendar entry (or none) for the page.
    pub fn extract_with(
        &self,
        page: &Page,
        meta: Option<&EventMetadata>,
        now: DateTime<FixedOffset>,
    ) -> Result<Vec<GameRecord>> {
        if !looks_like_html(&page.html) {
            return Err(Error::NotHtml { url: page.url.clone() });
        }
        let doc = Html::parse_document(&page.html);

        let mut slots = SlotTable::default();
        let mut has_day_headers = false;
        let mut records = Vec::new();

        for el in subtree(doc.root_element()).filter(|e| is_tag(*e, "div")) {
            let class = class_of(el);
            if is_day_header(class) {
                has_day_headers = true;
                collect_slots(el, &mut slots);
            }
            if is_event_block(class) {
                records.push(read_block(el, &page.url, &self.root));
            }
        }

        // slot tabs outrank a block's own date paragraph
        for r in records.iter_mut() {
            if let Some(at) = slots.get(r.slot) {
                r.scheduled_at = Some(at);
            }
        }

        let shape = PageShape::detect(has_day_headers, records.len());
        if let Some(meta) = meta {
            if records.iter().any(|r| r.scheduled_at.is_none()) {
                let page_times = page_times(shape, &records, &doc, &page.html);
                apply_metadata_fallback(&mut records, meta, &page_times);
            }
        }

        for r in records.iter_mut() {
            r.refresh_joinable(now);
            if r.scheduled_at.is_none() {
                warn!(game_id = %r.external_id, title = %r.title, url = %page.url, "game has no date");
            }
        }

        debug!(page_url = %page.url, ?shape, games_count = records.len(), "page processed");
        Ok(records)
    }
}

/// Clock times the page itself states, keyed by slot.
fn page_times(shape: PageShape, records: &[GameRecord], doc: &Html, html: &str) -> HashMap<u32, (u32, u32)> {
    match shape {
        PageShape::Single => records
            .first()
            .zip(range_start(html))
            .map(|(r, hm)| HashMap::from([(r.slot, hm)]))
            .unwrap_or_default(),
        PageShape::Summary => {
            let tabs = subtree(doc.root_element()).filter(|e: &ElementRef<'_>| class_of(*e).contains("tab-caption"));
            tab_range_starts(tabs)
        }
    }
}
