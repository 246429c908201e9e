// src/scrape/mod.rs
pub mod calendar;
pub mod fetcher;
pub mod session;

use chrono::{DateTime, FixedOffset};
use tracing::{debug, info};

pub use calendar::{CalendarIndex, DateWindow, EventMetadata};
pub use fetcher::fetch_all;
pub use session::{Csrf, RootPage, SessionClient};

use crate::{
    config::{FetchOptions, consts::HORIZON_DAYS},
    error::Result,
    progress::Progress,
};

/// One fetched document.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Page {
    pub url: String,
    pub html: String,
}

/// Anything that can turn a URL into a page. Shared across worker threads.
pub trait PageLoader: Sync {
    fn load_page(&self, url: &str) -> Result<Page>;
}

/// Everything one run needs for extraction. Dropped after use.
#[derive(Debug, Default)]
pub struct FetchResult {
    pub pages: Vec<Page>,
    pub index: CalendarIndex,
}

/// Root page → CSRF pair → calendar → every session page.
pub struct Fetcher {
    client: SessionClient,
    options: FetchOptions,
}

impl Fetcher {
    pub fn new(client: SessionClient, options: FetchOptions) -> Self {
        Self { client, options }
    }

    pub fn fetch(&self, now: DateTime<FixedOffset>, progress: &mut dyn Progress) -> Result<FetchResult> {
        let root = self.client.load_root_page()?;
        let csrf = root.csrf()?;
        debug!(token = %csrf.token, "csrf pair found");

        let window = DateWindow::ahead(now, HORIZON_DAYS);
        let index = calendar::load_index(&self.client, &csrf, window)?;
        info!(events = index.events.len(), pages = index.urls.len(), "calendar loaded");

        progress.log("Fetching session pages…");
        let pages = fetch_all(&self.client, &index.urls, &self.options, progress)?;
        info!(pages = pages.len(), "session pages collected");

        Ok(FetchResult { pages, index })
    }
}
