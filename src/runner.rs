// src/runner.rs
use std::sync::Arc;

use chrono::{DateTime, FixedOffset};
use tracing::info;

use crate::{
    changes::{ReconcileSummary, Reconciler},
    config::{Config, DigestSort},
    config::consts::MESSAGE_LIMIT,
    engine::Extractor,
    error::{Error, Result},
    notify::{LogDispatcher, MessageDispatcher, TelegramDispatcher, TransitionObserver, deliver, digest},
    progress::Progress,
    scrape::{FetchResult, Fetcher, SessionClient},
    store::GameStore,
};

/// Telegram when a token is configured, the log otherwise.
pub fn dispatcher(cfg: &Config, dry_run: bool) -> Result<Arc<dyn MessageDispatcher>> {
    match (&cfg.bot_token, dry_run) {
        (Some(token), false) => Ok(Arc::new(TelegramDispatcher::new(token.clone())?)),
        _ => {
            info!("no bot token or dry run, messages go to the log");
            Ok(Arc::new(LogDispatcher))
        }
    }
}

/// Where messages go. The log dispatcher writes to a single `log` target
/// when no chats are configured; real delivery needs at least one chat.
pub fn destinations(cfg: &Config, dispatcher: &dyn MessageDispatcher) -> Result<Vec<String>> {
    match (cfg.notification_chats.is_empty(), dispatcher.is_live()) {
        (false, _) => Ok(cfg.notification_chats.clone()),
        (true, false) => Ok(vec![s!("log")]),
        (true, true) => Err(Error::Config(s!("BOT_NOTIFICATION_CHAT_ID is not set"))),
    }
}

/// Observers for this run, one per transition kind.
pub fn reconciler(dispatcher: Arc<dyn MessageDispatcher>, destinations: &[String]) -> Reconciler {
    let mut r = Reconciler::new();
    for obs in TransitionObserver::all(dispatcher, destinations) {
        r.register(obs);
    }
    r
}

/// Extraction and change detection over an already fetched batch.
pub fn reconcile_fetched(
    fetched: &FetchResult,
    extractor: &Extractor,
    reconciler: &Reconciler,
    store: &mut dyn GameStore,
    now: DateTime<FixedOffset>,
) -> Result<ReconcileSummary> {
    let records = extractor.extract_all(fetched, now)?;
    info!(records = records.len(), pages = fetched.pages.len(), "pages extracted");
    reconciler.reconcile(store, records, now)
}

/// One full pipeline run. Any fetch failure aborts before the store is touched.
pub fn fetch_and_reconcile(
    cfg: &Config,
    store: &mut dyn GameStore,
    dispatcher: Arc<dyn MessageDispatcher>,
    now: DateTime<FixedOffset>,
    progress: &mut dyn Progress,
) -> Result<ReconcileSummary> {
    let destinations = destinations(cfg, dispatcher.as_ref())?;
    let client = SessionClient::new(&cfg.site_root)?;
    let extractor = Extractor::new(client.root().clone());
    let fetched = Fetcher::new(client, cfg.fetch.clone()).fetch(now, progress)?;
    let reconciler = reconciler(dispatcher, &destinations);
    reconcile_fetched(&fetched, &extractor, &reconciler, store, now)
}

/// Every joinable future session. Returns how many were listed.
pub fn report_full(
    store: &dyn GameStore,
    dispatcher: &dyn MessageDispatcher,
    destinations: &[String],
    sort: DigestSort,
    now: DateTime<FixedOffset>,
) -> Result<usize> {
    require_destinations(destinations)?;
    let mut games = store.query_joinable_future(now)?;
    if games.is_empty() {
        info!("no joinable games found");
        return Ok(0);
    }
    digest::sort_games(&mut games, sort);
    let parts = digest::render(digest::FULL_HEADER, &games, MESSAGE_LIMIT);
    deliver(dispatcher, destinations, &parts)?;
    info!(games = games.len(), parts = parts.len(), "full report sent");
    Ok(games.len())
}

/// Joinable future sessions not yet announced; marked once every
/// destination got them.
pub fn report_delta(
    store: &mut dyn GameStore,
    dispatcher: &dyn MessageDispatcher,
    destinations: &[String],
    sort: DigestSort,
    now: DateTime<FixedOffset>,
) -> Result<usize> {
    require_destinations(destinations)?;
    let mut games = store.query_unnotified_joinable_future(now)?;
    if games.is_empty() {
        info!("no unnotified joinable games found");
        return Ok(0);
    }
    digest::sort_games(&mut games, sort);
    let parts = digest::render(digest::DELTA_HEADER, &games, MESSAGE_LIMIT);
    deliver(dispatcher, destinations, &parts)?;

    if !dispatcher.is_live() {
        info!(games = games.len(), "dry run, games stay pending");
        return Ok(games.len());
    }
    let ids: Vec<String> = games.iter().map(|g| g.external_id.clone()).collect();
    store.mark_notified(&ids)?;
    store.flush()?;
    info!(games = ids.len(), parts = parts.len(), "delta report sent");
    Ok(ids.len())
}

fn require_destinations(destinations: &[String]) -> Result<()> {
    if destinations.is_empty() {
        return Err(Error::Config(s!("no notification destinations")));
    }
    Ok(())
}
