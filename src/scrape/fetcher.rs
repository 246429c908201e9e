// src/scrape/fetcher.rs
use std::{
    sync::{atomic::{AtomicUsize, Ordering}, mpsc},
    thread,
    time::Duration,
};

use tracing::{debug, error};

use super::{Page, PageLoader};
use crate::{
    config::FetchOptions,
    error::{Error, Result},
    progress::Progress,
};

/// Load every URL on a bounded pool of workers.
///
/// Workers pull indices from a shared cursor and send each outcome to one
/// collector running on the calling thread, the only writer of the output.
/// All workers are joined before this returns. A single failure fails the
/// whole batch: callers never see a partial page set.
pub fn fetch_all<L>(
    loader: &L,
    urls: &[String],
    opts: &FetchOptions,
    progress: &mut dyn Progress,
) -> Result<Vec<Page>>
where
    L: PageLoader + ?Sized,
{
    progress.begin(urls.len());
    if urls.is_empty() {
        progress.finish();
        return Ok(Vec::new());
    }

    let workers = opts.workers.min(urls.len()).max(1);
    let cursor = AtomicUsize::new(0);
    let (res_tx, res_rx) = mpsc::channel::<(usize, Result<Page>)>();

    let (mut pages, failures) = thread::scope(|scope| {
        for _ in 0..workers {
            let tx = res_tx.clone();
            let cursor = &cursor;
            scope.spawn(move || {
                loop {
                    let i = cursor.fetch_add(1, Ordering::Relaxed);
                    if i >= urls.len() {
                        break;
                    }
                    let result = loader.load_page(&urls[i]);
                    if tx.send((i, result)).is_err() {
                        break;
                    }
                    polite_pause(opts, i);
                }
            });
        }
        drop(res_tx); // collector stops once every worker hung up

        let mut pages: Vec<(usize, Page)> = Vec::with_capacity(urls.len());
        let mut failures: Vec<Error> = Vec::new();
        for (i, result) in res_rx {
            match result {
                Ok(page) => {
                    debug!(url = %urls[i], size = page.html.len(), "page loaded");
                    progress.item_done(&urls[i]);
                    pages.push((i, page));
                }
                Err(e) => {
                    error!(url = %urls[i], error = %e, "page load failed");
                    progress.item_failed(&urls[i]);
                    failures.push(e);
                }
            }
        }
        (pages, failures)
    });

    progress.finish();

    let failed = failures.len();
    if let Some(first) = failures.into_iter().next() {
        return Err(Error::Incomplete {
            failed,
            total: urls.len(),
            first: Box::new(first),
        });
    }

    pages.sort_by_key(|(i, _)| *i);
    Ok(pages.into_iter().map(|(_, page)| page).collect())
}

fn polite_pause(opts: &FetchOptions, i: usize) {
    let jitter = if opts.jitter_ms > 0 { (i as u64 * 37) % opts.jitter_ms } else { 0 };
    let ms = opts.pause_ms + jitter;
    if ms > 0 {
        thread::sleep(Duration::from_millis(ms)); // be polite
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::progress::NullProgress;
    use std::sync::atomic::AtomicUsize;

    struct Echo {
        calls: AtomicUsize,
    }

    impl PageLoader for Echo {
        fn load_page(&self, url: &str) -> Result<Page> {
            self.calls.fetch_add(1, Ordering::Relaxed);
            Ok(Page { url: s!(url), html: format!("<p>{url}</p>") })
        }
    }

    fn quick(workers: usize) -> FetchOptions {
        FetchOptions { workers, pause_ms: 0, jitter_ms: 0 }
    }

    #[test]
    fn loads_each_url_once_in_input_order() {
        let urls: Vec<String> = (0..23).map(|i| format!("https://rolecon.ru/game/{i}")).collect();
        let echo = Echo { calls: AtomicUsize::new(0) };
        let pages = fetch_all(&echo, &urls, &quick(5), &mut NullProgress).unwrap();
        assert_eq!(echo.calls.load(Ordering::Relaxed), 23);
        let got: Vec<&str> = pages.iter().map(|p| p.url.as_str()).collect();
        assert_eq!(got, urls.iter().map(String::as_str).collect::<Vec<_>>());
    }

    #[test]
    fn empty_input_spawns_nothing() {
        let echo = Echo { calls: AtomicUsize::new(0) };
        let pages = fetch_all(&echo, &[], &quick(5), &mut NullProgress).unwrap();
        assert!(pages.is_empty());
        assert_eq!(echo.calls.load(Ordering::Relaxed), 0);
    }
}
