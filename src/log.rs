// src/log.rs
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

const DEFAULT_FILTER: &str = "rolecon_scrape=info";
const DEBUG_FILTER: &str = "rolecon_scrape=debug";

/// Install the global subscriber. `RUST_LOG` wins over the `debug` switch.
/// Safe to call twice; the second call is a no-op.
pub fn init(debug: bool) {
    let fallback = if debug { DEBUG_FILTER } else { DEFAULT_FILTER };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(fallback));

    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_target(false))
        .try_init();
}
