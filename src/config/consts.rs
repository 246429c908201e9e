// src/config/consts.rs

// Site
pub const SITE_ROOT: &str = "https://rolecon.ru";
pub const CALENDAR_PATH: &str = "/event/json-calendar";
pub const CSRF_COOKIE: &str = "_csrf";
pub const USER_AGENT: &str = concat!("rolecon_scrape/", env!("CARGO_PKG_VERSION"));

// Net
pub const CONNECT_TIMEOUT_SECS: u64 = 10;
pub const REQUEST_TIMEOUT_SECS: u64 = 15;
pub const TCP_KEEPALIVE_SECS: u64 = 30;
pub const POOL_IDLE_TIMEOUT_SECS: u64 = 90;
pub const POOL_MAX_IDLE_PER_HOST: usize = 10;

// Calendar
pub const HORIZON_DAYS: i64 = 14;

// Concurrency
pub const WORKERS: usize = 5;
pub const REQUEST_PAUSE_MS: u64 = 75; // be polite
pub const JITTER_MS: u64 = 50; // extra 0..50 ms

// Local store
pub const STORE_DIR: &str = ".store";
pub const STORE_FILE: &str = "games.json";

// Delivery
pub const MESSAGE_LIMIT: usize = 4000;
pub const TELEGRAM_API: &str = "https://api.telegram.org";
