// src/error.rs
use std::path::PathBuf;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("request to {url} failed: {source}")]
    Http {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("{url} answered with HTTP {status}")]
    Status { url: String, status: u16 },

    #[error("invalid URL {url}: {source}")]
    Url {
        url: String,
        #[source]
        source: url::ParseError,
    },

    #[error("csrf token 'csrf-token' not found in the root page")]
    CsrfToken,

    #[error("csrf cookie '_csrf' not found in the root page cookies")]
    CsrfCookie,

    #[error("calendar {url} returned no events")]
    EmptyCalendar { url: String },

    #[error("malformed JSON from {url}: {source}")]
    Json {
        url: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("{url} did not return an HTML document")]
    NotHtml { url: String },

    #[error("{failed} of {total} pages failed to load, first failure: {first}")]
    Incomplete {
        failed: usize,
        total: usize,
        first: Box<Error>,
    },

    #[error("store {}: {source}", path.display())]
    Store {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("store {} is corrupt: {source}", path.display())]
    StoreFormat {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("delivery to {destination} failed: {reason}")]
    Dispatch { destination: String, reason: String },

    #[error("configuration: {0}")]
    Config(String),
}

impl Error {
    pub(crate) fn http(url: &str, source: reqwest::Error) -> Self {
        Error::Http { url: s!(url), source }
    }
}
