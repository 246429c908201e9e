// src/core/sanitize.rs
use url::Url;

/// Collapse whitespace runs (newlines and tabs included) to single spaces.
pub fn normalize_ws(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Resolve a page link against the site root. Absolute links pass through.
pub fn absolutize(root: &Url, href: &str) -> String {
    let href = href.trim();
    match root.join(href) {
        Ok(u) => u.into(),
        Err(_) => s!(href),
    }
}
