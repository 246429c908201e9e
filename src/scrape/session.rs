// src/scrape/session.rs
use std::sync::LazyLock;

use regex::Regex;
use reqwest::blocking::Client;
use tracing::debug;
use url::Url;

use super::{Page, PageLoader};
use crate::config::consts::CSRF_COOKIE;
use crate::core::net::{build_client, read_body, send_ok};
use crate::error::{Error, Result};

static CSRF_META: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"<meta name="csrf-token" content="([\w\-=]+)">"#).expect("valid regex")
});

/// Anti-forgery pair the calendar endpoint insists on.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Csrf {
    pub token: String,
    pub cookie: String,
}

#[derive(Clone, Debug, Default)]
pub struct RootPage {
    pub html: String,
    /// `(name, value)` pairs from `Set-Cookie`.
    pub cookies: Vec<(String, String)>,
}

impl RootPage {
    pub fn csrf(&self) -> Result<Csrf> {
        Ok(Csrf {
            token: extract_csrf_token(&self.html)?,
            cookie: extract_csrf_cookie(&self.cookies)?,
        })
    }
}

pub fn extract_csrf_token(html: &str) -> Result<String> {
    CSRF_META
        .captures(html)
        .and_then(|c| c.get(1))
        .map(|m| s!(m.as_str()))
        .ok_or(Error::CsrfToken)
}

pub fn extract_csrf_cookie(cookies: &[(String, String)]) -> Result<String> {
    cookies
        .iter()
        .find(|(name, _)| name == CSRF_COOKIE)
        .map(|(_, value)| value.clone())
        .ok_or(Error::CsrfCookie)
}

/// Shared HTTP session against one site root. Cheap to clone.
#[derive(Clone, Debug)]
pub struct SessionClient {
    client: Client,
    root: Url,
}

impl SessionClient {
    pub fn new(site_root: &str) -> Result<Self> {
        Self::with_client(build_client()?, site_root)
    }

    pub fn with_client(client: Client, site_root: &str) -> Result<Self> {
        let root = Url::parse(site_root)
            .map_err(|source| Error::Url { url: s!(site_root), source })?;
        Ok(Self { client, root })
    }

    pub fn root(&self) -> &Url {
        &self.root
    }

    pub fn load_root_page(&self) -> Result<RootPage> {
        let url = self.root.as_str();
        debug!(url, "requesting root page");
        let resp = send_ok(url, self.client.get(url))?;
        let cookies = resp
            .cookies()
            .map(|c| (s!(c.name()), s!(c.value())))
            .collect::<Vec<_>>();
        let html = read_body(url, resp)?;
        debug!(size = html.len(), cookies = cookies.len(), "root page loaded");
        Ok(RootPage { html, cookies })
    }

    /// AJAX-style GET carrying the anti-forgery pair.
    pub fn get_with_csrf(&self, url: &str, csrf: &Csrf) -> Result<String> {
        let req = self
            .client
            .get(url)
            .header(reqwest::header::COOKIE, format!("{CSRF_COOKIE}={}", csrf.cookie))
            .header("x-csrf-token", &csrf.token)
            .header("x-requested-with", "XMLHttpRequest");
        let resp = send_ok(url, req)?;
        read_body(url, resp)
    }
}

impl PageLoader for SessionClient {
    fn load_page(&self, url: &str) -> Result<Page> {
        let resp = send_ok(url, self.client.get(url))?;
        let html = read_body(url, resp)?;
        if !looks_like_html(&html) {
            return Err(Error::NotHtml { url: s!(url) });
        }
        Ok(Page { url: s!(url), html })
    }
}

/// The HTML parser accepts anything, so reject bodies with no markup at all.
pub(crate) fn looks_like_html(body: &str) -> bool {
    !body.trim().is_empty() && body.contains('<')
}
