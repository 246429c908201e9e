// src/core/net.rs
use std::time::Duration;

use reqwest::blocking::{Client, RequestBuilder, Response};

use crate::config::consts::*;
use crate::error::{Error, Result};

/// Pooled blocking client. Clones share one connection pool, so a single
/// instance serves every worker thread.
pub fn build_client() -> Result<Client> {
    Client::builder()
        .user_agent(USER_AGENT)
        .connect_timeout(Duration::from_secs(CONNECT_TIMEOUT_SECS))
        .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
        .tcp_keepalive(Duration::from_secs(TCP_KEEPALIVE_SECS))
        .pool_idle_timeout(Duration::from_secs(POOL_IDLE_TIMEOUT_SECS))
        .pool_max_idle_per_host(POOL_MAX_IDLE_PER_HOST)
        .build()
        .map_err(|e| Error::http("client setup", e))
}

/// Send a request; anything outside 2xx is an error carrying the URL.
pub fn send_ok(url: &str, req: RequestBuilder) -> Result<Response> {
    let resp = req.send().map_err(|e| Error::http(url, e))?;
    let status = resp.status();
    if !status.is_success() {
        return Err(Error::Status { url: s!(url), status: status.as_u16() });
    }
    Ok(resp)
}

pub fn read_body(url: &str, resp: Response) -> Result<String> {
    resp.text().map_err(|e| Error::http(url, e))
}
