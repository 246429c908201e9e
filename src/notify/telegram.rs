// src/notify/telegram.rs
use reqwest::blocking::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::MessageDispatcher;
use crate::config::consts::TELEGRAM_API;
use crate::core::net::build_client;
use crate::error::{Error, Result};

/// `chat` or `chat,thread`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Destination {
    pub chat: String,
    pub thread: Option<i64>,
}

impl Destination {
    pub fn parse(raw: &str) -> Result<Self> {
        let mut it = raw.split(',').map(str::trim);
        let chat = it.next().filter(|c| !c.is_empty())
            .ok_or_else(|| Error::Config(format!("empty chat in destination {raw:?}")))?;
        let thread = match it.next().filter(|t| !t.is_empty()) {
            Some(t) => Some(t.parse::<i64>()
                .map_err(|_| Error::Config(format!("bad thread id in destination {raw:?}")))?),
            None => None,
        };
        if it.next().is_some() {
            return Err(Error::Config(format!("too many parts in destination {raw:?}")));
        }
        Ok(Self { chat: s!(chat), thread: thread.filter(|t| *t != 0) })
    }
}

#[derive(Serialize)]
struct SendMessage<'a> {
    chat_id: serde_json::Value,
    #[serde(skip_serializing_if = "Option::is_none")]
    message_thread_id: Option<i64>,
    text: &'a str,
    parse_mode: &'static str,
    disable_web_page_preview: bool,
}

#[derive(Deserialize)]
struct Reply {
    ok: bool,
    #[serde(default)]
    description: Option<String>,
}

/// Bot API `sendMessage` in HTML mode.
#[derive(Clone)]
pub struct TelegramDispatcher {
    client: Client,
    api_base: String,
    token: String,
}

impl TelegramDispatcher {
    pub fn new(token: impl Into<String>) -> Result<Self> {
        Ok(Self::with_client(build_client()?, TELEGRAM_API, token))
    }

    pub fn with_client(client: Client, api_base: &str, token: impl Into<String>) -> Self {
        Self {
            client,
            api_base: api_base.trim_end_matches('/').to_string(),
            token: token.into(),
        }
    }
}

impl std::fmt::Debug for TelegramDispatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TelegramDispatcher").field("api_base", &self.api_base).finish_non_exhaustive()
    }
}

impl MessageDispatcher for TelegramDispatcher {
    fn send(&self, destination: &str, text: &str) -> Result<()> {
        let dest = Destination::parse(destination)?;
        let chat_id = match dest.chat.parse::<i64>() {
            Ok(id) => serde_json::Value::from(id),
            Err(_) => serde_json::Value::from(dest.chat.clone()),
        };
        let body = SendMessage {
            chat_id,
            message_thread_id: dest.thread,
            text,
            parse_mode: "HTML",
            disable_web_page_preview: true,
        };

        // the URL carries the token; keep it out of errors
        let url = format!("{}/bot{}/sendMessage", self.api_base, self.token);
        let fail = |reason: String| Error::Dispatch { destination: s!(destination), reason };

        let resp = self.client.post(&url).json(&body).send().map_err(|e| fail(e.without_url().to_string()))?;
        let status = resp.status();
        let raw = resp.text().map_err(|e| fail(e.without_url().to_string()))?;
        let reply: Option<Reply> = serde_json::from_str(&raw).ok();
        match reply {
            Some(Reply { ok: true, .. }) if status.is_success() => {
                debug!(destination, bytes = text.len(), "message sent");
                Ok(())
            }
            Some(Reply { description, .. }) => {
                Err(fail(description.unwrap_or_else(|| format!("HTTP {}", status.as_u16()))))
            }
            None => Err(fail(format!("HTTP {} with unreadable body", status.as_u16()))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn destinations() {
        assert_eq!(
            Destination::parse("-1001234,17").unwrap(),
            Destination { chat: s!("-1001234"), thread: Some(17) }
        );
        assert_eq!(Destination::parse(" 42 ").unwrap().thread, None);
        assert_eq!(Destination::parse("42,0").unwrap().thread, None);
        assert_eq!(Destination::parse("@channel,").unwrap().chat, "@channel");
        assert!(Destination::parse("").is_err());
        assert!(Destination::parse("42,abc").is_err());
        assert!(Destination::parse("1,2,3").is_err());
    }

    #[test]
    fn body_shape() {
        let body = SendMessage {
            chat_id: serde_json::Value::from(-100_i64),
            message_thread_id: None,
            text: "<b>hi</b>",
            parse_mode: "HTML",
            disable_web_page_preview: true,
        };
        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(json["chat_id"], -100);
        assert_eq!(json["parse_mode"], "HTML");
        assert_eq!(json["disable_web_page_preview"], true);
        assert!(json.get("message_thread_id").is_none());
    }
}
