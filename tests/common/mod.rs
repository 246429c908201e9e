// tests/common/mod.rs
#![allow(dead_code)]

use std::{
    collections::HashMap,
    io::{BufRead, BufReader, Read, Write},
    net::{TcpListener, TcpStream},
    sync::{Arc, Mutex},
    thread,
};

use chrono::{DateTime, FixedOffset, TimeZone};
use reqwest::blocking::Client;
use rolecon_scrape::core::time::msk;

pub const SUMMARY_PAGE: &str = include_str!("../fixtures/summary_page.html");
pub const SINGLE_PAGE: &str = include_str!("../fixtures/single_page.html");
pub const SINGLE_TIME_ONLY: &str = include_str!("../fixtures/single_time_only.html");

/// Jan 1st 2025, noon in Moscow. Every fixture session lies after it.
pub fn now() -> DateTime<FixedOffset> {
    msk().with_ymd_and_hms(2025, 1, 1, 12, 0, 0).unwrap()
}

/// Client that ignores proxy variables from the environment.
pub fn local_client() -> Client {
    Client::builder().no_proxy().build().unwrap()
}

#[derive(Clone, Debug)]
pub struct Reply {
    pub status: u16,
    pub headers: Vec<(String, String)>,
    pub body: String,
}

impl Reply {
    pub fn ok(body: impl Into<String>) -> Self {
        Self { status: 200, headers: Vec::new(), body: body.into() }
    }

    pub fn status(status: u16, body: impl Into<String>) -> Self {
        Self { status, headers: Vec::new(), body: body.into() }
    }

    pub fn header(mut self, name: &str, value: &str) -> Self {
        self.headers.push((name.to_string(), value.to_string()));
        self
    }
}

/// Minimal HTTP/1.1 server on a random local port. Routes match the
/// request path without its query string; unknown paths get a 404.
pub struct StubServer {
    pub base: String,
    requests: Arc<Mutex<Vec<String>>>,
}

impl StubServer {
    pub fn start(routes: Vec<(&str, Reply)>) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let base = format!("http://{}", listener.local_addr().unwrap());
        let routes: Arc<HashMap<String, Reply>> =
            Arc::new(routes.into_iter().map(|(p, r)| (p.to_string(), r)).collect());
        let requests = Arc::new(Mutex::new(Vec::new()));

        let log = Arc::clone(&requests);
        thread::spawn(move || {
            for stream in listener.incoming() {
                let Ok(stream) = stream else { continue };
                let routes = Arc::clone(&routes);
                let log = Arc::clone(&log);
                thread::spawn(move || handle(stream, &routes, &log));
            }
        });

        Self { base, requests }
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base, path)
    }

    /// Raw request heads and bodies, in arrival order.
    pub fn requests(&self) -> Vec<String> {
        self.requests.lock().unwrap().clone()
    }

    /// Requests whose path (before any query) equals `path`.
    pub fn requests_to(&self, path: &str) -> Vec<String> {
        self.requests()
            .into_iter()
            .filter(|raw| request_path(raw) == path)
            .collect()
    }
}

fn request_path(raw: &str) -> &str {
    let target = raw.split_whitespace().nth(1).unwrap_or("");
    target.split('?').next().unwrap_or(target)
}

fn handle(stream: TcpStream, routes: &HashMap<String, Reply>, log: &Mutex<Vec<String>>) {
    let mut reader = BufReader::new(stream.try_clone().unwrap());
    let mut head = String::new();
    let mut content_length = 0usize;
    loop {
        let mut line = String::new();
        if reader.read_line(&mut line).unwrap_or(0) == 0 {
            break;
        }
        if let Some((name, value)) = line.split_once(':') {
            if name.trim().eq_ignore_ascii_case("content-length") {
                content_length = value.trim().parse().unwrap_or(0);
            }
        }
        head.push_str(&line);
        if line == "\r\n" {
            break;
        }
    }
    let mut body = vec![0u8; content_length];
    if content_length > 0 {
        reader.read_exact(&mut body).ok();
    }
    let raw = format!("{head}{}", String::from_utf8_lossy(&body));

    let reply = routes
        .get(request_path(&raw))
        .cloned()
        .unwrap_or_else(|| Reply::status(404, "not found"));
    log.lock().unwrap().push(raw);

    let mut out = format!(
        "HTTP/1.1 {} Stub\r\nContent-Length: {}\r\nConnection: close\r\n",
        reply.status,
        reply.body.len()
    );
    for (name, value) in &reply.headers {
        out.push_str(&format!("{name}: {value}\r\n"));
    }
    out.push_str("\r\n");
    out.push_str(&reply.body);

    let mut stream = stream;
    stream.write_all(out.as_bytes()).ok();
    stream.flush().ok();
}

/// Header value by case-insensitive name from a raw request.
pub fn header<'a>(raw: &'a str, name: &str) -> Option<&'a str> {
    raw.lines().find_map(|line| {
        let (k, v) = line.split_once(':')?;
        k.trim().eq_ignore_ascii_case(name).then(|| v.trim())
    })
}
