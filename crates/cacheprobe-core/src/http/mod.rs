//! Blocking HTTP client for the archive REST API.
//!
//! Uses the curl crate (libcurl) with basic-auth credentials and
//! connect/request timeouts, capturing status, headers and body. Transport
//! failures are never retried; a failed call surfaces as a failed check.
//! Runs in the current thread; call from `spawn_blocking` if used from async code.

mod parse;

pub use parse::ResponseHeaders;

use std::str;
use std::time::Duration;
use thiserror::Error;
use url::Url;

/// Conditional request header attached to a probe GET.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Conditional {
    IfNoneMatch(String),
    IfMatch(String),
    IfModifiedSince(String),
}

impl Conditional {
    /// Header name on the wire.
    pub fn name(&self) -> &'static str {
        match self {
            Conditional::IfNoneMatch(_) => "If-None-Match",
            Conditional::IfMatch(_) => "If-Match",
            Conditional::IfModifiedSince(_) => "If-Modified-Since",
        }
    }

    /// Header value on the wire.
    pub fn value(&self) -> &str {
        match self {
            Conditional::IfNoneMatch(v)
            | Conditional::IfMatch(v)
            | Conditional::IfModifiedSince(v) => v,
        }
    }
}

/// Transport-level failure: invalid base URL, refused connection, timeout.
#[derive(Debug, Error)]
pub enum TransportError {
    #[error("invalid base URL {url:?}: {source}")]
    BaseUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },
    #[error("{method} {url} failed: {source}")]
    Request {
        method: &'static str,
        url: String,
        #[source]
        source: curl::Error,
    },
}

/// Raw HTTP response: final status code, parsed headers, body bytes.
#[derive(Debug, Clone)]
pub struct HttpResponse {
    pub status: u32,
    pub headers: ResponseHeaders,
    pub body: Vec<u8>,
}

/// Blocking client bound to one archive base URL.
#[derive(Debug, Clone)]
pub struct HttpClient {
    base: Url,
    username: Option<String>,
    password: Option<String>,
    connect_timeout: Duration,
    timeout: Duration,
}

impl HttpClient {
    /// Create a client for `base`, e.g. `http://localhost:8042`.
    pub fn new(base: &str) -> Result<Self, TransportError> {
        let base = Url::parse(base).map_err(|source| TransportError::BaseUrl {
            url: base.to_string(),
            source,
        })?;
        Ok(Self {
            base,
            username: None,
            password: None,
            connect_timeout: Duration::from_secs(15),
            timeout: Duration::from_secs(30),
        })
    }

    /// Set basic-auth credentials for every request.
    pub fn with_credentials(mut self, username: &str, password: &str) -> Self {
        self.username = Some(username.to_string());
        self.password = Some(password.to_string());
        self
    }

    pub fn with_timeouts(mut self, connect: Duration, total: Duration) -> Self {
        self.connect_timeout = connect;
        self.timeout = total;
        self
    }

    /// Port of the base URL (scheme default when unspecified).
    pub fn port(&self) -> Option<u16> {
        self.base.port_or_known_default()
    }

    /// GET `path` (leading slash), optionally with one conditional header.
    pub fn get(
        &self,
        path: &str,
        conditional: Option<&Conditional>,
    ) -> Result<HttpResponse, TransportError> {
        self.perform("GET", path, conditional, None, None)
    }

    /// POST a binary body to `path`.
    pub fn post(
        &self,
        path: &str,
        body: &[u8],
        content_type: &str,
    ) -> Result<HttpResponse, TransportError> {
        self.perform("POST", path, None, Some(body), Some(content_type))
    }

    fn request_url(&self, path: &str) -> String {
        format!("{}{}", self.base.as_str().trim_end_matches('/'), path)
    }

    fn perform(
        &self,
        method: &'static str,
        path: &str,
        conditional: Option<&Conditional>,
        body: Option<&[u8]>,
        content_type: Option<&str>,
    ) -> Result<HttpResponse, TransportError> {
        let url = self.request_url(path);
        self.perform_curl(&url, conditional, body, content_type)
            .map_err(|source| TransportError::Request {
                method,
                url,
                source,
            })
    }

    fn perform_curl(
        &self,
        url: &str,
        conditional: Option<&Conditional>,
        body: Option<&[u8]>,
        content_type: Option<&str>,
    ) -> Result<HttpResponse, curl::Error> {
        let mut easy = curl::easy::Easy::new();
        easy.url(url)?;
        easy.connect_timeout(self.connect_timeout)?;
        easy.timeout(self.timeout)?;
        if let Some(user) = &self.username {
            easy.username(user)?;
        }
        if let Some(pass) = &self.password {
            easy.password(pass)?;
        }
        if let Some(bytes) = body {
            easy.post(true)?;
            easy.post_fields_copy(bytes)?;
        }

        let mut list = curl::easy::List::new();
        let mut has_headers = false;
        if let Some(cond) = conditional {
            list.append(&format!("{}: {}", cond.name(), cond.value()))?;
            has_headers = true;
        }
        if let Some(ct) = content_type {
            list.append(&format!("Content-Type: {}", ct))?;
            has_headers = true;
        }
        if has_headers {
            easy.http_headers(list)?;
        }

        let mut header_lines: Vec<String> = Vec::new();
        let mut body_bytes: Vec<u8> = Vec::new();
        {
            let mut transfer = easy.transfer();
            transfer.header_function(|data| {
                if let Ok(s) = str::from_utf8(data) {
                    header_lines.push(s.trim_end().to_string());
                }
                true
            })?;
            transfer.write_function(|data| {
                body_bytes.extend_from_slice(data);
                Ok(data.len())
            })?;
            transfer.perform()?;
        }

        let status = easy.response_code()?;
        Ok(HttpResponse {
            status,
            headers: parse::parse_headers(&header_lines),
            body: body_bytes,
        })
    }
}
