//! HTTP transport types for the host-does-IO pattern.
//!
//! # Design
//! Requests and responses are plain owned data. The core builds
//! `HttpRequest` values and reads `HttpResponse` values; executing the
//! exchange belongs to a [`Transport`](crate::transport::Transport).
//!
//! `Response` is the metadata view handed back to callers on every call,
//! successful or not, so rate-limit and diagnostic headers stay inspectable.

use std::fmt;

use chrono::{DateTime, Utc};

pub const HEADER_RATE_LIMIT: &str = "x-ratelimit-limit";
pub const HEADER_RATE_REMAINING: &str = "x-ratelimit-remaining";
pub const HEADER_RATE_RESET: &str = "x-ratelimit-reset";

/// HTTP method for a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HttpMethod {
    Get,
    Post,
    Patch,
    Delete,
}

impl HttpMethod {
    pub fn as_str(self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
            HttpMethod::Patch => "PATCH",
            HttpMethod::Delete => "DELETE",
        }
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An HTTP request described as plain data.
///
/// `url` is fully resolved against the client's API root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpRequest {
    pub method: HttpMethod,
    pub url: String,
    pub headers: Vec<(String, String)>,
    pub body: Option<String>,
}

impl HttpRequest {
    pub fn header(&self, name: &str) -> Option<&str> {
        find_header(&self.headers, name)
    }
}

/// An HTTP response described as plain data, as returned by a transport.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    pub status: u16,
    pub headers: Vec<(String, String)>,
    pub body: String,
}

impl HttpResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Rate-limit state reported by the service.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rate {
    /// Requests allowed per window.
    pub limit: u32,
    /// Requests left in the current window.
    pub remaining: u32,
    /// When the current window resets.
    pub reset: DateTime<Utc>,
}

impl Rate {
    /// All three rate headers must be present and well-formed.
    fn from_headers(headers: &[(String, String)]) -> Option<Self> {
        let limit = find_header(headers, HEADER_RATE_LIMIT)?.trim().parse().ok()?;
        let remaining = find_header(headers, HEADER_RATE_REMAINING)?.trim().parse().ok()?;
        let reset_secs: i64 = find_header(headers, HEADER_RATE_RESET)?.trim().parse().ok()?;
        let reset = DateTime::from_timestamp(reset_secs, 0)?;
        Some(Rate {
            limit,
            remaining,
            reset,
        })
    }
}

/// Response metadata returned alongside every decoded value and error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Response {
    pub status: u16,
    pub headers: Vec<(String, String)>,
    pub rate: Option<Rate>,
}

impl Response {
    pub fn header(&self, name: &str) -> Option<&str> {
        find_header(&self.headers, name)
    }
}

impl From<&HttpResponse> for Response {
    fn from(response: &HttpResponse) -> Self {
        Self {
            status: response.status,
            headers: response.headers.clone(),
            rate: Rate::from_headers(&response.headers),
        }
    }
}

fn find_header<'a>(headers: &'a [(String, String)], name: &str) -> Option<&'a str> {
    headers
        .iter()
        .find(|(k, _)| k.eq_ignore_ascii_case(name))
        .map(|(_, v)| v.as_str())
}
