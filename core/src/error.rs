//! Error types for the keys API client.
//!
//! # Design
//! Every failure is returned to the caller, never recovered locally. Errors
//! raised after a response arrived (`Api`, `Decoding`, and a `Transport`
//! failure while reading the body) keep the response metadata so callers can
//! read rate-limit headers on failure too.

use serde::{Deserialize, Deserializer};

use crate::http::Response;

pub type Result<T> = std::result::Result<T, Error>;

/// A failure inside a [`Transport`](crate::transport::Transport).
///
/// `response` is set when the status line and headers arrived but the body
/// could not be read.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{message}")]
pub struct TransportError {
    pub message: String,
    pub response: Option<Response>,
}

impl TransportError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            response: None,
        }
    }

    /// A failure after `response` metadata was already received.
    pub fn with_response(message: impl Into<String>, response: Response) -> Self {
        Self {
            message: message.into(),
            response: Some(response),
        }
    }
}

/// One entry of the `errors` array in a service error payload.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct FieldError {
    #[serde(default)]
    pub resource: Option<String>,
    #[serde(default)]
    pub field: Option<String>,
    #[serde(default)]
    pub code: Option<String>,
}

/// Structured error payload returned by the service with a non-2xx status.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct ErrorDetail {
    #[serde(default, deserialize_with = "null_as_default")]
    pub message: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub errors: Vec<FieldError>,
    #[serde(default)]
    pub documentation_url: Option<String>,
}

/// `null` reads as the type's default, like a missing field.
fn null_as_default<'de, D, T>(deserializer: D) -> std::result::Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

impl ErrorDetail {
    /// Reads the service payload; a body that is not a JSON error object is
    /// kept verbatim as the message.
    pub fn from_body(body: &str) -> Self {
        serde_json::from_str(body).unwrap_or_else(|_| ErrorDetail {
            message: body.trim().to_string(),
            ..ErrorDetail::default()
        })
    }
}

#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum Error {
    /// The request body could not be serialized to JSON.
    #[error("failed to encode request body: {0}")]
    Encoding(String),

    /// The base URL or a request path could not be parsed or resolved.
    #[error("invalid URL '{input}': {source}")]
    Url {
        input: String,
        #[source]
        source: url::ParseError,
    },

    /// A path parameter that cannot stand as a single URL segment.
    #[error("invalid path segment '{0}'")]
    PathSegment(String),

    /// The transport failed; see [`TransportError::response`] for metadata
    /// received before the failure.
    #[error("transport failed: {0}")]
    Transport(#[from] TransportError),

    /// The service answered with a non-2xx status.
    #[error("HTTP {}: {}", response.status, detail.message)]
    Api {
        response: Response,
        detail: ErrorDetail,
    },

    /// A 2xx response body did not match the expected shape.
    #[error("failed to decode response body: {message}")]
    Decoding { response: Response, message: String },

    #[error("invalid configuration: {0}")]
    Config(#[from] envy::Error),
}

impl Error {
    /// Response metadata, when the failure happened after a response arrived.
    pub fn response(&self) -> Option<&Response> {
        match self {
            Error::Api { response, .. } | Error::Decoding { response, .. } => Some(response),
            Error::Transport(e) => e.response.as_ref(),
            _ => None,
        }
    }

    pub fn status(&self) -> Option<u16> {
        self.response().map(|r| r.status)
    }

    pub fn is_not_found(&self) -> bool {
        self.status() == Some(404)
    }
}
