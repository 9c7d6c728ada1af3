//! Request building and response decoding shared by every endpoint.
//!
//! # Design
//! `KeysClient` holds only read-only configuration (API root, user agent)
//! and carries no mutable state between calls, so one client can be shared
//! across threads. `new_request` produces an `HttpRequest`; `parse_response`
//! and `check_response` consume an `HttpResponse`. `send` and
//! `send_discarding` join the two through an explicitly passed
//! [`Transport`].

use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{debug, warn};
use url::Url;

use crate::config::ClientConfig;
use crate::error::{Error, ErrorDetail, Result};
use crate::http::{HttpMethod, HttpRequest, HttpResponse, Response};
use crate::transport::Transport;

pub const MEDIA_TYPE: &str = "application/vnd.github.v3+json";

/// A decoded value together with the metadata of the response it came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reply<T> {
    pub value: T,
    pub response: Response,
}

#[derive(Debug, Clone)]
pub struct KeysClient {
    base_url: Url,
    user_agent: String,
}

impl KeysClient {
    /// Fails with [`Error::Url`] if `base_url` is not an absolute URL that
    /// relative paths can nest under.
    pub fn new(base_url: &str) -> Result<Self> {
        Self::with_user_agent(base_url, &ClientConfig::default().user_agent)
    }

    pub fn from_config(config: &ClientConfig) -> Result<Self> {
        Self::with_user_agent(&config.base_url, &config.user_agent)
    }

    fn with_user_agent(base_url: &str, user_agent: &str) -> Result<Self> {
        let url_error = |source| Error::Url {
            input: base_url.to_string(),
            source,
        };
        let mut url = Url::parse(base_url).map_err(url_error)?;
        if url.cannot_be_a_base() {
            return Err(url_error(url::ParseError::RelativeUrlWithCannotBeABaseBase));
        }
        // Without a trailing slash, join() would replace the last segment.
        if !url.path().ends_with('/') {
            let path = format!("{}/", url.path());
            url.set_path(&path);
        }
        Ok(Self {
            base_url: url,
            user_agent: user_agent.to_string(),
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Build a request for `path`, relative to the API root.
    ///
    /// A present `body` is encoded as JSON and marked with a JSON
    /// content type. No I/O happens here.
    pub fn new_request<B>(&self, method: HttpMethod, path: &str, body: Option<&B>) -> Result<HttpRequest>
    where
        B: Serialize + ?Sized,
    {
        let url = self.base_url.join(path).map_err(|source| Error::Url {
            input: path.to_string(),
            source,
        })?;

        let mut headers = vec![
            ("accept".to_string(), MEDIA_TYPE.to_string()),
            ("user-agent".to_string(), self.user_agent.clone()),
        ];
        let body = match body {
            Some(body) => {
                let encoded = serde_json::to_string(body).map_err(|e| Error::Encoding(e.to_string()))?;
                headers.push(("content-type".to_string(), "application/json".to_string()));
                Some(encoded)
            }
            None => None,
        };

        debug!(%method, %url, "built request");
        Ok(HttpRequest {
            method,
            url: url.into(),
            headers,
            body,
        })
    }

    /// Execute `request` and decode a 2xx body into `T`.
    pub fn send<T, R>(&self, transport: &R, request: HttpRequest) -> Result<Reply<T>>
    where
        T: DeserializeOwned,
        R: Transport + ?Sized,
    {
        let raw = transport.execute(&request)?;
        self.parse_response(raw)
    }

    /// Execute `request` and check its status without reading the body.
    pub fn send_discarding<R>(&self, transport: &R, request: HttpRequest) -> Result<Response>
    where
        R: Transport + ?Sized,
    {
        let raw = transport.execute(&request)?;
        self.check_response(&raw)
    }

    /// Decode a 2xx body into `T`; a non-2xx status is reported as
    /// [`Error::Api`] before any decoding is attempted.
    pub fn parse_response<T: DeserializeOwned>(&self, raw: HttpResponse) -> Result<Reply<T>> {
        let response = self.check_response(&raw)?;
        match serde_json::from_str(&raw.body) {
            Ok(value) => Ok(Reply { value, response }),
            Err(e) => Err(Error::Decoding {
                response,
                message: e.to_string(),
            }),
        }
    }

    /// Turn the raw response into metadata, or into [`Error::Api`] when the
    /// status is outside 2xx.
    pub fn check_response(&self, raw: &HttpResponse) -> Result<Response> {
        let response = Response::from(raw);
        debug!(
            status = response.status,
            rate_remaining = response.rate.map(|r| r.remaining),
            "received response"
        );
        if raw.is_success() {
            return Ok(response);
        }
        let detail = ErrorDetail::from_body(&raw.body);
        warn!(status = response.status, message = %detail.message, "request failed");
        Err(Error::Api { response, detail })
    }
}
