//! Client configuration.
//!
//! Loaded from `KEYS_*` environment variables with `envy`; every field has a
//! default so an empty environment yields a working configuration.

use std::time::Duration;

use serde::Deserialize;

use crate::error::Result;

pub const DEFAULT_BASE_URL: &str = "https://api.github.com/";
pub const ENV_PREFIX: &str = "KEYS_";

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ClientConfig {
    /// API root that relative paths are resolved against.
    #[serde(default = "default_base_url")]
    pub base_url: String,
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
    /// Whole-request timeout for the bundled transport; unset means none.
    #[serde(default)]
    pub timeout_secs: Option<u64>,
}

fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}

fn default_user_agent() -> String {
    concat!("keys-core/", env!("CARGO_PKG_VERSION")).to_string()
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            user_agent: default_user_agent(),
            timeout_secs: None,
        }
    }
}

impl ClientConfig {
    /// Reads `KEYS_BASE_URL`, `KEYS_USER_AGENT` and `KEYS_TIMEOUT_SECS`.
    pub fn from_env() -> Result<Self> {
        Self::from_vars(std::env::vars())
    }

    /// Same as [`from_env`](Self::from_env) over an explicit set of
    /// variables; names without the `KEYS_` prefix are ignored.
    pub fn from_vars<I>(vars: I) -> Result<Self>
    where
        I: IntoIterator<Item = (String, String)>,
    {
        Ok(envy::prefixed(ENV_PREFIX).from_iter::<_, ClientConfig>(vars)?)
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_secs.map(Duration::from_secs)
    }
}
