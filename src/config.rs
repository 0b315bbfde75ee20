//! Executor and transport configuration.
//!
//! [`ClientConfig`] is handed to [`ResourceClient`](crate::ResourceClient) and
//! holds the headers every request starts from. [`TransportConfig`] shapes the
//! `reqwest` client behind [`BasicClient`](crate::fetch::BasicClient).
//! [`HeaderFile`] loads extra per-call headers from disk.

use anyhow::{Context, Result};
use reqwest::header::{CONTENT_TYPE, HeaderMap, HeaderName, HeaderValue};
use std::collections::BTreeMap;
use std::time::Duration;

pub const DEFAULT_TIMEOUT_SECS: u64 = 30;
pub const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 10;
pub const DEFAULT_USER_AGENT: &str = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"));

/// Headers applied to every request an executor sends.
///
/// Precedence: defaults are applied first, then the descriptor's own headers.
/// A descriptor header with the same name (compared case-insensitively, as
/// HTTP does) replaces the default. A descriptor cannot remove a default.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    default_headers: HeaderMap,
}

impl Default for ClientConfig {
    /// `Content-Type: application/json`.
    fn default() -> Self {
        let mut default_headers = HeaderMap::new();
        default_headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        Self { default_headers }
    }
}

impl ClientConfig {
    /// A config with no default headers at all.
    pub fn empty() -> Self {
        Self {
            default_headers: HeaderMap::new(),
        }
    }

    /// Adds or replaces one default header.
    pub fn with_default_header(mut self, name: &str, value: &str) -> Result<Self> {
        let name = HeaderName::from_bytes(name.as_bytes())
            .with_context(|| format!("invalid header name '{name}'"))?;
        let value = HeaderValue::from_str(value)
            .with_context(|| format!("invalid value for header '{name}'"))?;
        self.default_headers.insert(name, value);
        Ok(self)
    }

    pub fn default_headers(&self) -> &HeaderMap {
        &self.default_headers
    }
}

/// Settings for the `reqwest` client behind a [`BasicClient`](crate::fetch::BasicClient).
///
/// `None` leaves the `reqwest` default in place.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransportConfig {
    pub timeout: Option<Duration>,
    pub connect_timeout: Option<Duration>,
    pub user_agent: Option<String>,
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            timeout: Some(Duration::from_secs(DEFAULT_TIMEOUT_SECS)),
            connect_timeout: Some(Duration::from_secs(DEFAULT_CONNECT_TIMEOUT_SECS)),
            user_agent: Some(DEFAULT_USER_AGENT.to_string()),
        }
    }
}

impl TransportConfig {
    /// Reads `TYPED_FETCH_TIMEOUT_SECS`, `TYPED_FETCH_CONNECT_TIMEOUT_SECS` and
    /// `TYPED_FETCH_USER_AGENT`, falling back to the defaults.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as [`from_env`](Self::from_env) with a custom variable source.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let mut config = Self::default();

        if let Some(secs) = lookup("TYPED_FETCH_TIMEOUT_SECS") {
            config.timeout = Some(parse_secs("TYPED_FETCH_TIMEOUT_SECS", &secs)?);
        }
        if let Some(secs) = lookup("TYPED_FETCH_CONNECT_TIMEOUT_SECS") {
            config.connect_timeout = Some(parse_secs("TYPED_FETCH_CONNECT_TIMEOUT_SECS", &secs)?);
        }
        if let Some(user_agent) = lookup("TYPED_FETCH_USER_AGENT") {
            config.user_agent = Some(user_agent);
        }

        Ok(config)
    }
}

fn parse_secs(key: &str, raw: &str) -> Result<Duration> {
    let secs: u64 = raw
        .trim()
        .parse()
        .with_context(|| format!("{key} must be a whole number of seconds, got '{raw}'"))?;
    Ok(Duration::from_secs(secs))
}

/// Extra request headers stored as a plain JSON object on disk:
/// ```json
/// {
///   "Accept-Language": "en",
///   "X-Tenant": "acme"
/// }
/// ```
pub struct HeaderFile {
    entries: BTreeMap<String, String>,
}

impl HeaderFile {
    /// Loads the headers from a JSON file at `path`.
    pub fn load(path: &str) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read header file '{path}'"))?;
        Self::parse(&content).with_context(|| format!("invalid header file '{path}'"))
    }

    pub fn parse(content: &str) -> Result<Self> {
        let entries: BTreeMap<String, String> = serde_json::from_str(content)?;
        Ok(Self { entries })
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.entries.get(name).map(String::as_str)
    }

    /// Iterates over all `(name, value)` pairs.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}
