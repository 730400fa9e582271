// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! Transport configuration

use std::env;
use std::str::FromStr;
use std::time::Duration;

use url::Url;

use crate::error::{Error, Result};

/// Default host of the platform API endpoint
pub const DEFAULT_API_HOST: &str = "appengine.googleapis.internal";

/// Default port of the platform API endpoint
pub const DEFAULT_API_PORT: u16 = 10001;

/// Default path RPCs are posted to
pub const DEFAULT_RPC_PATH: &str = "/rpc_http";

/// Default user agent of the direct transport
pub const DEFAULT_USER_AGENT: &str = concat!("urlfetch-stream/", env!("CARGO_PKG_VERSION"));

/// Configuration shared by the transports
#[derive(Debug, Clone, PartialEq)]
pub struct UrlFetchConfig {
    /// API endpoint host
    pub api_host: String,
    /// API endpoint port
    pub api_port: u16,
    /// Path RPCs are posted to
    pub rpc_path: String,
    /// Deadline for calls whose request carries none
    pub default_deadline: Duration,
    /// Maximum redirects the direct transport follows
    pub max_redirects: usize,
    /// Ticket identifying the calling request to the platform
    pub ticket: Option<String>,
    /// User agent of the direct transport
    pub user_agent: String,
}

impl Default for UrlFetchConfig {
    fn default() -> Self {
        Self {
            api_host: DEFAULT_API_HOST.to_string(),
            api_port: DEFAULT_API_PORT,
            rpc_path: DEFAULT_RPC_PATH.to_string(),
            default_deadline: Duration::from_secs(60),
            max_redirects: 10,
            ticket: None,
            user_agent: DEFAULT_USER_AGENT.to_string(),
        }
    }
}

impl UrlFetchConfig {
    /// Create a new config with defaults
    pub fn new() -> Self {
        Self::default()
    }

    /// Read the config from the environment
    ///
    /// Recognizes `API_HOST`, `API_PORT`, `URLFETCH_RPC_PATH`,
    /// `URLFETCH_DEFAULT_DEADLINE` (seconds), `URLFETCH_MAX_REDIRECTS` and
    /// `URLFETCH_TICKET`. Unset variables keep their defaults.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let mut config = Self::default();

        if let Some(host) = lookup("API_HOST") {
            config.api_host = host;
        }
        if let Some(port) = lookup("API_PORT") {
            config.api_port = parse_var("API_PORT", &port)?;
        }
        if let Some(path) = lookup("URLFETCH_RPC_PATH") {
            config.rpc_path = path;
        }
        if let Some(deadline) = lookup("URLFETCH_DEFAULT_DEADLINE") {
            let secs: f64 = parse_var("URLFETCH_DEFAULT_DEADLINE", &deadline)?;
            config.default_deadline = Duration::try_from_secs_f64(secs).map_err(|e| {
                Error::Config(format!("URLFETCH_DEFAULT_DEADLINE: {}", e))
            })?;
        }
        if let Some(max) = lookup("URLFETCH_MAX_REDIRECTS") {
            config.max_redirects = parse_var("URLFETCH_MAX_REDIRECTS", &max)?;
        }
        config.ticket = lookup("URLFETCH_TICKET").filter(|t| !t.is_empty());

        Ok(config)
    }

    /// Set API host
    pub fn api_host(mut self, host: impl Into<String>) -> Self {
        self.api_host = host.into();
        self
    }

    /// Set API port
    pub fn api_port(mut self, port: u16) -> Self {
        self.api_port = port;
        self
    }

    /// Set RPC path
    pub fn rpc_path(mut self, path: impl Into<String>) -> Self {
        self.rpc_path = path.into();
        self
    }

    /// Set default deadline
    pub fn default_deadline(mut self, deadline: Duration) -> Self {
        self.default_deadline = deadline;
        self
    }

    /// Set max redirects
    pub fn max_redirects(mut self, max: usize) -> Self {
        self.max_redirects = max;
        self
    }

    /// Set the request ticket
    pub fn ticket(mut self, ticket: impl Into<String>) -> Self {
        self.ticket = Some(ticket.into());
        self
    }

    /// Set user agent
    pub fn user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    /// URL RPCs are posted to
    pub fn api_url(&self) -> Result<Url> {
        let path = if self.rpc_path.starts_with('/') {
            self.rpc_path.clone()
        } else {
            format!("/{}", self.rpc_path)
        };
        Url::parse(&format!("http://{}:{}{}", self.api_host, self.api_port, path))
            .map_err(|e| Error::Config(format!("Invalid API endpoint: {}", e)))
    }
}

fn parse_var<T>(key: &str, value: &str) -> Result<T>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    value
        .trim()
        .parse()
        .map_err(|e| Error::Config(format!("{}={:?}: {}", key, value, e)))
}
