// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! Error types for the urlfetch stream adapter
//!
//! Every failure of a stream open is reported through [`Error`], so callers can
//! inspect what the transport said instead of getting a bare `false`.

use thiserror::Error;

use crate::fetch::FetchErrorCode;

/// Result type alias for urlfetch operations
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for urlfetch
#[derive(Error, Debug)]
pub enum Error {
    /// HTTP request failed
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// URL parsing failed
    #[error("Invalid URL: {0}")]
    Url(#[from] url::ParseError),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// The call did not complete before its deadline
    #[error("Operation timed out after {duration_ms}ms: {operation}")]
    Timeout {
        operation: String,
        duration_ms: u64,
        url: Option<String>,
    },

    /// The RPC layer failed before a fetch result came back
    #[error("RPC {service}.{method} failed: {reason}")]
    Transport {
        service: String,
        method: String,
        reason: String,
    },

    /// The fetch service answered with an application error
    #[error("Fetch of {url} failed with {code}: {detail}")]
    RemoteFetch {
        code: FetchErrorCode,
        detail: String,
        url: String,
    },

    /// Header line without a `:` separator
    #[error("Malformed header segment '{segment}'")]
    MalformedHeader { segment: String },

    /// A stream-context option has an unusable value
    #[error("Invalid context option '{option}': {reason}")]
    InvalidOption { option: String, reason: String },

    /// No wrapper is registered for the URL scheme
    #[error("No stream wrapper registered for scheme '{0}'")]
    UnsupportedScheme(String),

    /// A wrapper is already registered for the scheme
    #[error("Stream wrapper for scheme '{0}' is already registered")]
    WrapperExists(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Generic error
    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Create a timeout error
    pub fn timeout(operation: impl Into<String>, duration_ms: u64) -> Self {
        Error::Timeout {
            operation: operation.into(),
            duration_ms,
            url: None,
        }
    }

    /// Create a timeout error with URL
    pub fn timeout_with_url(
        operation: impl Into<String>,
        duration_ms: u64,
        url: impl Into<String>,
    ) -> Self {
        Error::Timeout {
            operation: operation.into(),
            duration_ms,
            url: Some(url.into()),
        }
    }

    /// Create a transport error for an RPC
    pub fn transport(
        service: impl Into<String>,
        method: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        Error::Transport {
            service: service.into(),
            method: method.into(),
            reason: reason.into(),
        }
    }

    /// Create an error for an application error reported by the fetch service
    pub fn remote_fetch(
        code: FetchErrorCode,
        detail: impl Into<String>,
        url: impl Into<String>,
    ) -> Self {
        Error::RemoteFetch {
            code,
            detail: detail.into(),
            url: url.into(),
        }
    }

    /// Create an invalid option error
    pub fn invalid_option(option: impl Into<String>, reason: impl Into<String>) -> Self {
        Error::InvalidOption {
            option: option.into(),
            reason: reason.into(),
        }
    }

    /// Create a generic error
    pub fn other<S: Into<String>>(msg: S) -> Self {
        Error::Other(msg.into())
    }

    /// Check if this is a timeout error
    pub fn is_timeout(&self) -> bool {
        match self {
            Error::Timeout { .. } => true,
            Error::Http(e) => e.is_timeout(),
            _ => false,
        }
    }

    /// Check if the failure happened in the RPC layer
    pub fn is_transport(&self) -> bool {
        matches!(self, Error::Transport { .. } | Error::Http(_))
    }

    /// Check if this is recoverable (a caller may retry)
    pub fn is_recoverable(&self) -> bool {
        match self {
            Error::Timeout { .. } | Error::Transport { .. } | Error::Http(_) => true,
            Error::RemoteFetch { code, .. } => code.is_transient(),
            _ => false,
        }
    }

    /// Get the remote error code if the fetch service reported one
    pub fn fetch_code(&self) -> Option<FetchErrorCode> {
        match self {
            Error::RemoteFetch { code, .. } => Some(*code),
            _ => None,
        }
    }

    /// Get URL if available
    pub fn url(&self) -> Option<&str> {
        match self {
            Error::Timeout { url: Some(u), .. } => Some(u),
            Error::RemoteFetch { url, .. } => Some(url),
            _ => None,
        }
    }
}

impl From<String> for Error {
    fn from(s: String) -> Self {
        Error::Other(s)
    }
}

impl From<&str> for Error {
    fn from(s: &str) -> Self {
        Error::Other(s.to_string())
    }
}

/// Helper trait for adding context to errors
pub trait ErrorContext<T> {
    /// Add URL context to error
    fn with_url(self, url: &str) -> Result<T>;

    /// Add operation context to error
    fn context(self, msg: &str) -> Result<T>;
}

impl<T, E: Into<Error>> ErrorContext<T> for std::result::Result<T, E> {
    fn with_url(self, url: &str) -> Result<T> {
        self.map_err(|e| match e.into() {
            Error::Timeout {
                operation,
                duration_ms,
                ..
            } => Error::Timeout {
                operation,
                duration_ms,
                url: Some(url.to_string()),
            },
            other => other,
        })
    }

    fn context(self, msg: &str) -> Result<T> {
        self.map_err(|e| {
            let err = e.into();
            Error::Other(format!("{}: {}", msg, err))
        })
    }
}
