// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! Fetch response types

use bytes::Bytes;
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};

use super::request::HeaderEntry;
use super::wire::base64_bytes;
use crate::error::{Error, Result};

/// Response returned by the fetch service
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FetchResponse {
    /// Response body
    #[serde(default, with = "base64_bytes")]
    pub content: Bytes,
    /// HTTP status code
    #[serde(default)]
    pub status_code: u16,
    /// Response headers in order
    #[serde(default)]
    pub headers: Vec<HeaderEntry>,
    /// Final URL after redirects, when the service reports one
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub final_url: Option<String>,
    /// The service cut the body short
    #[serde(default)]
    pub content_was_truncated: bool,
}

impl FetchResponse {
    /// Create a new response
    pub fn new(status_code: u16, content: impl Into<Bytes>) -> Self {
        Self {
            content: content.into(),
            status_code,
            ..Default::default()
        }
    }

    /// Append a header
    pub fn header(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push(HeaderEntry::new(key, value));
        self
    }

    /// Set the final URL
    pub fn final_url(mut self, url: impl Into<String>) -> Self {
        self.final_url = Some(url.into());
        self
    }

    /// Check if status is success (2xx)
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status_code)
    }

    /// First value of a header, compared case-insensitively
    pub fn header_value(&self, key: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|h| h.key.eq_ignore_ascii_case(key))
            .map(|h| h.value.as_str())
    }

    /// Get all values for a header
    pub fn header_all(&self, key: &str) -> Vec<&str> {
        self.headers
            .iter()
            .filter(|h| h.key.eq_ignore_ascii_case(key))
            .map(|h| h.value.as_str())
            .collect()
    }

    /// Get content type
    pub fn content_type(&self) -> Option<&str> {
        self.header_value("content-type")
    }

    /// Get body as text
    pub fn text(&self) -> Result<String> {
        String::from_utf8(self.content.to_vec()).map_err(|e| Error::Other(e.to_string()))
    }

    /// Get body as text, lossy conversion
    pub fn text_lossy(&self) -> String {
        String::from_utf8_lossy(&self.content).into_owned()
    }

    /// Get body length
    pub fn body_len(&self) -> usize {
        self.content.len()
    }

    /// Status line such as `HTTP/1.1 200 OK`
    pub fn status_line(&self) -> String {
        let reason = StatusCode::from_u16(self.status_code)
            .ok()
            .and_then(|s| s.canonical_reason());
        match reason {
            Some(reason) => format!("HTTP/1.1 {} {}", self.status_code, reason),
            None => format!("HTTP/1.1 {}", self.status_code),
        }
    }

    /// Status line followed by one "Key: Value" line per header
    pub fn header_lines(&self) -> Vec<String> {
        std::iter::once(self.status_line())
            .chain(self.headers.iter().map(ToString::to_string))
            .collect()
    }
}
