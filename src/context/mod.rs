// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! Stream context options
//!
//! A [`StreamContext`] carries one [`StreamContextOptions`] per wrapper name,
//! the way a caller configures a URL open. Options are parsed once when the
//! stream is opened and never change afterwards.

use std::collections::HashMap;

use bytes::Bytes;
use serde_json::Value;

use crate::error::{Error, Result};
use crate::fetch::{HeaderEntry, RequestMethod};

mod headers;

pub use headers::{
    apply_user_agent, parse_header_block, parse_header_line, split_lines,
    try_parse_header_block, USER_AGENT,
};

/// Wrapper name whose options `https` URLs fall back to
pub const HTTP_WRAPPER: &str = "http";

/// The `header` option in one of its accepted shapes
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HeaderOption {
    /// "Key: Value" entries separated by CRLF, CR or LF
    Block(String),
    /// One "Key: Value" entry per element
    Lines(Vec<String>),
    /// Ordered key/value pairs
    Map(Vec<(String, String)>),
}

impl HeaderOption {
    /// Expand into header entries, in order, skipping malformed lines
    pub fn entries(&self) -> Vec<HeaderEntry> {
        match self {
            HeaderOption::Block(block) => parse_header_block(block),
            HeaderOption::Lines(lines) => lines
                .iter()
                .flat_map(|line| parse_header_block(line))
                .collect(),
            HeaderOption::Map(pairs) => pairs
                .iter()
                .map(|(key, value)| HeaderEntry::new(key.as_str(), value.as_str()))
                .collect(),
        }
    }
}

/// Options recognized by the fetch stream adapter
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StreamContextOptions {
    /// Request method (GET unless set)
    pub method: RequestMethod,
    /// Request headers
    pub header: Option<HeaderOption>,
    /// Request body, already encoded by the caller
    pub content: Option<Bytes>,
    /// Deadline in seconds, passed through unchanged
    pub timeout: Option<f64>,
    /// User agent, written into the `User-Agent` header
    pub user_agent: Option<String>,
}

impl StreamContextOptions {
    /// Create empty options (GET, no headers)
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the request method
    pub fn method(mut self, method: RequestMethod) -> Self {
        self.method = method;
        self
    }

    /// Set headers from a delimited "Key: Value" block
    pub fn header_block(mut self, block: impl Into<String>) -> Self {
        self.header = Some(HeaderOption::Block(block.into()));
        self
    }

    /// Set headers from a list of "Key: Value" lines
    pub fn header_lines<I, S>(mut self, lines: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.header = Some(HeaderOption::Lines(
            lines.into_iter().map(Into::into).collect(),
        ));
        self
    }

    /// Set headers from ordered key/value pairs
    pub fn header_map<I, K, V>(mut self, pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        self.header = Some(HeaderOption::Map(
            pairs
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        ));
        self
    }

    /// Set the request body
    pub fn content(mut self, content: impl Into<Bytes>) -> Self {
        self.content = Some(content.into());
        self
    }

    /// Set the deadline in seconds
    pub fn timeout(mut self, seconds: f64) -> Self {
        self.timeout = Some(seconds);
        self
    }

    /// Set the user agent
    pub fn user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = Some(user_agent.into());
        self
    }

    /// Header entries these options produce, including the user agent
    pub fn header_entries(&self) -> Vec<HeaderEntry> {
        let mut entries = self
            .header
            .as_ref()
            .map(HeaderOption::entries)
            .unwrap_or_default();
        if let Some(ref user_agent) = self.user_agent {
            apply_user_agent(&mut entries, user_agent);
        }
        entries
    }

    /// Read options from a loosely typed JSON object
    ///
    /// Accepts `{"method": "POST", "header": ..., "content": "...",
    /// "timeout": 5.0, "user_agent": "..."}`. `header` may be a string, an
    /// array of strings or an object. Unrecognized keys are ignored.
    pub fn from_json(value: &Value) -> Result<Self> {
        let object = value
            .as_object()
            .ok_or_else(|| Error::invalid_option("http", "expected an object of options"))?;

        let mut options = Self::default();
        for (key, value) in object {
            match key.as_str() {
                "method" => {
                    let name = value
                        .as_str()
                        .ok_or_else(|| Error::invalid_option("method", "expected a string"))?;
                    options.method = name.parse()?;
                }
                "header" => options.header = Some(header_from_json(value)?),
                "content" => {
                    let content = value
                        .as_str()
                        .ok_or_else(|| Error::invalid_option("content", "expected a string"))?;
                    options.content = Some(Bytes::copy_from_slice(content.as_bytes()));
                }
                "timeout" => {
                    let seconds = value
                        .as_f64()
                        .ok_or_else(|| Error::invalid_option("timeout", "expected a number"))?;
                    options.timeout = Some(seconds);
                }
                "user_agent" => {
                    let agent = value
                        .as_str()
                        .ok_or_else(|| Error::invalid_option("user_agent", "expected a string"))?;
                    options.user_agent = Some(agent.to_string());
                }
                other => tracing::debug!(option = %other, "Ignoring unsupported context option"),
            }
        }
        Ok(options)
    }
}

fn header_from_json(value: &Value) -> Result<HeaderOption> {
    match value {
        Value::String(block) => Ok(HeaderOption::Block(block.clone())),
        Value::Array(lines) => lines
            .iter()
            .map(|line| {
                line.as_str()
                    .map(str::to_string)
                    .ok_or_else(|| Error::invalid_option("header", "expected string lines"))
            })
            .collect::<Result<Vec<_>>>()
            .map(HeaderOption::Lines),
        Value::Object(map) => map
            .iter()
            .map(|(key, value)| {
                scalar_to_string(value)
                    .map(|value| (key.clone(), value))
                    .ok_or_else(|| {
                        Error::invalid_option("header", format!("value of '{}' is not a scalar", key))
                    })
            })
            .collect::<Result<Vec<_>>>()
            .map(HeaderOption::Map),
        _ => Err(Error::invalid_option(
            "header",
            "expected a string, an array or an object",
        )),
    }
}

fn scalar_to_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

/// Options for a URL open, keyed by wrapper name
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StreamContext {
    wrappers: HashMap<String, StreamContextOptions>,
}

impl StreamContext {
    /// Create an empty context
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a context holding `http` options
    pub fn http(options: StreamContextOptions) -> Self {
        Self::new().with_options(HTTP_WRAPPER, options)
    }

    /// Set the options for a wrapper
    pub fn with_options(mut self, wrapper: impl Into<String>, options: StreamContextOptions) -> Self {
        self.wrappers
            .insert(wrapper.into().to_ascii_lowercase(), options);
        self
    }

    /// Options stored for a wrapper name
    pub fn options(&self, wrapper: &str) -> Option<&StreamContextOptions> {
        self.wrappers.get(&wrapper.to_ascii_lowercase())
    }

    /// Options that apply to a URL scheme
    ///
    /// `https` uses the `http` entry when it has none of its own.
    pub fn options_for_scheme(&self, scheme: &str) -> Option<&StreamContextOptions> {
        self.options(scheme).or_else(|| {
            if scheme.eq_ignore_ascii_case("https") {
                self.options(HTTP_WRAPPER)
            } else {
                None
            }
        })
    }

    /// Build a context from `{"http": {...}, ...}`
    pub fn from_json(value: &Value) -> Result<Self> {
        let object = value
            .as_object()
            .ok_or_else(|| Error::invalid_option("context", "expected an object keyed by wrapper"))?;

        let mut context = Self::new();
        for (wrapper, options) in object {
            context = context.with_options(wrapper.as_str(), StreamContextOptions::from_json(options)?);
        }
        Ok(context)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_defaults() {
        let options = StreamContextOptions::new();
        assert_eq!(options.method, RequestMethod::Get);
        assert!(options.header_entries().is_empty());
        assert!(options.content.is_none());
        assert!(options.timeout.is_none());
    }

    #[test]
    fn test_block_and_map_agree() {
        let from_block = StreamContextOptions::new()
            .header_block("Content-type: text/plain\r\nX-A: 1\rX-B: 2\n")
            .header_entries();
        let from_map = StreamContextOptions::new()
            .header_map([("Content-type", "text/plain"), ("X-A", "1"), ("X-B", "2")])
            .header_entries();
        assert_eq!(from_block, from_map);
    }

    #[test]
    fn test_header_lines() {
        let entries = StreamContextOptions::new()
            .header_lines(["Accept: */*", "X-Dup: 1", "X-Dup: 2"])
            .header_entries();
        assert_eq!(entries.len(), 3);
        assert_eq!(entries[2], HeaderEntry::new("X-Dup", "2"));
    }

    #[test]
    fn test_from_json() {
        let options = StreamContextOptions::from_json(&json!({
            "method": "post",
            "header": {"Content-type": "application/x-www-form-urlencoded", "X-Num": 3},
            "content": "var1=some_content&var2=some_content2",
            "timeout": 5.0,
            "user_agent": "agent",
            "protocol_version": 1.1
        }))
        .unwrap();

        assert_eq!(options.method, RequestMethod::Post);
        assert_eq!(options.timeout, Some(5.0));
        assert_eq!(
            options.content.as_deref(),
            Some(&b"var1=some_content&var2=some_content2"[..])
        );
        assert_eq!(
            options.header_entries(),
            vec![
                HeaderEntry::new("Content-type", "application/x-www-form-urlencoded"),
                HeaderEntry::new("X-Num", "3"),
                HeaderEntry::new("User-Agent", "agent"),
            ]
        );
    }

    #[test]
    fn test_from_json_rejects_bad_values() {
        assert!(StreamContextOptions::from_json(&json!({"method": "BREW"})).is_err());
        assert!(StreamContextOptions::from_json(&json!({"timeout": "soon"})).is_err());
        assert!(StreamContextOptions::from_json(&json!({"header": 7})).is_err());
        assert!(StreamContextOptions::from_json(&json!("GET")).is_err());
    }

    #[test]
    fn test_https_falls_back_to_http() {
        let context = StreamContext::from_json(&json!({"http": {"method": "POST"}})).unwrap();
        assert_eq!(
            context.options_for_scheme("https").map(|o| o.method),
            Some(RequestMethod::Post)
        );
        assert!(context.options_for_scheme("ftp").is_none());

        let context = context.with_options("https", StreamContextOptions::new());
        assert_eq!(
            context.options_for_scheme("HTTPS").map(|o| o.method),
            Some(RequestMethod::Get)
        );
    }
}
