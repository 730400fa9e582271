// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! Fetch request types and builder

use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use bytes::Bytes;
use serde::{Deserialize, Serialize};

use super::wire::base64_bytes_opt;
use crate::context::StreamContextOptions;
use crate::error::{Error, Result};

/// HTTP methods the fetch service supports
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum RequestMethod {
    #[default]
    Get,
    Post,
    Head,
    Put,
    Delete,
    Patch,
}

impl RequestMethod {
    /// Method name as sent on the wire
    pub fn as_str(&self) -> &'static str {
        match self {
            RequestMethod::Get => "GET",
            RequestMethod::Post => "POST",
            RequestMethod::Head => "HEAD",
            RequestMethod::Put => "PUT",
            RequestMethod::Delete => "DELETE",
            RequestMethod::Patch => "PATCH",
        }
    }

    /// Equivalent reqwest method
    pub fn to_reqwest(&self) -> reqwest::Method {
        match self {
            RequestMethod::Get => reqwest::Method::GET,
            RequestMethod::Post => reqwest::Method::POST,
            RequestMethod::Head => reqwest::Method::HEAD,
            RequestMethod::Put => reqwest::Method::PUT,
            RequestMethod::Delete => reqwest::Method::DELETE,
            RequestMethod::Patch => reqwest::Method::PATCH,
        }
    }
}

impl FromStr for RequestMethod {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_uppercase().as_str() {
            "GET" => Ok(RequestMethod::Get),
            "POST" => Ok(RequestMethod::Post),
            "HEAD" => Ok(RequestMethod::Head),
            "PUT" => Ok(RequestMethod::Put),
            "DELETE" => Ok(RequestMethod::Delete),
            "PATCH" => Ok(RequestMethod::Patch),
            _ => Err(Error::invalid_option(
                "method",
                format!("unsupported method '{}'", s),
            )),
        }
    }
}

impl fmt::Display for RequestMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One header of a request or response, duplicates allowed
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HeaderEntry {
    pub key: String,
    pub value: String,
}

impl HeaderEntry {
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
        }
    }
}

impl fmt::Display for HeaderEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.key, self.value)
    }
}

/// Request sent to the fetch service
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FetchRequest {
    /// Target URL, exactly as the caller gave it
    pub url: String,
    /// Request method
    pub method: RequestMethod,
    /// Request headers in order
    #[serde(default)]
    pub headers: Vec<HeaderEntry>,
    /// Request body
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        with = "base64_bytes_opt"
    )]
    pub payload: Option<Bytes>,
    /// Deadline in seconds
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deadline: Option<f64>,
    /// Follow redirects
    pub follow_redirects: bool,
    /// Reject responses whose server certificate does not validate
    pub must_validate_server_certificate: bool,
}

impl FetchRequest {
    /// Create a new request with arbitrary method
    pub fn new(method: RequestMethod, url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            method,
            headers: Vec::new(),
            payload: None,
            deadline: None,
            follow_redirects: true,
            must_validate_server_certificate: false,
        }
    }

    /// Create a new GET request
    pub fn get(url: impl Into<String>) -> Self {
        Self::new(RequestMethod::Get, url)
    }

    /// Create a new POST request
    pub fn post(url: impl Into<String>) -> Self {
        Self::new(RequestMethod::Post, url)
    }

    /// Build the request a stream open issues for `url` under `options`
    ///
    /// Redirects are always followed and certificate validation is always
    /// left to the service, whatever the options say.
    pub fn from_context(url: impl Into<String>, options: &StreamContextOptions) -> Self {
        let mut request = Self::new(options.method, url);
        request.headers = options.header_entries();
        request.payload = options.content.clone();
        request.deadline = options.timeout;
        request
    }

    /// Append a header
    pub fn header(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push(HeaderEntry::new(key, value));
        self
    }

    /// Set the request body
    pub fn payload(mut self, payload: impl Into<Bytes>) -> Self {
        self.payload = Some(payload.into());
        self
    }

    /// Set the deadline in seconds
    pub fn deadline(mut self, seconds: f64) -> Self {
        self.deadline = Some(seconds);
        self
    }

    /// Set follow redirects
    pub fn follow_redirects(mut self, follow: bool) -> Self {
        self.follow_redirects = follow;
        self
    }

    /// Set server certificate validation
    pub fn must_validate_server_certificate(mut self, validate: bool) -> Self {
        self.must_validate_server_certificate = validate;
        self
    }

    /// First value of a header, compared case-insensitively
    pub fn header_value(&self, key: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|h| h.key.eq_ignore_ascii_case(key))
            .map(|h| h.value.as_str())
    }

    /// Deadline as a duration, if set to a usable value
    pub fn deadline_duration(&self) -> Option<Duration> {
        self.deadline
            .and_then(|secs| Duration::try_from_secs_f64(secs).ok())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_method_parsing() {
        assert_eq!("post".parse::<RequestMethod>().unwrap(), RequestMethod::Post);
        assert_eq!(" GET ".parse::<RequestMethod>().unwrap(), RequestMethod::Get);
        assert!("CONNECT".parse::<RequestMethod>().is_err());
        assert_eq!(RequestMethod::default(), RequestMethod::Get);
    }

    #[test]
    fn test_request_defaults() {
        let req = FetchRequest::get("http://www.google.com");
        assert_eq!(req.url, "http://www.google.com");
        assert!(req.follow_redirects);
        assert!(!req.must_validate_server_certificate);
        assert!(req.payload.is_none());
        assert!(req.deadline.is_none());
    }

    #[test]
    fn test_from_context_defaults_to_get() {
        let req = FetchRequest::from_context("http://www.google.com", &StreamContextOptions::new());
        assert_eq!(req.method, RequestMethod::Get);
        assert!(req.headers.is_empty());
    }

    #[test]
    fn test_from_context_payload_verbatim() {
        let options = StreamContextOptions::new()
            .method(RequestMethod::Post)
            .content("var1=some_content&var2=some_content2");
        let req = FetchRequest::from_context("http://www.google.com", &options);
        assert_eq!(req.method, RequestMethod::Post);
        assert_eq!(
            req.payload.as_deref(),
            Some(&b"var1=some_content&var2=some_content2"[..])
        );
    }

    #[test]
    fn test_from_context_deadline_unchanged() {
        let options = StreamContextOptions::new().timeout(5.0);
        let req = FetchRequest::from_context("http://www.google.com", &options);
        assert_eq!(req.deadline, Some(5.0));
        assert_eq!(req.deadline_duration(), Some(Duration::from_secs(5)));
    }

    #[test]
    fn test_negative_deadline_has_no_duration() {
        let req = FetchRequest::get("http://a").deadline(-1.0);
        assert_eq!(req.deadline, Some(-1.0));
        assert!(req.deadline_duration().is_none());
    }

    #[test]
    fn test_header_value_lookup() {
        let req = FetchRequest::get("http://a")
            .header("Content-type", "text/plain")
            .header("content-type", "ignored");
        assert_eq!(req.header_value("CONTENT-TYPE"), Some("text/plain"));
        assert_eq!(req.header_value("accept"), None);
    }

    #[test]
    fn test_wire_encoding() {
        let req = FetchRequest::post("http://a").payload("hi").deadline(2.5);
        let json = serde_json::to_value(&req).unwrap();
        assert_eq!(json["method"], "POST");
        assert_eq!(json["payload"], "aGk=");
        assert_eq!(json["deadline"], 2.5);
        assert_eq!(json["follow_redirects"], true);

        let decoded: FetchRequest = serde_json::from_value(json).unwrap();
        assert_eq!(decoded, req);
    }
}
