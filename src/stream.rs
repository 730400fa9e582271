// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! Fetch stream adapter
//!
//! Opening a [`FetchStream`] issues exactly one "Fetch" call through an
//! [`ApiTransport`] and, on success, exposes the response body as a readable
//! stream. The adapter keeps no state between opens.

use std::fmt;
use std::io::{self, Read};
use std::pin::Pin;
use std::task::{Context, Poll};

use bytes::Bytes;
use tokio::io::{AsyncRead, ReadBuf};
use url::Url;

use crate::context::StreamContextOptions;
use crate::error::Result;
use crate::fetch::{FetchRequest, FetchResponse, HeaderEntry, FETCH_METHOD, SERVICE_NAME};
use crate::transport::ApiTransport;

/// Mode string a stream was opened with
///
/// The mode is recorded but not enforced; fetch streams are always readable
/// and never writable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OpenMode {
    raw: String,
}

impl OpenMode {
    /// Read-only mode (`r`)
    pub fn read() -> Self {
        Self::parse("r")
    }

    /// Record a mode string
    pub fn parse(mode: &str) -> Self {
        Self {
            raw: mode.to_string(),
        }
    }

    /// Mode as given
    pub fn as_str(&self) -> &str {
        &self.raw
    }

    /// Whether the mode allows reading (`r` or any `+` mode)
    pub fn is_read_oriented(&self) -> bool {
        self.raw.starts_with('r') || self.raw.contains('+')
    }
}

impl Default for OpenMode {
    fn default() -> Self {
        Self::read()
    }
}

impl fmt::Display for OpenMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

/// Readable stream over a fetch response body
#[derive(Debug, Clone)]
pub struct FetchStream {
    url: String,
    mode: OpenMode,
    response: FetchResponse,
    position: usize,
}

impl FetchStream {
    /// Open `url` by fetching it through `transport`
    ///
    /// The returned error is whatever the transport reported; nothing is
    /// retried.
    pub async fn open<T>(
        transport: &T,
        url: &str,
        mode: OpenMode,
        options: &StreamContextOptions,
    ) -> Result<Self>
    where
        T: ApiTransport + ?Sized,
    {
        Url::parse(url)?;

        if !mode.is_read_oriented() {
            tracing::debug!(url = %url, mode = %mode, "Opening fetch stream with a non-read mode");
        }

        let request = FetchRequest::from_context(url, options);

        tracing::debug!(
            transport = transport.name(),
            method = %request.method,
            url = %request.url,
            headers = request.headers.len(),
            deadline = ?request.deadline,
            "Fetch"
        );

        let response = match transport.make_call(SERVICE_NAME, FETCH_METHOD, &request).await {
            Ok(response) => response,
            Err(e) => {
                tracing::warn!(url = %url, error = %e, "Fetch stream open failed");
                return Err(e);
            }
        };

        if response.content_was_truncated {
            tracing::warn!(url = %url, "Fetch response body was truncated");
        }

        Ok(Self::from_response(url, mode, response))
    }

    /// Wrap an already obtained response
    pub fn from_response(url: impl Into<String>, mode: OpenMode, response: FetchResponse) -> Self {
        Self {
            url: url.into(),
            mode,
            response,
            position: 0,
        }
    }

    /// URL the stream was opened for
    pub fn url(&self) -> &str {
        &self.url
    }

    /// Mode the stream was opened with
    pub fn mode(&self) -> &OpenMode {
        &self.mode
    }

    /// Final URL after redirects, falling back to the opened URL
    pub fn final_url(&self) -> &str {
        self.response.final_url.as_deref().unwrap_or(&self.url)
    }

    /// HTTP status code
    pub fn status(&self) -> u16 {
        self.response.status_code
    }

    /// Response headers
    pub fn headers(&self) -> &[HeaderEntry] {
        &self.response.headers
    }

    /// Status line followed by "Key: Value" header lines
    pub fn response_header_lines(&self) -> Vec<String> {
        self.response.header_lines()
    }

    /// Full response
    pub fn response(&self) -> &FetchResponse {
        &self.response
    }

    /// Total body length
    pub fn len(&self) -> usize {
        self.response.content.len()
    }

    /// Whether the body is empty
    pub fn is_empty(&self) -> bool {
        self.response.content.is_empty()
    }

    /// Whether every byte has been read
    pub fn eof(&self) -> bool {
        self.position >= self.response.content.len()
    }

    /// Bytes not read yet
    pub fn remaining(&self) -> Bytes {
        self.response.content.slice(self.position.min(self.len())..)
    }

    /// Whole body, regardless of the read position
    pub fn bytes(&self) -> &Bytes {
        &self.response.content
    }

    /// Consume the stream, returning the whole body
    pub fn into_bytes(self) -> Bytes {
        self.response.content
    }

    /// Close the stream, returning the response
    pub fn close(self) -> FetchResponse {
        self.response
    }

    fn read_into(&mut self, buf: &mut [u8]) -> usize {
        let remaining = &self.response.content[self.position.min(self.len())..];
        let n = remaining.len().min(buf.len());
        buf[..n].copy_from_slice(&remaining[..n]);
        self.position += n;
        n
    }
}

impl Read for FetchStream {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        Ok(self.read_into(buf))
    }
}

impl AsyncRead for FetchStream {
    fn poll_read(
        self: Pin<&mut Self>,
        _cx: &mut Context<'_>,
        buf: &mut ReadBuf<'_>,
    ) -> Poll<io::Result<()>> {
        let this = self.get_mut();
        let n = this.read_into(buf.initialize_unfilled());
        buf.advance(n);
        Poll::Ready(Ok(()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use crate::fetch::RequestMethod;
    use crate::transport::MockApiProxy;
    use tokio::io::AsyncReadExt;

    const URL: &str = "http://www.google.com";

    fn expected_request(method: RequestMethod) -> FetchRequest {
        FetchRequest::new(method, URL)
            .follow_redirects(true)
            .must_validate_server_certificate(false)
    }

    #[tokio::test]
    async fn test_stream_with_header_map() {
        let mock = MockApiProxy::new();
        mock.expect_call(
            SERVICE_NAME,
            FETCH_METHOD,
            expected_request(RequestMethod::Post)
                .header("Content-type", "application/x-www-form-urlencoded"),
            FetchResponse::default(),
        );

        let options = StreamContextOptions::new()
            .method(RequestMethod::Post)
            .header_map([("Content-type", "application/x-www-form-urlencoded")]);
        let stream = FetchStream::open(&mock, URL, OpenMode::parse("a+"), &options).await;

        assert!(stream.is_ok());
        assert_eq!(mock.call_count(), 1);
        mock.verify().unwrap();
    }

    #[tokio::test]
    async fn test_stream_with_header_string() {
        let mock = MockApiProxy::new();
        mock.expect_call(
            SERVICE_NAME,
            FETCH_METHOD,
            expected_request(RequestMethod::Post)
                .header("Content-type", "application/x-www-form-urlencoded"),
            FetchResponse::default(),
        );

        let options = StreamContextOptions::new()
            .method(RequestMethod::Post)
            .header_block("Content-type: application/x-www-form-urlencoded");
        FetchStream::open(&mock, URL, OpenMode::parse("a+"), &options)
            .await
            .unwrap();
        mock.verify().unwrap();
    }

    #[tokio::test]
    async fn test_stream_with_multi_header_string() {
        let mock = MockApiProxy::new();
        mock.expect_call(
            SERVICE_NAME,
            FETCH_METHOD,
            expected_request(RequestMethod::Post)
                .header("Content-Type", "application/octet-stream")
                .header("X-Google-RPC-Service-Deadline", "60")
                .header("X-Google-RPC-Service-Endpoint", "app-engine-apis")
                .header("X-Google-RPC-Service-Method", "/VMRemoteAPI.CallRemoteAPI")
                .header("User-Agent", "some_user_agent_string"),
            FetchResponse::default(),
        );

        let options = StreamContextOptions::new()
            .method(RequestMethod::Post)
            .header_block(
                "Content-Type: application/octet-stream\r\n\
                 X-Google-RPC-Service-Deadline: 60\n\
                 X-Google-RPC-Service-Endpoint: app-engine-apis\r\
                 X-Google-RPC-Service-Method: /VMRemoteAPI.CallRemoteAPI\n",
            )
            .user_agent("some_user_agent_string");
        FetchStream::open(&mock, URL, OpenMode::parse("a+"), &options)
            .await
            .unwrap();
        mock.verify().unwrap();
    }

    #[tokio::test]
    async fn test_fetch_with_payload() {
        let payload = "var1=some_content&var2=some_content2";
        let mock = MockApiProxy::new();
        mock.expect_call(
            SERVICE_NAME,
            FETCH_METHOD,
            expected_request(RequestMethod::Post).payload(payload),
            FetchResponse::default(),
        );

        let options = StreamContextOptions::new()
            .method(RequestMethod::Post)
            .content(payload);
        FetchStream::open(&mock, URL, OpenMode::parse("a+"), &options)
            .await
            .unwrap();
        mock.verify().unwrap();
    }

    #[tokio::test]
    async fn test_fetch_with_deadline() {
        let mock = MockApiProxy::new();
        mock.expect_call(
            SERVICE_NAME,
            FETCH_METHOD,
            expected_request(RequestMethod::Post).deadline(5.0),
            FetchResponse::default(),
        );

        let options = StreamContextOptions::new()
            .method(RequestMethod::Post)
            .timeout(5.0);
        FetchStream::open(&mock, URL, OpenMode::parse("a+"), &options)
            .await
            .unwrap();
        mock.verify().unwrap();
    }

    #[tokio::test]
    async fn test_transport_failure_surfaces() {
        let mock = MockApiProxy::new();
        mock.expect_failure(
            SERVICE_NAME,
            FETCH_METHOD,
            expected_request(RequestMethod::Get),
            || Error::transport(SERVICE_NAME, FETCH_METHOD, "connection refused"),
        );

        let err = FetchStream::open(&mock, URL, OpenMode::read(), &StreamContextOptions::new())
            .await
            .unwrap_err();
        assert!(err.is_transport());
        assert_eq!(mock.call_count(), 1);
    }

    #[tokio::test]
    async fn test_invalid_url_makes_no_call() {
        let mock = MockApiProxy::new();
        let err = FetchStream::open(&mock, "no scheme", OpenMode::read(), &StreamContextOptions::new())
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Url(_)));
        assert_eq!(mock.call_count(), 0);
    }

    #[tokio::test]
    async fn test_reading_body() {
        let mut stream = FetchStream::from_response(
            URL,
            OpenMode::read(),
            FetchResponse::new(200, "hello world").header("Content-Type", "text/plain"),
        );
        assert_eq!(stream.len(), 11);
        assert!(!stream.eof());

        let mut first = [0u8; 5];
        Read::read_exact(&mut stream, &mut first).unwrap();
        assert_eq!(&first, b"hello");
        assert_eq!(&stream.remaining()[..], b" world");

        let mut rest = String::new();
        AsyncReadExt::read_to_string(&mut stream, &mut rest).await.unwrap();
        assert_eq!(rest, " world");
        assert!(stream.eof());

        let mut more = [0u8; 4];
        assert_eq!(Read::read(&mut stream, &mut more).unwrap(), 0);
        assert_eq!(
            stream.response_header_lines(),
            vec!["HTTP/1.1 200 OK", "Content-Type: text/plain"]
        );
        assert_eq!(stream.final_url(), URL);
        assert_eq!(&stream.into_bytes()[..], b"hello world");
    }

    #[test]
    fn test_open_modes() {
        assert!(OpenMode::parse("r").is_read_oriented());
        assert!(OpenMode::parse("rb").is_read_oriented());
        assert!(OpenMode::parse("a+").is_read_oriented());
        assert!(!OpenMode::parse("w").is_read_oriented());
        assert_eq!(OpenMode::default().as_str(), "r");
    }
}
