// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! Local fetch execution
//!
//! Serves the "Fetch" call in-process when there is no platform endpoint,
//! e.g. on a developer machine.

use std::collections::HashMap;
use std::time::Instant;

use async_trait::async_trait;
use parking_lot::Mutex;
use reqwest::redirect::Policy;
use reqwest::Client;
use url::Url;

use super::{call_label, ApiTransport};
use crate::config::UrlFetchConfig;
use crate::error::{Error, Result};
use crate::fetch::{
    FetchErrorCode, FetchRequest, FetchResponse, HeaderEntry, FETCH_METHOD, SERVICE_NAME,
};

/// Transport executing fetches with a local HTTP client
pub struct DirectTransport {
    config: UrlFetchConfig,
    /// Clients keyed by (follow redirects, validate certificates)
    clients: Mutex<HashMap<(bool, bool), Client>>,
}

impl DirectTransport {
    /// Create a transport with default configuration
    pub fn new() -> Self {
        Self::with_config(UrlFetchConfig::default())
    }

    /// Create a transport with custom configuration
    pub fn with_config(config: UrlFetchConfig) -> Self {
        Self {
            config,
            clients: Mutex::new(HashMap::new()),
        }
    }

    /// Get transport configuration
    pub fn config(&self) -> &UrlFetchConfig {
        &self.config
    }

    fn client(&self, follow_redirects: bool, validate_certificate: bool) -> Result<Client> {
        let mut clients = self.clients.lock();
        if let Some(client) = clients.get(&(follow_redirects, validate_certificate)) {
            return Ok(client.clone());
        }

        let redirect = if follow_redirects {
            Policy::limited(self.config.max_redirects)
        } else {
            Policy::none()
        };
        let client = Client::builder()
            .user_agent(&self.config.user_agent)
            .redirect(redirect)
            .danger_accept_invalid_certs(!validate_certificate)
            .build()?;

        clients.insert((follow_redirects, validate_certificate), client.clone());
        Ok(client)
    }

    fn map_send_error(&self, request: &FetchRequest, e: reqwest::Error) -> Error {
        let label = call_label(SERVICE_NAME, FETCH_METHOD);
        if e.is_timeout() {
            let deadline = request
                .deadline_duration()
                .unwrap_or(self.config.default_deadline);
            Error::timeout_with_url(label, deadline.as_millis() as u64, request.url.as_str())
        } else if e.is_redirect() {
            Error::remote_fetch(FetchErrorCode::TooManyRedirects, e.to_string(), request.url.as_str())
        } else if e.is_connect() {
            Error::remote_fetch(FetchErrorCode::ConnectionError, e.to_string(), request.url.as_str())
        } else {
            Error::Http(e)
        }
    }
}

impl Default for DirectTransport {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ApiTransport for DirectTransport {
    async fn make_call(
        &self,
        service: &str,
        method: &str,
        request: &FetchRequest,
    ) -> Result<FetchResponse> {
        if service != SERVICE_NAME || method != FETCH_METHOD {
            return Err(Error::transport(
                service,
                method,
                "only urlfetch.Fetch is served by the direct transport",
            ));
        }

        let url = Url::parse(&request.url).map_err(|e| {
            Error::remote_fetch(FetchErrorCode::InvalidUrl, e.to_string(), request.url.as_str())
        })?;

        let start = Instant::now();
        let client = self.client(request.follow_redirects, request.must_validate_server_certificate)?;

        let mut builder = client.request(request.method.to_reqwest(), url);

        for header in &request.headers {
            builder = builder.header(header.key.as_str(), header.value.as_str());
        }

        if let Some(ref payload) = request.payload {
            builder = builder.body(payload.clone());
        }

        builder = builder.timeout(
            request
                .deadline_duration()
                .unwrap_or(self.config.default_deadline),
        );

        let response = builder
            .send()
            .await
            .map_err(|e| self.map_send_error(request, e))?;

        let status_code = response.status().as_u16();
        let final_url = response.url().to_string();
        let headers = response
            .headers()
            .iter()
            .map(|(name, value)| {
                HeaderEntry::new(
                    name.as_str(),
                    String::from_utf8_lossy(value.as_bytes()).into_owned(),
                )
            })
            .collect();

        let content = response
            .bytes()
            .await
            .map_err(|e| self.map_send_error(request, e))?;

        tracing::debug!(
            method = %request.method,
            url = %request.url,
            status = status_code,
            time_ms = start.elapsed().as_millis() as u64,
            "Direct fetch completed"
        );

        Ok(FetchResponse {
            content,
            status_code,
            headers,
            final_url: Some(final_url),
            content_was_truncated: false,
        })
    }

    fn name(&self) -> &'static str {
        "direct"
    }
}
