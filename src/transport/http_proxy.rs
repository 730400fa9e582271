// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! RPC over HTTP to the platform API endpoint

use std::time::{Duration, Instant};

use async_trait::async_trait;
use reqwest::redirect::Policy;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use url::Url;

use super::{call_label, ApiTransport};
use crate::config::UrlFetchConfig;
use crate::error::{Error, Result};
use crate::fetch::{FetchErrorCode, FetchRequest, FetchResponse};

/// Header naming the API endpoint
pub const ENDPOINT_HEADER: &str = "X-Google-RPC-Service-Endpoint";

/// Header naming the remote method handling the call
pub const METHOD_HEADER: &str = "X-Google-RPC-Service-Method";

/// Header carrying the call deadline in seconds
pub const DEADLINE_HEADER: &str = "X-Google-RPC-Service-Deadline";

const ENDPOINT_VALUE: &str = "app-engine-apis";
const METHOD_VALUE: &str = "/VMRemoteAPI.CallRemoteAPI";

#[derive(Debug, Serialize)]
struct RpcEnvelope<'a> {
    service_name: &'a str,
    method: &'a str,
    request: &'a FetchRequest,
    #[serde(skip_serializing_if = "Option::is_none")]
    request_id: Option<&'a str>,
}

#[derive(Debug, Deserialize)]
struct RpcReply {
    #[serde(default)]
    response: Option<FetchResponse>,
    #[serde(default)]
    error: Option<RpcError>,
}

#[derive(Debug, Deserialize)]
struct RpcError {
    code: i32,
    #[serde(default)]
    detail: String,
}

/// Transport posting calls to the platform API endpoint
#[derive(Debug, Clone)]
pub struct HttpApiProxy {
    client: Client,
    config: UrlFetchConfig,
    endpoint: Url,
}

impl HttpApiProxy {
    /// Create a proxy configured from the environment
    pub fn new() -> Result<Self> {
        Self::with_config(UrlFetchConfig::from_env()?)
    }

    /// Create a proxy with custom configuration
    pub fn with_config(config: UrlFetchConfig) -> Result<Self> {
        let endpoint = config.api_url()?;
        let client = Client::builder().redirect(Policy::none()).build()?;

        Ok(Self {
            client,
            config,
            endpoint,
        })
    }

    /// Endpoint calls are posted to
    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    /// Get proxy configuration
    pub fn config(&self) -> &UrlFetchConfig {
        &self.config
    }

    fn send_error(&self, service: &str, method: &str, deadline: Duration, url: &str, e: reqwest::Error) -> Error {
        if e.is_timeout() {
            Error::timeout_with_url(call_label(service, method), deadline.as_millis() as u64, url)
        } else {
            Error::transport(service, method, e.to_string())
        }
    }
}

#[async_trait]
impl ApiTransport for HttpApiProxy {
    async fn make_call(
        &self,
        service: &str,
        method: &str,
        request: &FetchRequest,
    ) -> Result<FetchResponse> {
        let start = Instant::now();
        let deadline = request
            .deadline_duration()
            .unwrap_or(self.config.default_deadline);

        let envelope = RpcEnvelope {
            service_name: service,
            method,
            request,
            request_id: self.config.ticket.as_deref(),
        };

        let response = self
            .client
            .post(self.endpoint.clone())
            .header(ENDPOINT_HEADER, ENDPOINT_VALUE)
            .header(METHOD_HEADER, METHOD_VALUE)
            .header(DEADLINE_HEADER, deadline.as_secs_f64().to_string())
            .timeout(deadline)
            .json(&envelope)
            .send()
            .await
            .map_err(|e| self.send_error(service, method, deadline, &request.url, e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(Error::transport(
                service,
                method,
                format!("API endpoint returned {}", status),
            ));
        }

        let body = response
            .bytes()
            .await
            .map_err(|e| self.send_error(service, method, deadline, &request.url, e))?;

        tracing::debug!(
            rpc = %call_label(service, method),
            url = %request.url,
            time_ms = start.elapsed().as_millis() as u64,
            "API call completed"
        );

        let reply: RpcReply = serde_json::from_slice(&body).map_err(|e| {
            Error::transport(service, method, format!("unreadable reply: {}", e))
        })?;

        match reply {
            RpcReply {
                error: Some(error), ..
            } => Err(match FetchErrorCode::from_code(error.code) {
                FetchErrorCode::DeadlineExceeded => Error::timeout_with_url(
                    call_label(service, method),
                    deadline.as_millis() as u64,
                    request.url.as_str(),
                ),
                FetchErrorCode::Ok => Error::transport(service, method, "error reply carrying OK code"),
                code => Error::remote_fetch(code, error.detail, request.url.as_str()),
            }),
            RpcReply {
                response: Some(response),
                ..
            } => Ok(response),
            _ => Err(Error::transport(service, method, "reply carried neither response nor error")),
        }
    }

    fn name(&self) -> &'static str {
        "http-api-proxy"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fetch::{FETCH_METHOD, SERVICE_NAME};
    use serde_json::{json, Value};
    use wiremock::matchers::{header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    async fn proxy_for(server: &MockServer) -> HttpApiProxy {
        let url = Url::parse(&server.uri()).unwrap();
        let config = UrlFetchConfig::new()
            .api_host(url.host_str().unwrap())
            .api_port(url.port().unwrap())
            .ticket("ticket-1");
        HttpApiProxy::with_config(config).unwrap()
    }

    #[tokio::test]
    async fn test_posts_envelope_and_decodes_response() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/rpc_http"))
            .and(header(ENDPOINT_HEADER, "app-engine-apis"))
            .and(header(METHOD_HEADER, "/VMRemoteAPI.CallRemoteAPI"))
            .and(header(DEADLINE_HEADER, "5"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "response": {
                    "content": "aGVsbG8=",
                    "status_code": 200,
                    "headers": [{"key": "Content-Type", "value": "text/plain"}]
                }
            })))
            .expect(1)
            .mount(&server)
            .await;

        let proxy = proxy_for(&server).await;
        let request = FetchRequest::post("http://www.google.com")
            .header("Content-type", "application/x-www-form-urlencoded")
            .payload("a=1")
            .deadline(5.0);
        let response = proxy
            .make_call(SERVICE_NAME, FETCH_METHOD, &request)
            .await
            .unwrap();

        assert_eq!(response.status_code, 200);
        assert_eq!(&response.content[..], b"hello");
        assert_eq!(response.content_type(), Some("text/plain"));

        let received = server.received_requests().await.unwrap();
        let sent: Value = serde_json::from_slice(&received[0].body).unwrap();
        assert_eq!(sent["service_name"], "urlfetch");
        assert_eq!(sent["method"], "Fetch");
        assert_eq!(sent["request_id"], "ticket-1");
        assert_eq!(sent["request"]["url"], "http://www.google.com");
        assert_eq!(sent["request"]["method"], "POST");
        assert_eq!(sent["request"]["payload"], "YT0x");
        assert_eq!(sent["request"]["deadline"], 5.0);
        assert_eq!(sent["request"]["follow_redirects"], true);
        assert_eq!(sent["request"]["must_validate_server_certificate"], false);
    }

    #[tokio::test]
    async fn test_remote_error_reply() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "error": {"code": 7, "detail": "no such host"}
            })))
            .mount(&server)
            .await;

        let proxy = proxy_for(&server).await;
        let err = proxy
            .make_call(SERVICE_NAME, FETCH_METHOD, &FetchRequest::get("http://nx.invalid"))
            .await
            .unwrap_err();

        assert_eq!(err.fetch_code(), Some(FetchErrorCode::DnsError));
        assert_eq!(err.url(), Some("http://nx.invalid"));
    }

    #[tokio::test]
    async fn test_deadline_exceeded_reply_is_timeout() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "error": {"code": 5}
            })))
            .mount(&server)
            .await;

        let proxy = proxy_for(&server).await;
        let err = proxy
            .make_call(SERVICE_NAME, FETCH_METHOD, &FetchRequest::get("http://slow").deadline(1.0))
            .await
            .unwrap_err();

        assert!(err.is_timeout());
    }

    #[tokio::test]
    async fn test_endpoint_failure_is_transport_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(503))
            .mount(&server)
            .await;

        let proxy = proxy_for(&server).await;
        let err = proxy
            .make_call(SERVICE_NAME, FETCH_METHOD, &FetchRequest::get("http://a"))
            .await
            .unwrap_err();

        assert!(err.is_transport());
    }

    #[tokio::test]
    async fn test_client_side_timeout() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({"response": {"status_code": 200}}))
                    .set_delay(Duration::from_secs(2)),
            )
            .mount(&server)
            .await;

        let proxy = proxy_for(&server).await;
        let err = proxy
            .make_call(SERVICE_NAME, FETCH_METHOD, &FetchRequest::get("http://a").deadline(0.2))
            .await
            .unwrap_err();

        assert!(err.is_timeout());
    }
}
