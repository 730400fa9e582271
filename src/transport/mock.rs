// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! Expectation-driven transport for tests
//!
//! Each call must match the next queued expectation exactly (service, method
//! and the full request); anything else fails the call.

use std::collections::VecDeque;

use async_trait::async_trait;
use parking_lot::Mutex;

use super::ApiTransport;
use crate::error::{Error, Result};
use crate::fetch::{FetchRequest, FetchResponse};

type ErrorFactory = Box<dyn FnOnce() -> Error + Send>;

enum Reply {
    Response(FetchResponse),
    Failure(ErrorFactory),
}

struct Expectation {
    service: String,
    method: String,
    request: FetchRequest,
    reply: Reply,
}

/// A call the mock received
#[derive(Debug, Clone, PartialEq)]
pub struct RecordedCall {
    pub service: String,
    pub method: String,
    pub request: FetchRequest,
}

/// Transport answering from queued expectations
#[derive(Default)]
pub struct MockApiProxy {
    expected: Mutex<VecDeque<Expectation>>,
    calls: Mutex<Vec<RecordedCall>>,
}

impl MockApiProxy {
    /// Create a mock with no expectations
    pub fn new() -> Self {
        Self::default()
    }

    /// Expect a call and answer it with `response`
    pub fn expect_call(
        &self,
        service: impl Into<String>,
        method: impl Into<String>,
        request: FetchRequest,
        response: FetchResponse,
    ) {
        self.expected.lock().push_back(Expectation {
            service: service.into(),
            method: method.into(),
            request,
            reply: Reply::Response(response),
        });
    }

    /// Expect a call and fail it with the error `make_error` builds
    pub fn expect_failure<F>(
        &self,
        service: impl Into<String>,
        method: impl Into<String>,
        request: FetchRequest,
        make_error: F,
    ) where
        F: FnOnce() -> Error + Send + 'static,
    {
        self.expected.lock().push_back(Expectation {
            service: service.into(),
            method: method.into(),
            request,
            reply: Reply::Failure(Box::new(make_error)),
        });
    }

    /// Calls received so far, in order
    pub fn calls(&self) -> Vec<RecordedCall> {
        self.calls.lock().clone()
    }

    /// Number of calls received
    pub fn call_count(&self) -> usize {
        self.calls.lock().len()
    }

    /// Number of expectations not yet consumed
    pub fn remaining(&self) -> usize {
        self.expected.lock().len()
    }

    /// Fail if any expectation was never called
    pub fn verify(&self) -> Result<()> {
        let expected = self.expected.lock();
        match expected.front() {
            None => Ok(()),
            Some(next) => Err(Error::transport(
                next.service.as_str(),
                next.method.as_str(),
                format!("{} expected call(s) never made", expected.len()),
            )),
        }
    }
}

#[async_trait]
impl ApiTransport for MockApiProxy {
    async fn make_call(
        &self,
        service: &str,
        method: &str,
        request: &FetchRequest,
    ) -> Result<FetchResponse> {
        self.calls.lock().push(RecordedCall {
            service: service.to_string(),
            method: method.to_string(),
            request: request.clone(),
        });

        let expectation = self
            .expected
            .lock()
            .pop_front()
            .ok_or_else(|| Error::transport(service, method, "unexpected call"))?;

        if expectation.service != service || expectation.method != method {
            return Err(Error::transport(
                service,
                method,
                format!(
                    "expected call to {}.{}",
                    expectation.service, expectation.method
                ),
            ));
        }
        if expectation.request != *request {
            return Err(Error::transport(
                service,
                method,
                format!(
                    "request mismatch: expected {:?}, got {:?}",
                    expectation.request, request
                ),
            ));
        }

        match expectation.reply {
            Reply::Response(response) => Ok(response),
            Reply::Failure(make_error) => Err(make_error()),
        }
    }

    fn name(&self) -> &'static str {
        "mock"
    }
}
