// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! Transports carrying the fetch RPC
//!
//! The stream adapter only knows [`ApiTransport`]. Which process actually
//! performs the fetch is up to the implementation:
//!
//! - [`HttpApiProxy`] posts the call to the platform API endpoint
//! - [`DirectTransport`] performs the fetch itself with an HTTP client
//! - [`MockApiProxy`] answers from a queue of expected calls

use std::sync::Arc;

use async_trait::async_trait;

use crate::error::Result;
use crate::fetch::{FetchRequest, FetchResponse};

mod direct;
mod http_proxy;
mod mock;

pub use direct::DirectTransport;
pub use http_proxy::{HttpApiProxy, DEADLINE_HEADER, ENDPOINT_HEADER, METHOD_HEADER};
pub use mock::{MockApiProxy, RecordedCall};

/// Something that can perform a remote API call returning a fetch response
#[async_trait]
pub trait ApiTransport: Send + Sync {
    /// Perform one call of `method` on `service`
    ///
    /// Implementations must not retry on their own account.
    async fn make_call(
        &self,
        service: &str,
        method: &str,
        request: &FetchRequest,
    ) -> Result<FetchResponse>;

    /// Short name used in logs
    fn name(&self) -> &'static str {
        "transport"
    }
}

#[async_trait]
impl<T: ApiTransport + ?Sized> ApiTransport for Arc<T> {
    async fn make_call(
        &self,
        service: &str,
        method: &str,
        request: &FetchRequest,
    ) -> Result<FetchResponse> {
        (**self).make_call(service, method, request).await
    }

    fn name(&self) -> &'static str {
        (**self).name()
    }
}

/// `service.method` label for logs and timeout errors
pub(crate) fn call_label(service: &str, method: &str) -> String {
    format!("{}.{}", service, method)
}
