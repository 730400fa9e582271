// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! # urlfetch - URL streams over a remote fetch service
//!
//! Opens `http` and `https` URLs by sending one "Fetch" RPC to the platform's
//! urlfetch service and exposes the reply as a readable byte stream.
//!
//! ## Features
//!
//! - Typed stream-context options: method, header, content, timeout, user_agent
//! - Header blocks split on CRLF, CR or LF, duplicates kept in order
//! - Pluggable transports: platform API endpoint, local HTTP client, test mock
//! - Explicit scheme registry instead of process-wide globals
//!
//! ## Example
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use urlfetch::{
//!     HttpApiProxy, RequestMethod, StreamContext, StreamContextOptions, WrapperRegistry,
//! };
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let registry = WrapperRegistry::with_urlfetch(Arc::new(HttpApiProxy::new()?));
//!
//!     let context = StreamContext::http(
//!         StreamContextOptions::new()
//!             .method(RequestMethod::Post)
//!             .header_block("Content-type: application/x-www-form-urlencoded")
//!             .content("var1=some_content&var2=some_content2")
//!             .timeout(5.0),
//!     );
//!
//!     let body = registry.get_contents("http://www.google.com", Some(&context)).await?;
//!     println!("{} bytes", body.len());
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod context;
pub mod error;
pub mod fetch;
pub mod registry;
pub mod stream;
pub mod transport;

// Re-exports for convenience

// Configuration
pub use config::UrlFetchConfig;

// Context options
pub use context::{HeaderOption, StreamContext, StreamContextOptions};

// Errors
pub use error::{Error, ErrorContext, Result};

// Wire types
pub use fetch::{
    FetchErrorCode, FetchRequest, FetchResponse, HeaderEntry, RequestMethod, FETCH_METHOD,
    SERVICE_NAME,
};

// Registry
pub use registry::{StreamWrapper, UrlFetchWrapper, WrapperRegistry};

// Streams
pub use stream::{FetchStream, OpenMode};

// Transports
pub use transport::{ApiTransport, DirectTransport, HttpApiProxy, MockApiProxy, RecordedCall};

/// urlfetch version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
