// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! Scheme to stream-wrapper registry
//!
//! The registry is an ordinary value: create one at startup, register the
//! wrappers, and hand it to whatever opens URLs.

use std::sync::Arc;

use async_trait::async_trait;
use bytes::Bytes;
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use url::Url;

use crate::context::StreamContext;
use crate::error::{Error, Result};
use crate::stream::{FetchStream, OpenMode};
use crate::transport::ApiTransport;

/// Something that can open URLs of a scheme
#[async_trait]
pub trait StreamWrapper: Send + Sync {
    /// Open `url` using the options `context` holds for it
    async fn open(&self, url: &str, mode: OpenMode, context: &StreamContext)
        -> Result<FetchStream>;
}

/// Wrapper that opens URLs through the urlfetch RPC
#[derive(Clone)]
pub struct UrlFetchWrapper {
    transport: Arc<dyn ApiTransport>,
}

impl UrlFetchWrapper {
    /// Create a wrapper over a transport
    pub fn new<T: ApiTransport + 'static>(transport: T) -> Self {
        Self::from_arc(Arc::new(transport))
    }

    /// Create a wrapper over a shared transport
    pub fn from_arc(transport: Arc<dyn ApiTransport>) -> Self {
        Self { transport }
    }
}

#[async_trait]
impl StreamWrapper for UrlFetchWrapper {
    async fn open(
        &self,
        url: &str,
        mode: OpenMode,
        context: &StreamContext,
    ) -> Result<FetchStream> {
        let scheme = Url::parse(url)?.scheme().to_string();
        let options = context
            .options_for_scheme(&scheme)
            .cloned()
            .unwrap_or_default();
        FetchStream::open(&*self.transport, url, mode, &options).await
    }
}

/// Registry of stream wrappers keyed by lowercase scheme
#[derive(Clone, Default)]
pub struct WrapperRegistry {
    wrappers: Arc<DashMap<String, Arc<dyn StreamWrapper>>>,
}

impl WrapperRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a registry serving `http` and `https` through urlfetch
    pub fn with_urlfetch(transport: Arc<dyn ApiTransport>) -> Self {
        let registry = Self::new();
        let wrapper: Arc<dyn StreamWrapper> = Arc::new(UrlFetchWrapper::from_arc(transport));
        registry.wrappers.insert("http".to_string(), wrapper.clone());
        registry.wrappers.insert("https".to_string(), wrapper);
        registry
    }

    /// Register a wrapper for a scheme
    ///
    /// Fails if the scheme already has one; unregister it first to replace it.
    pub fn register(&self, scheme: &str, wrapper: Arc<dyn StreamWrapper>) -> Result<()> {
        match self.wrappers.entry(scheme.to_ascii_lowercase()) {
            Entry::Occupied(_) => Err(Error::WrapperExists(scheme.to_string())),
            Entry::Vacant(slot) => {
                slot.insert(wrapper);
                tracing::info!(scheme = %scheme, "Registered stream wrapper");
                Ok(())
            }
        }
    }

    /// Remove the wrapper for a scheme, returning whether one was registered
    pub fn unregister(&self, scheme: &str) -> bool {
        let removed = self.wrappers.remove(&scheme.to_ascii_lowercase()).is_some();
        if removed {
            tracing::info!(scheme = %scheme, "Unregistered stream wrapper");
        }
        removed
    }

    /// Check whether a scheme has a wrapper
    pub fn is_registered(&self, scheme: &str) -> bool {
        self.wrappers.contains_key(&scheme.to_ascii_lowercase())
    }

    /// Registered schemes, sorted
    pub fn schemes(&self) -> Vec<String> {
        let mut schemes: Vec<String> = self.wrappers.iter().map(|e| e.key().clone()).collect();
        schemes.sort();
        schemes
    }

    fn resolve(&self, url: &str) -> Result<Arc<dyn StreamWrapper>> {
        let parsed = Url::parse(url)?;
        self.wrappers
            .get(parsed.scheme())
            .map(|entry| entry.value().clone())
            .ok_or_else(|| Error::UnsupportedScheme(parsed.scheme().to_string()))
    }

    /// Open a URL with the wrapper registered for its scheme
    pub async fn open(
        &self,
        url: &str,
        mode: OpenMode,
        context: &StreamContext,
    ) -> Result<FetchStream> {
        let wrapper = self.resolve(url)?;
        wrapper.open(url, mode, context).await
    }

    /// Read the whole resource at `url`
    pub async fn get_contents(&self, url: &str, context: Option<&StreamContext>) -> Result<Bytes> {
        let default_context = StreamContext::default();
        let context = context.unwrap_or(&default_context);
        let stream = self.open(url, OpenMode::read(), context).await?;
        Ok(stream.into_bytes())
    }
}
