//! Core resource pool implementation.

use crate::config::{PreservePlacement, ResourcePoolConfig};
use crate::error::SourceUnavailable;
use crate::identity::{self, DEFAULT_USER_AGENT};
use crate::proxy::ProxyEndpoint;
use crate::source::{FreeProxyListSource, ProxySource};

use log::{debug, info, warn};
use rand::seq::IndexedRandom;
use std::sync::Arc;
use tokio::sync::Mutex;

/// Snapshot of the pool's contents.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PoolStats {
    /// Proxies currently on the stack.
    pub available: usize,
    /// Loaded user agents.
    pub identities: usize,
}

/// A LIFO stack of proxy endpoints that refills itself from a remote
/// source, together with a fixed set of user agents.
///
/// Every proxy operation holds the stack lock for its full duration,
/// including the remote fetch of a refresh, so at most one refresh runs at
/// a time and other callers wait for it.
pub struct ResourcePool {
    /// Proxies, top of the stack is the end of the vector.
    proxies: Mutex<Vec<ProxyEndpoint>>,
    /// User agents, never empty.
    identities: Vec<String>,
    /// Where fresh proxies come from.
    source: Box<dyn ProxySource>,
    /// Configuration for the pool.
    pub config: ResourcePoolConfig,
}

impl std::fmt::Debug for ResourcePool {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResourcePool")
            .field("identities", &self.identities)
            .field("source", &self.source.name())
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl ResourcePool {
    /// Create a pool backed by the configured free-proxy-list page.
    /// This will fetch the initial proxy list before returning.
    pub async fn new(config: ResourcePoolConfig) -> Result<Arc<Self>, SourceUnavailable> {
        let source = FreeProxyListSource::new(&config.source_url, config.fetch_timeout)?;
        Self::with_source(config, source).await
    }

    /// Create a pool backed by an arbitrary proxy source.
    pub async fn with_source(
        config: ResourcePoolConfig,
        source: impl ProxySource + 'static,
    ) -> Result<Arc<Self>, SourceUnavailable> {
        let identities = identity::load(&config.identity_dir, config.full_identities);

        info!("Initializing proxy pool from {}", source.name());
        let proxies = source.fetch().await.map_err(|e| {
            warn!("Failed to fetch initial proxy list from {}: {}", source.name(), e);
            e
        })?;
        info!(
            "Proxy pool initialized with {} proxies and {} user agents",
            proxies.len(),
            identities.len()
        );

        Ok(Arc::new(Self {
            proxies: Mutex::new(proxies),
            identities,
            source: Box::new(source),
            config,
        }))
    }

    /// Return a random user agent.
    pub fn select_identity(&self) -> &str {
        self.identities
            .choose(&mut rand::rng())
            .map(String::as_str)
            .unwrap_or(DEFAULT_USER_AGENT)
    }

    /// Pop a proxy, refreshing from the source when the stack runs low.
    ///
    /// - more than `refresh_threshold` proxies: plain pop.
    /// - empty: replace the stack with a fresh batch, then pop.
    /// - otherwise: set the remaining proxies aside, replace the stack with a
    ///   fresh batch, put them back per `preserve_placement`, then pop.
    pub async fn acquire_proxy(&self) -> Result<ProxyEndpoint, SourceUnavailable> {
        let mut proxies = self.proxies.lock().await;

        if proxies.len() > self.config.refresh_threshold {
            if let Some(proxy) = proxies.pop() {
                debug!("Acquired proxy {} ({} left)", proxy, proxies.len());
                return Ok(proxy);
            }
        }

        let fresh = self.refresh(proxies.len()).await?;
        let preserved = std::mem::take(&mut *proxies);
        *proxies = match self.config.preserve_placement {
            PreservePlacement::Top => fresh.into_iter().chain(preserved).collect(),
            PreservePlacement::Bottom => preserved.into_iter().chain(fresh).collect(),
        };

        let proxy = proxies.pop().ok_or(SourceUnavailable::Exhausted)?;
        debug!("Acquired proxy {} ({} left)", proxy, proxies.len());
        Ok(proxy)
    }

    /// Push a proxy back after a successful request.
    pub async fn release_proxy(&self, proxy: ProxyEndpoint) {
        let mut proxies = self.proxies.lock().await;
        debug!("Released proxy {}", proxy);
        proxies.push(proxy);
    }

    /// Number of proxies currently on the stack.
    pub async fn available(&self) -> usize {
        self.proxies.lock().await.len()
    }

    /// Get statistics about the pool.
    pub async fn stats(&self) -> PoolStats {
        PoolStats {
            available: self.available().await,
            identities: self.identities.len(),
        }
    }

    async fn refresh(&self, preserved: usize) -> Result<Vec<ProxyEndpoint>, SourceUnavailable> {
        info!(
            "Refreshing proxy pool from {} ({} proxies preserved)",
            self.source.name(),
            preserved
        );
        match self.source.fetch().await {
            Ok(fresh) => {
                info!("Fetched {} proxies from {}", fresh.len(), self.source.name());
                Ok(fresh)
            }
            Err(e) => {
                warn!("Failed to refresh proxies from {}: {}", self.source.name(), e);
                Err(e)
            }
        }
    }
}
