//! Middleware implementation for reqwest.

use crate::config::ResourcePoolConfig;
use crate::error::NoProxyAvailable;
use crate::identity::DEFAULT_USER_AGENT;
use crate::pool::ResourcePool;
use crate::shared;

use anyhow::anyhow;
use async_trait::async_trait;
use log::{info, warn};
use reqwest::header::{HeaderValue, USER_AGENT};
use reqwest_middleware::{Error, Middleware, Next, Result};
use std::sync::Arc;

/// Middleware that sends each request through a pooled proxy with a
/// rotated user agent.
///
/// A proxy that serves a request goes back to the pool; one that fails is
/// dropped and the request is retried through the next proxy.
#[derive(Clone)]
pub struct ResourcePoolMiddleware {
    /// The resource pool.
    pool: Arc<ResourcePool>,
}

impl ResourcePoolMiddleware {
    /// Create middleware over the process-wide pool, building it from
    /// `config` on first use.
    pub async fn new(config: ResourcePoolConfig) -> Result<Self> {
        match shared::shared_with(config).await {
            Ok(pool) => {
                let stats = pool.stats().await;
                info!(
                    "Resource pool ready with {} proxies and {} user agents",
                    stats.available, stats.identities
                );
                Ok(Self { pool })
            }
            Err(e) => Err(Error::Middleware(anyhow::Error::new(e).context(NoProxyAvailable))),
        }
    }

    /// Create middleware over an existing pool.
    pub fn with_pool(pool: Arc<ResourcePool>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl Middleware for ResourcePoolMiddleware {
    async fn handle(
        &self,
        req: reqwest::Request,
        _extensions: &mut http::Extensions,
        _next: Next<'_>,
    ) -> Result<reqwest::Response> {
        let max_retries = self.pool.config.retry_count;
        let mut retry_count = 0;

        loop {
            let mut proxied_request = req.try_clone().ok_or_else(|| {
                Error::Middleware(anyhow!(
                    "Request object is not cloneable. Are you passing a streaming body?"
                        .to_string()
                ))
            })?;

            let proxy = match self.pool.acquire_proxy().await {
                Ok(proxy) => proxy,
                Err(e) => {
                    warn!("No proxy available: {}", e);
                    return Err(Error::Middleware(anyhow::Error::new(e).context(NoProxyAvailable)));
                }
            };

            let identity = self.pool.select_identity();
            let user_agent = HeaderValue::from_str(identity)
                .unwrap_or_else(|_| HeaderValue::from_static(DEFAULT_USER_AGENT));
            proxied_request.headers_mut().insert(USER_AGENT, user_agent);

            info!("Using proxy: {} (attempt {})", proxy, retry_count + 1);

            // A proxy that cannot even build a client is dropped like a failed one.
            let client = match proxy.to_reqwest_proxy().and_then(|p| {
                reqwest::Client::builder()
                    .proxy(p)
                    .timeout(self.pool.config.request_timeout)
                    .build()
            }) {
                Ok(c) => c,
                Err(e) => {
                    warn!("Failed to build client with proxy {}: {}", proxy, e);
                    retry_count += 1;
                    if retry_count > max_retries {
                        return Err(Error::Reqwest(e));
                    }
                    continue;
                }
            };

            match client.execute(proxied_request).await {
                Ok(response) => {
                    self.pool.release_proxy(proxy).await;
                    return Ok(response);
                }
                Err(err) => {
                    warn!(
                        "Request failed with proxy {} (attempt {}): {}",
                        proxy,
                        retry_count + 1,
                        err
                    );
                    retry_count += 1;
                    if retry_count > max_retries {
                        return Err(Error::Reqwest(err));
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::proxy::ProxyEndpoint;
    use crate::source::mock::ScriptedSource;
    use reqwest_middleware::ClientBuilder;
    use std::time::Duration;

    #[tokio::test]
    async fn failing_proxies_are_evicted_and_error_is_returned() {
        // Nothing listens on loopback port 9, so every attempt fails fast.
        let source = Arc::new(ScriptedSource::new());
        source.push_batch(&[]);
        let config = ResourcePoolConfig::builder()
            .retry_count(1)
            .request_timeout(Duration::from_secs(2))
            .refresh_threshold(0)
            .build();
        let pool = ResourcePool::with_source(config, Arc::clone(&source)).await.unwrap();
        for _ in 0..3 {
            pool.release_proxy(ProxyEndpoint::new("127.0.0.1", "9")).await;
        }

        let client = ClientBuilder::new(reqwest::Client::new())
            .with(ResourcePoolMiddleware::with_pool(Arc::clone(&pool)))
            .build();
        let result = client.get("http://127.0.0.1:9/").send().await;

        assert!(matches!(result, Err(Error::Reqwest(_))));
        // two attempts, both proxies dropped
        assert_eq!(pool.available().await, 1);
        assert_eq!(source.fetches(), 1);
    }

    #[tokio::test]
    async fn source_outage_surfaces_as_no_proxy_available() {
        let source = Arc::new(ScriptedSource::new());
        source.push_batch(&[]);
        source.push_failure();
        let pool = ResourcePool::with_source(ResourcePoolConfig::default(), source).await.unwrap();

        let client = ClientBuilder::new(reqwest::Client::new())
            .with(ResourcePoolMiddleware::with_pool(pool))
            .build();
        let result = client.get("http://127.0.0.1:9/").send().await;

        match result {
            Err(Error::Middleware(e)) => assert!(e.downcast_ref::<NoProxyAvailable>().is_some()),
            other => panic!("unexpected result: {:?}", other.map(|r| r.status())),
        }
    }
}
