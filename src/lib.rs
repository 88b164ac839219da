//! # proxy-rotation-pool
//!
//! A self-refreshing pool of elite proxies and rotating user agents for reqwest.
//!
//! The pool keeps a LIFO stack of proxies scraped from a free proxy list and
//! refetches the list when the stack runs low. Callers pop a proxy, use it,
//! and push it back only if it worked, so failing proxies fall out of
//! rotation on their own. A fixed list of user agents is loaded alongside
//! and handed out at random.

pub mod config;
pub mod error;
pub mod identity;
pub mod middleware;
pub mod pool;
pub mod proxy;
pub mod shared;
pub mod source;

pub use config::{PreservePlacement, ResourcePoolConfig, ResourcePoolConfigBuilder};
pub use error::{NoProxyAvailable, SourceUnavailable};
pub use identity::DEFAULT_USER_AGENT;
pub use middleware::ResourcePoolMiddleware;
pub use pool::{PoolStats, ResourcePool};
pub use proxy::ProxyEndpoint;
pub use shared::{shared, shared_with, SharedPool};
pub use source::{FreeProxyListSource, ProxySource};
