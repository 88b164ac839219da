//! Process-wide shared pool.

use crate::config::ResourcePoolConfig;
use crate::error::SourceUnavailable;
use crate::pool::ResourcePool;

use log::debug;
use std::future::Future;
use std::sync::Arc;
use tokio::sync::OnceCell;

static SHARED: SharedPool = SharedPool::new();

/// A lazily built pool that is constructed at most once.
///
/// Concurrent first callers wait on a single initialiser. A failed
/// initialisation is not cached: its error goes to the caller whose
/// initialiser ran, and the next call tries again.
pub struct SharedPool {
    cell: OnceCell<Arc<ResourcePool>>,
}

impl SharedPool {
    /// Create an empty slot.
    pub const fn new() -> Self {
        Self {
            cell: OnceCell::const_new(),
        }
    }

    /// Return the pool, building it with `init` if this is the first
    /// successful call.
    pub async fn get_or_try_init<F, Fut>(&self, init: F) -> Result<Arc<ResourcePool>, SourceUnavailable>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<Arc<ResourcePool>, SourceUnavailable>>,
    {
        self.cell
            .get_or_try_init(|| async {
                debug!("Building shared resource pool");
                init().await
            })
            .await
            .map(Arc::clone)
    }

    /// The pool, if it has been built.
    pub fn get(&self) -> Option<Arc<ResourcePool>> {
        self.cell.get().cloned()
    }
}

impl Default for SharedPool {
    fn default() -> Self {
        Self::new()
    }
}

/// The process-wide pool with the default configuration.
pub async fn shared() -> Result<Arc<ResourcePool>, SourceUnavailable> {
    shared_with(ResourcePoolConfig::default()).await
}

/// The process-wide pool, built from `config` if it does not exist yet.
///
/// Once the pool exists, `config` is ignored.
pub async fn shared_with(config: ResourcePoolConfig) -> Result<Arc<ResourcePool>, SourceUnavailable> {
    SHARED.get_or_try_init(|| ResourcePool::new(config)).await
}
