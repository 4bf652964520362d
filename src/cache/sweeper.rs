//! Periodic removal of expired cache entries.
//!
//! Lazy expiry on read is what keeps the cache correct; the sweeper only
//! bounds memory held by entries that are never read again.

use std::time::Duration;

use tokio::sync::broadcast;
use tokio::time;

use crate::cache::InMemoryCache;
use crate::observability::metrics;

pub struct CacheSweeper {
    cache: InMemoryCache,
    interval: Duration,
}

impl CacheSweeper {
    pub fn new(cache: InMemoryCache, interval: Duration) -> Self {
        Self { cache, interval }
    }

    pub async fn run(self, mut shutdown: broadcast::Receiver<()>) {
        if self.interval.is_zero() {
            tracing::info!("Cache sweeper disabled");
            return;
        }

        tracing::info!(interval = ?self.interval, "Cache sweeper starting");

        let mut ticker = time::interval(self.interval);
        // The first tick completes immediately; there is nothing to sweep yet.
        ticker.tick().await;

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    self.sweep();
                }
                _ = shutdown.recv() => {
                    tracing::info!("Cache sweeper received shutdown signal, exiting loop");
                    break;
                }
            }
        }
    }

    fn sweep(&self) -> usize {
        let removed = self.cache.purge_expired();
        if removed > 0 {
            tracing::debug!(removed, remaining = self.cache.len(), "Swept expired cache entries");
        }
        metrics::record_cache_size(self.cache.len());
        removed
    }
}
