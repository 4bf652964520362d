//! Response cache subsystem.
//!
//! # Data Flow
//! ```text
//! proxy handler
//!     → key.rs (method + target URL → CacheKey)
//!     → policy.rs (is this method / status cacheable?)
//!     → Cache::get / Cache::set on a shared Arc<dyn Cache>
//!     → memory.rs (sharded map, lazy expiry on read)
//!
//! Optional:
//!     sweeper.rs purges expired entries on an interval
//! ```
//!
//! # Design Decisions
//! - Entries expire by time only; no size bound, no LRU
//! - Readers never block each other (per-shard reader/writer locks)
//! - The trait keeps an error channel for non-memory backends; the proxy
//!   degrades cache errors to a miss or a skipped store

pub mod key;
pub mod memory;
pub mod policy;
pub mod sweeper;

use std::time::Duration;

use bytes::Bytes;

pub use key::CacheKey;
pub use memory::InMemoryCache;

/// Default lifetime of a cached response.
pub const DEFAULT_TTL: Duration = Duration::from_secs(5 * 60);

/// Error type for cache operations.
#[derive(Debug, thiserror::Error)]
pub enum CacheError {
    /// The backing store could not be read or mutated.
    #[error("cache backend unavailable: {0}")]
    Unavailable(String),
}

/// Key-value store of response bodies with per-entry expiry.
///
/// Implementations must be safe to share across request tasks. A `get` racing
/// a `set` on the same key observes either the old or the new value, never a
/// mix of both.
pub trait Cache: Send + Sync {
    /// Store `value` under `key`, replacing any previous entry and its expiry.
    ///
    /// A zero `ttl` stores an entry that is already expired.
    fn set(&self, key: &str, value: Bytes, ttl: Duration) -> Result<(), CacheError>;

    /// Fetch the value for `key` if present and not yet expired.
    ///
    /// An expired entry found here is removed before returning `None`.
    fn get(&self, key: &str) -> Option<Bytes>;

    /// Remove the entry for `key`. Removing a missing key is not an error.
    fn delete(&self, key: &str) -> Result<(), CacheError>;

    /// Number of entries held, expired ones included, if the backend knows.
    fn entry_count(&self) -> Option<usize> {
        None
    }
}
