//! Caching forward HTTP proxy.
//!
//! Requests are forwarded unmodified to their origin and the response is
//! relayed back. Successful GET responses are kept in a TTL cache and served
//! from there while they remain fresh.

pub mod cache;
pub mod config;
pub mod http;
pub mod lifecycle;
pub mod observability;
pub mod proxy;

pub use cache::{Cache, CacheError, InMemoryCache};
pub use config::ProxyConfig;
pub use http::HttpServer;
pub use lifecycle::Shutdown;
pub use proxy::{Proxy, ProxyError};
