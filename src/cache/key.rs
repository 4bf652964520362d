//! Cache key derivation.

use std::fmt;

use axum::http::Method;
use url::Url;

/// Fingerprint of a cacheable request: `"<METHOD>:<target URL>"`.
///
/// The URL is taken in its normalized serialization, so two requests for the
/// same method and target always produce the same key.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey(String);

impl CacheKey {
    pub fn new(method: &Method, target: &Url) -> Self {
        Self(format!("{}:{}", method.as_str(), target.as_str()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
