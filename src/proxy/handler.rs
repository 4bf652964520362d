//! Per-request orchestration of cache and forwarder.
//!
//! ```text
//! Received → TargetResolved ─┬─ CacheHit → Served
//!                            └─ CacheMiss → Dispatched → ResponseReceived
//!                                 → BodyRead → [CachePopulated] → Relayed
//! ```
//!
//! Any step may end the request with a [`ProxyError`]; nothing after the
//! failing step runs. Client disconnects drop the in-flight future, which
//! abandons the origin call before any cache write.

use std::sync::Arc;
use std::time::{Duration, Instant};

use axum::body::Body;
use axum::http::{Method, Request};
use axum::response::{IntoResponse, Response};
use bytes::Bytes;
use url::Url;

use crate::cache::{policy, Cache, CacheKey};
use crate::config::ProxyConfig;
use crate::observability::metrics;
use crate::proxy::error::ProxyError;
use crate::proxy::forward::Forwarder;
use crate::proxy::target::{resolve_target, AddressingMode};

/// How a request that did not fail was answered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// Served from the cache without contacting the origin.
    Hit,
    /// Forwarded because no usable entry existed.
    Miss,
    /// Forwarded without consulting the cache (non-GET or cache disabled).
    Bypass,
}

impl Outcome {
    fn as_str(self) -> &'static str {
        match self {
            Outcome::Hit => "hit",
            Outcome::Miss => "miss",
            Outcome::Bypass => "bypass",
        }
    }
}

/// Caching forward proxy.
///
/// Owns no request state; holds the shared cache, the outbound client and
/// the cache policy settings.
pub struct Proxy {
    cache: Arc<dyn Cache>,
    forwarder: Forwarder,
    upstream: Option<Url>,
    caching: bool,
    ttl: Duration,
}

impl Proxy {
    pub fn new(
        cache: Arc<dyn Cache>,
        forwarder: Forwarder,
        upstream: Option<Url>,
        caching: bool,
        ttl: Duration,
    ) -> Self {
        Self {
            cache,
            forwarder,
            upstream,
            caching,
            ttl,
        }
    }

    /// Build a proxy from configuration around the given cache backend.
    pub fn from_config(config: &ProxyConfig, cache: Arc<dyn Cache>) -> Result<Self, url::ParseError> {
        let upstream = config.upstream.base_url.as_deref().map(Url::parse).transpose()?;
        Ok(Self::new(
            cache,
            Forwarder::new(&config.upstream),
            upstream,
            config.cache.enabled,
            config.cache.ttl(),
        ))
    }

    /// Handle one inbound request, turning every failure into its status code.
    pub async fn handle(&self, mode: AddressingMode, request: Request<Body>) -> Response {
        let start = Instant::now();
        let method = request.method().clone();

        match self.serve(mode, request).await {
            Ok((response, outcome)) => {
                let status = response.status();
                tracing::debug!(
                    method = %method,
                    status = status.as_u16(),
                    outcome = outcome.as_str(),
                    "Request completed"
                );
                metrics::record_request(method.as_str(), status.as_u16(), outcome.as_str(), start);
                response
            }
            Err(e) => {
                let status = e.status();
                if status.is_server_error() {
                    tracing::error!(method = %method, status = status.as_u16(), error = %e, "Proxy request failed");
                } else {
                    tracing::warn!(method = %method, status = status.as_u16(), error = %e, "Rejected request");
                }
                metrics::record_request(method.as_str(), status.as_u16(), "error", start);
                e.into_response()
            }
        }
    }

    /// Run the request through resolution, cache probe, forwarding and cache
    /// population.
    pub async fn serve(
        &self,
        mode: AddressingMode,
        request: Request<Body>,
    ) -> Result<(Response, Outcome), ProxyError> {
        let (parts, body) = request.into_parts();
        let target = resolve_target(mode, &parts, self.upstream.as_ref())?;
        let method = parts.method.clone();
        let key = CacheKey::new(&method, &target);
        let cacheable = self.caches(&method);

        if cacheable {
            if let Some(cached) = self.cache.get(key.as_str()) {
                metrics::record_cache_hit();
                tracing::debug!(key = %key, bytes = cached.len(), "Cache hit");
                return Ok((Response::new(Body::from(cached)), Outcome::Hit));
            }
            metrics::record_cache_miss();
            tracing::debug!(key = %key, "Cache miss");
        }

        let outbound = self
            .forwarder
            .build_request(Request::from_parts(parts, body), &target)?;

        tracing::debug!(method = %method, target = %target, "Forwarding to origin");
        let response = self.forwarder.forward(outbound).await?;

        if self.caching && policy::should_store(&method, response.status) {
            self.store(&key, &response.body);
        }

        let outcome = if cacheable { Outcome::Miss } else { Outcome::Bypass };
        Ok((response.into_response(), outcome))
    }

    fn store(&self, key: &CacheKey, body: &Bytes) {
        match self.cache.set(key.as_str(), body.clone(), self.ttl) {
            Ok(()) => {
                metrics::record_cache_store();
                if let Some(entries) = self.cache.entry_count() {
                    metrics::record_cache_size(entries);
                }
                tracing::debug!(key = %key, bytes = body.len(), ttl = ?self.ttl, "Cached origin response");
            }
            // A failed store only costs a future cache hit.
            Err(e) => tracing::warn!(key = %key, error = %e, "Failed to cache origin response"),
        }
    }

    /// Whether this proxy consults the cache for `method`.
    pub fn caches(&self, method: &Method) -> bool {
        self.caching && policy::is_cacheable_method(method)
    }
}
