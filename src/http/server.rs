//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create Axum Router with both addressing modes
//! - Wire up middleware (tracing with request ID)
//! - Own the shared cache and start its sweeper
//! - Serve until the shutdown signal fires

use std::sync::Arc;

use axum::{
    body::Body,
    extract::State,
    http::Request,
    response::Response,
    routing::any,
    Router,
};
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower_http::trace::TraceLayer;

use crate::cache::sweeper::CacheSweeper;
use crate::cache::InMemoryCache;
use crate::config::{validate_config, ConfigError, ProxyConfig, ValidationError};
use crate::http::request::make_request_span;
use crate::proxy::target::is_absolute_form;
use crate::proxy::{AddressingMode, Proxy};

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub proxy: Arc<Proxy>,
}

/// HTTP server for the caching proxy.
pub struct HttpServer {
    router: Router,
    config: ProxyConfig,
    cache: InMemoryCache,
}

impl HttpServer {
    /// Create a new HTTP server with the given configuration.
    pub fn new(config: ProxyConfig) -> Result<Self, ConfigError> {
        validate_config(&config).map_err(ConfigError::Validation)?;

        let cache = InMemoryCache::new();
        let proxy = Proxy::from_config(&config, Arc::new(cache.clone())).map_err(|e| {
            ConfigError::Validation(vec![ValidationError::new("upstream.base_url", e.to_string())])
        })?;

        let state = AppState {
            proxy: Arc::new(proxy),
        };

        let router = Self::build_router(&config, state);
        Ok(Self {
            router,
            config,
            cache,
        })
    }

    /// Build the Axum router with all middleware layers.
    fn build_router(config: &ProxyConfig, state: AppState) -> Router {
        Router::new()
            .route(&config.routes.parameterized_path, any(parameterized_handler))
            .fallback(pass_through_handler)
            .with_state(state)
            .layer(TraceLayer::new_for_http().make_span_with(make_request_span::<Body>))
    }

    /// Run the server, accepting connections on the given listener.
    pub async fn run(
        self,
        listener: TcpListener,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(
            address = %addr,
            parameterized_path = %self.config.routes.parameterized_path,
            cache_enabled = self.config.cache.enabled,
            ttl_secs = self.config.cache.ttl_secs,
            "HTTP server starting"
        );

        if self.config.cache.enabled {
            let sweeper = CacheSweeper::new(self.cache.clone(), self.config.cache.sweep_interval());
            tokio::spawn(sweeper.run(shutdown.resubscribe()));
        }

        axum::serve(listener, self.router)
            .with_graceful_shutdown(async move {
                let _ = shutdown.recv().await;
                tracing::info!("Shutdown signal received");
            })
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }

    /// Get a reference to the config.
    pub fn config(&self) -> &ProxyConfig {
        &self.config
    }

    /// The cache shared by every request this server handles.
    pub fn cache(&self) -> &InMemoryCache {
        &self.cache
    }
}

/// Target taken from the `url` query parameter.
///
/// The router matches on path alone, so a forward-proxy request for
/// `http://origin/proxy` lands here too; its absolute-form target is
/// forwarded as-is.
async fn parameterized_handler(State(state): State<AppState>, request: Request<Body>) -> Response {
    let mode = if is_absolute_form(request.uri()) {
        AddressingMode::PassThrough
    } else {
        AddressingMode::Parameterized
    };
    state.proxy.handle(mode, request).await
}

/// Target taken from the request line itself.
async fn pass_through_handler(State(state): State<AppState>, request: Request<Body>) -> Response {
    state.proxy.handle(AddressingMode::PassThrough, request).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::StatusCode;
    use tower::ServiceExt;

    fn server() -> HttpServer {
        HttpServer::new(ProxyConfig::default()).unwrap()
    }

    async fn body_text(response: Response) -> String {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    #[tokio::test]
    async fn test_parameterized_route_requires_url() {
        let response = server()
            .router
            .oneshot(Request::builder().uri("/proxy").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(body_text(response).await, "Missing 'url' query parameter");
    }

    #[tokio::test]
    async fn test_pass_through_needs_absolute_target_without_upstream() {
        let response = server()
            .router
            .oneshot(Request::builder().uri("/anything").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_cache_hit_through_router() {
        let server = server();
        crate::cache::Cache::set(
            server.cache(),
            "GET:http://origin.invalid/page",
            bytes::Bytes::from_static(b"cached page"),
            std::time::Duration::from_secs(60),
        )
        .unwrap();

        let response = server
            .router
            .oneshot(
                Request::builder()
                    .uri("/proxy?url=http://origin.invalid/page")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_text(response).await, "cached page");
    }

    #[test]
    fn test_invalid_config_is_rejected() {
        let mut config = ProxyConfig::default();
        config.upstream.request_timeout_secs = 0;
        assert!(matches!(HttpServer::new(config), Err(ConfigError::Validation(_))));
    }
}
