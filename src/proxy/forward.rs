//! Outbound request construction and origin dispatch.
//!
//! # Responsibilities
//! - Mirror the inbound request (method, headers, body) onto the target URL
//! - Send it through the shared connection pool (`http` and `https` origins)
//! - Buffer the origin response body so it can be relayed and cached whole
//!
//! # Design Decisions
//! - One deadline covers the origin call and the body read; running out
//!   before the response head is a 504, during the body a 500
//! - The origin body is consumed by value; the connection goes back to the
//!   pool (or is closed) whenever it is dropped, on every exit path
//! - `Host` is not copied; the client derives it from the target URL

use std::time::Duration;

use axum::body::Body;
use axum::http::{header, HeaderMap, Request, StatusCode, Uri};
use axum::response::{IntoResponse, Response};
use bytes::Bytes;
use hyper::body::Incoming;
use hyper_rustls::{HttpsConnector, HttpsConnectorBuilder};
use hyper_util::{
    client::legacy::{connect::HttpConnector, Client},
    rt::TokioExecutor,
};
use tokio::time::{self, Instant};
use url::Url;

use crate::config::UpstreamConfig;
use crate::proxy::error::ProxyError;

/// A fully-read origin response.
#[derive(Debug, Clone)]
pub struct ForwardResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Bytes,
}

impl IntoResponse for ForwardResponse {
    fn into_response(self) -> Response {
        let mut response = Response::new(Body::from(self.body));
        *response.status_mut() = self.status;
        *response.headers_mut() = self.headers;
        response
    }
}

/// Issues outbound requests to origin servers.
///
/// Holds no per-request state; one instance is shared by all request tasks.
#[derive(Clone)]
pub struct Forwarder {
    client: Client<HttpsConnector<HttpConnector>, Body>,
    request_timeout: Duration,
    max_body_bytes: usize,
}

impl Forwarder {
    pub fn new(config: &UpstreamConfig) -> Self {
        let mut http = HttpConnector::new();
        http.set_connect_timeout(Some(config.connect_timeout()));
        // The TLS layer decides per scheme; the TCP connector must accept both.
        http.enforce_http(false);

        let connector = HttpsConnectorBuilder::new()
            .with_webpki_roots()
            .https_or_http()
            .enable_http1()
            .wrap_connector(http);

        let client = Client::builder(TokioExecutor::new()).build(connector);

        Self {
            client,
            request_timeout: config.request_timeout(),
            max_body_bytes: config.max_body_bytes,
        }
    }

    /// Build the outbound request: same method, `target` as URI, an
    /// independent copy of the inbound headers, and the inbound body stream.
    pub fn build_request(
        &self,
        request: Request<Body>,
        target: &Url,
    ) -> Result<Request<Body>, ProxyError> {
        let (parts, body) = request.into_parts();

        let uri: Uri = target
            .as_str()
            .parse()
            .map_err(|e| ProxyError::Internal(format!("Cannot build origin request: {e}")))?;

        let mut outbound = Request::builder()
            .method(parts.method)
            .uri(uri)
            .body(body)
            .map_err(|e| ProxyError::Internal(format!("Cannot build origin request: {e}")))?;
        *outbound.headers_mut() = copy_headers(&parts.headers);

        Ok(outbound)
    }

    /// Send `request` to the origin and read the complete response.
    pub async fn forward(&self, request: Request<Body>) -> Result<ForwardResponse, ProxyError> {
        let deadline = Instant::now() + self.request_timeout;

        let response = self.dispatch(request, deadline).await?;
        let (parts, body) = response.into_parts();
        let body = self.read_body(body, deadline).await?;

        Ok(ForwardResponse {
            status: parts.status,
            headers: parts.headers,
            body,
        })
    }

    async fn dispatch(
        &self,
        request: Request<Body>,
        deadline: Instant,
    ) -> Result<hyper::Response<Incoming>, ProxyError> {
        match time::timeout_at(deadline, self.client.request(request)).await {
            Ok(Ok(response)) => Ok(response),
            Ok(Err(e)) => Err(ProxyError::BadGateway(format!("Origin request failed: {e}"))),
            Err(_) => Err(ProxyError::GatewayTimeout(
                "Origin did not respond in time".to_string(),
            )),
        }
    }

    async fn read_body(&self, body: Incoming, deadline: Instant) -> Result<Bytes, ProxyError> {
        let read = axum::body::to_bytes(Body::new(body), self.max_body_bytes);
        match time::timeout_at(deadline, read).await {
            Ok(Ok(bytes)) => Ok(bytes),
            Ok(Err(e)) => Err(ProxyError::Internal(format!(
                "Failed to read origin response body: {e}"
            ))),
            // The status line already arrived; an unfinished body is a read failure.
            Err(_) => Err(ProxyError::Internal(
                "Origin response body did not complete in time".to_string(),
            )),
        }
    }
}

/// Deep copy of the inbound headers for the outbound request, minus `Host`.
///
/// Every value of a multi-valued header is kept, in order.
pub fn copy_headers(inbound: &HeaderMap) -> HeaderMap {
    let mut headers = inbound.clone();
    headers.remove(header::HOST);
    headers
}
