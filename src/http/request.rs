//! Request identification.
//!
//! # Responsibilities
//! - Generate a unique request ID (UUID v4) per inbound request
//! - Open the span every log line of that request is recorded in
//!
//! # Design Decisions
//! - The ID lives in the span only; relayed headers are left untouched

use std::fmt;

use axum::http::Request;
use tracing::Span;
use uuid::Uuid;

/// Identifier attached to the tracing span of one inbound request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RequestId(Uuid);

impl RequestId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for RequestId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for RequestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

/// Span factory for `TraceLayer::make_span_with`.
pub fn make_request_span<B>(request: &Request<B>) -> Span {
    tracing::info_span!(
        "request",
        request_id = %RequestId::new(),
        method = %request.method(),
        uri = %request.uri(),
    )
}
