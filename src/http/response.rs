//! Error responses.
//!
//! # Responsibilities
//! - Map proxy failures to status codes (400 / 500 / 502 / 504)
//! - Give the client a short plain-text explanation
//!
//! Successful responses are relayed as received; see `proxy::forward`.

use axum::response::{IntoResponse, Response};

use crate::proxy::ProxyError;

impl IntoResponse for ProxyError {
    fn into_response(self) -> Response {
        (self.status(), self.to_string()).into_response()
    }
}
