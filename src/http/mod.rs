//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, route by addressing mode)
//!     → request.rs (request ID span)
//!     → proxy::Proxy (cache probe, forward, relay)
//!     → response.rs (error → status code + plain-text body)
//!     → Send to client
//! ```

pub mod request;
pub mod response;
pub mod server;

pub use request::{make_request_span, RequestId};
pub use server::{AppState, HttpServer};
