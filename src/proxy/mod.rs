//! Forwarding subsystem.
//!
//! # Data Flow
//! ```text
//! inbound request
//!     → target.rs (pass-through or `url` parameter → target URL)
//!     → handler.rs (cache key, cache probe, eligibility)
//!     → forward.rs (outbound request, origin dispatch, body read)
//!     → handler.rs (cache populate, relay status + headers + body)
//! ```
//!
//! # Design Decisions
//! - One canonical handler for both addressing modes; caching applies to both
//! - Responses are fully buffered; a cache entry is always a complete body
//! - No retries; every failure is terminal for its own request only

pub mod error;
pub mod forward;
pub mod handler;
pub mod target;

pub use error::ProxyError;
pub use forward::{ForwardResponse, Forwarder};
pub use handler::{Outcome, Proxy};
pub use target::{resolve_target, AddressingMode};
