//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! All subsystems produce:
//!     → logging.rs (structured tracing events)
//!     → metrics.rs (counters, gauges, histograms)
//!
//! Consumers:
//!     → stdout via tracing-subscriber
//!     → Metrics endpoint (Prometheus scrape), when enabled
//! ```
//!
//! # Design Decisions
//! - Each request runs inside a span carrying a generated request ID
//! - Metric updates are cheap enough to stay on the hot path
//! - `RUST_LOG` overrides the configured log level

pub mod logging;
pub mod metrics;
