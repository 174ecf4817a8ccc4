//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! Relay and middleware produce:
//!     → logging.rs (structured log events via tracing)
//!     → metrics.rs (counters and histograms)
//!
//! Consumers:
//!     → stdout (fmt subscriber)
//!     → Metrics endpoint (Prometheus scrape), when enabled
//! ```
//!
//! # Design Decisions
//! - Request ID flows through every log line of a request
//! - Assertion and API key values are never logged
//! - Metrics are cheap (no-ops when no recorder is installed)

pub mod logging;
pub mod metrics;
