//! Resilience subsystem.
//!
//! # Data Flow
//! ```text
//! Request to backend:
//!     → reqwest client (connect timeout + request timeout)
//!     → On connection failure: retries.rs (idempotent only, when enabled)
//!     → backoff.rs (exponential delay with jitter between attempts)
//! ```
//!
//! # Design Decisions
//! - Timeouts are non-negotiable; every backend call has a deadline
//! - Retries are off unless configured, and never replay a non-idempotent request
//! - Timeouts are not retried: a hung backend would multiply the wait

pub mod backoff;
pub mod retries;

pub use backoff::Backoff;
pub use retries::RetryPolicy;
