//! Edge access gateway.
//!
//! A fail-closed relay in front of a backend query service. Requests
//! without a `CF-Access-Jwt-Assertion` header are refused at the edge;
//! everything else is forwarded to a single backend origin together with the
//! caller identity headers, and the backend response is returned untouched.

pub mod client;
pub mod config;
pub mod contract;
pub mod error;
pub mod http;
pub mod lifecycle;
pub mod observability;
pub mod resilience;

pub use config::GatewayConfig;
pub use error::{GatewayError, StartupError};
pub use http::HttpServer;
pub use lifecycle::Shutdown;
