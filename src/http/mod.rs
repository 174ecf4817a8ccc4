//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, middleware stack)
//!     → request.rs (request ID assigned)
//!     → middleware/assertion.rs (401 unless CF-Access-Jwt-Assertion present)
//!     → relay.rs (build outbound request, call backend)
//!     → response.rs (relay backend response, strip hop-by-hop headers)
//!     → Send to client
//! ```

pub mod middleware;
pub mod relay;
pub mod request;
pub mod response;
pub mod server;

pub use request::X_REQUEST_ID;
pub use server::{AppState, HttpServer};
