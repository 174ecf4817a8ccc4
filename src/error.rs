//! Error types for the edge gateway.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use thiserror::Error;

/// Failure while relaying a single request.
///
/// Every variant maps to an HTTP response; none of them is fatal to the
/// process. Response bodies are short fixed strings, details only go to the
/// log. A backend that answers with a non-2xx status is not an error here:
/// its response is relayed untouched.
#[derive(Debug, Error)]
pub enum GatewayError {
    /// The identity assertion header is absent or empty.
    #[error("missing identity assertion")]
    MissingAssertion,

    /// The inbound body exceeds the configured limit.
    #[error("request body exceeds {limit} bytes")]
    BodyTooLarge { limit: usize },

    /// The inbound body could not be read.
    #[error("unreadable request body: {0}")]
    InvalidBody(#[source] axum::Error),

    /// The backend could not be reached.
    #[error("backend unavailable: {0}")]
    UpstreamUnavailable(#[source] reqwest::Error),

    /// The backend did not answer within the request timeout.
    #[error("backend timed out: {0}")]
    UpstreamTimeout(#[source] reqwest::Error),
}

impl GatewayError {
    /// Status code presented to the caller.
    pub fn status(&self) -> StatusCode {
        match self {
            GatewayError::MissingAssertion => StatusCode::UNAUTHORIZED,
            GatewayError::BodyTooLarge { .. } => StatusCode::PAYLOAD_TOO_LARGE,
            GatewayError::InvalidBody(_) => StatusCode::BAD_REQUEST,
            GatewayError::UpstreamUnavailable(_) => StatusCode::BAD_GATEWAY,
            GatewayError::UpstreamTimeout(_) => StatusCode::GATEWAY_TIMEOUT,
        }
    }

    /// Classify a backend client failure.
    pub fn from_upstream(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            GatewayError::UpstreamTimeout(err)
        } else {
            GatewayError::UpstreamUnavailable(err)
        }
    }

    /// Metric label for the failure.
    pub fn outcome(&self) -> &'static str {
        match self {
            GatewayError::MissingAssertion => "rejected",
            GatewayError::BodyTooLarge { .. } | GatewayError::InvalidBody(_) => "client_error",
            GatewayError::UpstreamUnavailable(_) => "upstream_unavailable",
            GatewayError::UpstreamTimeout(_) => "upstream_timeout",
        }
    }
}

impl IntoResponse for GatewayError {
    fn into_response(self) -> Response {
        let body = match self {
            GatewayError::MissingAssertion => "Unauthorized",
            GatewayError::BodyTooLarge { .. } => "Payload Too Large",
            GatewayError::InvalidBody(_) => "Bad Request",
            GatewayError::UpstreamUnavailable(_) => "Bad Gateway",
            GatewayError::UpstreamTimeout(_) => "Gateway Timeout",
        };
        (self.status(), body).into_response()
    }
}

/// Failure while assembling or running the server.
#[derive(Debug, Error)]
pub enum StartupError {
    #[error(transparent)]
    Config(#[from] crate::config::ConfigError),

    #[error("invalid backend url: {0}")]
    BackendUrl(#[from] url::ParseError),

    #[error("failed to build backend client: {0}")]
    Client(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
