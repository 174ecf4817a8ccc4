//! Assertion gate.
//!
//! Refuses any request without a non-empty `CF-Access-Jwt-Assertion` before
//! its body is read or the backend is contacted. Signature verification is
//! left to the backend, which holds the identity provider's keys.

use axum::{
    body::Body,
    http::{HeaderValue, Request},
    middleware::Next,
    response::{IntoResponse, Response},
};

use crate::contract;
use crate::error::GatewayError;
use crate::http::request::request_id;
use crate::observability::metrics;

/// Assertion accepted at the edge, attached to the request for the relay.
#[derive(Clone, Debug)]
pub struct CallerAssertion(pub HeaderValue);

pub async fn require_assertion(mut req: Request<Body>, next: Next) -> Response {
    let assertion = match contract::assertion(req.headers()) {
        Some(value) => value.clone(),
        None => {
            tracing::debug!(
                request_id = %request_id(&req),
                method = %req.method(),
                path = %req.uri().path(),
                "Rejected request without identity assertion"
            );
            metrics::record_rejected();
            return GatewayError::MissingAssertion.into_response();
        }
    };

    req.extensions_mut().insert(CallerAssertion(assertion));
    next.run(req).await
}
