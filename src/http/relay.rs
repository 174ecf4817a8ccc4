//! The relay handler: forwards an accepted request to the backend origin.
//!
//! # Outbound request
//! - URL: backend base URL + inbound path and query
//! - Method: unchanged
//! - Body: verbatim, except `GET` which is always sent without a body
//! - Headers: `Content-Type: application/json`, the assertion, the identity
//!   headers present inbound and the request ID; nothing else
//!
//! The backend response comes back unchanged apart from hop-by-hop headers.

use std::time::Instant;

use axum::{
    body::{Body, Bytes},
    extract::State,
    http::{header, HeaderMap, HeaderValue, Method, Request, Uri},
    response::{IntoResponse, Response},
};
use http_body_util::LengthLimitError;
use url::Url;

use crate::contract;
use crate::error::GatewayError;
use crate::http::middleware::assertion::CallerAssertion;
use crate::http::request::{request_id, X_REQUEST_ID};
use crate::http::response::relay_response;
use crate::http::server::AppState;
use crate::observability::metrics;

/// Axum handler wrapping [`relay`] with logging and metrics.
pub async fn relay_handler(State(state): State<AppState>, request: Request<Body>) -> Response {
    let start = Instant::now();
    let method = request.method().clone();
    let path = request.uri().path().to_string();
    let request_id = request_id(&request).to_string();

    tracing::debug!(
        request_id = %request_id,
        method = %method,
        path = %path,
        "Relaying request"
    );

    match relay(&state, request).await {
        Ok(response) => {
            let status = response.status();
            tracing::debug!(
                request_id = %request_id,
                status = status.as_u16(),
                elapsed_ms = start.elapsed().as_millis() as u64,
                "Backend responded"
            );
            metrics::record_request(method.as_str(), status.as_u16(), "relayed", start);
            response
        }
        Err(err) => {
            tracing::warn!(
                request_id = %request_id,
                method = %method,
                path = %path,
                error = %err,
                "Relay failed"
            );
            metrics::record_request(method.as_str(), err.status().as_u16(), err.outcome(), start);
            err.into_response()
        }
    }
}

/// Forward `request` to the backend and return its response.
pub async fn relay(state: &AppState, request: Request<Body>) -> Result<Response, GatewayError> {
    let (parts, body) = request.into_parts();

    let CallerAssertion(assertion) = parts
        .extensions
        .get::<CallerAssertion>()
        .cloned()
        .ok_or(GatewayError::MissingAssertion)?;

    let payload = if parts.method == Method::GET {
        None
    } else {
        Some(read_body(body, state.max_body_size).await?)
    };

    let url = upstream_url(&state.backend, &parts.uri);
    let headers = outbound_headers(&parts.headers, &assertion);

    let mut attempt = 0;
    loop {
        attempt += 1;

        let mut outbound = state
            .client
            .request(parts.method.clone(), url.clone())
            .headers(headers.clone());
        if let Some(ref bytes) = payload {
            outbound = outbound.body(bytes.clone());
        }

        let err = match outbound.send().await {
            Ok(response) => {
                let status = response.status();
                let response_headers = response.headers().clone();
                let body = response.bytes().await.map_err(GatewayError::from_upstream)?;
                return Ok(relay_response(status, &response_headers, body));
            }
            Err(e) => GatewayError::from_upstream(e),
        };

        match state.retry.next_delay(&parts.method, &err, attempt) {
            Some(delay) => {
                tracing::info!(
                    attempt,
                    delay = ?delay,
                    error = %err,
                    "Retrying after backend connection failure"
                );
                metrics::record_retry(parts.method.as_str());
                tokio::time::sleep(delay).await;
            }
            None => return Err(err),
        }
    }
}

/// Join the inbound path and query onto the backend base URL.
///
/// A path prefix on the base URL is kept: `https://api/v1` + `/query`
/// gives `https://api/v1/query`.
pub fn upstream_url(base: &Url, uri: &Uri) -> Url {
    let mut target = base.clone();
    let prefix = base.path().trim_end_matches('/');
    target.set_path(&format!("{}{}", prefix, uri.path()));
    target.set_query(uri.query());
    target
}

/// Select the headers sent to the backend.
pub fn outbound_headers(inbound: &HeaderMap, assertion: &HeaderValue) -> HeaderMap {
    let mut headers = HeaderMap::new();
    headers.insert(
        header::CONTENT_TYPE,
        HeaderValue::from_static("application/json"),
    );
    headers.insert(contract::ASSERTION, assertion.clone());
    contract::copy_identity(inbound, &mut headers);
    if let Some(id) = inbound.get(X_REQUEST_ID) {
        headers.insert(X_REQUEST_ID, id.clone());
    }
    headers
}

async fn read_body(body: Body, limit: usize) -> Result<Bytes, GatewayError> {
    axum::body::to_bytes(body, limit).await.map_err(|err| {
        if is_length_limit(&err) {
            GatewayError::BodyTooLarge { limit }
        } else {
            GatewayError::InvalidBody(err)
        }
    })
}

fn is_length_limit(err: &axum::Error) -> bool {
    let mut source: Option<&(dyn std::error::Error + 'static)> = Some(err);
    while let Some(e) = source {
        if e.is::<LengthLimitError>() {
            return true;
        }
        source = e.source();
    }
    false
}
