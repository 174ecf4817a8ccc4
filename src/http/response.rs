//! Backend response relay.
//!
//! # Responsibilities
//! - Convert the backend response into the client response
//! - Keep status, body and end-to-end headers unchanged
//! - Strip hop-by-hop headers, which describe the backend connection only
//!
//! # Design Decisions
//! - The body is opaque bytes; it is never parsed
//! - Content-Length is recomputed from the body actually sent

use axum::body::{Body, Bytes};
use axum::http::{header, HeaderMap, HeaderName, StatusCode};
use axum::response::Response;

/// Headers meaningful only for a single transport connection.
const HOP_BY_HOP: [HeaderName; 8] = [
    header::CONNECTION,
    HeaderName::from_static("keep-alive"),
    header::PROXY_AUTHENTICATE,
    header::PROXY_AUTHORIZATION,
    header::TE,
    header::TRAILER,
    header::TRANSFER_ENCODING,
    header::UPGRADE,
];

/// Whether `name` must not cross the gateway.
pub fn is_hop_by_hop(name: &HeaderName) -> bool {
    HOP_BY_HOP.contains(name) || *name == header::CONTENT_LENGTH
}

/// Build the client response from a backend status, headers and body.
pub fn relay_response(status: StatusCode, headers: &HeaderMap, body: Bytes) -> Response {
    let mut response = Response::new(Body::from(body));
    *response.status_mut() = status;

    let outgoing = response.headers_mut();
    for (name, value) in headers.iter() {
        if !is_hop_by_hop(name) {
            outgoing.append(name.clone(), value.clone());
        }
    }
    response
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[tokio::test]
    async fn test_relay_keeps_status_body_and_headers() {
        let mut headers = HeaderMap::new();
        headers.insert(header::CONTENT_TYPE, HeaderValue::from_static("application/json"));
        headers.insert(header::CONNECTION, HeaderValue::from_static("keep-alive"));
        headers.insert(header::CONTENT_LENGTH, HeaderValue::from_static("999"));
        headers.append(header::SET_COOKIE, HeaderValue::from_static("a=1"));
        headers.append(header::SET_COOKIE, HeaderValue::from_static("b=2"));

        let response = relay_response(
            StatusCode::FORBIDDEN,
            &headers,
            Bytes::from_static(b"{\"detail\":\"denied\"}"),
        );

        assert_eq!(response.status(), StatusCode::FORBIDDEN);
        assert_eq!(response.headers()[header::CONTENT_TYPE], "application/json");
        assert!(response.headers().get(header::CONNECTION).is_none());
        assert!(response.headers().get(header::CONTENT_LENGTH).is_none());
        assert_eq!(response.headers().get_all(header::SET_COOKIE).iter().count(), 2);

        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        assert_eq!(&body[..], b"{\"detail\":\"denied\"}");
    }
}
