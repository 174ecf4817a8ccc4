//! Identity header contract shared by the gateway and its callers.
//!
//! Header names are part of the wire protocol with the backend query
//! service. Renaming any of them is a breaking change.
//!
//! The gateway only checks that the assertion is present. Every other
//! identity value is opaque here: `X-User-Clearance` travels as a decimal
//! string and is never parsed, defaulted or normalized on this side.

use axum::http::{HeaderMap, HeaderName, HeaderValue};

/// Assertion issued by the upstream identity provider.
pub const ASSERTION: HeaderName = HeaderName::from_static("cf-access-jwt-assertion");

/// Backend authorization credential.
pub const API_KEY: HeaderName = HeaderName::from_static("x-api-key");

/// Caller identity.
pub const USER_EMAIL: HeaderName = HeaderName::from_static("x-user-email");

/// Organizational or business-unit scope.
pub const USER_DOMAIN: HeaderName = HeaderName::from_static("x-user-domain");

/// Clearance level, a non-negative integer encoded as a decimal string.
pub const USER_CLEARANCE: HeaderName = HeaderName::from_static("x-user-clearance");

/// Caller identity headers relayed verbatim to the backend.
pub const IDENTITY_HEADERS: [HeaderName; 4] = [API_KEY, USER_EMAIL, USER_DOMAIN, USER_CLEARANCE];

/// Returns the assertion header when it is present and non-empty.
pub fn assertion(headers: &HeaderMap) -> Option<&HeaderValue> {
    headers.get(ASSERTION).filter(|value| !value.is_empty())
}

/// Whether the request may pass the edge.
pub fn has_assertion(headers: &HeaderMap) -> bool {
    assertion(headers).is_some()
}

/// Copy the identity headers present on `inbound` into `outbound`.
///
/// Values are cloned byte-for-byte. Repeated headers keep every value in
/// their original order. Absent headers stay absent.
pub fn copy_identity(inbound: &HeaderMap, outbound: &mut HeaderMap) {
    for name in IDENTITY_HEADERS.iter() {
        for value in inbound.get_all(name) {
            outbound.append(name.clone(), value.clone());
        }
    }
}
