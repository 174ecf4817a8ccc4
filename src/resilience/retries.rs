//! Retry decisions for relayed requests.
//!
//! # Design Decisions
//! - Never retry POST/PUT/PATCH (non-idempotent); DELETE is left alone too
//! - Only connection failures are retried; the backend never saw the request
//! - Backend statuses are passed through, never retried

use std::time::Duration;

use axum::http::Method;

use crate::config::RetryConfig;
use crate::error::GatewayError;
use crate::resilience::backoff::Backoff;

/// Retry policy derived from configuration.
#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    max_attempts: u32,
    backoff: Backoff,
}

impl RetryPolicy {
    pub fn new(config: &RetryConfig) -> Self {
        Self {
            max_attempts: config.max_attempts.max(1),
            backoff: Backoff::from(config),
        }
    }

    /// Policy that makes exactly one attempt.
    pub fn disabled() -> Self {
        Self::new(&RetryConfig::default())
    }

    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    /// Decide whether a failed attempt should be retried, returning the
    /// delay to wait first.
    pub fn next_delay(&self, method: &Method, error: &GatewayError, attempt: u32) -> Option<Duration> {
        if attempt >= self.max_attempts || !is_retryable_method(method) {
            return None;
        }
        match error {
            GatewayError::UpstreamUnavailable(err) if err.is_connect() => {
                Some(self.backoff.delay(attempt))
            }
            _ => None,
        }
    }
}

/// Methods safe to replay against the backend.
pub fn is_retryable_method(method: &Method) -> bool {
    matches!(*method, Method::GET | Method::HEAD | Method::OPTIONS)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn policy(max_attempts: u32) -> RetryPolicy {
        RetryPolicy::new(&RetryConfig {
            max_attempts,
            base_delay_ms: 10,
            max_delay_ms: 100,
        })
    }

    #[test]
    fn test_method_classification() {
        assert!(is_retryable_method(&Method::GET));
        assert!(is_retryable_method(&Method::HEAD));
        assert!(!is_retryable_method(&Method::POST));
        assert!(!is_retryable_method(&Method::PUT));
        assert!(!is_retryable_method(&Method::PATCH));
    }

    #[test]
    fn test_non_connection_errors_never_retried() {
        let policy = policy(3);
        assert!(policy
            .next_delay(&Method::GET, &GatewayError::MissingAssertion, 1)
            .is_none());
        assert!(policy
            .next_delay(&Method::GET, &GatewayError::BodyTooLarge { limit: 1 }, 1)
            .is_none());
    }

    #[test]
    fn test_disabled_policy_makes_one_attempt() {
        assert_eq!(RetryPolicy::disabled().max_attempts(), 1);
        assert_eq!(policy(0).max_attempts(), 1);
    }
}
