//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Check the backend origin is an absolute http(s) URL
//! - Validate value ranges (timeouts > 0, addresses parse)
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: GatewayConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use std::net::SocketAddr;

use thiserror::Error;
use url::Url;

use crate::config::schema::GatewayConfig;

/// A single semantic problem with a configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("backend.url is required (set it in the config file or BACKEND_URL)")]
    MissingBackendUrl,

    #[error("backend.url {url:?} is not a valid URL: {reason}")]
    InvalidBackendUrl { url: String, reason: String },

    #[error("backend.url scheme must be http or https, got {0:?}")]
    UnsupportedScheme(String),

    #[error("backend.url must not carry a query string or fragment")]
    BackendUrlHasQuery,

    #[error("{field} {value:?} is not a socket address")]
    InvalidAddress { field: &'static str, value: String },

    #[error("{0} must be greater than zero")]
    Zero(&'static str),

    #[error("retries.base_delay_ms ({base}) exceeds retries.max_delay_ms ({max})")]
    BackoffRange { base: u64, max: u64 },

    #[error(
        "timeouts.inbound_secs ({inbound_secs}) must exceed the backend budget of {budget_ms} ms \
         (request_secs x max_attempts plus backoff)"
    )]
    InboundCeiling { inbound_secs: u64, budget_ms: u64 },
}

/// Validate a configuration, collecting every problem found.
pub fn validate_config(config: &GatewayConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    validate_backend_url(&config.backend.url, &mut errors);

    if config.listener.bind_address.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::InvalidAddress {
            field: "listener.bind_address",
            value: config.listener.bind_address.clone(),
        });
    }

    let timeouts = &config.timeouts;
    for (field, value) in [
        ("timeouts.connect_secs", timeouts.connect_secs),
        ("timeouts.request_secs", timeouts.request_secs),
        ("timeouts.inbound_secs", timeouts.inbound_secs),
    ] {
        if value == 0 {
            errors.push(ValidationError::Zero(field));
        }
    }

    if config.retries.max_attempts == 0 {
        errors.push(ValidationError::Zero("retries.max_attempts"));
    }
    if config.retries.base_delay_ms > config.retries.max_delay_ms {
        errors.push(ValidationError::BackoffRange {
            base: config.retries.base_delay_ms,
            max: config.retries.max_delay_ms,
        });
    }

    if timeouts.inbound_secs > 0 {
        let budget_ms = backend_budget_ms(config);
        if timeouts.inbound_secs.saturating_mul(1000) <= budget_ms {
            errors.push(ValidationError::InboundCeiling {
                inbound_secs: timeouts.inbound_secs,
                budget_ms,
            });
        }
    }

    if config.limits.max_body_size == 0 {
        errors.push(ValidationError::Zero("limits.max_body_size"));
    }

    let observability = &config.observability;
    if observability.metrics_enabled
        && observability.metrics_address.parse::<SocketAddr>().is_err()
    {
        errors.push(ValidationError::InvalidAddress {
            field: "observability.metrics_address",
            value: observability.metrics_address.clone(),
        });
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

/// Longest a relay can spend on the backend: every attempt running to the
/// request timeout, with the capped backoff between attempts.
fn backend_budget_ms(config: &GatewayConfig) -> u64 {
    let attempts = u64::from(config.retries.max_attempts.max(1));
    let per_attempt = config.timeouts.request_secs.saturating_mul(1000);
    let backoff = config.retries.max_delay_ms.saturating_mul(attempts - 1);
    per_attempt.saturating_mul(attempts).saturating_add(backoff)
}

fn validate_backend_url(raw: &str, errors: &mut Vec<ValidationError>) {
    if raw.trim().is_empty() {
        errors.push(ValidationError::MissingBackendUrl);
        return;
    }

    let url = match Url::parse(raw) {
        Ok(url) => url,
        Err(e) => {
            errors.push(ValidationError::InvalidBackendUrl {
                url: raw.to_string(),
                reason: e.to_string(),
            });
            return;
        }
    };

    if !matches!(url.scheme(), "http" | "https") {
        errors.push(ValidationError::UnsupportedScheme(url.scheme().to_string()));
    }
    if url.query().is_some() || url.fragment().is_some() {
        errors.push(ValidationError::BackendUrlHasQuery);
    }
}
