//! Configuration loading from disk and the environment.

use std::fs;
use std::path::Path;

use thiserror::Error;

use crate::config::schema::GatewayConfig;
use crate::config::validation::{validate_config, ValidationError};

/// Environment variable holding the backend base URL.
pub const BACKEND_URL_ENV: &str = "BACKEND_URL";

/// Environment variable overriding the listener bind address.
pub const BIND_ADDRESS_ENV: &str = "EDGE_GATEWAY_BIND";

/// Error type for configuration loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation failed: {}", join(.0))]
    Validation(Vec<ValidationError>),
}

fn join(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Parse a configuration from TOML text without validating it.
pub fn parse_config(content: &str) -> Result<GatewayConfig, ConfigError> {
    Ok(toml::from_str(content)?)
}

/// Apply environment overrides using `lookup` to read variables.
///
/// Empty values are ignored so an exported-but-blank variable does not
/// erase a value from the file.
pub fn apply_env_overrides<F>(config: &mut GatewayConfig, lookup: F)
where
    F: Fn(&str) -> Option<String>,
{
    let non_empty = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

    if let Some(url) = non_empty(BACKEND_URL_ENV) {
        config.backend.url = url;
    }
    if let Some(addr) = non_empty(BIND_ADDRESS_ENV) {
        config.listener.bind_address = addr;
    }
}

/// Values given on the command line; they win over file and environment.
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub backend_url: Option<String>,
    pub bind_address: Option<String>,
}

impl ConfigOverrides {
    pub fn apply(&self, config: &mut GatewayConfig) {
        if let Some(ref url) = self.backend_url {
            config.backend.url = url.clone();
        }
        if let Some(ref addr) = self.bind_address {
            config.listener.bind_address = addr.clone();
        }
    }
}

/// Load configuration from an optional TOML file, the process environment
/// and command-line overrides, in that order, then validate it.
pub fn load_config(
    path: Option<&Path>,
    overrides: &ConfigOverrides,
) -> Result<GatewayConfig, ConfigError> {
    let mut config = match path {
        Some(path) => parse_config(&fs::read_to_string(path)?)?,
        None => GatewayConfig::default(),
    };

    apply_env_overrides(&mut config, |name| std::env::var(name).ok());
    overrides.apply(&mut config);
    validate_config(&config).map_err(ConfigError::Validation)?;

    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_partial_file_keeps_defaults() {
        let config = parse_config(
            r#"
            [backend]
            url = "https://rag-api.example.run.app"

            [timeouts]
            request_secs = 10
            "#,
        )
        .unwrap();

        assert_eq!(config.backend.url, "https://rag-api.example.run.app");
        assert_eq!(config.timeouts.request_secs, 10);
        assert_eq!(config.timeouts.connect_secs, 5);
        assert_eq!(config.retries.max_attempts, 1);
        assert_eq!(config.listener.bind_address, "0.0.0.0:8080");
    }

    #[test]
    fn test_malformed_toml_is_parse_error() {
        let err = parse_config("[backend\nurl = 1").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn test_env_overrides_file() {
        let mut config = parse_config("[backend]\nurl = \"http://from-file\"").unwrap();
        let env: HashMap<&str, &str> = [
            (BACKEND_URL_ENV, "http://from-env:9000"),
            (BIND_ADDRESS_ENV, ""),
        ]
        .into_iter()
        .collect();

        apply_env_overrides(&mut config, |name| env.get(name).map(|v| v.to_string()));

        assert_eq!(config.backend.url, "http://from-env:9000");
        assert_eq!(config.listener.bind_address, "0.0.0.0:8080");
    }

    #[test]
    fn test_cli_overrides_win() {
        let mut config = parse_config("[listener]\nbind_address = \"127.0.0.1:1\"").unwrap();
        let overrides = ConfigOverrides {
            backend_url: Some("http://cli:8000".into()),
            bind_address: None,
        };
        overrides.apply(&mut config);

        assert_eq!(config.backend.url, "http://cli:8000");
        assert_eq!(config.listener.bind_address, "127.0.0.1:1");
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let err = load_config(
            Some(Path::new("/nonexistent/edge-gateway.toml")),
            &ConfigOverrides::default(),
        )
        .unwrap_err();
        assert!(matches!(err, ConfigError::Io(_)));
    }

    #[test]
    fn test_validation_error_lists_every_problem() {
        let err = ConfigError::Validation(vec![
            ValidationError::MissingBackendUrl,
            ValidationError::Zero("timeouts.request_secs"),
        ]);
        let message = err.to_string();
        assert!(message.starts_with("Validation failed: backend.url is required"));
        assert!(message.ends_with("timeouts.request_secs must be greater than zero"));
    }
}
