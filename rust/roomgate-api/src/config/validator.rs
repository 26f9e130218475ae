//! Configuration validation for the gateway.
//!
//! Rejects settings that would let the server start but fail every
//! request, such as a missing signing secret or an unusable directory URL.

use super::error::ConfigurationError;
use super::{AppConfig, DirectoryConfig, GatewayConfig};

/// Shortest HMAC secret accepted for signing session credentials.
pub const MIN_SECRET_LEN: usize = 16;

/// Validates an [`AppConfig`] before the server is built.
#[derive(Debug)]
pub struct ConfigValidator;

impl ConfigValidator {
    /// Validate the entire application configuration, reporting every problem.
    pub fn validate(config: &AppConfig) -> Result<(), ConfigurationError> {
        let mut errors = Self::gateway_errors(&config.gateway);
        errors.extend(Self::validate_directory(&config.directory).err());

        if config.server.timeout_secs == 0 {
            errors.push(ConfigurationError::ZeroDuration {
                setting: "server.timeout_secs",
                env_var: "ROOMGATE__SERVER__TIMEOUT_SECS",
            });
        }

        ConfigurationError::collect(errors)
    }

    /// Validate signing and timeout settings.
    pub fn validate_gateway(config: &GatewayConfig) -> Result<(), ConfigurationError> {
        ConfigurationError::collect(Self::gateway_errors(config))
    }

    fn gateway_errors(config: &GatewayConfig) -> Vec<ConfigurationError> {
        let mut errors = Vec::new();

        match config.jwt_secret.as_deref() {
            None | Some("") => errors.push(ConfigurationError::MissingSecret),
            Some(secret) if secret.len() < MIN_SECRET_LEN => {
                errors.push(ConfigurationError::SecretTooShort {
                    len: secret.len(),
                    min: MIN_SECRET_LEN,
                });
            }
            Some(_) => {}
        }

        if config.jwt_expiry_secs == 0 {
            errors.push(ConfigurationError::ZeroDuration {
                setting: "gateway.jwt_expiry_secs",
                env_var: "ROOMGATE__GATEWAY__JWT_EXPIRY_SECS",
            });
        }

        if config.collaborator_timeout_secs == 0 {
            errors.push(ConfigurationError::ZeroDuration {
                setting: "gateway.collaborator_timeout_secs",
                env_var: "ROOMGATE__GATEWAY__COLLABORATOR_TIMEOUT_SECS",
            });
        }

        errors
    }

    /// Validate the admin API location.
    pub fn validate_directory(config: &DirectoryConfig) -> Result<(), ConfigurationError> {
        let reason = match url::Url::parse(&config.base_url) {
            Ok(parsed) if matches!(parsed.scheme(), "http" | "https") => return Ok(()),
            Ok(parsed) => format!("scheme '{}' is not http(s)", parsed.scheme()),
            Err(e) => e.to_string(),
        };

        Err(ConfigurationError::BadDirectoryUrl {
            url: config.base_url.clone(),
            reason,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid_config() -> AppConfig {
        let mut config = AppConfig::default();
        config.gateway.jwt_secret = Some("0123456789abcdef0123".to_string());
        config
    }

    #[test]
    fn test_valid_config_passes() {
        assert!(ConfigValidator::validate(&valid_config()).is_ok());
    }

    #[test]
    fn test_missing_secret_rejected() {
        let mut config = valid_config();
        config.gateway.jwt_secret = None;

        let err = ConfigValidator::validate(&config).unwrap_err();
        assert_eq!(err, ConfigurationError::MissingSecret);
        assert!(err.to_string().contains("SECRET_KEY"));
    }

    #[test]
    fn test_short_secret_rejected() {
        let mut config = valid_config();
        config.gateway.jwt_secret = Some("short".to_string());

        let err = ConfigValidator::validate(&config).unwrap_err();
        assert_eq!(
            err,
            ConfigurationError::SecretTooShort {
                len: 5,
                min: MIN_SECRET_LEN
            }
        );
    }

    #[test]
    fn test_bad_directory_url_rejected() {
        let mut config = valid_config();
        config.directory.base_url = "not a url".to_string();
        assert!(matches!(
            ConfigValidator::validate(&config),
            Err(ConfigurationError::BadDirectoryUrl { .. })
        ));

        config.directory.base_url = "ftp://admin.example.com".to_string();
        let err = ConfigValidator::validate(&config).unwrap_err();
        assert!(err.to_string().contains("ftp"));
    }

    #[test]
    fn test_zero_timeouts_rejected() {
        let mut config = valid_config();
        config.server.timeout_secs = 0;

        assert_eq!(
            ConfigValidator::validate(&config),
            Err(ConfigurationError::ZeroDuration {
                setting: "server.timeout_secs",
                env_var: "ROOMGATE__SERVER__TIMEOUT_SECS",
            })
        );
    }

    #[test]
    fn test_errors_are_aggregated() {
        let mut config = valid_config();
        config.gateway.jwt_secret = None;
        config.gateway.collaborator_timeout_secs = 0;
        config.directory.base_url = String::new();

        match ConfigValidator::validate(&config) {
            Err(ConfigurationError::Multiple(errors)) => assert_eq!(errors.len(), 3),
            other => panic!("expected three errors, got {other:?}"),
        }
    }
}
