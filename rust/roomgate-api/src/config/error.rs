//! Settings the gateway refuses to start with.
//!
//! Messages name the setting and the variable that fixes it.

use thiserror::Error;

/// A configuration problem found before the server is built.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigurationError {
    /// No signing secret at all.
    #[error("no JWT signing secret configured; set SECRET_KEY or ROOMGATE__GATEWAY__JWT_SECRET")]
    MissingSecret,
    #[error(
        "JWT signing secret is {len} bytes long, at least {min} are required; \
         generate one with `openssl rand -hex 32`"
    )]
    SecretTooShort { len: usize, min: usize },
    /// A lifetime or timeout of zero seconds.
    #[error("{setting} must be greater than zero; set {env_var} to a positive number of seconds")]
    ZeroDuration {
        setting: &'static str,
        env_var: &'static str,
    },
    #[error("admin API URL '{url}' is unusable ({reason}); set ADMIN_API_URL to an absolute http(s) URL")]
    BadDirectoryUrl { url: String, reason: String },
    #[error("{} configuration errors:\n{}", .0.len(), numbered(.0))]
    Multiple(Vec<ConfigurationError>),
}

impl ConfigurationError {
    /// `Ok` for no problems, the problem itself for one, `Multiple` otherwise.
    pub fn collect(mut errors: Vec<Self>) -> Result<(), Self> {
        match errors.len() {
            0 => Ok(()),
            1 => Err(errors.remove(0)),
            _ => Err(Self::Multiple(errors)),
        }
    }
}

fn numbered(errors: &[ConfigurationError]) -> String {
    errors
        .iter()
        .enumerate()
        .map(|(i, e)| format!("  {}. {e}", i + 1))
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_collect() {
        assert_eq!(ConfigurationError::collect(Vec::new()), Ok(()));
        assert_eq!(
            ConfigurationError::collect(vec![ConfigurationError::MissingSecret]),
            Err(ConfigurationError::MissingSecret)
        );

        let err = ConfigurationError::collect(vec![
            ConfigurationError::MissingSecret,
            ConfigurationError::SecretTooShort { len: 3, min: 16 },
        ])
        .unwrap_err();
        assert!(matches!(&err, ConfigurationError::Multiple(errors) if errors.len() == 2));
    }

    #[test]
    fn test_messages_name_the_fix() {
        assert!(
            ConfigurationError::MissingSecret
                .to_string()
                .contains("SECRET_KEY")
        );

        let msg = ConfigurationError::ZeroDuration {
            setting: "gateway.collaborator_timeout_secs",
            env_var: "ROOMGATE__GATEWAY__COLLABORATOR_TIMEOUT_SECS",
        }
        .to_string();
        assert!(msg.contains("gateway.collaborator_timeout_secs"));
        assert!(msg.contains("ROOMGATE__GATEWAY__COLLABORATOR_TIMEOUT_SECS"));
    }

    #[test]
    fn test_multiple_is_numbered() {
        let msg = ConfigurationError::Multiple(vec![
            ConfigurationError::MissingSecret,
            ConfigurationError::BadDirectoryUrl {
                url: "ftp://admin".to_string(),
                reason: "scheme 'ftp' is not http(s)".to_string(),
            },
        ])
        .to_string();

        assert!(msg.starts_with("2 configuration errors:"));
        assert!(msg.contains("  1. no JWT signing secret"));
        assert!(msg.contains("  2. admin API URL 'ftp://admin'"));
    }
}
