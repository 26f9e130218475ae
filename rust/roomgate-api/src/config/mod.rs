//! Configuration management for the gateway.
//!
//! Configuration is layered: built-in defaults, then an optional
//! `config/roomgate.*` file, then `ROOMGATE__*` environment variables, then
//! the legacy variables deployments already set (`SECRET_KEY`,
//! `ADMIN_API_URL`, `ADMIN_API_TOKEN`).
//!
//! ```rust,ignore
//! use roomgate_api::config::AppConfig;
//!
//! let config = AppConfig::load()?;
//! ```

pub mod error;
pub mod validator;

pub use error::ConfigurationError;
pub use validator::ConfigValidator;

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Main application configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Server configuration.
    #[serde(default)]
    pub server: ServerConfig,
    /// Credential signing and collaborator settings.
    #[serde(default)]
    pub gateway: GatewayConfig,
    /// Membership directory (admin API) settings.
    #[serde(default)]
    pub directory: DirectoryConfig,
    /// Logging configuration.
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl AppConfig {
    /// Load configuration from environment and config files, then validate it.
    ///
    /// Use [`Self::load_unchecked`] to skip validation.
    pub fn load() -> anyhow::Result<Self> {
        let config = Self::load_unchecked()?;
        config.validated()
    }

    /// Load configuration without validation.
    pub fn load_unchecked() -> anyhow::Result<Self> {
        // Load .env file if present
        let _ = dotenvy::dotenv();

        let builder = Self::defaults()?
            .add_source(config::File::with_name("config/roomgate").required(false));
        Self::finish(builder)
    }

    /// Load configuration from an explicit file, then validate it.
    pub fn load_from_file(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let builder = Self::defaults()?.add_source(config::File::from(path.as_ref()));
        Self::finish(builder)?.validated()
    }

    fn validated(self) -> anyhow::Result<Self> {
        ConfigValidator::validate(&self)
            .map_err(|e| anyhow::anyhow!("Configuration validation failed:\n\n{e}"))?;
        Ok(self)
    }

    fn defaults() -> anyhow::Result<config::ConfigBuilder<config::builder::DefaultState>> {
        Ok(config::Config::builder()
            .set_default("server.host", default_host())?
            .set_default("server.port", default_port())?
            .set_default("server.timeout_secs", default_timeout())?
            .set_default("gateway.jwt_expiry_secs", default_jwt_expiry())?
            .set_default(
                "gateway.collaborator_timeout_secs",
                default_collaborator_timeout(),
            )?
            .set_default("directory.base_url", default_directory_url())?
            .set_default("logging.level", default_log_level())?)
    }

    fn finish(
        builder: config::ConfigBuilder<config::builder::DefaultState>,
    ) -> anyhow::Result<Self> {
        let config = builder
            .add_source(
                config::Environment::with_prefix("ROOMGATE")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        let mut app_config: AppConfig = config.try_deserialize()?;

        // Variables already used by existing deployments
        if let Ok(secret) = std::env::var("SECRET_KEY") {
            app_config.gateway.jwt_secret = Some(secret);
        }
        if let Ok(url) = std::env::var("ADMIN_API_URL") {
            app_config.directory.base_url = url;
        }
        if let Ok(token) = std::env::var("ADMIN_API_TOKEN") {
            app_config.directory.api_token = Some(token);
        }

        Ok(app_config)
    }
}

/// Server configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Host to bind to.
    #[serde(default = "default_host")]
    pub host: String,
    /// Main API port.
    #[serde(default = "default_port")]
    pub port: u16,
    /// Whole-request timeout in seconds.
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

fn default_timeout() -> u64 {
    30
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            timeout_secs: default_timeout(),
        }
    }
}

/// Gateway configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GatewayConfig {
    /// HMAC secret for credential signing/validation.
    pub jwt_secret: Option<String>,
    /// Credential lifetime in seconds.
    #[serde(default = "default_jwt_expiry")]
    pub jwt_expiry_secs: u64,
    /// Upper bound on any single directory or signing call.
    #[serde(default = "default_collaborator_timeout")]
    pub collaborator_timeout_secs: u64,
}

fn default_jwt_expiry() -> u64 {
    200 * 24 * 60 * 60 // 200 days
}

fn default_collaborator_timeout() -> u64 {
    10
}

impl GatewayConfig {
    /// Collaborator timeout as a [`Duration`].
    pub fn collaborator_timeout(&self) -> Duration {
        Duration::from_secs(self.collaborator_timeout_secs)
    }
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            jwt_secret: None,
            jwt_expiry_secs: default_jwt_expiry(),
            collaborator_timeout_secs: default_collaborator_timeout(),
        }
    }
}

/// Membership directory (admin API) configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DirectoryConfig {
    /// Base URL of the admin API.
    #[serde(default = "default_directory_url")]
    pub base_url: String,
    /// Value sent in the `Authorization` header.
    pub api_token: Option<String>,
}

fn default_directory_url() -> String {
    "http://admin-api".to_string()
}

impl Default for DirectoryConfig {
    fn default() -> Self {
        Self {
            base_url: default_directory_url(),
            api_token: None,
        }
    }
}

/// Logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level.
    #[serde(default = "default_log_level")]
    pub level: String,
    /// Whether to use JSON format.
    #[serde(default)]
    pub json: bool,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl LoggingConfig {
    /// Apply command-line choices on top of the loaded settings.
    ///
    /// `--json-logs` can only switch JSON output on.
    pub fn apply_overrides(&mut self, level: Option<String>, json: bool) {
        if let Some(level) = level.filter(|l| !l.is_empty()) {
            self.level = level;
        }
        self.json |= json;
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            json: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    #[test]
    fn test_defaults() {
        let config = AppConfig::default();
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.gateway.jwt_expiry_secs, 17_280_000);
        assert_eq!(config.gateway.collaborator_timeout(), Duration::from_secs(10));
        assert!(config.gateway.jwt_secret.is_none());
        assert_eq!(config.logging.level, "info");
        assert!(!config.logging.json);
    }

    #[test]
    fn test_logging_overrides() {
        let mut logging = LoggingConfig {
            level: "warn".to_string(),
            json: true,
        };
        logging.apply_overrides(None, false);
        assert_eq!(logging.level, "warn");
        assert!(logging.json);

        logging.apply_overrides(Some("roomgate_api=debug".to_string()), false);
        assert_eq!(logging.level, "roomgate_api=debug");

        let mut logging = LoggingConfig::default();
        logging.apply_overrides(Some(String::new()), true);
        assert_eq!(logging.level, "info");
        assert!(logging.json);
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::Builder::new()
            .suffix(".toml")
            .tempfile()
            .expect("temp file");
        writeln!(
            file,
            r#"
[server]
port = 9191

[gateway]
jwt_secret = "file-secret-0123456789"
collaborator_timeout_secs = 3

[directory]
base_url = "https://admin.example.com"

[logging]
level = "debug"
json = true
"#
        )
        .expect("write config");

        let config = AppConfig::load_from_file(file.path()).expect("load config");
        assert_eq!(config.server.port, 9191);
        assert_eq!(config.logging.level, "debug");
        assert!(config.logging.json);
        assert_eq!(config.gateway.collaborator_timeout_secs, 3);
        assert_eq!(config.gateway.jwt_expiry_secs, 17_280_000);
    }

    #[test]
    fn test_load_from_file_rejects_invalid() {
        let mut file = tempfile::Builder::new()
            .suffix(".toml")
            .tempfile()
            .expect("temp file");
        writeln!(
            file,
            r#"
[gateway]
jwt_secret = "file-secret-0123456789"
jwt_expiry_secs = 0
"#
        )
        .expect("write config");

        let err = AppConfig::load_from_file(file.path()).unwrap_err();
        assert!(err.to_string().contains("jwt_expiry_secs"));
    }
}
