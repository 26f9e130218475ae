//! HTTP server setup and middleware.

use std::sync::Arc;
use std::time::Duration;

use axum::Router;
use tower_http::{
    cors::{Any, CorsLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use crate::api;
use crate::config::AppConfig;
use crate::gateway::{self, AdminApiDirectory, AuthenticationGateway, JwtTokenManager, UuidV4Generator};
use crate::logging::OpTimer;
use crate::{AppState, log_banner, log_init_step, log_init_warning};

/// Crate version (from Cargo.toml).
const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Create the application with the production collaborators.
pub fn create_app(config: AppConfig) -> anyhow::Result<Router> {
    let overall_timer = OpTimer::new("server", "create_app");

    log_banner!(
        format!("Roomgate API v{VERSION}"),
        format!("Admin API: {}", config.directory.base_url)
    );

    // [1/4] Signing authority
    let step_timer = OpTimer::new("server", "signing_authority");
    let signer = Arc::new(JwtTokenManager::from_config(&config.gateway)?);
    log_init_step!(
        1,
        4,
        "Signing Authority",
        format!("HS256, {}s lifetime", config.gateway.jwt_expiry_secs)
    );
    step_timer.finish();

    // [2/4] Membership directory
    let step_timer = OpTimer::new("server", "directory");
    let directory = AdminApiDirectory::new(&config.directory);
    step_timer.finish_with_result(&directory);
    let directory = Arc::new(directory?);
    if config.directory.api_token.is_none() {
        log_init_warning!("No ADMIN_API_TOKEN configured, admin API calls are unauthenticated");
    }
    log_init_step!(2, 4, "Membership Directory", config.directory.base_url.as_str());

    // [3/4] Gateway
    let gateway = AuthenticationGateway::new(
        directory,
        signer,
        Arc::new(UuidV4Generator),
        config.gateway.collaborator_timeout(),
    );
    log_init_step!(
        3,
        4,
        "Gateway",
        format!("collaborator timeout {:?}", config.gateway.collaborator_timeout())
    );

    let state = AppState {
        config: Arc::new(config),
        gateway: Arc::new(gateway),
    };

    // [4/4] Router
    let step_timer = OpTimer::new("server", "router");
    let app = build_router(state);
    log_init_step!(4, 4, "Router", "Routes + middleware configured");
    step_timer.finish();

    overall_timer.finish();
    Ok(app)
}

/// Build the router and middleware around an already-assembled state.
///
/// Tests use this to run the real routes over substitute collaborators.
pub fn build_router(state: AppState) -> Router {
    let timeout = Duration::from_secs(state.config.server.timeout_secs);

    Router::new()
        .merge(api::create_router())
        .merge(gateway::create_router())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .layer(TimeoutLayer::with_status_code(
            axum::http::StatusCode::REQUEST_TIMEOUT,
            timeout,
        ))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_app_requires_secret() {
        let config = AppConfig::default();
        assert!(create_app(config).is_err());
    }

    #[test]
    fn test_create_app_with_secret() {
        let mut config = AppConfig::default();
        config.gateway.jwt_secret = Some("server-test-secret-0123".to_string());
        assert!(create_app(config).is_ok());
    }
}
