//! Roomgate API - credential gateway for virtual-room clients
//!
//! A stateless HTTP service that hands out session credentials to clients
//! entering a world:
//!
//! - **Member login**: exchanges an organization member token, resolved by
//!   the admin API, for a session credential plus the world/room to join
//! - **Verification**: tells a client whether a credential is still valid
//! - **Anonymous login**: mints a credential for a fresh random identity
//!
//! # Architecture
//!
//! - [`config`]: Configuration management and environment loading
//! - [`gateway`]: The credential flows and their collaborators
//! - [`api`]: Operational endpoints (health)
//! - [`server`]: Router assembly and middleware
//!
//! # Example
//!
//! ```rust,ignore
//! use roomgate_api::{config::AppConfig, server::create_app};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = AppConfig::load()?;
//!     let app = create_app(config)?;
//!
//!     let listener = tokio::net::TcpListener::bind("0.0.0.0:8080").await?;
//!     axum::serve(listener, app).await?;
//!     Ok(())
//! }
//! ```

#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]

pub mod api;
pub mod config;
pub mod gateway;
pub mod logging;
pub mod server;

use std::sync::Arc;

use config::AppConfig;
use gateway::AuthenticationGateway;

/// Application state shared across all handlers.
///
/// Everything in here is immutable after startup.
#[derive(Debug, Clone)]
pub struct AppState {
    /// Application configuration.
    pub config: Arc<AppConfig>,
    /// The credential flows and their collaborators.
    pub gateway: Arc<AuthenticationGateway>,
}
