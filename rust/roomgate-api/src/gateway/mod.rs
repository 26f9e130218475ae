//! Gateway functionality - credential issuance and verification.
//!
//! This module provides the HTTP gateway layer, handling:
//! - Member login (organization member token exchange)
//! - Session credential verification
//! - Anonymous login
//!
//! Collaborators (membership directory, signing authority, identity
//! generator) are traits injected into [`AuthenticationGateway`].

pub mod authenticate;
pub mod directory;
pub mod error;
pub mod identity;
pub mod routes;
pub mod tokens;

pub use authenticate::AuthenticationGateway;
pub use directory::{AdminApiDirectory, DirectoryError, MembershipDirectory, MembershipRecord};
pub use error::GatewayError;
pub use identity::{IdentityGenerator, UuidV4Generator};
pub use tokens::{JwtTokenManager, SessionClaims, SigningAuthority, SigningError};

use axum::Router;

use crate::AppState;

/// Create the gateway router with all gateway-specific routes.
pub fn create_router() -> Router<AppState> {
    Router::new().merge(routes::router())
}
