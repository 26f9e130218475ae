//! Gateway error type and its translation into HTTP responses.

use std::time::Duration;

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};

use super::authenticate::VerifyResponse;
use super::directory::DirectoryError;
use super::tokens::SigningError;

/// Body of every non-verification failure. Existing clients match on it.
pub const FAILURE_MARKER: &str = "An error happened";

/// Message returned when a credential does not verify.
pub const INVALID_TOKEN_MESSAGE: &str = "Invalid JWT token";

/// Every way a gateway flow can end without a success response.
#[derive(Debug, thiserror::Error)]
pub enum GatewayError {
    /// Required input is missing or malformed. No collaborator was called.
    #[error("invalid request: {0}")]
    Validation(String),
    /// The membership directory failed.
    #[error("membership directory failed: {0}")]
    Directory(#[from] DirectoryError),
    /// The signing authority could not issue a credential.
    #[error("signing authority failed: {0}")]
    Signing(#[from] SigningError),
    /// A collaborator did not answer in time.
    #[error("{collaborator} did not answer within {limit:?}")]
    Timeout {
        collaborator: &'static str,
        limit: Duration,
    },
    /// The presented credential did not verify.
    #[error("session credential is invalid")]
    TokenInvalid,
    /// The client went away before the flow finished.
    #[error("client aborted the request")]
    ClientAborted,
    /// The flow task itself failed.
    #[error("flow task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}

impl GatewayError {
    /// Status code reported to the client.
    pub fn status(&self) -> StatusCode {
        match self {
            Self::TokenInvalid => StatusCode::BAD_REQUEST,
            Self::Directory(e) => e
                .status_hint()
                .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR),
            Self::Validation(_)
            | Self::Signing(_)
            | Self::Timeout { .. }
            | Self::ClientAborted
            | Self::Task(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for GatewayError {
    fn into_response(self) -> Response {
        let status = self.status();

        match &self {
            Self::TokenInvalid => {
                return (
                    status,
                    Json(VerifyResponse::invalid(INVALID_TOKEN_MESSAGE)),
                )
                    .into_response();
            }
            Self::Validation(reason) => {
                tracing::info!(status = status.as_u16(), reason = %reason, "Rejected request");
            }
            Self::Directory(_) if status.is_client_error() => {
                tracing::warn!(status = status.as_u16(), error = %self, "Directory refused member token");
            }
            _ => {
                tracing::error!(status = status.as_u16(), error = %self, "An error happened");
            }
        }

        (status, FAILURE_MARKER).into_response()
    }
}
