//! The three credential flows: member login, token verification and
//! anonymous login.
//!
//! Each flow validates its input, calls its collaborators, and yields
//! either a response body or a [`GatewayError`]. Flows take a
//! [`CancellationToken`] that is cancelled when the client disconnects; the
//! collaborator calls still run to completion, but the result is discarded
//! instead of being handed back for writing.

use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tokio_util::sync::CancellationToken;

use super::directory::MembershipDirectory;
use super::error::GatewayError;
use super::identity::IdentityGenerator;
use super::tokens::SigningAuthority;

/// Body of `POST /register`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MembershipExchangeRequest {
    pub organization_member_token: String,
}

impl MembershipExchangeRequest {
    /// Parse a JSON body, requiring a non-empty string
    /// `organizationMemberToken`.
    pub fn parse(body: &[u8]) -> Result<Self, GatewayError> {
        let value: serde_json::Value = serde_json::from_slice(body)
            .map_err(|e| GatewayError::Validation(format!("body is not JSON: {e}")))?;

        match value.get("organizationMemberToken") {
            Some(serde_json::Value::String(token)) if !token.is_empty() => Ok(Self {
                organization_member_token: token.clone(),
            }),
            Some(serde_json::Value::String(_)) => Err(GatewayError::Validation(
                "organizationMemberToken is empty".to_string(),
            )),
            Some(_) => Err(GatewayError::Validation(
                "organizationMemberToken is not a string".to_string(),
            )),
            None => Err(GatewayError::Validation(
                "No organization token".to_string(),
            )),
        }
    }
}

/// Successful `POST /register` body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MemberLoginResponse {
    pub auth_token: String,
    pub user_uuid: String,
    pub organization_slug: String,
    pub world_slug: String,
    pub room_slug: String,
    pub map_url_start: String,
}

/// Successful `POST /anonymLogin` body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnonymousLoginResponse {
    pub auth_token: String,
    pub user_uuid: String,
}

/// `GET /verify` body, for both outcomes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VerifyResponse {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl VerifyResponse {
    pub fn valid() -> Self {
        Self {
            success: true,
            message: None,
        }
    }

    pub fn invalid(message: &str) -> Self {
        Self {
            success: false,
            message: Some(message.to_string()),
        }
    }
}

const DIRECTORY: &str = "membership directory";
const SIGNER: &str = "signing authority";

/// Stateless credential gateway over injected collaborators.
#[derive(Debug, Clone)]
pub struct AuthenticationGateway {
    directory: Arc<dyn MembershipDirectory>,
    signer: Arc<dyn SigningAuthority>,
    identities: Arc<dyn IdentityGenerator>,
    collaborator_timeout: Duration,
}

impl AuthenticationGateway {
    pub fn new(
        directory: Arc<dyn MembershipDirectory>,
        signer: Arc<dyn SigningAuthority>,
        identities: Arc<dyn IdentityGenerator>,
        collaborator_timeout: Duration,
    ) -> Self {
        Self {
            directory,
            signer,
            identities,
            collaborator_timeout,
        }
    }

    /// Exchange an organization member token for a session credential.
    pub async fn member_login(
        &self,
        body: &[u8],
        abort: &CancellationToken,
    ) -> Result<MemberLoginResponse, GatewayError> {
        let request = MembershipExchangeRequest::parse(body)?;

        let record = self
            .bounded(
                DIRECTORY,
                self.directory.resolve(&request.organization_member_token),
            )
            .await?;

        let auth_token = self
            .bounded(SIGNER, self.signer.issue(&record.user_uuid))
            .await?;

        if abort.is_cancelled() {
            tracing::warn!(user_uuid = %record.user_uuid, "Login request was aborted");
            return Err(GatewayError::ClientAborted);
        }

        tracing::info!(
            user_uuid = %record.user_uuid,
            organization = %record.organization_slug,
            world = %record.world_slug,
            room = %record.room_slug,
            "Member logged in"
        );

        Ok(MemberLoginResponse {
            auth_token,
            user_uuid: record.user_uuid,
            organization_slug: record.organization_slug,
            world_slug: record.world_slug,
            room_slug: record.room_slug,
            map_url_start: record.map_url_start,
        })
    }

    /// Check a credential with the signing authority.
    ///
    /// Every failure, including a missing token or a slow authority, is
    /// reported as [`GatewayError::TokenInvalid`].
    pub async fn verify_token(
        &self,
        token: Option<&str>,
        abort: &CancellationToken,
    ) -> Result<VerifyResponse, GatewayError> {
        let Some(token) = token.filter(|t| !t.is_empty()) else {
            tracing::debug!("Verify request without token");
            return Err(GatewayError::TokenInvalid);
        };

        let outcome = self
            .bounded(SIGNER, self.signer.validate(token))
            .await;

        if abort.is_cancelled() {
            tracing::warn!("Verify request was aborted");
            return Err(GatewayError::ClientAborted);
        }

        match outcome {
            Ok(claims) => {
                tracing::debug!(user_uuid = %claims.user_uuid, "Credential verified");
                Ok(VerifyResponse::valid())
            }
            Err(e) => {
                tracing::debug!(error = %e, "Credential rejected");
                Err(GatewayError::TokenInvalid)
            }
        }
    }

    /// Mint a credential for a brand-new anonymous identity.
    pub async fn anonymous_login(
        &self,
        abort: &CancellationToken,
    ) -> Result<AnonymousLoginResponse, GatewayError> {
        let user_uuid = self.identities.new_identity();

        let auth_token = self
            .bounded(SIGNER, self.signer.issue(&user_uuid))
            .await?;

        if abort.is_cancelled() {
            tracing::warn!(user_uuid = %user_uuid, "Login request was aborted");
            return Err(GatewayError::ClientAborted);
        }

        tracing::info!(user_uuid = %user_uuid, "Anonymous login");

        Ok(AnonymousLoginResponse {
            auth_token,
            user_uuid,
        })
    }

    /// Run a collaborator call under the configured timeout.
    async fn bounded<T, E, F>(&self, collaborator: &'static str, call: F) -> Result<T, GatewayError>
    where
        F: Future<Output = Result<T, E>>,
        GatewayError: From<E>,
    {
        match tokio::time::timeout(self.collaborator_timeout, call).await {
            Ok(result) => result.map_err(GatewayError::from),
            Err(_elapsed) => Err(GatewayError::Timeout {
                collaborator,
                limit: self.collaborator_timeout,
            }),
        }
    }
}
