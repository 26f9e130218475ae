//! Session credential signing and validation.
//!
//! Credentials are HS256 JWTs carrying the user's identity under the
//! `userUuid` claim, which is what the room servers read back.

use std::fmt;

use async_trait::async_trait;
use chrono::Utc;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};

use crate::config::GatewayConfig;

/// Errors raised by a [`SigningAuthority`].
#[derive(Debug, thiserror::Error)]
pub enum SigningError {
    /// The credential could not be produced.
    #[error("failed to sign session credential: {0}")]
    Encode(#[source] jsonwebtoken::errors::Error),
    /// The credential is malformed, forged or expired.
    #[error("session credential rejected: {0}")]
    Rejected(#[source] jsonwebtoken::errors::Error),
    /// The authority has no key material to work with.
    #[error("signing secret is not configured")]
    MissingSecret,
}

/// Claims carried by every session credential.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionClaims {
    /// Identity the credential is bound to.
    #[serde(rename = "userUuid")]
    pub user_uuid: String,
    /// Issued at (Unix timestamp).
    pub iat: i64,
    /// Expiration time (Unix timestamp).
    pub exp: i64,
}

/// Creates and validates session credentials.
#[async_trait]
pub trait SigningAuthority: Send + Sync + fmt::Debug {
    /// Mint a fresh credential bound to `identity`.
    async fn issue(&self, identity: &str) -> Result<String, SigningError>;

    /// Check signature and expiry of `credential`.
    async fn validate(&self, credential: &str) -> Result<SessionClaims, SigningError>;
}

/// HMAC-backed [`SigningAuthority`].
#[derive(Clone)]
pub struct JwtTokenManager {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
    lifetime_secs: i64,
}

impl fmt::Debug for JwtTokenManager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("JwtTokenManager")
            .field("algorithm", &Algorithm::HS256)
            .field("lifetime_secs", &self.lifetime_secs)
            .finish_non_exhaustive()
    }
}

impl JwtTokenManager {
    /// Build a manager from a raw secret and a credential lifetime.
    pub fn new(secret: &str, lifetime_secs: u64) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = true;
        validation.set_required_spec_claims(&["exp"]);

        Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            validation,
            lifetime_secs: i64::try_from(lifetime_secs).unwrap_or(i64::MAX),
        }
    }

    /// Build a manager from the gateway configuration.
    pub fn from_config(config: &GatewayConfig) -> Result<Self, SigningError> {
        let secret = config
            .jwt_secret
            .as_deref()
            .filter(|s| !s.is_empty())
            .ok_or(SigningError::MissingSecret)?;
        Ok(Self::new(secret, config.jwt_expiry_secs))
    }

    /// Claims for a credential issued now.
    fn claims_for(&self, identity: &str) -> SessionClaims {
        let now = Utc::now().timestamp();
        SessionClaims {
            user_uuid: identity.to_string(),
            iat: now,
            exp: now.saturating_add(self.lifetime_secs),
        }
    }
}

#[async_trait]
impl SigningAuthority for JwtTokenManager {
    async fn issue(&self, identity: &str) -> Result<String, SigningError> {
        let claims = self.claims_for(identity);
        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .map_err(SigningError::Encode)
    }

    async fn validate(&self, credential: &str) -> Result<SessionClaims, SigningError> {
        decode::<SessionClaims>(credential, &self.decoding_key, &self.validation)
            .map(|data| data.claims)
            .map_err(SigningError::Rejected)
    }
}
