//! Membership directory client.
//!
//! The admin API turns an organization member token into the user's
//! identity and the world/room they should land in.

use std::fmt;

use async_trait::async_trait;
use axum::http::{StatusCode, header::AUTHORIZATION};
use serde::{Deserialize, Serialize};
use url::Url;

use crate::config::DirectoryConfig;

/// Identity and routing data for one organization member.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MembershipRecord {
    pub user_uuid: String,
    pub organization_slug: String,
    pub world_slug: String,
    pub room_slug: String,
    pub map_url_start: String,
}

/// Errors raised while resolving a member token.
#[derive(Debug, thiserror::Error)]
pub enum DirectoryError {
    /// The directory answered with a non-success status.
    #[error("admin API answered {status}")]
    Status { status: StatusCode },
    /// The request could not be sent or the answer could not be read.
    #[error("admin API request failed: {0}")]
    Transport(#[from] reqwest::Error),
    /// The member token cannot be placed in a request URL.
    #[error("cannot build membership URL from {0}")]
    Url(String),
}

impl DirectoryError {
    /// Status the directory asked us to report, if any.
    pub fn status_hint(&self) -> Option<StatusCode> {
        match self {
            Self::Status { status } => Some(*status),
            Self::Transport(e) => e.status(),
            Self::Url(_) => None,
        }
    }
}

/// Resolves organization member tokens.
#[async_trait]
pub trait MembershipDirectory: Send + Sync + fmt::Debug {
    async fn resolve(&self, member_token: &str) -> Result<MembershipRecord, DirectoryError>;
}

/// [`MembershipDirectory`] backed by the admin HTTP API.
#[derive(Debug, Clone)]
pub struct AdminApiDirectory {
    client: reqwest::Client,
    base_url: Url,
    api_token: Option<String>,
}

impl AdminApiDirectory {
    /// Create a client for the admin API described by `config`.
    pub fn new(config: &DirectoryConfig) -> anyhow::Result<Self> {
        let base_url = Url::parse(&config.base_url)?;
        if base_url.cannot_be_a_base() {
            anyhow::bail!("admin API URL {base_url} cannot carry a path");
        }

        Ok(Self {
            client: reqwest::Client::new(),
            base_url,
            api_token: config.api_token.clone(),
        })
    }

    /// `{base}/api/memberships/{token}`, with the token percent-encoded.
    ///
    /// `.` and `..` would be folded away by path normalization and address a
    /// different resource, so they are refused.
    fn membership_url(&self, member_token: &str) -> Result<Url, DirectoryError> {
        if matches!(member_token, "." | "..") {
            return Err(DirectoryError::Url(format!(
                "member token {member_token:?}"
            )));
        }

        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|()| DirectoryError::Url(self.base_url.to_string()))?
            .pop_if_empty()
            .extend(["api", "memberships", member_token]);
        Ok(url)
    }
}

#[async_trait]
impl MembershipDirectory for AdminApiDirectory {
    async fn resolve(&self, member_token: &str) -> Result<MembershipRecord, DirectoryError> {
        let url = self.membership_url(member_token)?;

        let mut request = self.client.get(url);
        if let Some(token) = &self.api_token {
            request = request.header(AUTHORIZATION, token);
        }

        let response = request.send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(DirectoryError::Status { status });
        }

        Ok(response.json::<MembershipRecord>().await?)
    }
}
