//! Shared fixtures for the HTTP tests: an in-memory membership directory and
//! an app wired to it.

#![allow(dead_code, reason = "each test binary uses a different subset")]

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use axum::{
    Router,
    body::Body,
    http::{Request, Response, StatusCode},
};
use http_body_util::BodyExt;
use tower::ServiceExt;

use roomgate_api::AppState;
use roomgate_api::config::AppConfig;
use roomgate_api::gateway::{
    AuthenticationGateway, DirectoryError, JwtTokenManager, MembershipDirectory, MembershipRecord,
    SigningAuthority, UuidV4Generator,
};
use roomgate_api::server::build_router;

pub const SECRET: &str = "integration-test-secret-0123456789";

/// Directory that knows `tok-123` and answers 404 for anything else.
#[derive(Debug, Default)]
pub struct StubDirectory {
    pub started: AtomicUsize,
    pub completed: AtomicUsize,
    pub delay: Option<Duration>,
}

impl StubDirectory {
    pub fn slow(delay: Duration) -> Self {
        Self {
            delay: Some(delay),
            ..Self::default()
        }
    }

    pub fn started(&self) -> usize {
        self.started.load(Ordering::SeqCst)
    }

    pub fn completed(&self) -> usize {
        self.completed.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl MembershipDirectory for StubDirectory {
    async fn resolve(&self, member_token: &str) -> Result<MembershipRecord, DirectoryError> {
        self.started.fetch_add(1, Ordering::SeqCst);
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        self.completed.fetch_add(1, Ordering::SeqCst);

        if member_token == "tok-123" {
            Ok(MembershipRecord {
                user_uuid: "u1".to_string(),
                organization_slug: "acme".to_string(),
                world_slug: "hq".to_string(),
                room_slug: "lobby".to_string(),
                map_url_start: "https://x/map.json".to_string(),
            })
        } else {
            Err(DirectoryError::Status {
                status: StatusCode::NOT_FOUND,
            })
        }
    }
}

/// Router over a stub directory and a real JWT manager.
#[derive(Debug)]
pub struct TestApp {
    pub router: Router,
    pub directory: Arc<StubDirectory>,
    pub signer: Arc<JwtTokenManager>,
}

impl TestApp {
    pub fn new() -> Self {
        Self::with_directory(StubDirectory::default())
    }

    pub fn with_directory(directory: StubDirectory) -> Self {
        let mut config = AppConfig::default();
        config.gateway.jwt_secret = Some(SECRET.to_string());

        let directory = Arc::new(directory);
        let signer = Arc::new(JwtTokenManager::new(SECRET, 3600));
        let gateway = AuthenticationGateway::new(
            Arc::clone(&directory) as Arc<dyn MembershipDirectory>,
            Arc::clone(&signer) as Arc<dyn SigningAuthority>,
            Arc::new(UuidV4Generator),
            config.gateway.collaborator_timeout(),
        );

        let router = build_router(AppState {
            config: Arc::new(config),
            gateway: Arc::new(gateway),
        });

        Self {
            router,
            directory,
            signer,
        }
    }

    /// Send one request and collect the whole response.
    pub async fn send(&self, request: Request<Body>) -> (Response<()>, Vec<u8>) {
        let response = self.router.clone().oneshot(request).await.unwrap();
        let (parts, body) = response.into_parts();
        let bytes = body.collect().await.unwrap().to_bytes().to_vec();
        (Response::from_parts(parts, ()), bytes)
    }
}

pub fn json(bytes: &[u8]) -> serde_json::Value {
    serde_json::from_slice(bytes).expect("JSON body")
}
