//! HTTP routes for the credential flows.
//!
//! Pre-flight `OPTIONS` requests never reach these handlers: the CORS layer
//! installed in [`crate::server`] answers them with an empty 200.

use std::sync::Arc;

use axum::{
    Json, Router,
    body::Bytes,
    extract::{Query, State, rejection::QueryRejection},
    http::{HeaderMap, header::HOST},
    response::{IntoResponse, Response},
    routing::{get, post},
};
use serde::Deserialize;
use tokio_util::sync::CancellationToken;
use tracing::Instrument;

use super::error::GatewayError;
use crate::AppState;

/// Credential routes.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/register", post(register))
        .route("/verify", get(verify))
        .route("/anonymLogin", post(anonym_login))
}

/// Query string of `GET /verify`.
#[derive(Debug, Deserialize)]
pub struct VerifyQuery {
    #[serde(default)]
    pub token: Option<String>,
}

/// Exchange an organization member token for a session credential.
pub async fn register(State(state): State<AppState>, headers: HeaderMap, body: Bytes) -> Response {
    let gateway = Arc::clone(&state.gateway);
    run_flow("register", &headers, move |abort| async move {
        gateway.member_login(&body, &abort).await.map(Json)
    })
    .await
}

/// Report whether a session credential is valid.
pub async fn verify(
    State(state): State<AppState>,
    headers: HeaderMap,
    query: Result<Query<VerifyQuery>, QueryRejection>,
) -> Response {
    // An unreadable query string (e.g. a repeated `token`) is just an invalid token.
    let Ok(Query(query)) = query else {
        tracing::debug!("Verify request with unreadable query string");
        return GatewayError::TokenInvalid.into_response();
    };

    let gateway = Arc::clone(&state.gateway);
    run_flow("verify", &headers, move |abort| async move {
        gateway
            .verify_token(query.token.as_deref(), &abort)
            .await
            .map(Json)
    })
    .await
}

/// Issue a credential for a fresh anonymous identity.
pub async fn anonym_login(State(state): State<AppState>, headers: HeaderMap) -> Response {
    let gateway = Arc::clone(&state.gateway);
    run_flow("anonymLogin", &headers, move |abort| async move {
        gateway.anonymous_login(&abort).await.map(Json)
    })
    .await
}

/// Run a flow on its own task so it outlives a dropped connection.
///
/// If the client disconnects, axum drops this future; the drop guard then
/// cancels `abort` and the detached task finishes its collaborator calls
/// without producing a response.
async fn run_flow<F, Fut, T>(route: &'static str, headers: &HeaderMap, flow: F) -> Response
where
    F: FnOnce(CancellationToken) -> Fut,
    Fut: Future<Output = Result<T, GatewayError>> + Send + 'static,
    T: IntoResponse + Send + 'static,
{
    // Host is recorded for future per-tenant routing; it does not change behavior.
    let host = headers
        .get(HOST)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default();
    let span = tracing::info_span!("auth_request", route, host = %host);

    let abort = CancellationToken::new();
    let _disconnect = abort.clone().drop_guard();

    match tokio::spawn(flow(abort).instrument(span)).await {
        Ok(result) => result.into_response(),
        Err(e) => GatewayError::Task(e).into_response(),
    }
}
