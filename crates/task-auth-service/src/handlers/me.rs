//! Current principal handler.

use crate::middleware::auth::CurrentPrincipal;
use axum::Json;
use serde::Serialize;
use tracing::instrument;

/// Response for `GET /v1/me`.
#[derive(Debug, Clone, Serialize)]
pub struct MeResponse {
    pub username: String,
    pub authorities: Vec<String>,
}

/// Handler for GET /v1/me
///
/// Anonymous callers are turned away with 401 by the extractor.
#[instrument(skip_all, name = "auth.handlers.me")]
pub async fn get_me(CurrentPrincipal(principal): CurrentPrincipal) -> Json<MeResponse> {
    tracing::debug!(target: "auth.handlers", "Returning current principal");

    Json(MeResponse {
        username: principal.username,
        authorities: principal.authorities.into_iter().collect(),
    })
}
