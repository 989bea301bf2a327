//! Login and logout handlers.

use crate::errors::AuthError;
use crate::routes::AppState;
use crate::services::session_service;
use crate::token::TokenPair;
use axum::{
    extract::{rejection::JsonRejection, State},
    http::{header::AUTHORIZATION, HeaderMap, StatusCode},
    Json,
};
use chrono::Utc;
use common::secret::{ExposeSecret, SecretString};
use serde::Deserialize;
use std::sync::Arc;
use tracing::instrument;

/// Body of `POST /auth/login`.
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: SecretString,
}

/// Handler for POST /auth/login
///
/// Returns the token pair on success. A body that is not valid JSON, or
/// lacks a field, is a 400.
#[instrument(skip_all, name = "auth.handlers.login")]
pub async fn handle_login(
    State(state): State<Arc<AppState>>,
    body: Result<Json<LoginRequest>, JsonRejection>,
) -> Result<Json<TokenPair>, AuthError> {
    let Json(request) = body.map_err(|rejection| {
        tracing::debug!(target: "auth.handlers", error = %rejection, "Rejected login body");
        AuthError::InvalidRequest("username and password are required".to_string())
    })?;

    let pair = session_service::login(
        &state.resolver,
        &state.issuer,
        &request.username,
        request.password.expose_secret(),
        Utc::now().timestamp(),
    )
    .await?;

    Ok(Json(pair))
}

/// Handler for POST /auth/logout
///
/// Revokes the bearer token and returns 204.
#[instrument(skip_all, name = "auth.handlers.logout")]
pub async fn handle_logout(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Result<StatusCode, AuthError> {
    let authorization = headers.get(AUTHORIZATION).and_then(|h| h.to_str().ok());

    session_service::logout(
        &state.validator,
        state.revocations.as_ref(),
        authorization,
        Utc::now().timestamp(),
    )?;

    Ok(StatusCode::NO_CONTENT)
}
