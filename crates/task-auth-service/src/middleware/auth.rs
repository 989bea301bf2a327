//! Authentication middleware and route guards.
//!
//! [`authenticate_request`] runs the [`AuthPipeline`] for every request and
//! installs the resolved principal in request extensions. It never blocks
//! anonymous requests; routes that need a caller take [`CurrentPrincipal`].

use crate::auth::{AuthContext, AuthPipeline, AuthenticatedPrincipal, Decision, FilterStage};
use crate::errors::AuthError;
use axum::{
    async_trait,
    extract::{FromRequestParts, Request, State},
    http::{header::AUTHORIZATION, request::Parts},
    middleware::Next,
    response::{IntoResponse, Response},
};
use chrono::Utc;
use std::sync::Arc;
use tracing::instrument;

/// State for the authentication middleware.
#[derive(Clone)]
pub struct AuthState {
    pub pipeline: Arc<AuthPipeline>,
}

/// Runs the authentication pipeline and acts on its decision.
///
/// - Continue: forwards the request, with the principal in extensions when
///   a token was validated
/// - Reject: responds with the error's status; the handler never runs
#[instrument(skip_all, name = "auth.middleware")]
pub async fn authenticate_request(
    State(state): State<AuthState>,
    mut req: Request,
    next: Next,
) -> Response {
    let path = req.uri().path().to_owned();
    let authorization = req
        .headers()
        .get(AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .map(str::to_owned);
    let installed = req.extensions().get::<AuthenticatedPrincipal>().cloned();

    let decision = state
        .pipeline
        .authenticate(
            &path,
            authorization.as_deref(),
            installed.as_ref(),
            Utc::now().timestamp(),
        )
        .await;

    match decision {
        Decision::Continue(AuthContext::Authenticated(principal)) => {
            req.extensions_mut().insert(principal);
            tracing::trace!(
                target: "auth.middleware",
                stage = FilterStage::ContextInstalled.as_str(),
                "Principal installed"
            );
            next.run(req).await
        }
        Decision::Continue(_) => next.run(req).await,
        Decision::Reject(error) => error.into_response(),
    }
}

/// Extractor for routes that require an authenticated caller.
///
/// Rejects with 401 when the middleware installed no principal.
#[derive(Debug, Clone)]
pub struct CurrentPrincipal(pub AuthenticatedPrincipal);

#[async_trait]
impl<S> FromRequestParts<S> for CurrentPrincipal
where
    S: Send + Sync,
{
    type Rejection = AuthError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<AuthenticatedPrincipal>()
            .cloned()
            .map(CurrentPrincipal)
            .ok_or(AuthError::Unauthenticated)
    }
}

/// Extension trait for reading the principal from a request.
pub trait PrincipalExt {
    /// `None` for public or anonymous requests.
    fn principal(&self) -> Option<&AuthenticatedPrincipal>;
}

impl<B> PrincipalExt for axum::http::Request<B> {
    fn principal(&self) -> Option<&AuthenticatedPrincipal> {
        self.extensions().get::<AuthenticatedPrincipal>()
    }
}
