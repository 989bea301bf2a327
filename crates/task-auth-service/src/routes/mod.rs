//! HTTP routes for the task auth service.
//!
//! Defines the Axum router and application state.

use crate::auth::{AuthPipeline, PrincipalResolver, PublicPaths};
use crate::config::{Config, ConfigError};
use crate::crypto::SigningKey;
use crate::directory::UserDirectory;
use crate::handlers;
use crate::middleware::auth::{authenticate_request, AuthState};
use crate::revocation::{InMemoryRevocationStore, RevocationStore};
use crate::token::{TokenIssuer, TokenValidator};
use axum::{
    middleware,
    routing::{get, post},
    Router,
};
use metrics_exporter_prometheus::PrometheusHandle;
use std::sync::Arc;
use std::time::Duration;
use tower_http::{timeout::TimeoutLayer, trace::TraceLayer};

/// Application state shared across all handlers.
///
/// The revocation store is shared by `Arc` between logout and the
/// validator the middleware uses.
#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    pub issuer: Arc<TokenIssuer>,
    pub validator: Arc<TokenValidator>,
    pub revocations: Arc<dyn RevocationStore>,
    pub resolver: PrincipalResolver,
    pub pipeline: Arc<AuthPipeline>,
}

impl AppState {
    /// Wire up the auth core from configuration and a user directory.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if the signing secret is unusable.
    pub fn new(config: Config, directory: Arc<dyn UserDirectory>) -> Result<Self, ConfigError> {
        let key = Arc::new(SigningKey::from_base64_secret(&config.jwt_secret)?);
        let revocations: Arc<dyn RevocationStore> =
            Arc::new(InMemoryRevocationStore::new(config.revocation_ttl_ceiling));

        let issuer = Arc::new(TokenIssuer::from_config(key.clone(), &config));
        let validator = Arc::new(TokenValidator::new(key, revocations.clone()));
        let resolver = PrincipalResolver::new(directory);
        let pipeline = Arc::new(AuthPipeline::new(
            PublicPaths::new(&config.public_paths),
            validator.clone(),
            resolver.clone(),
        ));

        Ok(Self {
            config,
            issuer,
            validator,
            revocations,
            resolver,
            pipeline,
        })
    }
}

/// Build the application routes.
///
/// - `POST /auth/login`, `POST /auth/logout`
/// - `GET /v1/me` - requires an authenticated principal
/// - `/health`, `/metrics` - unversioned operational endpoints
///
/// Every request passes through the authentication middleware, then
/// TraceLayer and a 30 second timeout.
pub fn build_routes(state: Arc<AppState>, metrics_handle: PrometheusHandle) -> Router {
    let auth_state = AuthState {
        pipeline: state.pipeline.clone(),
    };

    let app_routes = Router::new()
        .route("/health", get(handlers::health_check))
        .route("/auth/login", post(handlers::handle_login))
        .route("/auth/logout", post(handlers::handle_logout))
        .route("/v1/me", get(handlers::get_me))
        .with_state(state);

    let metrics_routes = Router::new()
        .route("/metrics", get(handlers::metrics_handler))
        .with_state(metrics_handle);

    app_routes
        .merge(metrics_routes)
        .layer(middleware::from_fn_with_state(
            auth_state,
            authenticate_request,
        ))
        .layer(TraceLayer::new_for_http())
        .layer(TimeoutLayer::new(Duration::from_secs(30)))
}
