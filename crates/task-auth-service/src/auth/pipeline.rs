//! Request authentication pipeline.
//!
//! Decides, per request, whether it continues and as whom. Independent of
//! axum: the middleware feeds it the path, the `Authorization` header and any
//! principal already installed, then acts on the returned [`Decision`].
//!
//! Stages, in order:
//!
//! ```text
//! Unauthenticated -> TokenExtracted -> TokenValidated -> PrincipalResolved -> ContextInstalled
//!        \________________\_________________\____________________\___> Rejected(reason)
//! ```
//!
//! - Public paths continue without any token work.
//! - A request that already carries a principal is not re-validated.
//! - No bearer token means anonymous: the request continues and route
//!   guards decide.
//! - A bearer token that fails any check rejects the request.

use crate::auth::principal::{AuthenticatedPrincipal, PrincipalResolver};
use crate::errors::AuthError;
use crate::observability::{hash_for_correlation, metrics::record_filter_decision};
use crate::token::TokenValidator;
use common::jwt::extract_bearer_token;
use std::sync::Arc;
use tracing::instrument;

/// Suffix marking a public path entry as a prefix pattern.
const PREFIX_WILDCARD: &str = "/**";

/// Where a request stopped in the pipeline. Used for logging.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterStage {
    Unauthenticated,
    TokenExtracted,
    TokenValidated,
    PrincipalResolved,
    ContextInstalled,
}

impl FilterStage {
    pub fn as_str(&self) -> &'static str {
        match self {
            FilterStage::Unauthenticated => "unauthenticated",
            FilterStage::TokenExtracted => "token_extracted",
            FilterStage::TokenValidated => "token_validated",
            FilterStage::PrincipalResolved => "principal_resolved",
            FilterStage::ContextInstalled => "context_installed",
        }
    }
}

/// How a request that continues is authenticated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthContext {
    /// Path is on the public list; no token was looked at.
    Public,
    /// No bearer token was presented.
    Anonymous,
    /// A principal was already installed by an earlier pass.
    AlreadyAuthenticated,
    /// Token validated and principal resolved; install it.
    Authenticated(AuthenticatedPrincipal),
}

impl AuthContext {
    fn label(&self) -> &'static str {
        match self {
            AuthContext::Public => "public",
            AuthContext::Anonymous => "anonymous",
            AuthContext::AlreadyAuthenticated => "reentrant",
            AuthContext::Authenticated(_) => "authenticated",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Decision {
    Continue(AuthContext),
    Reject(AuthError),
}

/// Paths that skip authentication.
///
/// Entries ending in `/**` match the prefix itself and everything below it;
/// other entries match exactly.
#[derive(Debug, Clone, Default)]
pub struct PublicPaths {
    exact: Vec<String>,
    prefixes: Vec<String>,
}

impl PublicPaths {
    pub fn new<S: AsRef<str>>(patterns: &[S]) -> Self {
        let mut paths = Self::default();
        for pattern in patterns {
            let pattern = pattern.as_ref();
            match pattern.strip_suffix(PREFIX_WILDCARD) {
                Some(prefix) => paths.prefixes.push(prefix.to_string()),
                None => paths.exact.push(pattern.to_string()),
            }
        }
        paths
    }

    pub fn matches(&self, path: &str) -> bool {
        self.exact.iter().any(|p| p == path)
            || self.prefixes.iter().any(|prefix| {
                path.strip_prefix(prefix.as_str())
                    .is_some_and(|rest| rest.is_empty() || rest.starts_with('/'))
            })
    }
}

pub struct AuthPipeline {
    public_paths: PublicPaths,
    validator: Arc<TokenValidator>,
    resolver: PrincipalResolver,
}

impl AuthPipeline {
    pub fn new(
        public_paths: PublicPaths,
        validator: Arc<TokenValidator>,
        resolver: PrincipalResolver,
    ) -> Self {
        Self {
            public_paths,
            validator,
            resolver,
        }
    }

    /// Run the pipeline for one request.
    ///
    /// `authorization` is the raw `Authorization` header value, if any.
    /// `installed` is the principal already attached to the request, if any.
    #[instrument(skip_all, name = "auth.filter")]
    pub async fn authenticate(
        &self,
        path: &str,
        authorization: Option<&str>,
        installed: Option<&AuthenticatedPrincipal>,
        now: i64,
    ) -> Decision {
        let decision = self.run(path, authorization, installed, now).await;

        match &decision {
            Decision::Continue(context) => record_filter_decision(context.label()),
            Decision::Reject(_) => record_filter_decision("rejected"),
        }

        decision
    }

    async fn run(
        &self,
        path: &str,
        authorization: Option<&str>,
        installed: Option<&AuthenticatedPrincipal>,
        now: i64,
    ) -> Decision {
        if self.public_paths.matches(path) {
            return Decision::Continue(AuthContext::Public);
        }

        if installed.is_some() {
            return Decision::Continue(AuthContext::AlreadyAuthenticated);
        }

        // Unauthenticated -> TokenExtracted
        let Some(token) = authorization.and_then(extract_bearer_token) else {
            tracing::trace!(
                target: "auth.filter",
                stage = FilterStage::Unauthenticated.as_str(),
                "No bearer token; continuing anonymously"
            );
            return Decision::Continue(AuthContext::Anonymous);
        };

        // TokenExtracted -> TokenValidated
        let claims = match self.validator.verify(token, now) {
            Ok(claims) => claims,
            Err(e) => return reject(FilterStage::TokenExtracted, e),
        };

        // TokenValidated -> PrincipalResolved
        let principal = match self.resolver.resolve(&claims.sub).await {
            Ok(principal) => principal,
            Err(e) => return reject(FilterStage::TokenValidated, e),
        };

        if let Err(e) = TokenValidator::check_subject(&claims, &principal.username) {
            return reject(FilterStage::PrincipalResolved, e);
        }

        tracing::debug!(
            target: "auth.filter",
            stage = FilterStage::PrincipalResolved.as_str(),
            user = %hash_for_correlation(&principal.username),
            "Request authenticated"
        );

        Decision::Continue(AuthContext::Authenticated(principal))
    }
}

fn reject(stage: FilterStage, error: AuthError) -> Decision {
    tracing::debug!(
        target: "auth.filter",
        stage = stage.as_str(),
        error = %error,
        "Request rejected"
    );
    Decision::Reject(error)
}
