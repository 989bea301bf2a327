//! Authenticated principals and their resolution from the user directory.

use crate::crypto::{verify_password, DUMMY_PASSWORD_HASH};
use crate::directory::{DirectoryUser, UserDirectory};
use crate::errors::AuthError;
use crate::observability::hash_for_correlation;
use common::secret::ExposeSecret;
use serde::Serialize;
use std::collections::BTreeSet;
use std::sync::Arc;
use tracing::instrument;

/// The caller a request runs as. Built per request, dropped with it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AuthenticatedPrincipal {
    pub username: String,
    pub authorities: BTreeSet<String>,
}

impl AuthenticatedPrincipal {
    pub fn has_authority(&self, authority: &str) -> bool {
        self.authorities.contains(authority)
    }
}

impl From<DirectoryUser> for AuthenticatedPrincipal {
    fn from(user: DirectoryUser) -> Self {
        Self {
            username: user.username,
            authorities: user.roles.into_iter().collect(),
        }
    }
}

/// Maps usernames to principals through a [`UserDirectory`].
#[derive(Clone)]
pub struct PrincipalResolver {
    directory: Arc<dyn UserDirectory>,
}

impl PrincipalResolver {
    pub fn new(directory: Arc<dyn UserDirectory>) -> Self {
        Self { directory }
    }

    /// Resolve the principal for a token subject.
    ///
    /// The returned username is the directory's spelling, which can differ
    /// from `username` (e.g. case-insensitive lookups); that is the case the
    /// filter's subject check catches.
    ///
    /// # Errors
    ///
    /// - `PrincipalNotFound` if the user no longer exists
    /// - `DirectoryUnavailable` if the directory cannot answer
    #[instrument(skip_all)]
    pub async fn resolve(&self, username: &str) -> Result<AuthenticatedPrincipal, AuthError> {
        match self.directory.find_principal_by_username(username).await? {
            Some(user) => Ok(user.into()),
            None => {
                tracing::debug!(
                    target: "auth.principal",
                    user = %hash_for_correlation(username),
                    "Token subject not found in directory"
                );
                Err(AuthError::PrincipalNotFound)
            }
        }
    }

    /// Check a username/password pair.
    ///
    /// bcrypt runs even for unknown users so response time does not reveal
    /// which usernames exist.
    ///
    /// # Errors
    ///
    /// `InvalidCredentials` for an unknown user or wrong password.
    #[instrument(skip_all)]
    pub async fn authenticate_credentials(
        &self,
        username: &str,
        password: &str,
    ) -> Result<AuthenticatedPrincipal, AuthError> {
        let user = self.directory.find_principal_by_username(username).await?;

        let Some(user) = user else {
            // Result ignored: only the cost of the comparison matters here.
            let _ = verify_password(password, DUMMY_PASSWORD_HASH);
            tracing::debug!(
                target: "auth.principal",
                user = %hash_for_correlation(username),
                "Login rejected: unknown user"
            );
            return Err(AuthError::InvalidCredentials);
        };

        if !verify_password(password, user.password_hash.expose_secret())? {
            tracing::debug!(
                target: "auth.principal",
                user = %hash_for_correlation(username),
                "Login rejected: wrong password"
            );
            return Err(AuthError::InvalidCredentials);
        }

        Ok(user.into())
    }
}
