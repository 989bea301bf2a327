//! User directory.
//!
//! The auth core only needs one question answered: does this username
//! exist, and with which password hash and roles. Everything else about
//! users belongs to the task API proper.

mod postgres;

pub use postgres::{PgUserDirectory, DIRECTORY_ACQUIRE_TIMEOUT};

use crate::errors::AuthError;
use async_trait::async_trait;
use common::secret::SecretString;
use std::collections::HashMap;
use tokio::sync::RwLock;

/// Role granted to every directory user.
pub const DEFAULT_ROLE: &str = "ROLE_USER";

/// A user record as seen by the auth core.
#[derive(Debug, Clone)]
pub struct DirectoryUser {
    pub username: String,
    /// bcrypt hash. Redacted in Debug output.
    pub password_hash: SecretString,
    pub roles: Vec<String>,
}

impl DirectoryUser {
    /// A user carrying only [`DEFAULT_ROLE`].
    pub fn new(username: impl Into<String>, password_hash: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password_hash: SecretString::from(password_hash.into()),
            roles: vec![DEFAULT_ROLE.to_string()],
        }
    }
}

/// Username lookup used by login and the request filter.
#[async_trait]
pub trait UserDirectory: Send + Sync {
    /// `Ok(None)` when no such user exists.
    ///
    /// # Errors
    ///
    /// `DirectoryUnavailable` when the backing store cannot be reached.
    async fn find_principal_by_username(
        &self,
        username: &str,
    ) -> Result<Option<DirectoryUser>, AuthError>;
}

/// Directory held in memory. Used by tests and local runs without a database.
#[derive(Default)]
pub struct InMemoryUserDirectory {
    users: RwLock<HashMap<String, DirectoryUser>>,
}

impl InMemoryUserDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_users(users: impl IntoIterator<Item = DirectoryUser>) -> Self {
        let users = users
            .into_iter()
            .map(|user| (user.username.clone(), user))
            .collect();
        Self {
            users: RwLock::new(users),
        }
    }

    pub async fn insert(&self, user: DirectoryUser) {
        self.users.write().await.insert(user.username.clone(), user);
    }

    /// Returns true if a user was removed.
    pub async fn remove(&self, username: &str) -> bool {
        self.users.write().await.remove(username).is_some()
    }
}

#[async_trait]
impl UserDirectory for InMemoryUserDirectory {
    async fn find_principal_by_username(
        &self,
        username: &str,
    ) -> Result<Option<DirectoryUser>, AuthError> {
        Ok(self.users.read().await.get(username).cloned())
    }
}

/// Test doubles for directory failure paths.
pub mod mock {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Directory whose backing store is always down.
    #[derive(Default)]
    pub struct UnavailableDirectory {
        call_count: AtomicUsize,
    }

    impl UnavailableDirectory {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn call_count(&self) -> usize {
            self.call_count.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl UserDirectory for UnavailableDirectory {
        async fn find_principal_by_username(
            &self,
            _username: &str,
        ) -> Result<Option<DirectoryUser>, AuthError> {
            self.call_count.fetch_add(1, Ordering::SeqCst);
            Err(AuthError::DirectoryUnavailable(
                "directory backend unreachable".to_string(),
            ))
        }
    }
}
