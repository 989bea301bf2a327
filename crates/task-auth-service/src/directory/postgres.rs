//! Postgres-backed user directory.
//!
//! Reads the task API's `users` table. Every user holds
//! [`DEFAULT_ROLE`](super::DEFAULT_ROLE); the table has no role column.

use super::{DirectoryUser, UserDirectory};
use crate::errors::AuthError;
use async_trait::async_trait;
use sqlx::PgPool;
use std::time::Duration;
use tracing::instrument;

/// Maximum time a lookup may wait for a pooled connection.
pub const DIRECTORY_ACQUIRE_TIMEOUT: Duration = Duration::from_secs(5);

#[derive(Debug, sqlx::FromRow)]
struct UserRow {
    username: String,
    password_hash: String,
}

#[derive(Clone)]
pub struct PgUserDirectory {
    pool: PgPool,
}

impl PgUserDirectory {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UserDirectory for PgUserDirectory {
    #[instrument(skip_all, name = "auth.directory.lookup")]
    async fn find_principal_by_username(
        &self,
        username: &str,
    ) -> Result<Option<DirectoryUser>, AuthError> {
        let row = sqlx::query_as::<_, UserRow>(
            r#"
            SELECT username, password_hash
            FROM users
            WHERE username = $1
            "#,
        )
        .bind(username)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!(target: "auth.directory", error = %e, "User lookup failed");
            AuthError::from(e)
        })?;

        Ok(row.map(|r| DirectoryUser::new(r.username, r.password_hash)))
    }
}
