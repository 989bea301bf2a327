//! Revoked-token store.
//!
//! Logout inserts a token here so a stolen copy cannot be replayed before
//! it expires. Each entry lives for the token's remaining validity window
//! and then disappears on its own.
//!
//! Entries are keyed by [`token_digest`], never by the raw token.
//!
//! Expiry happens two ways:
//! - **Active**: `moka` drops the entry when its per-entry TTL elapses.
//! - **Lazy**: reads compare the stored `exp` with the caller's `now`.

use crate::crypto::token_digest;
use crate::errors::AuthError;
use crate::observability::metrics::{record_revocation, set_revocation_entries};
use moka::sync::Cache;
use std::time::{Duration, Instant};
use tracing::instrument;

/// Shared revocation list. Implementations must be safe to call from any
/// number of request tasks at once.
pub trait RevocationStore: Send + Sync {
    /// Mark `token` revoked until `expires_at`.
    ///
    /// Revoking a token that is already revoked and still valid is a no-op.
    ///
    /// # Errors
    ///
    /// `AlreadyExpired` when `now >= expires_at`.
    fn revoke(&self, token: &str, expires_at: i64, now: i64) -> Result<(), AuthError>;

    /// Whether `token` is revoked at `now`.
    fn is_revoked(&self, token: &str, now: i64) -> bool;
}

#[derive(Debug, Clone, Copy)]
struct RevokedEntry {
    /// The revoked token's own `exp` (Unix seconds).
    expires_at: i64,
    ttl: Duration,
}

/// Per-entry expiry: the TTL computed at revocation time.
struct RevocationExpiry;

impl moka::Expiry<String, RevokedEntry> for RevocationExpiry {
    fn expire_after_create(
        &self,
        _key: &String,
        value: &RevokedEntry,
        _created_at: Instant,
    ) -> Option<Duration> {
        Some(value.ttl)
    }
}

/// In-process revocation store backed by a [`moka::sync::Cache`].
///
/// The cache has no capacity bound: evicting a live entry early would
/// un-revoke a token. Growth is bounded by token lifetimes instead.
pub struct InMemoryRevocationStore {
    entries: Cache<String, RevokedEntry>,
    ttl_ceiling: Duration,
}

impl InMemoryRevocationStore {
    /// `ttl_ceiling` is the longest validity a token issued under the
    /// current configuration can have. Entries are never cut short by it;
    /// a token outliving it (issued under older, longer TTLs) is logged.
    pub fn new(ttl_ceiling: Duration) -> Self {
        let entries = Cache::builder().expire_after(RevocationExpiry).build();
        Self {
            entries,
            ttl_ceiling,
        }
    }

    /// Number of live entries after pending expirations are applied.
    pub fn outstanding(&self) -> u64 {
        self.entries.run_pending_tasks();
        let count = self.entries.entry_count();
        set_revocation_entries(count);
        count
    }
}

impl RevocationStore for InMemoryRevocationStore {
    #[instrument(skip_all)]
    fn revoke(&self, token: &str, expires_at: i64, now: i64) -> Result<(), AuthError> {
        if now >= expires_at {
            tracing::debug!(
                target: "auth.revocation",
                expires_at = expires_at,
                now = now,
                "Revocation refused: token already expired"
            );
            record_revocation("already_expired");
            return Err(AuthError::AlreadyExpired);
        }

        let remaining = u64::try_from(expires_at.saturating_sub(now)).unwrap_or(u64::MAX);
        let ttl = Duration::from_secs(remaining);
        if ttl > self.ttl_ceiling {
            tracing::warn!(
                target: "auth.revocation",
                ttl_secs = ttl.as_secs(),
                ceiling_secs = self.ttl_ceiling.as_secs(),
                "Revoked token outlives the configured revocation TTL; retaining until its expiry"
            );
        }

        let entry = self
            .entries
            .entry(token_digest(token))
            .or_insert_with(|| RevokedEntry { expires_at, ttl });

        if entry.is_fresh() {
            tracing::debug!(
                target: "auth.revocation",
                expires_at = expires_at,
                ttl_secs = ttl.as_secs(),
                "Token revoked"
            );
            record_revocation("revoked");
        } else {
            tracing::debug!(target: "auth.revocation", "Token was already revoked");
            record_revocation("already_revoked");
        }
        set_revocation_entries(self.entries.entry_count());

        Ok(())
    }

    #[instrument(skip_all)]
    fn is_revoked(&self, token: &str, now: i64) -> bool {
        let key = token_digest(token);
        match self.entries.get(&key) {
            Some(entry) if now < entry.expires_at => true,
            Some(_) => {
                // Token expired naturally; the entry has nothing left to guard.
                self.entries.invalidate(&key);
                set_revocation_entries(self.entries.entry_count());
                false
            }
            None => false,
        }
    }
}
