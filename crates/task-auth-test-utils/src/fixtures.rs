//! Deterministic fixtures.
//!
//! Fixed secrets and users so failures reproduce. Never use outside tests.

use std::collections::HashMap;
use std::sync::Arc;
use task_auth_service::config::Config;
use task_auth_service::crypto::{hash_password, SigningKey};
use task_auth_service::directory::{DirectoryUser, InMemoryUserDirectory};

/// Base64 of the 32 ASCII bytes `0123456789abcdef0123456789abcdef`.
pub const TEST_JWT_SECRET_B64: &str = "MDEyMzQ1Njc4OWFiY2RlZjAxMjM0NTY3ODlhYmNkZWY=";

/// A second 32-byte secret, for tokens the service must reject.
pub const FOREIGN_SECRET_BYTES: [u8; 32] = [0x5a; 32];

pub const TEST_USERNAME: &str = "alice";
pub const TEST_PASSWORD: &str = "correct horse battery staple";
pub const SECOND_USERNAME: &str = "bob";
pub const SECOND_PASSWORD: &str = "tr0ub4dor&3";

/// bcrypt cost for fixtures. The minimum bcrypt accepts; keeps tests fast.
pub const TEST_BCRYPT_COST: u32 = 4;

/// Access token lifetime used by [`test_config`], in milliseconds.
pub const TEST_ACCESS_TTL_MS: u64 = 60_000;
/// Refresh token lifetime used by [`test_config`], in milliseconds.
pub const TEST_REFRESH_TTL_MS: u64 = 120_000;

/// The key matching [`TEST_JWT_SECRET_B64`].
pub fn test_signing_key() -> SigningKey {
    SigningKey::from_bytes(b"0123456789abcdef0123456789abcdef").expect("test key is 32 bytes")
}

/// A key the service does not trust.
pub fn foreign_signing_key() -> SigningKey {
    SigningKey::from_bytes(&FOREIGN_SECRET_BYTES).expect("foreign key is 32 bytes")
}

/// Environment for [`test_config`]. Tests may tweak entries before
/// calling `Config::from_vars` themselves.
pub fn test_config_vars() -> HashMap<String, String> {
    HashMap::from([
        (
            "DATABASE_URL".to_string(),
            "postgresql://localhost/unused".to_string(),
        ),
        ("BIND_ADDRESS".to_string(), "127.0.0.1:0".to_string()),
        (
            "JWT_SECRET_KEY".to_string(),
            TEST_JWT_SECRET_B64.to_string(),
        ),
        (
            "JWT_EXPIRATION_MS".to_string(),
            TEST_ACCESS_TTL_MS.to_string(),
        ),
        (
            "JWT_REFRESH_EXPIRATION_MS".to_string(),
            TEST_REFRESH_TTL_MS.to_string(),
        ),
    ])
}

pub fn test_config() -> Config {
    Config::from_vars(&test_config_vars()).expect("test config is valid")
}

/// Directory holding [`TEST_USERNAME`] and [`SECOND_USERNAME`].
pub async fn seeded_directory() -> Arc<InMemoryUserDirectory> {
    let directory = InMemoryUserDirectory::new();
    for (username, password) in [
        (TEST_USERNAME, TEST_PASSWORD),
        (SECOND_USERNAME, SECOND_PASSWORD),
    ] {
        let hash = hash_password(password, TEST_BCRYPT_COST).expect("bcrypt hash");
        directory.insert(DirectoryUser::new(username, hash)).await;
    }
    Arc::new(directory)
}
