//! Service configuration loaded once at startup.
//!
//! Values come from environment variables; [`Config::from_vars`] takes a map
//! so tests never touch the process environment.

use common::secret::SecretString;
use std::collections::HashMap;
use std::env;
use std::fmt;
use std::time::Duration;
use thiserror::Error;

/// Default access token lifetime (1 hour).
pub const DEFAULT_ACCESS_TOKEN_TTL_MS: u64 = 3_600_000;

/// Default refresh token lifetime (24 hours).
pub const DEFAULT_REFRESH_TOKEN_TTL_MS: u64 = 86_400_000;

/// Shortest accepted token lifetime. Token timestamps have one second
/// resolution, so anything shorter would expire at issuance.
pub const MIN_TOKEN_TTL_MS: u64 = 1_000;

/// Longest accepted token lifetime (365 days).
pub const MAX_TOKEN_TTL_MS: u64 = 31_536_000_000;

/// Paths that bypass the authentication filter when `AUTH_PUBLIC_PATHS` is unset.
pub const DEFAULT_PUBLIC_PATHS: &[&str] = &["/auth/login", "/auth/logout", "/health", "/metrics"];

pub const DEFAULT_BIND_ADDRESS: &str = "0.0.0.0:8080";

#[derive(Clone)]
pub struct Config {
    pub database_url: String,
    pub bind_address: String,
    /// Base64 (standard alphabet) HMAC secret. Decoded by `crypto::SigningKey`.
    pub jwt_secret: SecretString,
    pub access_token_ttl: Duration,
    pub refresh_token_ttl: Duration,
    /// Upper bound on how long a single revocation entry is retained.
    pub revocation_ttl_ceiling: Duration,
    pub public_paths: Vec<String>,
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("database_url", &"[REDACTED]")
            .field("bind_address", &self.bind_address)
            .field("jwt_secret", &"[REDACTED]")
            .field("access_token_ttl", &self.access_token_ttl)
            .field("refresh_token_ttl", &self.refresh_token_ttl)
            .field("revocation_ttl_ceiling", &self.revocation_ttl_ceiling)
            .field("public_paths", &self.public_paths)
            .finish()
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    MissingEnvVar(String),

    #[error("Invalid token lifetime: {0}")]
    InvalidTokenTtl(String),

    #[error("Invalid revocation cache TTL: {0}")]
    InvalidRevocationTtl(String),

    #[error("Invalid public path pattern: {0}")]
    InvalidPublicPath(String),

    #[error("Invalid signing secret: {0}")]
    InvalidSigningSecret(String),

    #[error("Signing secret too short: expected at least {min} bytes, got {actual}")]
    WeakSigningSecret { min: usize, actual: usize },
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_vars(&env::vars().collect())
    }

    /// Load configuration from a HashMap (for testing)
    pub fn from_vars(vars: &HashMap<String, String>) -> Result<Self, ConfigError> {
        let database_url = vars
            .get("DATABASE_URL")
            .ok_or_else(|| ConfigError::MissingEnvVar("DATABASE_URL".to_string()))?
            .clone();

        let bind_address = vars
            .get("BIND_ADDRESS")
            .cloned()
            .unwrap_or_else(|| DEFAULT_BIND_ADDRESS.to_string());

        let jwt_secret = vars
            .get("JWT_SECRET_KEY")
            .filter(|v| !v.trim().is_empty())
            .map(|v| SecretString::from(v.trim().to_string()))
            .ok_or_else(|| ConfigError::MissingEnvVar("JWT_SECRET_KEY".to_string()))?;

        let access_token_ttl =
            parse_token_ttl(vars, "JWT_EXPIRATION_MS", DEFAULT_ACCESS_TOKEN_TTL_MS)?;
        let refresh_token_ttl = parse_token_ttl(
            vars,
            "JWT_REFRESH_EXPIRATION_MS",
            DEFAULT_REFRESH_TOKEN_TTL_MS,
        )?;

        let longest_ttl = access_token_ttl.max(refresh_token_ttl);
        let revocation_ttl_ceiling = match vars.get("REVOCATION_CACHE_TTL_MS") {
            Some(raw) => {
                let ms: u64 = raw.trim().parse().map_err(|e| {
                    ConfigError::InvalidRevocationTtl(format!(
                        "REVOCATION_CACHE_TTL_MS must be an integer number of milliseconds: {}",
                        e
                    ))
                })?;
                let ceiling = Duration::from_millis(ms);
                // A shorter ceiling would let revoked tokens become usable again
                // before they expire.
                if ceiling < longest_ttl {
                    return Err(ConfigError::InvalidRevocationTtl(format!(
                        "REVOCATION_CACHE_TTL_MS ({}) must be at least the longest token lifetime ({})",
                        ms,
                        longest_ttl.as_millis()
                    )));
                }
                ceiling
            }
            None => longest_ttl,
        };

        let public_paths = match vars.get("AUTH_PUBLIC_PATHS") {
            Some(raw) => parse_public_paths(raw)?,
            None => DEFAULT_PUBLIC_PATHS.iter().map(|p| p.to_string()).collect(),
        };

        Ok(Config {
            database_url,
            bind_address,
            jwt_secret,
            access_token_ttl,
            refresh_token_ttl,
            revocation_ttl_ceiling,
            public_paths,
        })
    }
}

fn parse_token_ttl(
    vars: &HashMap<String, String>,
    name: &str,
    default_ms: u64,
) -> Result<Duration, ConfigError> {
    let Some(raw) = vars.get(name) else {
        return Ok(Duration::from_millis(default_ms));
    };

    let ms: u64 = raw.trim().parse().map_err(|e| {
        ConfigError::InvalidTokenTtl(format!(
            "{} must be an integer number of milliseconds: {}",
            name, e
        ))
    })?;

    if !(MIN_TOKEN_TTL_MS..=MAX_TOKEN_TTL_MS).contains(&ms) {
        return Err(ConfigError::InvalidTokenTtl(format!(
            "{} must be between {} and {} milliseconds, got {}",
            name, MIN_TOKEN_TTL_MS, MAX_TOKEN_TTL_MS, ms
        )));
    }

    Ok(Duration::from_millis(ms))
}

fn parse_public_paths(raw: &str) -> Result<Vec<String>, ConfigError> {
    raw.split(',')
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .map(|p| {
            if p.starts_with('/') {
                Ok(p.to_string())
            } else {
                Err(ConfigError::InvalidPublicPath(format!(
                    "'{}' must start with '/'",
                    p
                )))
            }
        })
        .collect()
}
