//! Task Auth Service Library
//!
//! Bearer-token authentication for the task API: HS256 token pairs issued
//! at login, revocation at logout, and a per-request filter that turns an
//! `Authorization` header into an authenticated principal.
//!
//! # Architecture
//!
//! ```text
//! routes/mod.rs -> handlers/*.rs -> services/*.rs -> token/, revocation/, directory/
//!                  middleware/auth.rs -> auth/pipeline.rs
//! ```
//!
//! # Modules
//!
//! - `auth` - Principal resolution and the authentication pipeline
//! - `config` - Service configuration from environment
//! - `crypto` - Signing keys and password hashing
//! - `directory` - User directory backends
//! - `errors` - Error types with HTTP status code mapping
//! - `revocation` - Revoked-token store
//! - `token` - Claims, codec, issuer and validator
//! - `routes` - Axum router setup

pub mod auth;
pub mod config;
pub mod crypto;
pub mod directory;
pub mod errors;
pub mod handlers;
pub mod middleware;
pub mod observability;
pub mod revocation;
pub mod routes;
pub mod services;
pub mod token;
