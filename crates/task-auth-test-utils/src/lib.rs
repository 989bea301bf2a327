//! # Task Auth Test Utilities
//!
//! Shared test utilities for the task auth service.
//!
//! This crate provides:
//! - Deterministic fixtures (fixed signing secret, seeded user directory)
//! - `TestTokenBuilder` for hand-crafted tokens (expired, foreign-signed, ...)
//! - `TestAuthServer` for end-to-end tests over real HTTP
//! - `TokenAssertions` for inspecting issued tokens
//!
//! ## Usage
//!
//! ```rust,ignore
//! use task_auth_test_utils::*;
//!
//! #[tokio::test]
//! async fn test_example() {
//!     let server = TestAuthServer::spawn(seeded_directory().await).await?;
//!     let pair = server.login(TEST_USERNAME, TEST_PASSWORD).await?;
//!
//!     pair.access_token
//!         .assert_valid_jwt()
//!         .assert_for_subject(TEST_USERNAME);
//! }
//! ```

pub mod assertions;
pub mod fixtures;
pub mod server_harness;
pub mod token_builders;

pub use assertions::*;
pub use fixtures::*;
pub use server_harness::*;
pub use token_builders::*;
