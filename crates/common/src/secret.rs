//! Secret wrappers for values that must never reach logs.
//!
//! Re-exports [`secrecy`] types. `SecretString` implements `Debug` with
//! redaction, so a struct that derives `Debug` while holding a login
//! password or the JWT signing secret stays safe to trace. Values are
//! zeroized on drop and only readable through `expose_secret()`.
//!
//! ```rust
//! use common::secret::{ExposeSecret, SecretString};
//!
//! #[derive(Debug)]
//! struct LoginForm {
//!     username: String,
//!     password: SecretString,
//! }
//!
//! let form = LoginForm {
//!     username: "alice".to_string(),
//!     password: SecretString::from("hunter2"),
//! };
//! assert!(!format!("{form:?}").contains("hunter2"));
//! assert_eq!(form.password.expose_secret(), "hunter2");
//! ```
//!
//! Use `SecretString` for passwords, bearer tokens held in memory and the
//! base64 signing secret.

pub use secrecy::{ExposeSecret, SecretString};
