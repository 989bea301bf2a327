//! Utilities shared across the task API crates.

#![warn(clippy::pedantic)]

/// Secret types that prevent accidental logging
pub mod secret;

/// JWT structural checks and bearer header parsing
pub mod jwt;
