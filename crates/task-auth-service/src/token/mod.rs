//! Token lifecycle: claims, codec, issuance and validation.

pub mod claims;
pub mod codec;
pub mod issuer;
pub mod validator;

pub use claims::Claims;
pub use issuer::{TokenIssuer, TokenPair};
pub use validator::TokenValidator;
