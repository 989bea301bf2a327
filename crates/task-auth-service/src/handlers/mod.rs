//! HTTP request handlers for the task auth service.

pub mod health;
pub mod me;
pub mod metrics;
pub mod session;

pub use health::health_check;
pub use me::get_me;
pub use metrics::metrics_handler;
pub use session::{handle_login, handle_logout};
