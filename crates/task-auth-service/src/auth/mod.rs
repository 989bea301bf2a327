//! Request authentication: principals and the per-request pipeline.

pub mod pipeline;
pub mod principal;

pub use pipeline::{AuthContext, AuthPipeline, Decision, FilterStage, PublicPaths};
pub use principal::{AuthenticatedPrincipal, PrincipalResolver};
