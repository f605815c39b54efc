//! Route guard for page navigations
//!
//! - [`classifier`] - path classification into allow/redirect decisions
//! - [`middleware`] - actix middleware applying the decision to every request

pub mod classifier;
pub mod middleware;

pub use classifier::{GuardDecision, RouteGuard, HEALTH_PATH};
pub use middleware::route_guard;
