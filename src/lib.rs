#![warn(clippy::pedantic)]
#![warn(clippy::cargo)]
#![allow(clippy::multiple_crate_versions)]

/// Version of the dashgate application
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub mod backend;
pub mod client;
pub mod errors;
pub mod guard;
pub mod handlers;
pub mod models;
pub mod session;
pub mod settings;
pub mod utils;

#[cfg(any(test, feature = "testing"))]
pub mod testing;

/// Re-export commonly used items
pub use backend::{AuthBackend, HttpAuthBackend};
pub use client::{AccessTokenHolder, OAuthCallbackBridge, SessionClient};
pub use errors::AuthFlowError;
pub use guard::{route_guard, RouteGuard};
pub use handlers::configure_services;
pub use session::SessionManager;
pub use settings::DashgateSettings;
