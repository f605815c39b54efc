//! Unified testing utilities for dashgate
//!
//! ## Organization
//!
//! - [`fixtures`] - Pre-built settings, guards and session managers
//! - [`mock`] - In-memory backend and loopback cookie endpoints
//! - [`assertions`] - Helpers for inspecting responses and cookies
//! - [`server`] - Ephemeral localhost servers for the HTTP clients
//!
//! ## Usage
//!
//! ```rust,ignore
//! use dashgate::testing::{mock::MockAuthBackend, TestFixtures};
//! use std::sync::Arc;
//!
//! let backend = Arc::new(MockAuthBackend::with_user("user@example.com", "secret"));
//! let manager = TestFixtures::session_manager(backend);
//! assert_eq!(manager.cookie_store().cookie_name(), "refresh");
//! ```

pub mod assertions;
pub mod fixtures;
pub mod mock;
pub mod server;

pub use assertions::*;
pub use fixtures::TestFixtures;
pub use server::spawn_server;

/// Common test constants
pub mod constants {
    /// Default test email address
    pub const TEST_EMAIL: &str = "user@example.com";

    /// Default test password
    pub const TEST_PASSWORD: &str = "correct-horse";

    /// Name the mock backend gives every user
    pub const TEST_USER_NAME: &str = "Test User";

    /// Message the mock backend returns for bad credentials
    pub const INVALID_CREDENTIALS_MESSAGE: &str = "Invalid email or password";

    /// Message the mock backend returns for unknown or rotated refresh tokens
    pub const REVOKED_REFRESH_MESSAGE: &str = "Refresh token revoked";
}
