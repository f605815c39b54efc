//! Session Management Module
//!
//! Server side of the session lifecycle: the refresh cookie and the manager
//! that issues, rotates and clears it.
//!
//! # Modules
//!
//! - [`manager`] - Credential exchange, silent refresh, persistence and logout
//! - [`cookie`] - HTTP-only refresh cookie construction and lookup
//! - [`notifier`] - Optional chat notification on successful login

pub mod cookie;
pub mod manager;
pub mod notifier;

pub use cookie::{CookieOptions, RefreshCookieStore, DEFAULT_REFRESH_COOKIE_NAME};
pub use manager::{IssuedSession, SessionManager};
pub use notifier::LoginNotifier;
