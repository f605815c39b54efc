//! Client half of the session lifecycle
//!
//! - [`token_holder`] - in-memory access token slot with subscribers
//! - [`endpoints`] - calls to the local cookie endpoints
//! - [`session_client`] - login, silent refresh and logout for the pages
//! - [`oauth_bridge`] - completion of the OAuth redirect

pub mod endpoints;
pub mod oauth_bridge;
pub mod session_client;
pub mod token_holder;

pub use endpoints::{HttpSessionEndpoints, SessionEndpoints};
pub use oauth_bridge::{CallbackOutcome, CallbackParams, OAuthCallbackBridge, LOGIN_SUCCESS_NOTICE};
pub use session_client::SessionClient;
pub use token_holder::AccessTokenHolder;
