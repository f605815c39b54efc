// HTTP request handlers for the dashboard gateway
pub mod session;
pub mod static_files;

#[cfg(test)]
mod tests;

use actix_web::web;

use crate::errors::AuthFlowError;

// Re-export the main handler functions
pub use session::{api_login, api_logout, api_refresh, api_set_cookie};
pub use static_files::{api_not_found, health, serve_shell, serve_static};

/// Register every route of the gateway
///
/// Unreadable JSON bodies are reported as validation errors so the cookie
/// endpoints keep a single error shape.
pub fn configure_services(cfg: &mut web::ServiceConfig) {
    cfg.app_data(web::JsonConfig::default().error_handler(|err, _req| {
        AuthFlowError::Validation(format!("Invalid request body: {err}")).into()
    }))
    // Cookie endpoints
    .route("/api/login", web::post().to(api_login))
    .route("/api/refresh", web::post().to(api_refresh))
    .route("/api/logout", web::post().to(api_logout))
    .route("/api/set-cookie", web::post().to(api_set_cookie))
    .route("/api/{tail:.*}", web::route().to(api_not_found))
    // Static files endpoint
    .route("/static/{filename:.*}", web::get().to(serve_static))
    // Health endpoint
    .route("/ping", web::get().to(health))
    // Everything else that got past the route guard is a page of the shell
    .default_service(web::to(serve_shell));
}
