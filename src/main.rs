#![warn(clippy::pedantic)]
#![warn(clippy::cargo)]
#![allow(clippy::multiple_crate_versions)]

use actix_cors::Cors;
use actix_web::{middleware::from_fn, middleware::Logger, web, App, HttpServer};
use dashgate::{
    configure_services, route_guard,
    session::{LoginNotifier, RefreshCookieStore},
    settings::DashgateSettings,
    HttpAuthBackend, RouteGuard, SessionManager,
};
use log::info;
use std::sync::Arc;

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    // Load configuration from Settings.toml and environment variables
    // This also loads .env file and initializes the logger
    let settings = DashgateSettings::load()
        .map_err(|e| std::io::Error::other(format!("Failed to load settings: {e}")))?;

    let backend = HttpAuthBackend::from_settings(&settings)
        .map_err(|e| std::io::Error::other(format!("Failed to configure backend: {e}")))?;

    let notifier = LoginNotifier::from_settings(&settings.notifications);
    if notifier.is_some() {
        info!("Login notifications enabled");
    }

    let session_manager = SessionManager::new(
        Arc::new(backend),
        RefreshCookieStore::from_settings(&settings),
    )
    .with_notifier(notifier);

    start_server(session_manager, settings).await
}

/// Start the gateway
///
/// # Errors
///
/// Returns an error if:
/// - Server binding fails
/// - Server fails to start
async fn start_server(
    session_manager: SessionManager,
    settings: DashgateSettings,
) -> std::io::Result<()> {
    let bind_address = settings.get_bind_address();
    print_startup_info(&bind_address, &settings);

    let route_guard_config = RouteGuard::from_settings(&settings);
    let cors_origins = settings.get_cors_origins();

    HttpServer::new(move || {
        let cors_origins = cors_origins.clone();
        let cors = Cors::default()
            .allowed_origin_fn(move |origin, _| {
                cors_origins
                    .iter()
                    .any(|allowed| allowed == origin.to_str().unwrap_or(""))
            })
            .allowed_methods(vec!["GET", "POST", "OPTIONS"])
            .allowed_headers(vec!["Authorization", "Content-Type", "Accept"])
            .supports_credentials()
            .max_age(3600);

        App::new()
            .app_data(web::Data::new(settings.clone()))
            .app_data(web::Data::new(session_manager.clone()))
            .app_data(web::Data::new(route_guard_config.clone()))
            .wrap(from_fn(route_guard))
            .wrap(cors)
            .wrap(Logger::default())
            .configure(configure_services)
    })
    .bind(&bind_address)?
    .run()
    .await
}

fn print_startup_info(bind_address: &str, settings: &DashgateSettings) {
    println!("Starting dashgate on http://{bind_address}");
    println!("Environment: {}", settings.application.environment);
    println!("Backend: {}", settings.backend.base_url);
    println!(
        "Refresh cookie: {} (secure={})",
        settings.cookies.refresh_cookie_name,
        settings.cookie_secure()
    );
    println!();
    println!("Session endpoints:");
    println!("  POST /api/login      - Exchange credentials for a session");
    println!("  POST /api/refresh    - Rotate the refresh cookie");
    println!("  POST /api/logout     - Clear the refresh cookie");
    println!("  POST /api/set-cookie - Persist an OAuth refresh token");
    println!();
    println!("System endpoints:");
    println!("  GET  /ping           - Health check");
    println!("  GET  /static/*       - Static files");
    println!(
        "  Static files folder: {}",
        settings.static_files.assets_folder
    );
    println!("  Everything else      - Dashboard shell (login required)");
}
