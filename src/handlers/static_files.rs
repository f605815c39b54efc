use crate::models::HealthResponse;
use crate::settings::DashgateSettings;
use crate::utils::responses::ResponseBuilder;
use actix_web::{web, HttpResponse, Result};
use log::debug;
use std::fs;

/// Health check endpoint
///
/// # Errors
/// Returns an error if health status cannot be determined
pub async fn health() -> Result<HttpResponse> {
    let response = HealthResponse {
        status: "ok".to_string(),
        message: "dashgate is running".to_string(),
    };
    Ok(HttpResponse::Ok().json(response))
}

fn content_type_for(path: &str) -> &'static str {
    let extension = path
        .rsplit_once('.')
        .map(|(_, ext)| ext.to_ascii_lowercase());
    match extension.as_deref() {
        Some("html") => "text/html; charset=utf-8",
        Some("css") => "text/css",
        Some("js" | "mjs") => "application/javascript",
        Some("json" | "map") => "application/json",
        Some("png") => "image/png",
        Some("jpg" | "jpeg") => "image/jpeg",
        Some("gif") => "image/gif",
        Some("svg") => "image/svg+xml",
        Some("ico") => "image/x-icon",
        Some("webp") => "image/webp",
        Some("woff") => "font/woff",
        Some("woff2") => "font/woff2",
        _ => "text/plain",
    }
}

/// Serve static files from the configured static directory
///
/// # Errors
///
/// Never fails; unreadable or out-of-tree paths answer 404
pub async fn serve_static(
    path: web::Path<String>,
    settings: web::Data<DashgateSettings>,
) -> Result<HttpResponse> {
    let filename = path.into_inner();
    if filename.split('/').any(|segment| segment == "..") {
        debug!("Rejected static path with parent segment: {filename}");
        return Ok(ResponseBuilder::not_found()
            .with_message("File not found")
            .build());
    }

    let file_path = format!("{}/{}", settings.static_files.assets_folder, filename);
    debug!("Attempting to serve static file: {file_path}");

    Ok(fs::read(&file_path).map_or_else(
        |_| {
            debug!("Static file not found: {file_path}");
            ResponseBuilder::not_found()
                .with_message("File not found")
                .build()
        },
        |contents| {
            HttpResponse::Ok()
                .content_type(content_type_for(&file_path))
                .body(contents)
        },
    ))
}

/// Unknown API routes answer JSON instead of the shell page
///
/// # Errors
/// Never fails
pub async fn api_not_found() -> Result<HttpResponse> {
    Ok(ResponseBuilder::not_found()
        .with_message("Unknown API endpoint")
        .build())
}

/// Single-page application shell, served for every navigation the guard lets through
///
/// # Errors
///
/// Never fails; a generated page stands in when `index.html` is missing
pub async fn serve_shell(settings: web::Data<DashgateSettings>) -> Result<HttpResponse> {
    Ok(HttpResponse::Ok()
        .content_type("text/html; charset=utf-8")
        .body(get_shell_page(&settings)))
}

#[must_use]
pub fn get_shell_page(settings: &DashgateSettings) -> String {
    let html_path = format!("{}/index.html", settings.static_files.assets_folder);
    fs::read_to_string(&html_path).unwrap_or_else(|_| generate_fallback_shell())
}

fn generate_fallback_shell() -> String {
    r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>Invoicing Dashboard</title>
    <link rel="stylesheet" href="/static/app.css">
</head>
<body>
    <div id="root"></div>
    <script type="module" src="/static/app.js"></script>
</body>
</html>"#
        .to_string()
}
