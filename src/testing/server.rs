use actix_web::{web, App, HttpServer};

/// Serve `configure` on an ephemeral localhost port and return its base URL
///
/// Must be called from within an actix runtime (`#[actix_web::test]`); the
/// server runs until the test's system shuts down.
///
/// # Errors
///
/// Returns an error if no local port can be bound
pub fn spawn_server<F>(configure: F) -> std::io::Result<String>
where
    F: Fn(&mut web::ServiceConfig) + Send + Clone + 'static,
{
    let server = HttpServer::new(move || App::new().configure(configure.clone()))
        .workers(1)
        .disable_signals()
        .bind(("127.0.0.1", 0))?;

    let base_url = server
        .addrs()
        .first()
        .map(|addr| format!("http://{addr}"))
        .ok_or_else(|| std::io::Error::other("server bound no address"))?;

    actix_web::rt::spawn(server.run());
    Ok(base_url)
}
