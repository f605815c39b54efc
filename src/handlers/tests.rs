// Tests for the cookie endpoints at the handler level
use super::configure_services;
use crate::models::{ErrorBody, SuccessResponse};
use crate::testing::mock::MockAuthBackend;
use crate::testing::TestFixtures;
use actix_web::{cookie::Cookie, http::StatusCode, test, web, App};
use std::sync::Arc;

#[actix_web::test]
async fn test_set_cookie_persists_token() {
    let manager = TestFixtures::session_manager(Arc::new(MockAuthBackend::default()));
    let app = test::init_service(
        App::new()
            .app_data(web::Data::new(manager))
            .app_data(web::Data::new(TestFixtures::settings()))
            .configure(configure_services),
    )
    .await;

    let req = test::TestRequest::post()
        .uri("/api/set-cookie")
        .set_json(serde_json::json!({ "refreshToken": "RT-oauth" }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);

    let cookie = resp
        .response()
        .cookies()
        .find(|c| c.name() == "refresh")
        .map(Cookie::into_owned)
        .unwrap();
    assert_eq!(cookie.value(), "RT-oauth");
    assert_eq!(cookie.http_only(), Some(true));

    let body: SuccessResponse = test::read_body_json(resp).await;
    assert!(body.success);
}

#[actix_web::test]
async fn test_set_cookie_without_token_is_rejected() {
    let manager = TestFixtures::session_manager(Arc::new(MockAuthBackend::default()));
    let app = test::init_service(
        App::new()
            .app_data(web::Data::new(manager))
            .configure(configure_services),
    )
    .await;

    let req = test::TestRequest::post()
        .uri("/api/set-cookie")
        .set_json(serde_json::json!({}))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    assert_eq!(resp.response().cookies().count(), 0);

    let body: ErrorBody = test::read_body_json(resp).await;
    assert_eq!(body.error, "missing_token");
}

#[actix_web::test]
async fn test_malformed_login_body_is_validation_error() {
    let backend = Arc::new(MockAuthBackend::with_user("a@b.com", "secret"));
    let manager = TestFixtures::session_manager(backend.clone());
    let app = test::init_service(
        App::new()
            .app_data(web::Data::new(manager))
            .configure(configure_services),
    )
    .await;

    let req = test::TestRequest::post()
        .uri("/api/login")
        .insert_header(("content-type", "application/json"))
        .set_payload("{not json")
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    let body: ErrorBody = test::read_body_json(resp).await;
    assert_eq!(body.error, "validation_error");
    assert_eq!(backend.login_calls(), 0);
}

#[actix_web::test]
async fn test_rejected_refresh_clears_stale_cookie() {
    let manager = TestFixtures::session_manager(Arc::new(MockAuthBackend::default()));
    let app = test::init_service(
        App::new()
            .app_data(web::Data::new(manager))
            .configure(configure_services),
    )
    .await;

    let req = test::TestRequest::post()
        .uri("/api/refresh")
        .cookie(Cookie::new("refresh", "RT-revoked"))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);

    let cookie = resp
        .response()
        .cookies()
        .find(|c| c.name() == "refresh")
        .map(Cookie::into_owned)
        .unwrap();
    assert_eq!(cookie.value(), "");

    let body: ErrorBody = test::read_body_json(resp).await;
    assert_eq!(body.error, "refresh_rejected");
}

#[actix_web::test]
async fn test_unknown_api_route_is_json_404() {
    let manager = TestFixtures::session_manager(Arc::new(MockAuthBackend::default()));
    let app = test::init_service(
        App::new()
            .app_data(web::Data::new(manager))
            .configure(configure_services),
    )
    .await;

    let req = test::TestRequest::get().uri("/api/invoices").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);

    let body: ErrorBody = test::read_body_json(resp).await;
    assert_eq!(body.error, "not_found");
}
