use actix_web::{
    body::{EitherBody, MessageBody},
    dev::{ServiceRequest, ServiceResponse},
    error::ErrorInternalServerError,
    middleware::Next,
    web, Error,
};

use super::classifier::{GuardDecision, RouteGuard};
use crate::session::SessionManager;
use crate::utils::logging::LoggingHelper;
use crate::utils::responses::ResponseBuilder;

/// Route guard middleware, mounted with `middleware::from_fn(route_guard)`
///
/// Needs `RouteGuard` and `SessionManager` registered as app data.
///
/// # Errors
///
/// Returns an internal server error if either piece of app data is missing,
/// or whatever error the wrapped service produces.
pub async fn route_guard<B: MessageBody + 'static>(
    req: ServiceRequest,
    next: Next<B>,
) -> Result<ServiceResponse<EitherBody<B>>, Error> {
    let Some(guard) = req.app_data::<web::Data<RouteGuard>>().cloned() else {
        return Err(ErrorInternalServerError("Route guard not configured"));
    };
    let Some(manager) = req.app_data::<web::Data<SessionManager>>().cloned() else {
        return Err(ErrorInternalServerError("Session manager not configured"));
    };

    let has_cookie = manager.cookie_store().is_present(req.request());
    match guard.classify(req.path(), has_cookie) {
        GuardDecision::Allow => next
            .call(req)
            .await
            .map(ServiceResponse::map_into_left_body),
        GuardDecision::RedirectToLogin => {
            LoggingHelper::log_guard_redirect(req.path(), guard.login_path());
            let response = ResponseBuilder::redirect(guard.login_path()).build();
            Ok(req.into_response(response).map_into_right_body())
        }
    }
}
