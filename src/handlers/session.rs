// Cookie endpoints: the only code that writes or deletes the refresh cookie
use crate::errors::AuthFlowError;
use crate::models::{Credential, SetCookieRequest};
use crate::session::SessionManager;
use crate::utils::responses::ResponseBuilder;
use actix_web::{web, HttpRequest, HttpResponse, ResponseError, Result};
use log::{debug, warn};

/// `POST /api/login` - exchange credentials for a session
///
/// The refresh token goes into the HTTP-only cookie; only the access token
/// and the user profile are returned in the body.
///
/// # Errors
/// Returns the `AuthFlowError` produced by the credential exchange
pub async fn api_login(
    credential: web::Json<Credential>,
    session_manager: web::Data<SessionManager>,
) -> Result<HttpResponse, AuthFlowError> {
    let issued = session_manager.login(credential.into_inner()).await?;
    let body = issued.login_response();

    Ok(HttpResponse::Ok().cookie(issued.refresh_cookie).json(body))
}

/// `POST /api/refresh` - rotate the refresh cookie and mint a new access token
///
/// When the backend refuses the token the stale cookie is cleared in the same
/// response, so the route guard stops treating the browser as signed in.
///
/// # Errors
/// Never fails at the actix level; every failure is rendered as a JSON error
pub async fn api_refresh(
    req: HttpRequest,
    session_manager: web::Data<SessionManager>,
) -> Result<HttpResponse> {
    let current = session_manager.cookie_store().get(&req);

    match session_manager.refresh(current).await {
        Ok(issued) => {
            let body = issued.refresh_response();
            Ok(HttpResponse::Ok().cookie(issued.refresh_cookie).json(body))
        }
        Err(err @ AuthFlowError::RefreshRejected { .. }) => {
            let mut response = err.error_response();
            if let Err(e) = response.add_cookie(&session_manager.logout()) {
                warn!("Failed to attach cleared refresh cookie: {e}");
            }
            Ok(response)
        }
        Err(err) => Ok(err.error_response()),
    }
}

/// `POST /api/logout` - delete the refresh cookie
///
/// # Errors
/// Never fails; the backend is not contacted
pub async fn api_logout(session_manager: web::Data<SessionManager>) -> Result<HttpResponse> {
    debug!("Logout requested");
    Ok(ResponseBuilder::success_with_cookies(vec![
        session_manager.logout(),
    ]))
}

/// `POST /api/set-cookie` - persist a refresh token obtained through OAuth
///
/// # Errors
/// Returns `MissingToken` when the body carries no `refreshToken`
pub async fn api_set_cookie(
    body: web::Json<SetCookieRequest>,
    session_manager: web::Data<SessionManager>,
) -> Result<HttpResponse, AuthFlowError> {
    let cookie = session_manager.persist_refresh_token(body.refresh_token.as_deref())?;
    Ok(ResponseBuilder::success_with_cookies(vec![cookie]))
}
