//! Authentication middleware that validates the session cookies and makes
//! the authenticated identity available to route handlers.

use axum::{
    extract::{FromRequestParts, Request, State},
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
};
use axum_extra::extract::PrivateCookieJar;

use crate::{AppState, auth::get_auth_context, endpoints};

/// Middleware function that checks for a valid session.
///
/// If the session cookies are valid, the [AuthContext](super::AuthContext) is
/// placed into the request extensions and the request is executed normally,
/// otherwise a redirect to the log-in page is returned.
///
/// **Note**: Route handlers can use the function argument
/// `Extension(auth_context): Extension<AuthContext>` to receive the identity.
pub async fn auth_guard(State(state): State<AppState>, request: Request, next: Next) -> Response {
    let (mut parts, body) = request.into_parts();

    let jar = match PrivateCookieJar::from_request_parts(&mut parts, &state).await {
        Ok(jar) => jar,
        Err(error) => {
            tracing::error!("Error getting cookie jar: {error:?}. Redirecting to log in page.");
            return Redirect::to(endpoints::LOG_IN_VIEW).into_response();
        }
    };

    let auth_context = match get_auth_context(&jar) {
        Ok(auth_context) => auth_context,
        Err(_) => return Redirect::to(endpoints::LOG_IN_VIEW).into_response(),
    };

    parts.extensions.insert(auth_context);
    let request = Request::from_parts(parts, body);

    next.run(request).await
}
