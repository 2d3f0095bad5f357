//! Middleware that rejects requests without a session cookie.

use axum::{
    extract::Request,
    middleware::Next,
    response::{IntoResponse, Response},
};
use axum_extra::extract::CookieJar;

use crate::Error;

use super::cookie::get_session_id;

/// Middleware function that checks for a session cookie.
///
/// The session ID is placed into the request and the request is executed
/// normally if the cookie is present, otherwise a 401 response is returned
/// without calling the handler. The cookie value is not verified beyond being
/// non-empty.
///
/// **Note**: Route handlers can use the function argument `Extension(session_id): Extension<SessionId>` to receive the session ID.
pub async fn session_guard(jar: CookieJar, mut request: Request, next: Next) -> Response {
    let Some(session_id) = get_session_id(&jar) else {
        tracing::debug!(
            "Rejecting request to {} without a session cookie",
            request.uri().path()
        );
        return Error::Unauthorized.into_response();
    };

    request.extensions_mut().insert(session_id);

    next.run(request).await
}
