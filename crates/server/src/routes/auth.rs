//! Auth route handlers.
//!
//! Register and login answer with the user JSON and set the session cookie.
//! Profile reads the cookie through [`RequireAuth`].

use axum::{Json, extract::State, extract::rejection::JsonRejection};
use axum_extra::extract::CookieJar;
use tracing::instrument;

use crate::error::Result;
use crate::middleware::{RequireAuth, session_cookie};
use crate::models::{LoginRequest, RegisterRequest, UserResponse};
use crate::services::{AuthService, IssuedSession};
use crate::state::AppState;

/// `POST /api/auth/register`
#[instrument(skip_all)]
pub async fn register(
    State(state): State<AppState>,
    jar: CookieJar,
    body: std::result::Result<Json<RegisterRequest>, JsonRejection>,
) -> Result<(CookieJar, Json<UserResponse>)> {
    let Json(request) = body?;
    let session = AuthService::new(state.users(), state.tokens())
        .register(request)
        .await?;

    Ok(respond_with_session(&state, jar, session))
}

/// `POST /api/auth/login`
#[instrument(skip_all)]
pub async fn login(
    State(state): State<AppState>,
    jar: CookieJar,
    body: std::result::Result<Json<LoginRequest>, JsonRejection>,
) -> Result<(CookieJar, Json<UserResponse>)> {
    let Json(request) = body?;
    let session = AuthService::new(state.users(), state.tokens())
        .login(request)
        .await?;

    Ok(respond_with_session(&state, jar, session))
}

/// `GET /api/auth/profile`
#[instrument(skip_all)]
pub async fn profile(
    State(state): State<AppState>,
    RequireAuth(user_id): RequireAuth,
) -> Result<Json<UserResponse>> {
    let user = AuthService::new(state.users(), state.tokens())
        .profile(user_id)
        .await?;

    Ok(Json(user.into()))
}

fn respond_with_session(
    state: &AppState,
    jar: CookieJar,
    session: IssuedSession,
) -> (CookieJar, Json<UserResponse>) {
    let cookie = session_cookie(&session.token, state.config().session.cookie_secure);
    (jar.add(cookie), Json(session.user.into()))
}
