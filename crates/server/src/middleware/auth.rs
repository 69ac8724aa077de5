//! Authentication extractor.
//!
//! Reads the session cookie, verifies it with the token issuer, and hands
//! the authenticated user ID to the handler.

use axum::{extract::FromRequestParts, http::request::Parts};
use axum_extra::extract::CookieJar;
use tracing::Span;

use latchkey_core::UserId;

use super::session::SESSION_COOKIE_NAME;
use crate::error::{AppError, set_sentry_user};
use crate::state::AppState;

/// Extractor that requires a valid session cookie.
///
/// A missing, malformed, tampered, or expired token rejects the request
/// with `AppError::Unauthenticated` (401).
///
/// # Example
///
/// ```rust,ignore
/// async fn protected_handler(
///     RequireAuth(user_id): RequireAuth,
/// ) -> impl IntoResponse {
///     format!("Hello, {user_id}!")
/// }
/// ```
#[derive(Debug, Clone, Copy)]
pub struct RequireAuth(pub UserId);

impl FromRequestParts<AppState> for RequireAuth {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let jar = CookieJar::from_headers(&parts.headers);

        let token = jar
            .get(SESSION_COOKIE_NAME)
            .map(|cookie| cookie.value().to_owned())
            .ok_or(AppError::Unauthenticated)?;

        let user_id = state
            .tokens()
            .verify(&token)
            .map_err(|_| AppError::Unauthenticated)?;

        Span::current().record("user_id", tracing::field::display(user_id));
        set_sentry_user(&user_id);

        Ok(Self(user_id))
    }
}
