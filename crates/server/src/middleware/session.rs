//! Session cookie construction.
//!
//! The session token travels in a cookie named `token`:
//! - `HttpOnly` so page scripts cannot read it
//! - `SameSite=Strict` so cross-site requests don't carry it
//! - `Max-Age` equal to the token lifetime
//! - `Secure` only when `LATCHKEY_COOKIE_SECURE=true`. The default targets
//!   local plaintext development; production deployments behind TLS should
//!   turn it on.

use axum_extra::extract::cookie::{Cookie, SameSite};

use crate::services::token::SessionToken;

/// Session cookie name.
pub const SESSION_COOKIE_NAME: &str = "token";

/// Build the session cookie for a freshly issued token.
#[must_use]
pub fn session_cookie(token: &SessionToken, secure: bool) -> Cookie<'static> {
    let max_age = i64::try_from(token.max_age.as_secs()).unwrap_or(i64::MAX);

    Cookie::build((SESSION_COOKIE_NAME, token.token.clone()))
        .http_only(true)
        .secure(secure)
        .same_site(SameSite::Strict)
        .path("/")
        .max_age(time::Duration::seconds(max_age))
        .build()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::time::Duration;

    use chrono::Utc;

    use super::*;

    fn token() -> SessionToken {
        SessionToken {
            token: "header.payload.signature".to_string(),
            expires_at: Utc::now(),
            max_age: Duration::from_secs(86_400),
        }
    }

    #[test]
    fn test_cookie_attributes() {
        let cookie = session_cookie(&token(), false);

        assert_eq!(cookie.name(), "token");
        assert_eq!(cookie.value(), "header.payload.signature");
        assert_eq!(cookie.http_only(), Some(true));
        assert_eq!(cookie.secure(), Some(false));
        assert_eq!(cookie.same_site(), Some(SameSite::Strict));
        assert_eq!(cookie.max_age(), Some(time::Duration::seconds(86_400)));
        assert_eq!(cookie.path(), Some("/"));
    }

    #[test]
    fn test_cookie_header_has_no_secure_flag_by_default() {
        let header = session_cookie(&token(), false).to_string();
        assert!(header.contains("HttpOnly"));
        assert!(header.contains("SameSite=Strict"));
        assert!(header.contains("Max-Age=86400"));
        assert!(!header.contains("Secure"));
    }

    #[test]
    fn test_cookie_secure_when_configured() {
        let header = session_cookie(&token(), true).to_string();
        assert!(header.contains("Secure"));
    }
}
