//! HTTP middleware stack.
//!
//! # Middleware Order (bottom to top in Router)
//!
//! 1. Sentry layer (capture errors)
//! 2. `TraceLayer` (request tracing)
//! 3. Request ID (add unique ID to each request)
//! 4. CORS (front-end origin, with credentials)
//!
//! Session transport is not a layer: handlers that need a logged-in user
//! take the [`RequireAuth`] extractor, and login/register attach the cookie
//! with [`session_cookie`].

pub mod auth;
pub mod request_id;
pub mod session;

pub use auth::RequireAuth;
pub use request_id::{REQUEST_ID_HEADER, request_id_middleware};
pub use session::{SESSION_COOKIE_NAME, session_cookie};
