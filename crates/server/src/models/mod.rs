//! Domain models for the server.

pub mod auth;
pub mod user;

pub use auth::{LoginRequest, RegisterRequest};
pub use user::{NewUser, User, UserResponse};
