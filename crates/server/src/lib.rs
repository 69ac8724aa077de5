//! Latchkey authentication server.
//!
//! Exposes register, login, and profile over HTTP. Sessions are HS256 JWTs
//! carried in an HTTP-only cookie; passwords are stored as Argon2id PHC
//! strings in `PostgreSQL` (or an in-process store for development).
//!
//! The binary in `main.rs` wires configuration, tracing, and Sentry around
//! [`routes::router`]; tests build the same router over
//! [`db::MemoryUserStore`].

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod config;
pub mod db;
pub mod error;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;
pub mod state;

pub use config::ServerConfig;
pub use routes::router;
pub use state::AppState;
