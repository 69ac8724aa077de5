//! Latchkey Core - Shared types library.
//!
//! This crate provides the value types used across all Latchkey components:
//! - `server` - The authentication API (register, login, profile)
//! - `cli` - Command-line tools for migrations
//!
//! # Architecture
//!
//! The core crate contains only types - no I/O, no database access,
//! no HTTP clients. This keeps it lightweight and allows it to be used anywhere.
//!
//! # Modules
//!
//! - [`types`] - Newtype wrappers for type-safe IDs and normalized emails

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
