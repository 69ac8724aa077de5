//! Server configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required
//! - `LATCHKEY_JWT_SECRET` - Session token signing secret (min 32 chars, high entropy)
//! - `LATCHKEY_DATABASE_URL` - `PostgreSQL` connection string (falls back to
//!   `DATABASE_URL`; not needed when `LATCHKEY_STORE=memory`)
//!
//! ## Optional
//! - `LATCHKEY_HOST` - Bind address (default: 127.0.0.1)
//! - `LATCHKEY_PORT` - Listen port (default: 9000)
//! - `LATCHKEY_STORE` - `postgres` or `memory` (default: postgres)
//! - `LATCHKEY_SESSION_TTL_HOURS` - Session token and cookie lifetime (default: 24)
//! - `LATCHKEY_COOKIE_SECURE` - Mark the session cookie `Secure` (default: false)
//! - `LATCHKEY_CORS_ORIGIN` - Front-end origin allowed to send cookies
//!   (default: <http://localhost:5173>)
//! - `LATCHKEY_ARGON2_MEMORY_KIB` - Argon2 memory cost
//! - `LATCHKEY_ARGON2_ITERATIONS` - Argon2 time cost
//! - `LATCHKEY_ARGON2_PARALLELISM` - Argon2 lanes
//! - `SENTRY_DSN` - Sentry error tracking DSN
//! - `SENTRY_ENVIRONMENT` - Sentry environment tag

use std::collections::HashMap;
use std::net::{IpAddr, SocketAddr};
use std::str::FromStr;
use std::time::Duration;

use secrecy::{ExposeSecret, SecretString};
use thiserror::Error;

use crate::services::password::HasherConfig;

const MIN_JWT_SECRET_LENGTH: usize = 32;
const MIN_ENTROPY_BITS_PER_CHAR: f64 = 3.3;
const DEFAULT_SESSION_TTL_HOURS: u64 = 24;

/// Longest accepted session lifetime (one year).
const MAX_SESSION_TTL_HOURS: u64 = 8760;

/// Blocklist of common placeholder patterns (case-insensitive)
const PLACEHOLDER_PATTERNS: &[&str] = &[
    "your-",
    "changeme",
    "replace",
    "placeholder",
    "example",
    "secret",
    "password",
    "xxx",
    "todo",
    "fixme",
    "insert",
    "enter-",
    "put-your",
    "add-your",
];

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
    #[error("Insecure secret in {0}: {1}")]
    InsecureSecret(String, String),
}

/// Which [`crate::db::UserStore`] backs the server.
#[derive(Debug, Clone)]
pub enum StoreConfig {
    /// `PostgreSQL` via sqlx (connection string contains a password).
    Postgres { database_url: SecretString },
    /// Process-local store; data is lost on restart.
    Memory,
}

/// Session token and cookie settings.
#[derive(Clone)]
pub struct SessionConfig {
    /// HMAC secret used to sign session tokens.
    pub jwt_secret: SecretString,
    /// Lifetime of both the token `exp` claim and the cookie `Max-Age`.
    pub ttl: Duration,
    /// Whether the session cookie carries the `Secure` attribute.
    pub cookie_secure: bool,
}

impl std::fmt::Debug for SessionConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionConfig")
            .field("jwt_secret", &"[REDACTED]")
            .field("ttl", &self.ttl)
            .field("cookie_secure", &self.cookie_secure)
            .finish()
    }
}

/// Server application configuration.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Credential storage backend
    pub store: StoreConfig,
    /// IP address to bind the server to
    pub host: IpAddr,
    /// Port to listen on
    pub port: u16,
    /// Session token settings
    pub session: SessionConfig,
    /// Password hashing work factor
    pub hasher: HasherConfig,
    /// Origin of the single-page front end
    pub cors_origin: String,
    /// Sentry DSN for error tracking
    pub sentry_dsn: Option<String>,
    /// Sentry environment tag
    pub sentry_environment: Option<String>,
}

impl ServerConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if required variables are missing, invalid, or
    /// if the signing secret fails validation (length, placeholder detection,
    /// entropy check).
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        let store = match get_env_or_default("LATCHKEY_STORE", "postgres").as_str() {
            "postgres" => StoreConfig::Postgres {
                database_url: get_database_url("LATCHKEY_DATABASE_URL")?,
            },
            "memory" => StoreConfig::Memory,
            other => {
                return Err(ConfigError::InvalidEnvVar(
                    "LATCHKEY_STORE".to_string(),
                    format!("expected 'postgres' or 'memory', got '{other}'"),
                ));
            }
        };
        let host = parse_env("LATCHKEY_HOST", "127.0.0.1")?;
        let port = parse_env("LATCHKEY_PORT", "9000")?;

        let jwt_secret = get_validated_secret("LATCHKEY_JWT_SECRET")?;
        validate_secret_length(&jwt_secret, "LATCHKEY_JWT_SECRET")?;
        let ttl_hours: u64 = parse_env(
            "LATCHKEY_SESSION_TTL_HOURS",
            &DEFAULT_SESSION_TTL_HOURS.to_string(),
        )?;
        let session = SessionConfig {
            jwt_secret,
            ttl: session_ttl(ttl_hours)?,
            cookie_secure: parse_env("LATCHKEY_COOKIE_SECURE", "false")?,
        };

        let defaults = HasherConfig::default();
        let hasher = HasherConfig {
            memory_kib: parse_env("LATCHKEY_ARGON2_MEMORY_KIB", &defaults.memory_kib.to_string())?,
            iterations: parse_env("LATCHKEY_ARGON2_ITERATIONS", &defaults.iterations.to_string())?,
            parallelism: parse_env(
                "LATCHKEY_ARGON2_PARALLELISM",
                &defaults.parallelism.to_string(),
            )?,
        };

        Ok(Self {
            store,
            host,
            port,
            session,
            hasher,
            cors_origin: get_env_or_default("LATCHKEY_CORS_ORIGIN", "http://localhost:5173"),
            sentry_dsn: get_optional_env("SENTRY_DSN"),
            sentry_environment: get_optional_env("SENTRY_ENVIRONMENT"),
        })
    }

    /// Returns the socket address for binding the server.
    #[must_use]
    pub const fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Convert `LATCHKEY_SESSION_TTL_HOURS` into a lifetime within 1..=8760 hours.
fn session_ttl(hours: u64) -> Result<Duration, ConfigError> {
    let invalid = |reason: String| {
        ConfigError::InvalidEnvVar("LATCHKEY_SESSION_TTL_HOURS".to_string(), reason)
    };

    if hours == 0 {
        return Err(invalid("must be at least 1".to_string()));
    }
    if hours > MAX_SESSION_TTL_HOURS {
        return Err(invalid(format!("must be at most {MAX_SESSION_TTL_HOURS}")));
    }

    hours
        .checked_mul(60 * 60)
        .map(Duration::from_secs)
        .ok_or_else(|| invalid("out of range".to_string()))
}

/// Get a required environment variable.
fn get_required_env(key: &str) -> Result<String, ConfigError> {
    std::env::var(key).map_err(|_| ConfigError::MissingEnvVar(key.to_string()))
}

/// Get database URL with fallback to generic `DATABASE_URL`.
fn get_database_url(primary_key: &str) -> Result<SecretString, ConfigError> {
    if let Ok(value) = std::env::var(primary_key) {
        return Ok(SecretString::from(value));
    }
    if let Ok(value) = std::env::var("DATABASE_URL") {
        return Ok(SecretString::from(value));
    }
    Err(ConfigError::MissingEnvVar(primary_key.to_string()))
}

/// Get an optional environment variable.
fn get_optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok()
}

/// Get an environment variable with a default value.
fn get_env_or_default(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

/// Parse an environment variable (or its default) into `T`.
fn parse_env<T>(key: &str, default: &str) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    get_env_or_default(key, default)
        .parse::<T>()
        .map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), e.to_string()))
}

/// Validate that a signing secret meets minimum length requirements.
fn validate_secret_length(secret: &SecretString, var_name: &str) -> Result<(), ConfigError> {
    let value = secret.expose_secret();
    if value.len() < MIN_JWT_SECRET_LENGTH {
        return Err(ConfigError::InsecureSecret(
            var_name.to_string(),
            format!(
                "must be at least {} characters (got {})",
                MIN_JWT_SECRET_LENGTH,
                value.len()
            ),
        ));
    }
    Ok(())
}

/// Calculate Shannon entropy in bits per character.
fn shannon_entropy(s: &str) -> f64 {
    if s.is_empty() {
        return 0.0;
    }

    let mut freq: HashMap<char, usize> = HashMap::new();
    for c in s.chars() {
        *freq.entry(c).or_insert(0) += 1;
    }

    #[allow(clippy::cast_precision_loss)] // String length will never exceed f64 precision
    let len = s.len() as f64;
    freq.values()
        .map(|&count| {
            #[allow(clippy::cast_precision_loss)] // Character count will never exceed f64 precision
            let p = count as f64 / len;
            -p * p.log2()
        })
        .sum()
}

/// Validate that a secret is not a placeholder and has sufficient entropy.
fn validate_secret_strength(secret: &str, var_name: &str) -> Result<(), ConfigError> {
    let lower = secret.to_lowercase();

    for pattern in PLACEHOLDER_PATTERNS {
        if lower.contains(pattern) {
            return Err(ConfigError::InsecureSecret(
                var_name.to_string(),
                format!("appears to be a placeholder (contains '{pattern}')"),
            ));
        }
    }

    let entropy = shannon_entropy(secret);
    if entropy < MIN_ENTROPY_BITS_PER_CHAR {
        return Err(ConfigError::InsecureSecret(
            var_name.to_string(),
            format!(
                "entropy too low ({entropy:.2} bits/char, need >= {MIN_ENTROPY_BITS_PER_CHAR:.1}). Use a randomly generated secret."
            ),
        ));
    }

    Ok(())
}

/// Load and validate a secret from environment.
fn get_validated_secret(key: &str) -> Result<SecretString, ConfigError> {
    let value = get_required_env(key)?;
    validate_secret_strength(&value, key)?;
    Ok(SecretString::from(value))
}
