//! Integration tests for Latchkey.
//!
//! Each test starts the real router on an ephemeral port over
//! `MemoryUserStore` and talks to it with a cookie-keeping `reqwest`
//! client, so no database is needed.
//!
//! ```bash
//! cargo test -p latchkey-integration-tests
//! ```

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use latchkey_server::config::{ServerConfig, SessionConfig, StoreConfig};
use latchkey_server::db::MemoryUserStore;
use latchkey_server::services::HasherConfig;
use latchkey_server::{AppState, router};
use reqwest::Client;
use secrecy::SecretString;

/// Signing secret used by every test server.
pub const TEST_JWT_SECRET: &str = "k9$Qw2!zX7@pL4#rT1^vB8&nM3*cF6%h";

/// A server running in the background of the test runtime.
pub struct TestServer {
    addr: SocketAddr,
    store: Arc<MemoryUserStore>,
}

impl TestServer {
    /// Bind to `127.0.0.1:0` and serve the router with a cheap work factor.
    ///
    /// # Panics
    ///
    /// Panics if the listener cannot bind or the state cannot be built.
    pub async fn start() -> Self {
        let config = ServerConfig {
            store: StoreConfig::Memory,
            host: [127, 0, 0, 1].into(),
            port: 0,
            session: SessionConfig {
                jwt_secret: SecretString::from(TEST_JWT_SECRET),
                ttl: Duration::from_secs(86_400),
                cookie_secure: false,
            },
            hasher: HasherConfig {
                memory_kib: 64,
                iterations: 1,
                parallelism: 1,
            },
            cors_origin: "http://localhost:5173".to_string(),
            sentry_dsn: None,
            sentry_environment: None,
        };

        let store = Arc::new(MemoryUserStore::new());
        let state =
            AppState::new(config, store.clone()).expect("Failed to build application state");

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind test listener");
        let addr = listener.local_addr().expect("Failed to read local address");

        tokio::spawn(async move {
            axum::serve(listener, router(state))
                .await
                .expect("Test server failed");
        });

        Self { addr, store }
    }

    /// Absolute URL for a path on this server.
    #[must_use]
    pub fn url(&self, path: &str) -> String {
        format!("http://{}{path}", self.addr)
    }

    /// Backing store, for assertions on what was persisted.
    #[must_use]
    pub fn store(&self) -> &MemoryUserStore {
        &self.store
    }
}

/// A client that keeps cookies between requests, like a browser.
///
/// # Panics
///
/// Panics if the client cannot be built.
#[must_use]
pub fn browser() -> Client {
    Client::builder()
        .cookie_store(true)
        .build()
        .expect("Failed to create HTTP client")
}
