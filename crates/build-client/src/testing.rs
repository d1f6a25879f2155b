//! Test utilities for build-client
//!
//! Serves an axum router on an ephemeral port and hands out a client whose
//! API root (`/v4/`) and base host both point at it. Used to exercise the
//! client against fake Build API handlers.

use std::net::SocketAddr;
use std::time::Duration;

use tokio::net::TcpListener;

use crate::{BuildClient, ClientConfig, Result};

/// API key the test client is created with
pub const TEST_API_KEY: &str = "test-api-key";

/// A test server that automatically shuts down when dropped
pub struct TestServer {
    pub addr: SocketAddr,
    pub client: BuildClient,
    shutdown_tx: Option<tokio::sync::oneshot::Sender<()>>,
    handle: Option<tokio::task::JoinHandle<()>>,
}

impl TestServer {
    /// Start serving `router`
    ///
    /// Routes should include the `/v4` prefix, e.g. `/v4/models`.
    ///
    /// # Example
    ///
    /// ```ignore
    /// use axum::{routing::get, Json, Router};
    /// use build_client::testing::TestServer;
    ///
    /// let router = Router::new().route(
    ///     "/v4/models",
    ///     get(|| async { Json(serde_json::json!({"models": [], "success": true})) }),
    /// );
    /// let server = TestServer::start(router).await?;
    /// let models = server.client.list_models().await?;
    /// ```
    pub async fn start(router: axum::Router) -> Result<Self> {
        Self::start_with_timeout(router, Duration::from_secs(5), Duration::from_secs(2)).await
    }

    /// Start serving `router` with custom client timeouts
    pub async fn start_with_timeout(
        router: axum::Router,
        timeout: Duration,
        connect_timeout: Duration,
    ) -> Result<Self> {
        // Bind to any available port
        let listener = TcpListener::bind("127.0.0.1:0").await?;
        let addr = listener.local_addr()?;

        let (shutdown_tx, shutdown_rx) = tokio::sync::oneshot::channel();

        let handle = tokio::spawn(async move {
            axum::serve(listener, router)
                .with_graceful_shutdown(async {
                    let _ = shutdown_rx.await;
                })
                .await
                .ok();
        });

        let config = ClientConfig::builder()
            .server(&format!("http://{}", addr))
            .request_timeout_ms(timeout.as_millis() as u64)
            .connect_timeout_ms(connect_timeout.as_millis() as u64)
            .build();
        let client = BuildClient::with_config(TEST_API_KEY, config)?;

        Ok(Self {
            addr,
            client,
            shutdown_tx: Some(shutdown_tx),
            handle: Some(handle),
        })
    }

    /// Get the base URL of the test server
    pub fn base_url(&self) -> String {
        format!("http://{}", self.addr)
    }

    /// Get a reference to the client
    pub fn client(&self) -> &BuildClient {
        &self.client
    }

    /// Shutdown the server gracefully
    pub async fn shutdown(mut self) {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
        }
        if let Some(handle) = self.handle.take() {
            let _ = handle.await;
        }
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
        }
        if let Some(handle) = self.handle.take() {
            handle.abort();
        }
    }
}
