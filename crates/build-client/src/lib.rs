//! Build API Client Library
//!
//! Typed client for the versioned Build REST API: models (deployable
//! firmware units), the devices bound to them, their code revisions, and
//! streaming device logs.
//!
//! # Example
//!
//! ```rust,no_run
//! use build_client::{BuildClient, Model};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let client = BuildClient::new("my-api-key")?;
//!
//!     // Create a model and read it back
//!     let model = client.create_model(&Model::named("thermostat")).await?;
//!     let model = client.get_model(&model.id).await?;
//!
//!     // Restart everything running it
//!     client.restart_model_devices(&model.id).await?;
//!
//!     Ok(())
//! }
//! ```
//!
//! # Failures
//!
//! The server reports failure inside the response envelope
//! (`"success": false`), not through the HTTP status. The one exception is
//! 504 Gateway Timeout, which is reported as [`BuildClientError::Timeout`]
//! whatever the body says. See [`BuildClientError`] for the full taxonomy.
//!
//! # Deadlines and cancellation
//!
//! Every round trip runs under the client's [`CallContext`]. Use
//! [`BuildClient::with_context`] to get a client sharing the same
//! connection pool whose calls stop at a deadline or when a
//! [`CancellationToken`] fires.
//!
//! # Testing
//!
//! The `testing` module serves an axum router and points a client at it:
//!
//! ```rust,ignore
//! use build_client::testing::TestServer;
//!
//! let server = TestServer::start(fake_build_api()).await?;
//! let devices = server.client.list_devices().await?;
//! ```

mod auth;
mod client;
mod config;
mod context;
mod devices;
pub mod envelope;
mod error;
mod logs;
mod models;
mod revisions;
pub mod testing;
mod transport;
mod types;

pub use auth::Credentials;
pub use client::BuildClient;
pub use config::{
    ClientConfig, ClientConfigBuilder, ConfigError, EndpointsConfig, TimeoutsConfig,
    DEFAULT_API_URL, DEFAULT_BASE_URL,
};
pub use context::CallContext;
pub use error::{
    ApiError, BuildClientError, BuildErrorDetails, CodeTarget, Diagnostic, Result,
    GENERIC_FAILURE_MESSAGE,
};
pub use logs::LogSession;
pub use transport::{RawResponse, Transport};
pub use types::*;

// Re-export so callers don't need a direct tokio-util dependency
pub use tokio_util::sync::CancellationToken;
