//! Device log polling
//!
//! Logs are fetched in batches. The first batch comes from
//! `/devices/{id}/logs`; each response carries a `poll_url` cursor, relative
//! to the base host (not the versioned API root), that fetches the next one.
//!
//! There is no end state and no built-in pacing: the caller decides when to
//! poll again and when to stop. Batches are returned exactly as received.
//! Entries are ordered within a batch, but the server does not promise
//! anything across batches, so deduplication is the caller's job.
//!
//! ```rust,no_run
//! use std::time::Duration;
//! use build_client::BuildClient;
//!
//! # async fn example() -> build_client::Result<()> {
//! let client = BuildClient::new("api-key")?;
//! let mut session = client.log_session("2a3b4c5d6e7f");
//!
//! loop {
//!     for entry in session.next_batch().await?.entries {
//!         println!("{} [{}] {}", entry.timestamp, entry.log_type, entry.message);
//!     }
//!     tokio::time::sleep(Duration::from_secs(2)).await;
//! }
//! # }
//! ```

use reqwest::Method;
use tracing::{debug, instrument};

use crate::client::BuildClient;
use crate::error::Result;
use crate::types::{LogBatch, PollCursor};

impl BuildClient {
    // =========================================================================
    // Log Operations
    // =========================================================================

    /// Fetch the first batch of a device's logs
    ///
    /// The returned `poll_url` is handed back unchanged; pass it to
    /// [`continue_device_logs`](Self::continue_device_logs) for the next batch.
    #[instrument(skip(self))]
    pub async fn get_device_logs(&self, device_id: &str) -> Result<LogBatch> {
        let paths = self.paths();
        let url = self.endpoint(&[paths.devices.as_str(), device_id, paths.logs.as_str()])?;

        let batch = self
            .call::<LogBatch>(Method::GET, url, None)
            .await?
            .into_result()?;
        debug!(
            "Got {} log entries, next cursor {}",
            batch.entries.len(),
            batch.poll_url
        );
        Ok(batch)
    }

    /// Fetch the batch a poll cursor points at
    #[instrument(skip(self), fields(cursor = %cursor))]
    pub async fn continue_device_logs(&self, cursor: &PollCursor) -> Result<LogBatch> {
        let url = self.resolve_cursor(cursor)?;

        let batch = self
            .call::<LogBatch>(Method::GET, url, None)
            .await?
            .into_result()?;
        debug!(
            "Got {} log entries, next cursor {}",
            batch.entries.len(),
            batch.poll_url
        );
        Ok(batch)
    }

    /// Start a polling session for one device
    pub fn log_session(&self, device_id: impl Into<String>) -> LogSession {
        LogSession::new(self.clone(), device_id)
    }
}

/// Polling state for one device
///
/// The first [`next_batch`](Self::next_batch) starts from the device's log
/// endpoint; later calls follow the most recent cursor. A failed call
/// leaves the cursor untouched so the same batch can be requested again.
#[derive(Debug, Clone)]
pub struct LogSession {
    client: BuildClient,
    device_id: String,
    cursor: Option<PollCursor>,
}

impl LogSession {
    pub fn new(client: BuildClient, device_id: impl Into<String>) -> Self {
        Self {
            client,
            device_id: device_id.into(),
            cursor: None,
        }
    }

    pub fn device_id(&self) -> &str {
        &self.device_id
    }

    /// Cursor the next call will follow, if the session has started
    pub fn cursor(&self) -> Option<&PollCursor> {
        self.cursor.as_ref()
    }

    /// Fetch the next batch
    ///
    /// A batch with an empty `poll_url` keeps the previous cursor.
    pub async fn next_batch(&mut self) -> Result<LogBatch> {
        let batch = match &self.cursor {
            None => self.client.get_device_logs(&self.device_id).await?,
            Some(cursor) => self.client.continue_device_logs(cursor).await?,
        };

        if !batch.poll_url.is_empty() {
            self.cursor = Some(batch.poll_url.clone());
        }
        Ok(batch)
    }

    /// Forget the cursor; the next call starts over from the log endpoint
    pub fn restart(&mut self) {
        self.cursor = None;
    }
}
