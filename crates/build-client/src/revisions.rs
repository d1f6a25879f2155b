//! Code revision operations
//!
//! Revisions live under their model (`/models/{id}/revisions`). Failed
//! uploads carry compiler diagnostics in [`ApiError::details`](crate::ApiError).

use reqwest::Method;
use tracing::{debug, instrument};

use crate::client::BuildClient;
use crate::envelope::{self, RevisionPayload, RevisionsPayload};
use crate::error::Result;
use crate::types::{CodeRevisionLong, CodeRevisionShort};

impl BuildClient {
    /// List a model's revisions (without source)
    #[instrument(skip(self))]
    pub async fn list_revisions(&self, model_id: &str) -> Result<Vec<CodeRevisionShort>> {
        let paths = self.paths();
        let url = self.endpoint(&[paths.models.as_str(), model_id, paths.revisions.as_str()])?;
        debug!("Listing revisions from {}", url);

        self.call::<RevisionsPayload>(Method::GET, url, None)
            .await?
            .into_result()
            .map(|p| p.revisions)
    }

    /// Get one revision, including device and agent source
    #[instrument(skip(self))]
    pub async fn get_revision(&self, model_id: &str, version: u32) -> Result<CodeRevisionLong> {
        let paths = self.paths();
        let version = version.to_string();
        let url = self.endpoint(&[
            paths.models.as_str(),
            model_id,
            paths.revisions.as_str(),
            version.as_str(),
        ])?;

        self.call::<RevisionPayload>(Method::GET, url, None)
            .await?
            .into_result()
            .map(|p| p.revision)
    }

    /// Upload new code for a model
    ///
    /// The server assigns the next version number and returns the stored
    /// revision. On a compile failure the error's `details` list the
    /// offending rows and columns.
    #[instrument(skip(self, revision))]
    pub async fn update_revision(
        &self,
        model_id: &str,
        revision: &CodeRevisionLong,
    ) -> Result<CodeRevisionLong> {
        let paths = self.paths();
        let url = self.endpoint(&[paths.models.as_str(), model_id, paths.revisions.as_str()])?;
        let body = envelope::encode(revision)?;

        self.call::<RevisionPayload>(Method::POST, url, Some(body))
            .await?
            .into_result()
            .map(|p| p.revision)
    }
}
