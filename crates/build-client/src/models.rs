//! Model operations

use reqwest::Method;
use tracing::{debug, instrument};

use crate::client::BuildClient;
use crate::envelope::{self, ModelPayload, ModelsPayload, NoPayload};
use crate::error::Result;
use crate::types::Model;

impl BuildClient {
    // =========================================================================
    // Model Operations
    // =========================================================================

    /// List all models on the account
    #[instrument(skip(self))]
    pub async fn list_models(&self) -> Result<Vec<Model>> {
        let url = self.endpoint(&[self.paths().models.as_str()])?;
        debug!("Listing models from {}", url);

        self.call::<ModelsPayload>(Method::GET, url, None)
            .await?
            .into_result()
            .map(|p| p.models)
    }

    /// Create a model; the returned model carries its server-assigned id
    #[instrument(skip(self, model), fields(name = %model.name))]
    pub async fn create_model(&self, model: &Model) -> Result<Model> {
        let url = self.endpoint(&[self.paths().models.as_str()])?;
        let body = envelope::encode(model)?;

        self.call::<ModelPayload>(Method::POST, url, Some(body))
            .await?
            .into_result()
            .map(|p| p.model)
    }

    /// Replace a model's mutable attributes
    #[instrument(skip(self, model))]
    pub async fn update_model(&self, model_id: &str, model: &Model) -> Result<Model> {
        let url = self.endpoint(&[self.paths().models.as_str(), model_id])?;
        let body = envelope::encode(model)?;

        self.call::<ModelPayload>(Method::PUT, url, Some(body))
            .await?
            .into_result()
            .map(|p| p.model)
    }

    /// Get a model by id
    #[instrument(skip(self))]
    pub async fn get_model(&self, model_id: &str) -> Result<Model> {
        let url = self.endpoint(&[self.paths().models.as_str(), model_id])?;

        self.call::<ModelPayload>(Method::GET, url, None)
            .await?
            .into_result()
            .map(|p| p.model)
    }

    /// Delete a model
    #[instrument(skip(self))]
    pub async fn delete_model(&self, model_id: &str) -> Result<()> {
        let url = self.endpoint(&[self.paths().models.as_str(), model_id])?;

        self.call::<NoPayload>(Method::DELETE, url, None)
            .await?
            .into_ack()
    }

    /// Restart every device assigned to a model
    #[instrument(skip(self))]
    pub async fn restart_model_devices(&self, model_id: &str) -> Result<()> {
        let paths = self.paths();
        let url = self.endpoint(&[paths.models.as_str(), model_id, paths.restart.as_str()])?;

        self.call::<NoPayload>(Method::POST, url, None)
            .await?
            .into_ack()
    }
}
