//! Device operations

use reqwest::Method;
use tracing::{debug, instrument};

use crate::client::BuildClient;
use crate::envelope::{self, DevicePayload, DevicesPayload, NoPayload};
use crate::error::Result;
use crate::types::Device;

impl BuildClient {
    // =========================================================================
    // Device Operations
    // =========================================================================

    /// List all devices on the account
    #[instrument(skip(self))]
    pub async fn list_devices(&self) -> Result<Vec<Device>> {
        let url = self.endpoint(&[self.paths().devices.as_str()])?;
        debug!("Listing devices from {}", url);

        self.call::<DevicesPayload>(Method::GET, url, None)
            .await?
            .into_result()
            .map(|p| p.devices)
    }

    /// Get a device by id
    #[instrument(skip(self))]
    pub async fn get_device(&self, device_id: &str) -> Result<Device> {
        let url = self.endpoint(&[self.paths().devices.as_str(), device_id])?;

        self.call::<DevicePayload>(Method::GET, url, None)
            .await?
            .into_result()
            .map(|p| p.device)
    }

    /// Update a device (rename, assign to a model)
    ///
    /// Only the fields set on `device` are sent.
    #[instrument(skip(self, device))]
    pub async fn update_device(&self, device_id: &str, device: &Device) -> Result<Device> {
        let url = self.endpoint(&[self.paths().devices.as_str(), device_id])?;
        let body = envelope::encode(device)?;

        self.call::<DevicePayload>(Method::PUT, url, Some(body))
            .await?
            .into_result()
            .map(|p| p.device)
    }

    /// Remove a device from the account
    #[instrument(skip(self))]
    pub async fn delete_device(&self, device_id: &str) -> Result<()> {
        let url = self.endpoint(&[self.paths().devices.as_str(), device_id])?;

        self.call::<NoPayload>(Method::DELETE, url, None)
            .await?
            .into_ack()
    }

    /// Restart a single device
    #[instrument(skip(self))]
    pub async fn restart_device(&self, device_id: &str) -> Result<()> {
        let paths = self.paths();
        let url = self.endpoint(&[paths.devices.as_str(), device_id, paths.restart.as_str()])?;

        self.call::<NoPayload>(Method::POST, url, None)
            .await?
            .into_ack()
    }
}
