//! Devices commands

use anyhow::Result;
use build_client::{BuildClient, Device};

use crate::output::{DeviceRow, OutputContext};

/// List all devices
pub async fn list(client: &BuildClient, ctx: &OutputContext) -> Result<()> {
    let devices = client.list_devices().await?;

    let rows: Vec<DeviceRow> = devices.into_iter().map(DeviceRow::from).collect();
    ctx.print(&rows);
    Ok(())
}

/// Show device details
pub async fn get(client: &BuildClient, device_id: &str, ctx: &OutputContext) -> Result<()> {
    let device = client.get_device(device_id).await?;
    let agent_id = device.agent_id.clone().unwrap_or_else(|| "-".to_string());
    let row = DeviceRow::from(device);

    ctx.print_kv(&[
        ("ID", row.id),
        ("Name", row.name),
        ("Model", row.model),
        ("Power", row.power_state),
        ("RSSI", row.rssi),
        ("Agent ID", agent_id),
        ("Agent status", row.agent_status),
    ]);
    Ok(())
}

/// Move a device to another model
pub async fn assign(
    client: &BuildClient,
    device_id: &str,
    model_id: &str,
    ctx: &OutputContext,
) -> Result<()> {
    let device = client
        .update_device(device_id, &Device::assign_to(model_id))
        .await?;

    ctx.success(&format!(
        "Assigned device {} to model {}",
        device.id,
        device.assigned_model().unwrap_or(model_id)
    ));
    Ok(())
}

/// Rename a device
pub async fn rename(
    client: &BuildClient,
    device_id: &str,
    name: &str,
    ctx: &OutputContext,
) -> Result<()> {
    client.update_device(device_id, &Device::rename(name)).await?;

    ctx.success(&format!("Renamed device {} to {}", device_id, name));
    Ok(())
}

/// Delete a device
pub async fn delete(client: &BuildClient, device_id: &str, ctx: &OutputContext) -> Result<()> {
    client.delete_device(device_id).await?;

    ctx.success(&format!("Deleted device {}", device_id));
    Ok(())
}

/// Restart a device
pub async fn restart(client: &BuildClient, device_id: &str, ctx: &OutputContext) -> Result<()> {
    client.restart_device(device_id).await?;

    ctx.success(&format!("Restarted device {}", device_id));
    Ok(())
}
