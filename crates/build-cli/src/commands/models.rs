//! Models commands - list, inspect and manage models

use anyhow::Result;
use build_client::{BuildClient, Model};

use crate::output::{ModelRow, OutputContext};

/// List all models
pub async fn list(client: &BuildClient, ctx: &OutputContext) -> Result<()> {
    let models = client.list_models().await?;

    let rows: Vec<ModelRow> = models.into_iter().map(ModelRow::from).collect();
    ctx.print(&rows);
    Ok(())
}

/// Show a model and the devices bound to it
pub async fn get(client: &BuildClient, model_id: &str, ctx: &OutputContext) -> Result<()> {
    let model = client.get_model(model_id).await?;

    let devices = if model.devices.is_empty() {
        "-".to_string()
    } else {
        model.devices.join(" ")
    };
    ctx.print_kv(&[
        ("ID", model.id),
        ("Name", model.name),
        ("Devices", devices),
    ]);
    Ok(())
}

/// Create a model
pub async fn create(client: &BuildClient, name: &str, ctx: &OutputContext) -> Result<()> {
    let model = client.create_model(&Model::named(name)).await?;

    ctx.success(&format!("Created model {} ({})", model.name, model.id));
    if ctx.quiet {
        println!("{}", model.id);
    }
    Ok(())
}

/// Rename a model
pub async fn rename(
    client: &BuildClient,
    model_id: &str,
    name: &str,
    ctx: &OutputContext,
) -> Result<()> {
    let model = client.update_model(model_id, &Model::named(name)).await?;

    ctx.success(&format!("Renamed model {} to {}", model.id, model.name));
    Ok(())
}

/// Delete a model
pub async fn delete(client: &BuildClient, model_id: &str, ctx: &OutputContext) -> Result<()> {
    client.delete_model(model_id).await?;

    ctx.success(&format!("Deleted model {}", model_id));
    Ok(())
}

/// Restart every device running a model
pub async fn restart(client: &BuildClient, model_id: &str, ctx: &OutputContext) -> Result<()> {
    client.restart_model_devices(model_id).await?;

    ctx.success(&format!("Restarted devices of model {}", model_id));
    Ok(())
}
