//! Revisions commands - browse and upload model code

use std::path::Path;

use anyhow::{Context, Result};
use build_client::{BuildClient, CodeRevisionLong};

use crate::output::{DiagnosticRow, OutputContext, RevisionRow};

/// List the code revisions of a model
pub async fn list(client: &BuildClient, model_id: &str, ctx: &OutputContext) -> Result<()> {
    let revisions = client.list_revisions(model_id).await?;

    let rows: Vec<RevisionRow> = revisions.into_iter().map(RevisionRow::from).collect();
    ctx.print(&rows);
    Ok(())
}

/// Show one revision, including its source
pub async fn get(
    client: &BuildClient,
    model_id: &str,
    version: u32,
    ctx: &OutputContext,
) -> Result<()> {
    let revision = client.get_revision(model_id, version).await?;

    ctx.print_kv(&[
        (
            "Version",
            revision.version.unwrap_or(version).to_string(),
        ),
        ("Created", revision.created_at.unwrap_or_default()),
        ("Notes", revision.release_notes.unwrap_or_default()),
        ("Device code", revision.device_code.unwrap_or_default()),
        ("Agent code", revision.agent_code.unwrap_or_default()),
    ]);
    Ok(())
}

/// Upload device and agent source as a new revision
///
/// Compile errors are printed one row per diagnostic before the command fails.
pub async fn upload(
    client: &BuildClient,
    model_id: &str,
    device_file: &Path,
    agent_file: &Path,
    notes: Option<&str>,
    ctx: &OutputContext,
) -> Result<()> {
    let device_code = read_source(device_file)?;
    let agent_code = read_source(agent_file)?;

    let mut upload = CodeRevisionLong::upload(device_code, agent_code);
    if let Some(notes) = notes {
        upload = upload.with_release_notes(notes);
    }

    match client.update_revision(model_id, &upload).await {
        Ok(revision) => {
            let version = revision
                .version
                .map(|v| v.to_string())
                .unwrap_or_else(|| "?".to_string());
            ctx.success(&format!("Uploaded revision {} of model {}", version, model_id));
            Ok(())
        }
        Err(e) => {
            if let Some(api) = e.api_error() {
                let rows: Vec<DiagnosticRow> = api
                    .diagnostics()
                    .map(|(target, diagnostic)| DiagnosticRow {
                        target: target.to_string(),
                        row: diagnostic.row,
                        column: diagnostic.column,
                        error: diagnostic.error.clone(),
                    })
                    .collect();
                if !rows.is_empty() {
                    ctx.error(&format!("{} compile error(s):", rows.len()));
                    ctx.print(&rows);
                }
            }
            Err(e.into())
        }
    }
}

fn read_source(path: &Path) -> Result<String> {
    std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read source file: {}", path.display()))
}
