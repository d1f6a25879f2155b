//! Build CLI - Command-line tool for the Build API
//!
//! Manage models, devices and code revisions, and follow device logs.

mod commands;
mod config;
mod output;

use anyhow::{Context, Result};
use build_client::{BuildClient, ClientConfig};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::time::Duration;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use crate::config::{Config, MergedConfig};
use crate::output::{OutputContext, OutputFormat};

#[derive(Parser)]
#[command(name = "build-cli")]
#[command(author, version, about = "Build API CLI")]
#[command(propagate_version = true)]
struct Cli {
    /// JSON key file holding {"key": "..."}
    #[arg(short, long, env = "BUILD_API_KEY_FILE")]
    key_file: Option<PathBuf>,

    /// API key (takes precedence over the key file)
    #[arg(long, env = "BUILD_API_KEY", hide_env_values = true)]
    api_key: Option<String>,

    /// Configuration file path
    #[arg(short, long, env = "BUILD_CONFIG")]
    config: Option<PathBuf>,

    /// Output format
    #[arg(short, long, value_enum)]
    output: Option<OutputFormat>,

    /// Disable colored output
    #[arg(long)]
    no_color: bool,

    /// Minimal output (for scripting)
    #[arg(short, long)]
    quiet: bool,

    /// Verbose logging
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Manage models
    #[command(subcommand)]
    Models(ModelsCommand),

    /// Browse and upload code revisions
    #[command(subcommand)]
    Revisions(RevisionsCommand),

    /// Manage devices
    #[command(subcommand)]
    Devices(DevicesCommand),

    /// Print device logs
    Logs {
        /// Device ID
        device: String,

        /// Keep polling for new entries until Ctrl+C
        #[arg(short, long)]
        follow: bool,

        /// Seconds between polls when following
        #[arg(long, default_value = "2")]
        interval: u64,
    },
}

#[derive(Subcommand)]
enum ModelsCommand {
    /// List all models
    List,

    /// Show model details
    Get {
        /// Model ID (defaults to the configured model)
        id: Option<String>,
    },

    /// Create a model
    Create {
        /// Model name
        name: String,
    },

    /// Rename a model
    Rename {
        /// Model ID
        id: String,

        /// New name
        name: String,
    },

    /// Delete a model
    Delete {
        /// Model ID
        id: String,
    },

    /// Restart every device running a model
    Restart {
        /// Model ID
        id: String,
    },
}

#[derive(Subcommand)]
enum RevisionsCommand {
    /// List a model's code revisions
    List {
        /// Model ID
        model: String,
    },

    /// Show one code revision
    Get {
        /// Model ID
        model: String,

        /// Revision version
        version: u32,
    },

    /// Upload device and agent code as a new revision
    Upload {
        /// Model ID
        model: String,

        /// Device source file
        #[arg(long)]
        device: PathBuf,

        /// Agent source file
        #[arg(long)]
        agent: PathBuf,

        /// Release notes
        #[arg(long)]
        notes: Option<String>,
    },
}

#[derive(Subcommand)]
enum DevicesCommand {
    /// List all devices
    List,

    /// Show device details
    Get {
        /// Device ID
        id: String,
    },

    /// Move a device to a model
    Assign {
        /// Device ID
        id: String,

        /// Model ID
        model: String,
    },

    /// Rename a device
    Rename {
        /// Device ID
        id: String,

        /// New name
        name: String,
    },

    /// Delete a device
    Delete {
        /// Device ID
        id: String,
    },

    /// Restart a device
    Restart {
        /// Device ID
        id: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Set up logging
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("warn")
    };

    tracing_subscriber::registry()
        .with(fmt::layer().with_target(false))
        .with(filter)
        .init();

    // Load config file
    let config = if let Some(config_path) = &cli.config {
        Config::load_from(config_path)?
    } else {
        Config::load().unwrap_or_default()
    };

    // Merge CLI args with config
    let merged = config.merge_with_args(
        cli.key_file.as_deref(),
        cli.output.map(Into::into),
        cli.no_color,
    );
    let format: OutputFormat = merged.output.parse().map_err(anyhow::Error::msg)?;

    // Create output context
    let ctx = OutputContext::new(format, merged.no_color, cli.quiet);
    let client = create_client(cli.api_key.as_deref(), &merged)?;

    // Execute command
    match &cli.command {
        Commands::Models(command) => match command {
            ModelsCommand::List => commands::models::list(&client, &ctx).await?,
            ModelsCommand::Get { id } => {
                let id = merged.model_or_default(id.as_deref())?;
                commands::models::get(&client, &id, &ctx).await?;
            }
            ModelsCommand::Create { name } => {
                commands::models::create(&client, name, &ctx).await?;
            }
            ModelsCommand::Rename { id, name } => {
                commands::models::rename(&client, id, name, &ctx).await?;
            }
            ModelsCommand::Delete { id } => commands::models::delete(&client, id, &ctx).await?,
            ModelsCommand::Restart { id } => commands::models::restart(&client, id, &ctx).await?,
        },

        Commands::Revisions(command) => match command {
            RevisionsCommand::List { model } => {
                commands::revisions::list(&client, model, &ctx).await?;
            }
            RevisionsCommand::Get { model, version } => {
                commands::revisions::get(&client, model, *version, &ctx).await?;
            }
            RevisionsCommand::Upload {
                model,
                device,
                agent,
                notes,
            } => {
                commands::revisions::upload(&client, model, device, agent, notes.as_deref(), &ctx)
                    .await?;
            }
        },

        Commands::Devices(command) => match command {
            DevicesCommand::List => commands::devices::list(&client, &ctx).await?,
            DevicesCommand::Get { id } => commands::devices::get(&client, id, &ctx).await?,
            DevicesCommand::Assign { id, model } => {
                commands::devices::assign(&client, id, model, &ctx).await?;
            }
            DevicesCommand::Rename { id, name } => {
                commands::devices::rename(&client, id, name, &ctx).await?;
            }
            DevicesCommand::Delete { id } => commands::devices::delete(&client, id, &ctx).await?,
            DevicesCommand::Restart { id } => {
                commands::devices::restart(&client, id, &ctx).await?;
            }
        },

        Commands::Logs {
            device,
            follow,
            interval,
        } => {
            let interval = Duration::from_secs((*interval).max(1));
            commands::logs(&client, device, *follow, interval, &ctx).await?;
        }
    }

    Ok(())
}

/// Create a Build API client from an explicit key or the key file
fn create_client(api_key: Option<&str>, merged: &MergedConfig) -> Result<BuildClient> {
    let api_key = match api_key {
        Some(key) => key.to_string(),
        None => {
            let path = merged
                .key_file
                .as_deref()
                .context("No API key given and no key file configured")?;
            config::load_api_key(path)?
        }
    };

    let mut builder = ClientConfig::builder();
    if let Some(url) = &merged.api_url {
        builder = builder.api_url(url.as_str());
    }
    if let Some(url) = &merged.base_url {
        builder = builder.base_url(url.as_str());
    }

    BuildClient::with_config(&api_key, builder.build()).context("Failed to create Build client")
}

// Implement conversion for OutputFormat to string (for config merge)
impl From<OutputFormat> for &str {
    fn from(format: OutputFormat) -> Self {
        match format {
            OutputFormat::Table => "table",
            OutputFormat::Json => "json",
            OutputFormat::Csv => "csv",
        }
    }
}
