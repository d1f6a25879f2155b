//! Output formatting for build-cli (table, json, csv)

use build_client::{CodeRevisionShort, Device, DeviceLogEntry, Model};
use clap::ValueEnum;
use colored::Colorize;
use serde::Serialize;
use tabled::{Table, Tabled};

/// Output format options
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// ASCII table format (default)
    Table,
    /// JSON format
    Json,
    /// CSV format
    Csv,
}

impl Default for OutputFormat {
    fn default() -> Self {
        Self::Table
    }
}

impl std::str::FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        <Self as ValueEnum>::from_str(s, true)
    }
}

/// Context for output rendering
pub struct OutputContext {
    pub format: OutputFormat,
    pub quiet: bool,
}

impl OutputContext {
    pub fn new(format: OutputFormat, no_color: bool, quiet: bool) -> Self {
        if no_color {
            colored::control::set_override(false);
        }
        Self { format, quiet }
    }

    /// Print a success message (unless in quiet mode)
    pub fn success(&self, msg: &str) {
        if !self.quiet {
            println!("{}", msg.green());
        }
    }

    /// Print an info message (unless in quiet mode)
    pub fn info(&self, msg: &str) {
        if !self.quiet {
            println!("{}", msg);
        }
    }

    /// Print a warning message
    pub fn warn(&self, msg: &str) {
        eprintln!("{}", msg.yellow());
    }

    /// Print an error message
    pub fn error(&self, msg: &str) {
        eprintln!("{}", msg.red());
    }

    /// Print rows in the configured format
    pub fn print<T: Tabled + Serialize>(&self, rows: &[T]) {
        match self.format {
            OutputFormat::Table if rows.is_empty() => {
                if !self.quiet {
                    println!("No data");
                }
            }
            OutputFormat::Table => println!("{}", Table::new(rows)),
            OutputFormat::Json => print_json(rows),
            OutputFormat::Csv => {
                if rows.is_empty() {
                    return;
                }
                println!("{}", csv_line(T::headers()));
                for row in rows {
                    println!("{}", csv_line(row.fields()));
                }
            }
        }
    }

    /// Print labelled values of a single record, in order
    pub fn print_kv(&self, pairs: &[(&str, String)]) {
        match self.format {
            OutputFormat::Table => {
                let width = pairs.iter().map(|(k, _)| k.len()).max().unwrap_or(0);
                for (key, value) in pairs {
                    let label = format!("{:>width$}", key, width = width);
                    println!("{}  {}", label.bold(), value);
                }
            }
            OutputFormat::Json => print_json(&Record(pairs)),
            OutputFormat::Csv => {
                println!("{}", csv_line(pairs.iter().map(|(k, _)| *k)));
                println!("{}", csv_line(pairs.iter().map(|(_, v)| v)));
            }
        }
    }
}

/// Key-value pairs serialized as a JSON object, keeping their order
struct Record<'a>(&'a [(&'a str, String)]);

impl Serialize for Record<'_> {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_map(self.0.iter().map(|(k, v)| (*k, v)))
    }
}

fn print_json<T: Serialize + ?Sized>(value: &T) {
    match serde_json::to_string_pretty(value) {
        Ok(json) => println!("{}", json),
        Err(e) => eprintln!("{}", format!("Failed to render JSON: {}", e).red()),
    }
}

/// One CSV line from already-rendered fields
pub fn csv_line<I>(fields: I) -> String
where
    I: IntoIterator,
    I::Item: AsRef<str>,
{
    fields
        .into_iter()
        .map(|f| escape_csv(f.as_ref()))
        .collect::<Vec<_>>()
        .join(",")
}

/// Escape a value for CSV output
fn escape_csv(value: &str) -> String {
    if value.contains([',', '"', '\n']) {
        format!("\"{}\"", value.replace('"', "\"\""))
    } else {
        value.to_string()
    }
}

// =============================================================================
// Display types for various commands
// =============================================================================

/// Model display for models commands
#[derive(Debug, Tabled, Serialize)]
pub struct ModelRow {
    #[tabled(rename = "ID")]
    pub id: String,
    #[tabled(rename = "Name")]
    pub name: String,
    #[tabled(rename = "Devices")]
    pub devices: usize,
}

impl From<Model> for ModelRow {
    fn from(model: Model) -> Self {
        Self {
            id: model.id,
            name: model.name,
            devices: model.devices.len(),
        }
    }
}

/// Device display for devices commands
#[derive(Debug, Tabled, Serialize)]
pub struct DeviceRow {
    #[tabled(rename = "ID")]
    pub id: String,
    #[tabled(rename = "Name")]
    pub name: String,
    #[tabled(rename = "Model")]
    pub model: String,
    #[tabled(rename = "Power")]
    pub power_state: String,
    #[tabled(rename = "RSSI")]
    pub rssi: String,
    #[tabled(rename = "Agent")]
    pub agent_status: String,
}

impl From<Device> for DeviceRow {
    fn from(device: Device) -> Self {
        let dash = || "-".to_string();
        Self {
            model: device.assigned_model().map(String::from).unwrap_or_else(dash),
            id: device.id,
            name: device.name.unwrap_or_else(dash),
            power_state: device.power_state.unwrap_or_else(dash),
            rssi: device.rssi.map(|r| r.to_string()).unwrap_or_else(dash),
            agent_status: device.agent_status.unwrap_or_else(dash),
        }
    }
}

/// Revision display for revisions list
#[derive(Debug, Tabled, Serialize)]
pub struct RevisionRow {
    #[tabled(rename = "Version")]
    pub version: u32,
    #[tabled(rename = "Created")]
    pub created_at: String,
    #[tabled(rename = "Notes")]
    pub release_notes: String,
}

impl From<CodeRevisionShort> for RevisionRow {
    fn from(revision: CodeRevisionShort) -> Self {
        Self {
            version: revision.version,
            created_at: revision.created_at,
            release_notes: revision.release_notes,
        }
    }
}

/// Compiler diagnostic display for failed uploads
#[derive(Debug, Tabled, Serialize)]
pub struct DiagnosticRow {
    #[tabled(rename = "Code")]
    pub target: String,
    #[tabled(rename = "Row")]
    pub row: u32,
    #[tabled(rename = "Column")]
    pub column: u32,
    #[tabled(rename = "Error")]
    pub error: String,
}

/// Log entry display for logs command
#[derive(Debug, Tabled, Serialize)]
pub struct LogRow {
    #[tabled(rename = "Time")]
    pub timestamp: String,
    #[tabled(rename = "Type")]
    pub log_type: String,
    #[tabled(rename = "Message")]
    pub message: String,
}

impl From<DeviceLogEntry> for LogRow {
    fn from(entry: DeviceLogEntry) -> Self {
        Self {
            timestamp: entry.timestamp,
            log_type: entry.log_type,
            message: entry.message,
        }
    }
}
