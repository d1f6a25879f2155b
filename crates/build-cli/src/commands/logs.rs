//! Logs command - print and follow device logs

use std::time::Duration;

use anyhow::Result;
use build_client::{BuildClient, LogBatch};
use tabled::Tabled;

use crate::output::{csv_line, LogRow, OutputContext, OutputFormat};

/// Print a device's logs, optionally polling until Ctrl+C
pub async fn logs(
    client: &BuildClient,
    device_id: &str,
    follow: bool,
    interval: Duration,
    ctx: &OutputContext,
) -> Result<()> {
    let mut session = client.log_session(device_id);

    if !follow {
        let batch = session.next_batch().await?;
        let rows: Vec<LogRow> = batch.entries.into_iter().map(LogRow::from).collect();
        ctx.print(&rows);
        return Ok(());
    }

    ctx.info(&format!("Following logs of device {}", device_id));
    ctx.info("Press Ctrl+C to stop");

    if ctx.format == OutputFormat::Csv {
        println!("{}", csv_line(LogRow::headers()));
    }

    let ctrl_c = tokio::signal::ctrl_c();
    tokio::pin!(ctrl_c);

    loop {
        tokio::select! {
            _ = &mut ctrl_c => break,
            result = session.next_batch() => match result {
                Ok(batch) => print_batch(batch, ctx),
                // The cursor is kept, so the next poll retries the same batch
                Err(e) if e.is_timeout() => ctx.warn("Log poll timed out, retrying"),
                Err(e) => {
                    ctx.error(&format!("Log poll failed: {}", e));
                    break;
                }
            },
        }

        tokio::select! {
            _ = &mut ctrl_c => break,
            _ = tokio::time::sleep(interval) => {}
        }
    }

    ctx.info("\nStopped following logs");
    Ok(())
}

/// Print a batch line by line in the appropriate format
fn print_batch(batch: LogBatch, ctx: &OutputContext) {
    for entry in batch.entries {
        let row = LogRow::from(entry);
        match ctx.format {
            OutputFormat::Table => {
                println!("{} [{}] {}", row.timestamp, row.log_type, row.message);
            }
            OutputFormat::Json => {
                if let Ok(json) = serde_json::to_string(&row) {
                    println!("{}", json);
                }
            }
            OutputFormat::Csv => {
                println!("{}", csv_line([&row.timestamp, &row.log_type, &row.message]));
            }
        }
    }
}
