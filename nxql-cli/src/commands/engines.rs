//! Engines command - list the engines of the portal.

use anyhow::Result;
use nxql_store::Settings;
use tracing::info;

use super::connect;
use crate::output::{JsonFormatter, TextFormatter};
use crate::{Cli, OutputFormat};

/// Runs the engines command.
pub async fn run(cli: &Cli, settings: &Settings) -> Result<()> {
    let client = connect(cli, settings).await?;
    let engines = client.engines();
    let engine_port = client.engine_port().unwrap_or_default();
    info!(count = engines.len(), "Listing engines");

    match cli.format {
        OutputFormat::Text => {
            println!("{}", TextFormatter::new(!cli.no_color).format_engines(engines, engine_port));
        }
        OutputFormat::Json => {
            println!("{}", JsonFormatter::new(cli.pretty).format_engines(engines, engine_port)?);
        }
    }

    Ok(())
}
