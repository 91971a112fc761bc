//! Model command - field lists of all built-in tables.

use anyhow::Result;
use clap::Args;
use nxql_core::Platform;
use nxql_store::Settings;

use super::{connect, parse_platform};
use crate::output::{JsonFormatter, TextFormatter};
use crate::{Cli, OutputFormat};

/// Arguments for the model command.
#[derive(Args, Debug)]
pub struct ModelArgs {
    /// Platform to probe.
    #[arg(long, short = 'p', default_value = "windows", value_parser = parse_platform)]
    pub platform: Platform,
}

/// Runs the model command.
pub async fn run(args: &ModelArgs, cli: &Cli, settings: &Settings) -> Result<()> {
    let client = connect(cli, settings).await?;
    let model = client.fetch_data_model(args.platform).await?;

    match cli.format {
        OutputFormat::Text => {
            println!("{}", TextFormatter::new(!cli.no_color).format_model(&model));
        }
        OutputFormat::Json => {
            println!("{}", JsonFormatter::new(cli.pretty).format(&model)?);
        }
    }

    Ok(())
}
