//! Fields command - list the valid fields of a table.

use anyhow::Result;
use clap::Args;
use nxql_core::{FieldListRequest, Platform};
use nxql_store::Settings;

use super::{connect, parse_platform};
use crate::output::{JsonFormatter, TextFormatter};
use crate::{Cli, OutputFormat};

/// Arguments for the fields command.
#[derive(Args, Debug)]
pub struct FieldsArgs {
    /// Table to describe (e.g. device, user, application).
    pub table: String,

    /// Aggregate table to compute over (e.g. execution, connection).
    #[arg(long)]
    pub aggregate: Option<String>,

    /// Platform to probe.
    #[arg(long, short = 'p', default_value = "windows", value_parser = parse_platform)]
    pub platform: Platform,

    /// List dynamic fields (categories, scores).
    #[arg(long)]
    pub dynamic: bool,
}

impl FieldsArgs {
    /// Builds the field-list request.
    pub fn request(&self) -> FieldListRequest {
        let request = FieldListRequest::new(&self.table)
            .with_platform(self.platform)
            .dynamic(self.dynamic);
        match &self.aggregate {
            Some(aggregate) => request.with_aggregate(aggregate),
            None => request,
        }
    }
}

/// Runs the fields command.
pub async fn run(args: &FieldsArgs, cli: &Cli, settings: &Settings) -> Result<()> {
    let client = connect(cli, settings).await?;
    let request = args.request();
    let fields = client.list_fields(&request).await?;

    let title = match &request.aggregate_table {
        Some(aggregate) => format!("{} with {aggregate}", request.table),
        None => request.table.clone(),
    };

    match cli.format {
        OutputFormat::Text => {
            println!("{}", TextFormatter::new(!cli.no_color).format_fields(&title, &fields));
        }
        OutputFormat::Json => {
            println!("{}", JsonFormatter::new(cli.pretty).format_fields(&title, &fields)?);
        }
    }

    Ok(())
}
