//! Query command - run NXQL on every engine.

use std::time::Duration;

use anyhow::Result;
use clap::Args;
use nxql_client::{ErrorMode, Method, QueryOutput, Target};
use nxql_core::{Platform, QueryRequest};
use nxql_store::Settings;
use tracing::info;

use super::{connect, parse_platform};
use crate::output::{JsonFormatter, TextFormatter};
use crate::{Cli, OutputFormat};

/// Arguments for the query command.
#[derive(Args, Debug)]
pub struct QueryArgs {
    /// NXQL query text.
    pub nxql: String,

    /// Platform filter; repeat for several. Defaults to the configured ones.
    #[arg(long = "platform", short = 'p', value_parser = parse_platform)]
    pub platforms: Vec<Platform>,

    /// Positional parameter bound to $1, $2, ... in order.
    #[arg(long = "param", short = 'P')]
    pub params: Vec<String>,

    /// Request timeout in seconds.
    #[arg(long)]
    pub timeout: Option<u64>,

    /// Send the query to the portal instead of the engines.
    #[arg(long)]
    pub portal: bool,
}

impl QueryArgs {
    /// Builds the request, applying configured defaults.
    pub fn request(&self, settings: &Settings) -> QueryRequest {
        let platforms = if self.platforms.is_empty() {
            settings.default_platforms.clone()
        } else {
            self.platforms.clone()
        };

        QueryRequest::new(&self.nxql)
            .with_platforms(platforms)
            .with_parameters(self.params.iter().cloned())
            .with_timeout(Duration::from_secs(self.timeout.unwrap_or(settings.timeout_secs)))
    }
}

/// Runs the query command.
pub async fn run(args: &QueryArgs, cli: &Cli, settings: &Settings) -> Result<()> {
    let client = connect(cli, settings).await?;
    let request = args.request(settings);
    let target = if args.portal { Target::Portal } else { Target::Engines };

    let output = client
        .query_with(&request, target, &Method::GET, ErrorMode::Structured)
        .await?;

    match output {
        QueryOutput::Records(records) => {
            info!(count = records.len(), "Query complete");
            match cli.format {
                OutputFormat::Text => {
                    println!("{}", TextFormatter::new(!cli.no_color).format_records(&records));
                }
                OutputFormat::Json => {
                    println!("{}", JsonFormatter::new(cli.pretty).format_records(&records)?);
                }
            }
            Ok(())
        }
        QueryOutput::Error(detail) => {
            match cli.format {
                OutputFormat::Text => {
                    println!("{}", TextFormatter::new(!cli.no_color).format_error(&detail));
                }
                OutputFormat::Json => {
                    println!("{}", JsonFormatter::new(cli.pretty).format_error(&detail)?);
                }
            }
            anyhow::bail!("query rejected by backend")
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(platforms: Vec<Platform>, timeout: Option<u64>) -> QueryArgs {
        QueryArgs {
            nxql: "(select (name) (from device))".to_string(),
            platforms,
            params: vec!["a".to_string(), "b".to_string()],
            timeout,
            portal: false,
        }
    }

    #[test]
    fn test_configured_platforms_apply_when_none_given() {
        let mut settings = Settings::default();
        settings.default_platforms = vec![Platform::Mobile];

        let request = args(Vec::new(), None).request(&settings);
        assert_eq!(request.platforms, vec![Platform::Mobile]);
        assert_eq!(request.parameters, vec!["a", "b"]);
        assert_eq!(request.timeout, Duration::from_secs(60));
    }

    #[test]
    fn test_flags_win_over_settings() {
        let mut settings = Settings::default();
        settings.default_platforms = vec![Platform::Mobile];

        let request = args(vec![Platform::Windows], Some(5)).request(&settings);
        assert_eq!(request.platforms, vec![Platform::Windows]);
        assert_eq!(request.timeout, Duration::from_secs(5));
    }
}
