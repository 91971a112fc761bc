// Lint configuration for this crate
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]

//! nxql - run NXQL queries against every engine of a portal.
//!
//! # Examples
//!
//! ```bash
//! # Store connection defaults once
//! nxql config set portal_host demo.pac.nexthink.cloud
//! nxql config set username alice
//! nxql secret set
//!
//! # Query all engines
//! nxql query "(select (name last_seen) (from device) (limit 10))"
//!
//! # Positional parameters and platform filters
//! nxql query "(select (name) (from device) (where device (eq name (string \$1))))" \
//!     --param pc-01 --platform windows
//!
//! # Field discovery
//! nxql fields device
//! nxql fields device --aggregate execution
//! nxql model --format json --pretty
//! ```

mod commands;
mod output;

use anyhow::Result;
use clap::{Parser, Subcommand, ValueEnum};
use nxql_store::{LogLevel, SettingsStore};
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

use commands::{config, engines, fields, model, query, secret};

// ============================================================================
// CLI Definition
// ============================================================================

/// nxql - NXQL fan-out query client.
#[derive(Parser)]
#[command(name = "nxql")]
#[command(about = "Run NXQL queries against every engine of a portal")]
#[command(long_about = r#"
nxql resolves the engines of a portal and sends each query to all of them
at once. Results are merged in engine order.

Connection defaults come from `nxql config`; the password comes from
NXQL_PASSWORD or the system keychain (`nxql secret set`).

Examples:
  nxql query "(select (name) (from device) (limit 5))"
  nxql fields device                  # Valid fields of a table
  nxql engines                        # Engines listed by the portal
  nxql model --format json            # Field lists of all tables
"#)]
#[command(version)]
pub struct Cli {
    /// Subcommand to run.
    #[command(subcommand)]
    pub command: Commands,

    /// Output format (text or json).
    #[arg(long, short = 'f', default_value = "text", global = true)]
    pub format: OutputFormat,

    /// Pretty-print JSON output.
    #[arg(long, global = true)]
    pub pretty: bool,

    /// Portal host (overrides the configured one).
    #[arg(long, global = true)]
    pub host: Option<String>,

    /// Portal username (overrides the configured one).
    #[arg(long, short, global = true)]
    pub user: Option<String>,

    /// Accept invalid TLS certificates.
    #[arg(long, global = true)]
    pub insecure: bool,

    /// Verbose output (show debug info).
    #[arg(long, short, global = true)]
    pub verbose: bool,

    /// Disable colored output.
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Quiet mode (no logging, errors only via exit code).
    #[arg(long, short, global = true)]
    pub quiet: bool,
}

/// CLI commands.
#[derive(Subcommand)]
pub enum Commands {
    /// Run a query on every engine.
    #[command(visible_alias = "q")]
    Query(query::QueryArgs),

    /// List the valid fields of a table.
    Fields(fields::FieldsArgs),

    /// List the engines of the portal.
    Engines,

    /// Show the field lists of all built-in tables.
    Model(model::ModelArgs),

    /// Manage configuration.
    Config(config::ConfigArgs),

    /// Manage the stored password.
    Secret(secret::SecretArgs),
}

/// Output format options.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum, Default)]
pub enum OutputFormat {
    /// Human-readable text.
    #[default]
    Text,
    /// JSON output for scripting.
    Json,
}

/// CLI exit codes.
#[repr(i32)]
pub enum ExitCode {
    /// Any failure.
    Error = 1,
}

// ============================================================================
// Logging Setup
// ============================================================================

fn log_filter(verbose: bool, level: LogLevel) -> EnvFilter {
    if verbose {
        EnvFilter::new("nxql=debug,info")
    } else {
        EnvFilter::new(format!("nxql={level}"))
    }
}

fn setup_logging(verbose: bool, quiet: bool, level: LogLevel) {
    if quiet {
        return; // No logging in quiet mode
    }

    tracing_subscriber::registry()
        .with(
            fmt::layer()
                .with_target(false)
                .without_time()
                .with_writer(std::io::stderr),
        )
        .with(log_filter(verbose, level))
        .init();
}

// ============================================================================
// Main Entry Point
// ============================================================================

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let store = SettingsStore::load_default().await;
    let settings = store.get().await;
    setup_logging(cli.verbose, cli.quiet, settings.log_level);

    let result = match &cli.command {
        Commands::Query(args) => query::run(args, &cli, &settings).await,
        Commands::Fields(args) => fields::run(args, &cli, &settings).await,
        Commands::Engines => engines::run(&cli, &settings).await,
        Commands::Model(args) => model::run(args, &cli, &settings).await,
        Commands::Config(args) => config::run(args, &cli, &store).await,
        Commands::Secret(args) => secret::run(args, &cli, &settings).await,
    };

    if let Err(e) = result {
        if !cli.quiet {
            eprintln!("Error: {e:#}");
        }
        std::process::exit(ExitCode::Error as i32);
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_global_flags_after_subcommand() {
        let cli = Cli::try_parse_from([
            "nxql", "query", "(select (name) (from device))", "--format", "json", "--insecure",
            "--host", "portal.corp.local",
        ])
        .unwrap();
        assert_eq!(cli.format, OutputFormat::Json);
        assert!(cli.insecure);
        assert_eq!(cli.host.as_deref(), Some("portal.corp.local"));
        assert!(matches!(cli.command, Commands::Query(_)));
    }

    #[test]
    fn test_subcommand_is_required() {
        assert!(Cli::try_parse_from(["nxql"]).is_err());
    }

    #[test]
    fn test_query_args() {
        let cli = Cli::try_parse_from([
            "nxql", "query", "q", "--platform", "windows", "--platform", "mac_os", "--param", "a",
            "--timeout", "5",
        ])
        .unwrap();
        let Commands::Query(args) = cli.command else {
            panic!("expected query");
        };
        assert_eq!(args.platforms.len(), 2);
        assert_eq!(args.params, vec!["a"]);
        assert_eq!(args.timeout, Some(5));
    }
}
