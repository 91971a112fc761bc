//! CLI command implementations.

pub mod config;
pub mod engines;
pub mod fields;
pub mod model;
pub mod query;
pub mod secret;

use std::time::Duration;

use anyhow::{Context, Result};
use nxql_client::{ConnectOptions, Credential, NxqlClient};
use nxql_core::Platform;
use nxql_store::{Settings, SystemKeychain, resolve_secret};
use tracing::debug;

use crate::Cli;

/// Parses a `--platform` value.
pub fn parse_platform(value: &str) -> Result<Platform, String> {
    value.parse().map_err(|e: nxql_core::CoreError| e.to_string())
}

/// Username from `--user`, else the configured one.
pub fn username(cli: &Cli, settings: &Settings) -> Result<String> {
    cli.user
        .clone()
        .or_else(|| settings.username.clone())
        .context("No username: pass --user or run `nxql config set username <name>`")
}

/// Connection options from flags, falling back to settings.
pub fn connect_options(cli: &Cli, settings: &Settings, secret: String) -> Result<ConnectOptions> {
    let host = cli
        .host
        .clone()
        .or_else(|| settings.portal_host.clone())
        .context("No portal host: pass --host or run `nxql config set portal_host <host>`")?;
    let user = username(cli, settings)?;

    Ok(ConnectOptions::new(host, Credential::new(user, secret))
        .with_portal_port(settings.portal_port)
        .with_engine_port(settings.engine_port)
        .skip_cert_validation(cli.insecure || settings.skip_cert_validation)
        .with_timeout(Duration::from_secs(settings.timeout_secs)))
}

/// Resolves the password and connects.
pub async fn connect(cli: &Cli, settings: &Settings) -> Result<NxqlClient> {
    let user = username(cli, settings)?;
    let secret = resolve_secret(&SystemKeychain::new(), &user).await?;
    let options = connect_options(cli, settings, secret)?;
    debug!(host = %options.host, user = %user, "Connecting");

    let mut client = NxqlClient::new();
    client.connect(options).await?;
    Ok(client)
}

#[cfg(test)]
mod tests {
    use clap::Parser;

    use super::*;

    fn cli(args: &[&str]) -> Cli {
        let mut argv = vec!["nxql"];
        argv.extend_from_slice(args);
        argv.push("engines");
        Cli::try_parse_from(argv).unwrap()
    }

    #[test]
    fn test_flags_override_settings() {
        let mut settings = Settings::default();
        settings.portal_host = Some("configured.corp.local".to_string());
        settings.username = Some("configured".to_string());
        settings.engine_port = 1671;

        let options = connect_options(
            &cli(&["--host", "flag.corp.local", "--user", "alice", "--insecure"]),
            &settings,
            "pw".to_string(),
        )
        .unwrap();
        assert_eq!(options.host, "flag.corp.local");
        assert_eq!(options.credential.username, "alice");
        assert!(options.skip_cert_validation);
        assert_eq!(options.engine_port, Some(1671));
    }

    #[test]
    fn test_settings_fill_missing_flags() {
        let mut settings = Settings::default();
        settings.portal_host = Some("configured.corp.local".to_string());
        settings.username = Some("bob".to_string());
        settings.timeout_secs = 5;

        let options = connect_options(&cli(&[]), &settings, "pw".to_string()).unwrap();
        assert_eq!(options.host, "configured.corp.local");
        assert_eq!(options.credential.username, "bob");
        assert!(!options.skip_cert_validation);
        assert_eq!(options.timeout, Duration::from_secs(5));
    }

    #[test]
    fn test_missing_host_is_an_error() {
        let mut settings = Settings::default();
        settings.username = Some("bob".to_string());
        assert!(connect_options(&cli(&[]), &settings, "pw".to_string()).is_err());
    }

    #[test]
    fn test_parse_platform() {
        assert_eq!(parse_platform("macos"), Ok(Platform::MacOs));
        assert!(parse_platform("linux").is_err());
    }
}
