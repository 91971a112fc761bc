//! Secret command - manage the stored portal password.

use std::io::BufRead;

use anyhow::{Context, Result};
use clap::{Args, Subcommand};
use nxql_store::{PASSWORD_ENV, SecretStore, Settings, SystemKeychain};
use tracing::info;

use super::username;
use crate::Cli;

/// Arguments for the secret command.
#[derive(Args)]
pub struct SecretArgs {
    #[command(subcommand)]
    pub action: SecretAction,
}

/// Secret subcommands.
#[derive(Subcommand)]
pub enum SecretAction {
    /// Store the password for the current user in the system keychain.
    ///
    /// The password is read from the first line of standard input.
    Set,

    /// Delete the stored password for the current user.
    Delete,
}

/// Runs the secret command.
pub async fn run(args: &SecretArgs, cli: &Cli, settings: &Settings) -> Result<()> {
    let user = username(cli, settings)?;
    let keychain = SystemKeychain::new();

    match args.action {
        SecretAction::Set => {
            if !cli.quiet {
                eprintln!("Password for {user} (end with Enter):");
            }
            let secret = read_secret(std::io::stdin().lock())?;
            keychain.set(&user, &secret).await?;
            info!(user = %user, "Password stored");
            println!("Password stored for {user}");
            if std::env::var_os(PASSWORD_ENV).is_some() {
                println!("Note: {PASSWORD_ENV} is set and takes precedence");
            }
        }
        SecretAction::Delete => {
            keychain.delete(&user).await?;
            info!(user = %user, "Password deleted");
            println!("Password deleted for {user}");
        }
    }

    Ok(())
}

/// Reads the first line, without its line ending.
fn read_secret(mut input: impl BufRead) -> Result<String> {
    let mut line = String::new();
    input.read_line(&mut line).context("Failed to read password")?;
    let secret = line.trim_end_matches(['\r', '\n']);
    anyhow::ensure!(!secret.is_empty(), "Password is empty");
    Ok(secret.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_read_secret_strips_line_ending() {
        assert_eq!(read_secret("s3cret \r\nignored\n".as_bytes()).unwrap(), "s3cret ");
    }

    #[test]
    fn test_read_secret_rejects_empty() {
        assert!(read_secret("\n".as_bytes()).is_err());
        assert!(read_secret("".as_bytes()).is_err());
    }
}
