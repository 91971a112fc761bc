// Lint configuration for this crate
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]

//! # NXQL Store
//!
//! Persistent settings and password storage for the `nxql` CLI.
//!
//! This crate provides:
//!
//! - **SettingsStore**: Connection defaults persisted as JSON
//! - **SecretStore**: Passwords from `NXQL_PASSWORD` or the system keychain
//! - **Persistence**: File I/O helpers for JSON data
//!
//! ## Usage
//!
//! ```ignore
//! use nxql_store::{SettingsStore, SystemKeychain, resolve_secret};
//!
//! let store = SettingsStore::load_default().await;
//! let settings = store.get().await;
//!
//! if let Some(user) = settings.username.as_deref() {
//!     let password = resolve_secret(&SystemKeychain::new(), user).await?;
//! }
//! ```

pub mod error;
pub mod keychain;
pub mod persistence;
pub mod settings;

pub use error::StoreError;
pub use keychain::{
    PASSWORD_ENV, SecretStore, SystemKeychain, resolve_secret,
    resolve_secret_with,
};
pub use persistence::{default_config_dir, default_settings_path, load_json, load_json_or_default, save_json};
pub use settings::{LogLevel, Settings, SettingsStore};
