// Lint configuration for this crate
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]

//! # NXQL Client
//!
//! Engine discovery, query fan-out and response classification for NXQL.
//!
//! A portal lists the engines of a deployment; every query is sent to all of
//! them at once and their answers are merged in engine order.
//!
//! ## Host APIs
//!
//! - [`host::http`] - Authenticated HTTP client with per-client TLS policy
//!
//! ## Query Pipeline
//!
//! - [`connection`] - Portal host normalization and engine port inference
//! - [`directory`] - Engine listing from the portal
//! - [`encoder`] - `/2/query` path encoding
//! - [`fanout`] - Concurrent requests, joined in target order
//! - [`classifier`] - JSON / error page / garbage classification
//! - [`error_page`] - HTML error page parsing
//! - [`fields`] - Field-list and data-model discovery
//!
//! ## Example
//!
//! ```ignore
//! use nxql_client::{ConnectOptions, Credential, NxqlClient};
//! use nxql_core::{Platform, QueryRequest};
//!
//! let mut client = NxqlClient::new();
//! client
//!     .connect(ConnectOptions::new("demo.pac.nexthink.cloud", Credential::new("user", "secret")))
//!     .await?;
//!
//! let request = QueryRequest::new("(select (name) (from device) (limit 10))")
//!     .with_platform(Platform::Windows);
//! let records = client.query(&request).await?;
//! ```

// Core modules
pub mod classifier;
pub mod client;
pub mod connection;
pub mod directory;
pub mod encoder;
pub mod error;
pub mod error_page;
pub mod fanout;
pub mod fields;
pub mod host;

// Re-export key types at crate root

// Errors
pub use error::QueryError;

// Host APIs
pub use host::http::{Credential, HttpClient, Scheme};

// Client
pub use classifier::{ErrorMode, QueryOutput};
pub use client::NxqlClient;
pub use connection::{ConnectOptions, Connection, PortalAddress};
pub use fanout::Target;
pub use reqwest::Method;
pub use fields::{DataModel, ErrorPageCatalog};
