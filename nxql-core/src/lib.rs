// Lint configuration for this crate
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]

//! # NXQL Core
//!
//! Core types, models, and traits shared by the NXQL client crates.
//!
//! ## Key Types
//!
//! ### Query Types
//! - [`Platform`] - Device platform filter (windows, `mac_os`, mobile)
//! - [`QueryRequest`] - A single NXQL query with filters and parameters
//! - [`FieldListRequest`] - Input to field-list discovery
//!
//! ### Result Types
//! - [`Record`] - One result row, an ordered field-name to value mapping
//! - [`FieldValue`] - Tagged scalar/array value of a record field
//! - [`ErrorDetail`] - Structured error parsed out of a backend error page
//!
//! ### Directory Types
//! - [`Engine`] - An engine host listed by the portal

pub mod error;
pub mod models;
pub mod traits;

// Re-export error types
pub use error::CoreError;

// Re-export all model types
pub use models::{
    // Directory
    Engine,
    // Query types
    ErrorDetail,
    FieldListRequest,
    Platform,
    QueryRequest,
    // Result types
    FieldValue,
    Record,
};

// Re-export traits
pub use traits::FieldCatalog;
