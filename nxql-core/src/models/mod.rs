//! Domain models for the NXQL client.
//!
//! ## Submodules
//!
//! - [`platform`] - Platform filters
//! - [`engine`] - Engine directory entries
//! - [`query`] - Query requests and structured error detail
//! - [`record`] - Result records and field values

mod engine;
mod platform;
mod query;
mod record;

pub use engine::Engine;
pub use platform::Platform;
pub use query::{ErrorDetail, FieldListRequest, QueryRequest};
pub use record::{FieldValue, Record};
#[cfg(test)]
mod serde_tests;
