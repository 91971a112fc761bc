//! Host APIs for the NXQL client.
//!
//! - [`http`] - Authenticated HTTP client shared by every request of a connection

pub mod http;

pub use http::{Credential, HttpClient, HttpResponse, Scheme};
