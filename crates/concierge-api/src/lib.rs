//! concierge-api: Trip Concierge backend contract
//!
//! Wire types for the chat and trip endpoints, the [`Backend`] trait the
//! client is written against, and a reqwest-based [`HttpBackend`].

pub mod backend;
pub mod error;
pub mod http;
pub mod types;

pub use backend::Backend;
pub use error::{Error, Result};
pub use http::{HttpBackend, HttpBackendConfig};
pub use types::*;
