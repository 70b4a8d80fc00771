//! Re-export of the shared error type from the protocol crate.

pub use cassette_protocol::error::{Error, Result};
