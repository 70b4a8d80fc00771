//! Request-side CQL framing for the Cassette driver.
//!
//! This crate contains the wire types the session core works with: the
//! [`frame::Envelope`] container, request bodies for `QUERY`, `PREPARE` and
//! `EXECUTE`, query parameters and consistency levels, and the shared
//! [`error::Error`] type. Response decoding beyond what the session observes
//! (prepared-statement results) is the concern of the connection subsystem
//! and intentionally absent.

pub mod consistency;
pub mod error;
pub mod frame;
pub mod query;
pub mod types;

pub use error::{Error, Result};
