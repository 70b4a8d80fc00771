//! **cassette** is the session core of an async Cassandra client: it
//! multiplexes queries, prepares and executes across a dynamic, load-balanced
//! pool of connections, keeping a per-host prepared-statement cache so an
//! `EXECUTE` is only ever routed to a node that has acknowledged the matching
//! `PREPARE`.
//!
//! The session is deliberately narrow: topology discovery and the actual
//! socket handling live behind the [`ClusterConnector`](crate::cluster::ClusterConnector)
//! and [`CqlConnection`](crate::cluster::CqlConnection) seams, and feed the
//! session through its [`SessionListener`](crate::cluster::session::SessionListener).
//!
//! ## Getting started
//!
//! ```no_run
//! use std::sync::Arc;
//!
//! use cassette_tokio::cluster::session::{SessionBuilder, SessionListener};
//! use cassette_tokio::cluster::{ClusterConnector, HostId};
//!
//! struct StaticCluster;
//!
//! impl ClusterConnector for StaticCluster {
//!     fn up_hosts(&self) -> Vec<HostId> {
//!         vec!["127.0.0.1:9042".parse().unwrap()]
//!     }
//!
//!     fn request_connections(&self, _host: HostId, _count: usize) {
//!         // hand over to your connection subsystem; each connection that
//!         // comes up is announced via the registered listener
//!     }
//!
//!     fn register(&self, _listener: SessionListener) {
//!         // keep the listener around for pushing cluster events
//!     }
//! }
//!
//! #[tokio::main]
//! async fn main() {
//!     let session = SessionBuilder::new(Arc::new(StaticCluster)).build();
//!
//!     let rows = session.query("SELECT * FROM system.local").await;
//!     let _ = rows;
//! }
//! ```
//!
//! ## Request flow
//!
//! A call to [`execute`](crate::cluster::session::Session::execute) with
//! bound values is fingerprinted; hosts already holding the statement serve
//! it directly, otherwise the session issues a `PREPARE` first and parks the
//! execute until a host acknowledges. Requests arriving while no connection
//! is open are queued and drained, in order, on the first connection that
//! opens.

pub mod cluster;
pub mod load_balancing;
pub mod retry;
pub mod statement;

pub mod error;
pub mod future;

pub type Error = error::Error;
pub type Result<T> = error::Result<T>;
