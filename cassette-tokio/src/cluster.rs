pub(crate) mod connection;
mod connector;
mod dispatch;
mod fingerprint;
mod host;
pub mod session;

pub use crate::cluster::connection::{ConnectionHandle, ConnectionId, CqlConnection};
pub use crate::cluster::connector::ClusterConnector;
pub use crate::cluster::fingerprint::Fingerprint;
pub use crate::cluster::host::{Host, HostId, HostState};
