use bytes::Bytes;
use derivative::Derivative;
#[cfg(test)]
use mockall::automock;
use std::hash::{Hash, Hasher};
use std::sync::Arc;
use uuid::Uuid;

use crate::future::BoxFuture;
use cassette_protocol::error::Result;
use cassette_protocol::frame::Envelope;

/// Unique id of one connection within the session's bookkeeping. Connection
/// endpoints themselves are opaque, so identity lives here.
pub type ConnectionId = Uuid;

/// A live connection endpoint owned by the connection subsystem. The session
/// writes fully-encoded request envelopes and awaits the matching reply;
/// framing, compression and authentication all happen behind this seam. A
/// protocol-level error reply surfaces as [`Error::Server`](cassette_protocol::Error::Server).
#[cfg_attr(test, automock)]
pub trait CqlConnection: Send + Sync {
    /// Writes an encoded request and resolves with the decoded reply.
    fn send(&self, payload: Bytes) -> BoxFuture<'static, Result<Envelope>>;
}

/// Cloneable reference to a connection, paired with the identity the host
/// registry tracks it under. Equality and hashing go by id.
#[derive(Clone, Derivative)]
#[derivative(Debug)]
pub struct ConnectionHandle {
    id: ConnectionId,
    #[derivative(Debug = "ignore")]
    connection: Arc<dyn CqlConnection>,
}

impl ConnectionHandle {
    /// Wraps a connection endpoint under a fresh id.
    pub fn new(connection: Arc<dyn CqlConnection>) -> Self {
        Self::with_id(Uuid::new_v4(), connection)
    }

    /// Wraps a connection endpoint under a caller-chosen id.
    pub fn with_id(id: ConnectionId, connection: Arc<dyn CqlConnection>) -> Self {
        ConnectionHandle { id, connection }
    }

    #[inline]
    pub fn id(&self) -> ConnectionId {
        self.id
    }

    #[inline]
    pub fn send(&self, payload: Bytes) -> BoxFuture<'static, Result<Envelope>> {
        self.connection.send(payload)
    }
}

impl PartialEq for ConnectionHandle {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for ConnectionHandle {}

impl Hash for ConnectionHandle {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn handles_compare_by_id() {
        let connection = Arc::new(MockCqlConnection::new());
        let id = Uuid::new_v4();

        let first = ConnectionHandle::with_id(id, connection.clone());
        let second = ConnectionHandle::with_id(id, connection.clone());
        let third = ConnectionHandle::new(connection);

        assert_eq!(first, second);
        assert_ne!(first, third);
    }
}
