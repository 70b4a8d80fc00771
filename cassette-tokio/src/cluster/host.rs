use derive_more::Display;
use fxhash::FxHashMap;
use std::net::SocketAddr;

use crate::cluster::connection::{ConnectionHandle, ConnectionId};
use crate::cluster::fingerprint::Fingerprint;
use cassette_protocol::query::PreparedStatement;

/// Identity of a cluster node: its rpc address.
pub type HostId = SocketAddr;

/// Liveness of a host, as last reported by the cluster.
#[derive(Copy, Clone, Debug, Display, Ord, PartialOrd, Eq, PartialEq, Hash)]
pub enum HostState {
    Up,
    Down,
}

struct TrackedConnection {
    handle: ConnectionHandle,
    open: bool,
}

/// Per-host record: liveness, the set of known connections with their
/// open/closed state, and the statements this host has acknowledged a
/// `PREPARE` for. Pure bookkeeping, no I/O. Connection events can arrive out
/// of order, so every operation is total: unknown connections are a no-op.
pub struct Host {
    address: HostId,
    state: HostState,
    connections: FxHashMap<ConnectionId, TrackedConnection>,
    prepared: FxHashMap<Fingerprint, PreparedStatement>,
}

impl Host {
    pub fn new(address: HostId) -> Self {
        Host {
            address,
            state: HostState::Up,
            connections: Default::default(),
            prepared: Default::default(),
        }
    }

    #[inline]
    pub fn address(&self) -> HostId {
        self.address
    }

    #[inline]
    pub fn is_down(&self) -> bool {
        self.state == HostState::Down
    }

    pub fn mark_up(&mut self) {
        self.state = HostState::Up;
    }

    pub fn mark_down(&mut self) {
        self.state = HostState::Down;
    }

    /// Starts tracking a connection as open, or re-opens a known one.
    pub fn add_connection(&mut self, handle: ConnectionHandle) {
        self.connections
            .entry(handle.id())
            .and_modify(|tracked| tracked.open = true)
            .or_insert(TrackedConnection { handle, open: true });
    }

    /// Flags a tracked connection closed. It stays tracked, since it may
    /// reopen later.
    pub fn set_closed(&mut self, connection: ConnectionId) {
        if let Some(tracked) = self.connections.get_mut(&connection) {
            tracked.open = false;
        }
    }

    /// Stops tracking a connection entirely.
    pub fn remove_connection(&mut self, connection: ConnectionId) {
        self.connections.remove(&connection);
    }

    /// Number of connections currently flagged open.
    pub fn open_count(&self) -> usize {
        self.connections
            .values()
            .filter(|tracked| tracked.open)
            .count()
    }

    /// Number of tracked connections, open or closed.
    pub fn connection_count(&self) -> usize {
        self.connections.len()
    }

    /// Handles of the connections currently flagged open.
    pub fn open_connections(&self) -> impl Iterator<Item = &ConnectionHandle> {
        self.connections
            .values()
            .filter(|tracked| tracked.open)
            .map(|tracked| &tracked.handle)
    }

    /// Records that this host acknowledged a `PREPARE`.
    pub fn put_prepared(&mut self, fingerprint: Fingerprint, statement: PreparedStatement) {
        self.prepared.insert(fingerprint, statement);
    }

    /// Drops all prepared statements. The server forgets its prepared state
    /// when it goes down, so the registry must too.
    pub fn clear_prepared(&mut self) {
        self.prepared.clear();
    }

    pub fn has_prepared(&self, fingerprint: &Fingerprint) -> bool {
        self.prepared.contains_key(fingerprint)
    }

    pub fn prepared(&self, fingerprint: &Fingerprint) -> Option<&PreparedStatement> {
        self.prepared.get(fingerprint)
    }
}
