#[cfg(test)]
use mockall::automock;

use crate::cluster::host::HostId;
use crate::cluster::session::SessionListener;

/// Seam to the topology discoverer and connection subsystem. The session
/// never opens sockets itself: it asks the connector for connections and
/// learns about the results (and everything else that happens in the
/// cluster) through the [`SessionListener`] it hands over at registration.
///
/// Implementations are expected to pace actual connection attempts with the
/// session's [`ReconnectionPolicy`](crate::retry::ReconnectionPolicy) - the
/// session itself never schedules reconnects.
#[cfg_attr(test, automock)]
pub trait ClusterConnector: Send + Sync {
    /// Hosts currently reported up by the topology discoverer.
    fn up_hosts(&self) -> Vec<HostId>;

    /// Requests `count` new connections to `host`. Each one that comes up is
    /// announced via [`SessionListener::connection_opened`].
    fn request_connections(&self, host: HostId, count: usize);

    /// Called once when a session is built, giving the subsystem its channel
    /// into the session.
    fn register(&self, listener: SessionListener);
}
