mod random;
mod request;
mod round_robin;

pub use crate::load_balancing::random::RandomLoadBalancingStrategy;
pub use crate::load_balancing::request::Request;
pub use crate::load_balancing::round_robin::RoundRobinLoadBalancingStrategy;

use crate::cluster::{ConnectionHandle, Host};

/// Ordered connection candidates for a single request.
pub type QueryPlan = Vec<ConnectionHandle>;

/// Load balancing strategy. Decides how many connections the session keeps
/// per host, and in what order candidate connections are tried for one
/// request. The session treats implementations as opaque: any strategy that
/// returns candidates drawn from the given hosts' open connections is
/// acceptable.
pub trait LoadBalancingStrategy: Send + Sync {
    /// How many connections the session should keep open to the given host.
    fn target_connection_count(&self, host: &Host) -> usize;

    /// Ordered candidates for one request, drawn from `hosts`.
    fn select(&self, hosts: &[&Host], request: &Request) -> QueryPlan;
}
