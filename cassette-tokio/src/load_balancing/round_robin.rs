use itertools::Itertools;
use std::sync::atomic::{AtomicUsize, Ordering};

use crate::cluster::Host;
use crate::load_balancing::{LoadBalancingStrategy, QueryPlan, Request};

/// Round-robin load balancing: rotate the host order per request, then
/// flatten each host's open connections into the plan.
#[derive(Debug)]
pub struct RoundRobinLoadBalancingStrategy {
    prev_idx: AtomicUsize,
    connections_per_host: usize,
}

impl RoundRobinLoadBalancingStrategy {
    pub fn new() -> Self {
        Self::with_connections_per_host(1)
    }

    /// Creates a strategy keeping a fixed number of connections per host.
    pub fn with_connections_per_host(connections_per_host: usize) -> Self {
        assert!(connections_per_host > 0);
        RoundRobinLoadBalancingStrategy {
            prev_idx: AtomicUsize::new(0),
            connections_per_host,
        }
    }
}

impl Default for RoundRobinLoadBalancingStrategy {
    fn default() -> Self {
        RoundRobinLoadBalancingStrategy::new()
    }
}

impl LoadBalancingStrategy for RoundRobinLoadBalancingStrategy {
    fn target_connection_count(&self, _host: &Host) -> usize {
        self.connections_per_host
    }

    fn select(&self, hosts: &[&Host], _request: &Request) -> QueryPlan {
        let mut hosts = hosts
            .iter()
            .filter(|host| !host.is_down() && host.open_count() > 0)
            .collect_vec();
        if hosts.is_empty() {
            return vec![];
        }

        let cur_idx = self.prev_idx.fetch_add(1, Ordering::SeqCst) % hosts.len();
        hosts.rotate_left(cur_idx);

        hosts
            .into_iter()
            .flat_map(|host| host.open_connections().cloned())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cluster::connection::MockCqlConnection;
    use crate::cluster::ConnectionHandle;
    use std::sync::Arc;

    fn host_with_connections(address: &str, count: usize) -> Host {
        let mut host = Host::new(address.parse().unwrap());
        for _ in 0..count {
            host.add_connection(ConnectionHandle::new(Arc::new(MockCqlConnection::new())));
        }
        host
    }

    #[test]
    fn rotates_between_hosts() {
        let first = host_with_connections("127.0.0.1:9042", 1);
        let second = host_with_connections("127.0.0.2:9042", 1);
        let hosts = [&first, &second];

        let strategy = RoundRobinLoadBalancingStrategy::new();
        let request = Request::default();

        let plan_a = strategy.select(&hosts, &request);
        let plan_b = strategy.select(&hosts, &request);

        assert_eq!(plan_a.len(), 2);
        assert_eq!(plan_b.len(), 2);
        assert_ne!(plan_a[0], plan_b[0]);
        assert_eq!(plan_a[0], plan_b[1]);
    }

    #[test]
    fn skips_hosts_without_open_connections() {
        let connected = host_with_connections("127.0.0.1:9042", 2);
        let empty = host_with_connections("127.0.0.2:9042", 0);
        let hosts = [&connected, &empty];

        let strategy = RoundRobinLoadBalancingStrategy::new();
        let plan = strategy.select(&hosts, &Request::default());
        assert_eq!(plan.len(), 2);
    }

    #[test]
    fn skips_down_hosts() {
        let mut down = host_with_connections("127.0.0.1:9042", 1);
        down.mark_down();
        let hosts = [&down];

        let strategy = RoundRobinLoadBalancingStrategy::new();
        assert!(strategy.select(&hosts, &Request::default()).is_empty());
    }

    #[test]
    fn target_count_is_fixed() {
        let host = host_with_connections("127.0.0.1:9042", 0);
        let strategy = RoundRobinLoadBalancingStrategy::with_connections_per_host(3);
        assert_eq!(strategy.target_connection_count(&host), 3);
    }
}
