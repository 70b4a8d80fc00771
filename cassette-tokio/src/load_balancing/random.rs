use itertools::Itertools;
use rand::seq::SliceRandom;

use crate::cluster::Host;
use crate::load_balancing::{LoadBalancingStrategy, QueryPlan, Request};

/// Random load balancing: shuffle the host order per request, then flatten
/// each host's open connections into the plan.
#[derive(Debug)]
pub struct RandomLoadBalancingStrategy {
    connections_per_host: usize,
}

impl RandomLoadBalancingStrategy {
    pub fn new() -> Self {
        Self::with_connections_per_host(1)
    }

    /// Creates a strategy keeping a fixed number of connections per host.
    pub fn with_connections_per_host(connections_per_host: usize) -> Self {
        assert!(connections_per_host > 0);
        RandomLoadBalancingStrategy {
            connections_per_host,
        }
    }
}

impl Default for RandomLoadBalancingStrategy {
    fn default() -> Self {
        RandomLoadBalancingStrategy::new()
    }
}

impl LoadBalancingStrategy for RandomLoadBalancingStrategy {
    fn target_connection_count(&self, _host: &Host) -> usize {
        self.connections_per_host
    }

    fn select(&self, hosts: &[&Host], _request: &Request) -> QueryPlan {
        let mut hosts = hosts
            .iter()
            .filter(|host| !host.is_down() && host.open_count() > 0)
            .collect_vec();

        hosts.shuffle(&mut rand::rng());

        hosts
            .into_iter()
            .flat_map(|host| host.open_connections().cloned())
            .collect()
    }
}
