use derive_more::Constructor;
#[cfg(test)]
use mockall::automock;
use rand::Rng;
use std::time::Duration;

const DEFAULT_BASE_DELAY: Duration = Duration::from_secs(1);
const DEFAULT_MAX_DELAY: Duration = Duration::from_secs(60);

/// Determines the time for the next reconnection attempt when trying to
/// reconnect to a node.
pub trait ReconnectionSchedule {
    /// Returns next reconnect delay or `None` if no attempt should be made.
    fn next_delay(&mut self) -> Option<Duration>;
}

/// Creates reconnection schedules when trying to re-establish connections.
///
/// The session itself never sleeps on these - the connection subsystem draws
/// a fresh schedule per lost node and paces its attempts with it, which is
/// also why the session defers `host_up` handling to that subsystem instead
/// of opening connections eagerly.
#[cfg_attr(test, automock)]
pub trait ReconnectionPolicy {
    /// Creates new schedule when a connection needs to be re-established.
    fn new_node_schedule(&self) -> Box<dyn ReconnectionSchedule + Send + Sync>;
}

/// Schedules reconnection at constant intervals.
#[derive(Copy, Clone, Constructor, Debug, Ord, PartialOrd, Eq, PartialEq, Hash)]
pub struct ConstantReconnectionPolicy {
    base_delay: Duration,
}

impl Default for ConstantReconnectionPolicy {
    fn default() -> Self {
        ConstantReconnectionPolicy::new(DEFAULT_BASE_DELAY)
    }
}

impl ReconnectionPolicy for ConstantReconnectionPolicy {
    fn new_node_schedule(&self) -> Box<dyn ReconnectionSchedule + Send + Sync> {
        Box::new(ConstantReconnectionSchedule {
            base_delay: self.base_delay,
        })
    }
}

struct ConstantReconnectionSchedule {
    base_delay: Duration,
}

impl ReconnectionSchedule for ConstantReconnectionSchedule {
    fn next_delay(&mut self) -> Option<Duration> {
        Some(self.base_delay)
    }
}

/// Never schedules reconnections.
#[derive(Default, Copy, Clone, Debug, PartialEq, Ord, PartialOrd, Eq, Hash)]
pub struct NeverReconnectionPolicy;

impl ReconnectionPolicy for NeverReconnectionPolicy {
    fn new_node_schedule(&self) -> Box<dyn ReconnectionSchedule + Send + Sync> {
        Box::new(NeverReconnectionSchedule)
    }
}

struct NeverReconnectionSchedule;

impl ReconnectionSchedule for NeverReconnectionSchedule {
    fn next_delay(&mut self) -> Option<Duration> {
        None
    }
}

/// Waits exponentially longer between attempts, with jitter, holding at a
/// maximum delay once reached.
#[derive(Copy, Clone, Constructor, Debug, Ord, PartialOrd, Eq, PartialEq, Hash)]
pub struct ExponentialReconnectionPolicy {
    base_delay: Duration,
    max_delay: Duration,
}

impl Default for ExponentialReconnectionPolicy {
    fn default() -> Self {
        ExponentialReconnectionPolicy::new(DEFAULT_BASE_DELAY, DEFAULT_MAX_DELAY)
    }
}

impl ReconnectionPolicy for ExponentialReconnectionPolicy {
    fn new_node_schedule(&self) -> Box<dyn ReconnectionSchedule + Send + Sync> {
        Box::new(ExponentialReconnectionSchedule {
            base_delay: self.base_delay,
            max_delay: self.max_delay,
            attempt: 0,
        })
    }
}

struct ExponentialReconnectionSchedule {
    base_delay: Duration,
    max_delay: Duration,
    attempt: u32,
}

impl ReconnectionSchedule for ExponentialReconnectionSchedule {
    fn next_delay(&mut self) -> Option<Duration> {
        let factor = 1u32.checked_shl(self.attempt).unwrap_or(u32::MAX);
        self.attempt = self.attempt.saturating_add(1);

        let delay = self
            .base_delay
            .saturating_mul(factor)
            .min(self.max_delay);

        // +-15% jitter, so the whole pool doesn't reconnect in lockstep
        let jitter = rand::rng().random_range(85..116);

        Some(
            (delay / 100)
                .saturating_mul(jitter)
                .clamp(self.base_delay, self.max_delay),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn constant_policy_repeats_the_delay() {
        let mut schedule = ConstantReconnectionPolicy::new(Duration::from_secs(5))
            .new_node_schedule();

        assert_eq!(schedule.next_delay(), Some(Duration::from_secs(5)));
        assert_eq!(schedule.next_delay(), Some(Duration::from_secs(5)));
    }

    #[test]
    fn never_policy_yields_nothing() {
        let mut schedule = NeverReconnectionPolicy.new_node_schedule();
        assert_eq!(schedule.next_delay(), None);
    }

    #[test]
    fn exponential_delays_stay_within_bounds() {
        let base = Duration::from_millis(100);
        let max = Duration::from_secs(10);
        let mut schedule = ExponentialReconnectionPolicy::new(base, max).new_node_schedule();

        for _ in 0..64 {
            let delay = schedule.next_delay().unwrap();
            assert!(delay >= base);
            assert!(delay <= max);
        }
    }

    #[test]
    fn exponential_delays_reach_the_cap() {
        let base = Duration::from_secs(1);
        let max = Duration::from_secs(8);
        let mut schedule = ExponentialReconnectionPolicy::new(base, max).new_node_schedule();

        // after enough doublings, the pre-jitter delay is pinned at max and
        // jitter only pulls downwards from there
        let mut last = Duration::ZERO;
        for _ in 0..16 {
            last = schedule.next_delay().unwrap();
        }
        assert!(last >= max.mul_f64(0.85));
    }

    #[test]
    fn overflowing_attempt_counts_do_not_panic() {
        let mut schedule = ExponentialReconnectionSchedule {
            base_delay: Duration::from_secs(1),
            max_delay: Duration::from_secs(60),
            attempt: u32::MAX,
        };

        schedule.next_delay();
        schedule.next_delay();
    }
}
