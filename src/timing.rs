use std::time::Duration;

/// The five timers that drive the role engine, grouped so their ordering
/// invariant is checked in one place: `jitter_max < heartbeat_interval <
/// election_timeout < isolation_interval`.
#[derive(Clone, Copy, Debug)]
pub struct Timing {
    /// Candidate election timer.
    pub election_timeout: Duration,
    /// Pre-election jitter lower bound.
    pub jitter_min: Duration,
    /// Pre-election jitter upper bound.
    pub jitter_max: Duration,
    /// Follower heartbeat probe cadence.
    pub heartbeat_interval: Duration,
    /// Follower's timeout waiting for a heartbeat `pong`.
    pub ping_timeout: Duration,
    /// Leader isolation-check interval.
    pub isolation_interval: Duration,
}

impl Default for Timing {
    fn default() -> Self {
        Self {
            election_timeout: Duration::from_millis(1000),
            jitter_min: Duration::from_millis(300),
            jitter_max: Duration::from_millis(500),
            heartbeat_interval: Duration::from_millis(1000),
            ping_timeout: Duration::from_millis(300),
            isolation_interval: Duration::from_millis(5000),
        }
    }
}

impl Timing {
    /// Panics if the timers are not strictly ordered. Only ever called on
    /// construction, never on the hot path.
    pub fn assert_ordered(&self) {
        assert!(
            self.jitter_max < self.heartbeat_interval,
            "jitter_max must be < heartbeat_interval"
        );
        assert!(
            self.heartbeat_interval < self.election_timeout,
            "heartbeat_interval must be < election_timeout"
        );
        assert!(
            self.election_timeout < self.isolation_interval,
            "election_timeout must be < isolation_interval"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_timing_is_ordered() {
        Timing::default().assert_ordered();
    }

    #[test]
    #[should_panic]
    fn misordered_timing_panics() {
        let mut t = Timing::default();
        t.isolation_interval = Duration::from_millis(1);
        t.assert_ordered();
    }
}
