use std::time::Duration;

#[derive(Debug, Clone)]
pub struct HealthConfig {
    pub probe_interval: Duration,
    /// Number of probe cycles a peer's acks may lag behind `last_val_sent`
    /// before the peer is reported as stale.
    pub stale_threshold: u64,
}

impl HealthConfig {
    pub fn new() -> Self {
        Self {
            probe_interval: Duration::from_secs(2),
            stale_threshold: 3,
        }
    }

    pub fn with_probe_interval(mut self, interval: Duration) -> Self {
        self.probe_interval = interval;
        self
    }

    pub fn with_stale_threshold(mut self, cycles: u64) -> Self {
        self.stale_threshold = cycles;
        self
    }
}

impl Default for HealthConfig {
    fn default() -> Self {
        Self::new()
    }
}
