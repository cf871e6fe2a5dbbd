use std::sync::Arc;

use crate::{
    config::HealthConfig,
    network::HealthNetwork,
    prober::Prober,
    registry::{PeerAddr, PeerRegistry},
    snapshot::{Snapshot, SnapshotReader},
    tracker::LivenessTracker,
};

/// Process-wide health-check service object: owns the registry, the liveness
/// table and the prober, and keeps registry and tracker in lockstep on
/// registration changes. Clones share the same underlying state.
#[derive(Debug, Clone)]
pub struct HealthRuntime {
    pub node_name: String,
    pub config: Arc<HealthConfig>,
    pub registry: Arc<PeerRegistry>,
    pub tracker: Arc<LivenessTracker>,
    pub network: Arc<dyn HealthNetwork>,
    prober: Arc<Prober>,
}

impl HealthRuntime {
    pub fn new(
        node_name: impl Into<String>,
        config: Arc<HealthConfig>,
        network: Arc<dyn HealthNetwork>,
    ) -> Self {
        let node_name = node_name.into();
        let registry = Arc::new(PeerRegistry::new());
        let tracker = Arc::new(LivenessTracker::new());
        let prober = Arc::new(Prober::new(
            node_name.clone(),
            registry.clone(),
            tracker.clone(),
            network.clone(),
            config.probe_interval,
        ));
        Self {
            node_name,
            config,
            registry,
            tracker,
            network,
            prober,
        }
    }

    pub fn start(&self) {
        self.prober.start();
    }

    /// Stops the probe loop. In-flight exchanges are allowed to finish;
    /// their results land in the tracker as usual.
    pub fn shutdown(&self) {
        self.prober.stop();
    }

    /// Registers a peer and gives it a fresh liveness record. Registering an
    /// existing name overwrites both.
    pub fn register_peer(&self, name: impl Into<String>, addr: PeerAddr) {
        let name = name.into();
        self.registry.register(name.clone(), addr);
        self.tracker.insert(name, addr);
    }

    /// Removes a peer and its liveness record. Late results from in-flight
    /// exchanges for the peer are discarded.
    pub fn deregister_peer(&self, name: &str) {
        self.registry.deregister(name);
        self.tracker.remove(name);
    }

    pub fn snapshot(&self) -> Snapshot {
        self.tracker.snapshot()
    }

    pub fn snapshot_reader(&self) -> SnapshotReader {
        SnapshotReader::new(self.tracker.clone())
    }
}
