use std::{sync::Arc, time::Duration};

use log::{debug, error};
use parking_lot::Mutex;
use tokio::task::JoinHandle;

use crate::{
    network::HealthNetwork,
    registry::{Peer, PeerRegistry},
    tracker::LivenessTracker,
};

/// Drives one probe cycle per interval: every registered peer gets a fresh
/// probe value, each exchange runs as its own task so a slow or unreachable
/// peer never delays the others.
#[derive(Debug)]
pub struct Prober {
    pub node_name: String,
    pub registry: Arc<PeerRegistry>,
    pub tracker: Arc<LivenessTracker>,
    pub network: Arc<dyn HealthNetwork>,
    pub probe_interval: Duration,
    handle: Mutex<Option<JoinHandle<()>>>,
}

impl Prober {
    pub fn new(
        node_name: String,
        registry: Arc<PeerRegistry>,
        tracker: Arc<LivenessTracker>,
        network: Arc<dyn HealthNetwork>,
        probe_interval: Duration,
    ) -> Self {
        Prober {
            node_name,
            registry,
            tracker,
            network,
            probe_interval,
            handle: Mutex::new(None),
        }
    }

    pub fn start(&self) {
        let node_name = self.node_name.clone();
        let registry = self.registry.clone();
        let tracker = self.tracker.clone();
        let network = self.network.clone();
        let probe_interval = self.probe_interval;

        let handle = tokio::spawn(async move {
            loop {
                // Peers registered after this point wait for the next tick.
                for peer in registry.list() {
                    let node_name = node_name.clone();
                    let registry = registry.clone();
                    let tracker = tracker.clone();
                    let network = network.clone();
                    tokio::spawn(async move {
                        probe_peer(&node_name, &registry, &tracker, &network, peer).await;
                    });
                }

                tokio::time::sleep(probe_interval).await;
            }
        });
        *self.handle.lock() = Some(handle);
    }

    pub fn stop(&self) {
        if let Some(handle) = self.handle.lock().take() {
            handle.abort();
        }
    }
}

async fn probe_peer(
    node_name: &str,
    registry: &PeerRegistry,
    tracker: &LivenessTracker,
    network: &Arc<dyn HealthNetwork>,
    peer: Peer,
) {
    let Some(value) = tracker.next_value(&peer.name) else {
        debug!("Peer {} deregistered before probe, skipping", peer.name);
        return;
    };
    if let Err(e) = tracker.record_sent(&peer.name, value) {
        // Lost the race against a concurrent cycle; the other probe carries
        // this value forward.
        error!("Discarding probe for peer {}: {e}", peer.name);
        return;
    }

    match network.probe(&peer, node_name, value).await {
        Ok(acked) => {
            if !registry.contains(&peer.name) {
                debug!(
                    "Peer {} deregistered mid-flight, discarding ack {acked}",
                    peer.name
                );
                return;
            }
            if let Err(e) = tracker.record_ack_from(&peer.name, acked) {
                error!("Discarding ack from peer {}: {e}", peer.name);
            }
        }
        Err(e) => {
            // Non-fatal: the record simply stops advancing until the peer
            // answers again. Retried on the next tick.
            debug!("Failed to probe peer {} at {}: {e}", peer.name, peer.addr);
        }
    }
}
