use std::collections::{BTreeMap, HashMap};

use log::trace;
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};

use crate::{
    HealthError, HealthResult,
    registry::PeerAddr,
    snapshot::{NodeInfo, Snapshot},
};

/// Per-peer liveness state: the last probe value sent to the peer and the
/// most recent acknowledgement exchanged in each direction.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LivenessRecord {
    pub last_val_sent: u64,
    pub last_ack_from_node: u64,
    pub last_ack_to_node: u64,
}

#[derive(Debug, Clone)]
struct PeerLiveness {
    addr: PeerAddr,
    record: LivenessRecord,
    /// Highest probe value received from this peer, used to validate the
    /// acks we send back. Not part of the snapshot.
    last_val_received: u64,
}

/// Owns the liveness record table. Only the prober and the probe server
/// mutate a given peer's record; snapshot reads copy the whole table under a
/// short read lock, never held across I/O.
#[derive(Debug, Default)]
pub struct LivenessTracker {
    records: RwLock<HashMap<String, PeerLiveness>>,
}

impl LivenessTracker {
    pub fn new() -> Self {
        Self {
            records: RwLock::new(HashMap::new()),
        }
    }

    /// Creates a fresh record for a peer, replacing any previous one. The
    /// address is captured here so a snapshot is a single atomic read.
    pub fn insert(&self, name: impl Into<String>, addr: PeerAddr) {
        self.records.write().insert(
            name.into(),
            PeerLiveness {
                addr,
                record: LivenessRecord::default(),
                last_val_received: 0,
            },
        );
    }

    /// Drops a peer's record. Results of in-flight exchanges for the peer
    /// will be discarded when they arrive.
    pub fn remove(&self, name: &str) {
        self.records.write().remove(name);
    }

    pub fn get(&self, name: &str) -> Option<LivenessRecord> {
        self.records.read().get(name).map(|p| p.record)
    }

    /// Next probe value for a peer: one past the last value sent.
    pub fn next_value(&self, name: &str) -> Option<u64> {
        self.records
            .read()
            .get(name)
            .map(|p| p.record.last_val_sent + 1)
    }

    /// Records a probe sent to a peer. Values must strictly increase.
    pub fn record_sent(&self, name: &str, value: u64) -> HealthResult<()> {
        let mut guard = self.records.write();
        let Some(peer) = guard.get_mut(name) else {
            trace!("Discarding sent value {value} for unregistered peer {name}");
            return Ok(());
        };
        if value <= peer.record.last_val_sent {
            return Err(HealthError::stale_value(format!(
                "value {value} for peer {name} does not advance last sent value {}",
                peer.record.last_val_sent
            )));
        }
        peer.record.last_val_sent = value;
        Ok(())
    }

    /// Records an acknowledgement received from a peer for a probe this node
    /// sent. Re-applying an already-recorded ack is a no-op.
    pub fn record_ack_from(&self, name: &str, value: u64) -> HealthResult<()> {
        let mut guard = self.records.write();
        let Some(peer) = guard.get_mut(name) else {
            trace!("Discarding ack {value} from unregistered peer {name}");
            return Ok(());
        };
        if value > peer.record.last_val_sent {
            return Err(HealthError::invalid_ack(format!(
                "ack {value} from peer {name} references a value never sent (last sent {})",
                peer.record.last_val_sent
            )));
        }
        if value <= peer.record.last_ack_from_node {
            trace!("Ignoring out-of-order ack {value} from peer {name}");
            return Ok(());
        }
        peer.record.last_ack_from_node = value;
        Ok(())
    }

    /// Notes a probe value received from a peer.
    pub fn record_probe_received(&self, name: &str, value: u64) {
        let mut guard = self.records.write();
        let Some(peer) = guard.get_mut(name) else {
            trace!("Discarding probe {value} from unregistered peer {name}");
            return;
        };
        if value > peer.last_val_received {
            peer.last_val_received = value;
        }
    }

    /// Records the acknowledgement this node sent back for a peer's probe.
    /// Re-applying an already-recorded ack is a no-op.
    pub fn record_ack_to(&self, name: &str, value: u64) -> HealthResult<()> {
        let mut guard = self.records.write();
        let Some(peer) = guard.get_mut(name) else {
            trace!("Discarding ack {value} to unregistered peer {name}");
            return Ok(());
        };
        if value > peer.last_val_received {
            return Err(HealthError::invalid_ack(format!(
                "ack {value} to peer {name} exceeds its last known probe value {}",
                peer.last_val_received
            )));
        }
        if value <= peer.record.last_ack_to_node {
            trace!("Ignoring out-of-order ack {value} to peer {name}");
            return Ok(());
        }
        peer.record.last_ack_to_node = value;
        Ok(())
    }

    /// Atomic, consistent copy of all records. A peer appears iff it is
    /// currently registered.
    pub fn snapshot(&self) -> Snapshot {
        let guard = self.records.read();
        let node_info: BTreeMap<String, NodeInfo> = guard
            .iter()
            .map(|(name, peer)| {
                (
                    name.clone(),
                    NodeInfo {
                        ip_address: peer.addr.ip,
                        last_val_sent: peer.record.last_val_sent,
                        last_ack_from_node: peer.record.last_ack_from_node,
                        last_ack_to_node: peer.record.last_ack_to_node,
                    },
                )
            })
            .collect();
        Snapshot { node_info }
    }
}
