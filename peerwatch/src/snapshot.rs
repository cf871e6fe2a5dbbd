use std::{collections::BTreeMap, fmt::Display, net::IpAddr, sync::Arc};

use serde::{Deserialize, Serialize};

use crate::tracker::LivenessTracker;

/// Point-in-time liveness state of one peer as seen by this node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeInfo {
    pub ip_address: IpAddr,
    pub last_val_sent: u64,
    pub last_ack_from_node: u64,
    pub last_ack_to_node: u64,
}

impl NodeInfo {
    /// Derives the conceptual health state from value lag. Probe values
    /// advance one per cycle, so the lag between `last_val_sent` and
    /// `last_ack_from_node` counts missed cycles.
    pub fn health(&self, stale_threshold: u64) -> PeerHealth {
        if self.last_val_sent == 0 {
            PeerHealth::Unknown
        } else if self.last_ack_from_node == 0 {
            PeerHealth::Probing
        } else if self.last_val_sent - self.last_ack_from_node > stale_threshold {
            PeerHealth::Stale
        } else {
            PeerHealth::Healthy
        }
    }
}

/// Not terminal in either direction: a stale peer recovers to healthy once
/// its acks catch up.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PeerHealth {
    Unknown,
    Probing,
    Healthy,
    Stale,
}

/// Atomic, read-only view of all liveness records at one instant, keyed by
/// peer name in order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Snapshot {
    pub node_info: BTreeMap<String, NodeInfo>,
}

/// Read-only view over the tracker for external consumers. Reads never block
/// writers beyond the tracker's short copy-on-read lock.
#[derive(Debug, Clone)]
pub struct SnapshotReader {
    tracker: Arc<LivenessTracker>,
}

impl SnapshotReader {
    pub fn new(tracker: Arc<LivenessTracker>) -> Self {
        Self { tracker }
    }

    pub fn peek(&self) -> Snapshot {
        self.tracker.snapshot()
    }
}

/// Renders a snapshot as the health-checker table, one row per peer.
pub struct DisplayableSnapshot<'a>(pub &'a Snapshot);

const HEADERS: [&str; 5] = [
    "Node",
    "IP Address",
    "Last Value Sent",
    "Last Ack From Node",
    "Last Ack To Node",
];

impl Display for DisplayableSnapshot<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let rows: Vec<[String; 5]> = self
            .0
            .node_info
            .iter()
            .map(|(name, info)| {
                [
                    name.clone(),
                    info.ip_address.to_string(),
                    info.last_val_sent.to_string(),
                    info.last_ack_from_node.to_string(),
                    info.last_ack_to_node.to_string(),
                ]
            })
            .collect();

        let mut widths = HEADERS.map(str::len);
        for row in &rows {
            for (width, cell) in widths.iter_mut().zip(row.iter()) {
                *width = (*width).max(cell.len());
            }
        }

        for (i, (header, width)) in HEADERS.iter().zip(widths).enumerate() {
            if i > 0 {
                write!(f, "  ")?;
            }
            write!(f, "{header:<width$}")?;
        }
        writeln!(f)?;
        for (i, width) in widths.into_iter().enumerate() {
            if i > 0 {
                write!(f, "  ")?;
            }
            write!(f, "{:-<width$}", "")?;
        }
        for row in &rows {
            writeln!(f)?;
            for (i, (cell, width)) in row.iter().zip(widths).enumerate() {
                if i > 0 {
                    write!(f, "  ")?;
                }
                write!(f, "{cell:<width$}")?;
            }
        }
        Ok(())
    }
}
