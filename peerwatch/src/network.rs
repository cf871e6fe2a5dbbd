use std::fmt::Debug;

use crate::{HealthResult, registry::Peer, registry::PeerAddr, snapshot::Snapshot};

/// Transport seam between the core protocol and the wire. Two logical
/// message kinds matter: a probe carrying a value, and the ack referencing
/// it; `probe` covers one full exchange, returning the acked value.
#[async_trait::async_trait]
pub trait HealthNetwork: Debug + Send + Sync {
    fn local_node(&self) -> PeerAddr;

    /// Sends `PROBE(value)` to the peer and waits for its `ACK`.
    async fn probe(&self, peer: &Peer, from_node: &str, value: u64) -> HealthResult<u64>;

    /// Fetches a remote node's liveness snapshot.
    async fn peek(&self, addr: PeerAddr) -> HealthResult<Snapshot>;
}
