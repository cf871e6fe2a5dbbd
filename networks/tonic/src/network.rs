use peerwatch::{
    HealthError, HealthResult,
    network::HealthNetwork,
    registry::{Peer, PeerAddr},
    snapshot::Snapshot,
    util::get_local_ip,
};
use tonic::transport::{Channel, Endpoint};

use crate::{
    protobuf::{PeekReq, ProbeReq, health_tonic_service_client::HealthTonicServiceClient},
    serde::parse_snapshot,
};

#[derive(Debug)]
pub struct HealthTonicNetwork {
    pub port: u16,
}

impl HealthTonicNetwork {
    pub fn new(port: u16) -> Self {
        Self { port }
    }
}

#[async_trait::async_trait]
impl HealthNetwork for HealthTonicNetwork {
    fn local_node(&self) -> PeerAddr {
        PeerAddr {
            ip: get_local_ip(),
            port: self.port,
        }
    }

    async fn probe(&self, peer: &Peer, from_node: &str, value: u64) -> HealthResult<u64> {
        let channel = build_tonic_channel(peer.addr).await?;
        let mut tonic_client = HealthTonicServiceClient::new(channel);
        let req = ProbeReq {
            node_name: from_node.to_string(),
            value,
        };
        let resp = tonic_client
            .probe(req)
            .await
            .map_err(|e| HealthError::unreachable(Box::new(e)))?
            .into_inner();
        Ok(resp.value)
    }

    async fn peek(&self, addr: PeerAddr) -> HealthResult<Snapshot> {
        let endpoint = Endpoint::from_shared(format!("http://{addr}"))
            .map_err(|e| HealthError::unavailable(e.to_string()))?;
        let channel = endpoint
            .connect()
            .await
            .map_err(|e| HealthError::unavailable(format!("node {addr} is not serving: {e}")))?;
        let mut tonic_client = HealthTonicServiceClient::new(channel);
        let resp = tonic_client
            .peek(PeekReq {})
            .await
            .map_err(|e| HealthError::unavailable(e.to_string()))?
            .into_inner();
        parse_snapshot(resp)
    }
}

async fn build_tonic_channel(addr: PeerAddr) -> HealthResult<Channel> {
    let endpoint = Endpoint::from_shared(format!("http://{addr}"))
        .map_err(|e| HealthError::unreachable(Box::new(e)))?;
    let channel = endpoint
        .connect()
        .await
        .map_err(|e| HealthError::unreachable(Box::new(e)))?;
    Ok(channel)
}
