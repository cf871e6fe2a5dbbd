use log::{debug, error};
use peerwatch::runtime::HealthRuntime;
use tonic::{Request, Response, Status};

use crate::{
    protobuf::{AckResp, PeekReq, PeekResp, ProbeReq, health_tonic_service_server::HealthTonicService},
    serde::serialize_snapshot,
};

pub struct HealthTonicServer {
    pub runtime: HealthRuntime,
}

impl HealthTonicServer {
    pub fn new(runtime: HealthRuntime) -> Self {
        Self { runtime }
    }
}

#[async_trait::async_trait]
impl HealthTonicService for HealthTonicServer {
    async fn probe(&self, request: Request<ProbeReq>) -> Result<Response<AckResp>, Status> {
        let req = request.into_inner();
        if self.runtime.registry.contains(&req.node_name) {
            self.runtime
                .tracker
                .record_probe_received(&req.node_name, req.value);
            if let Err(e) = self.runtime.tracker.record_ack_to(&req.node_name, req.value) {
                error!("Discarding ack to node {}: {e}", req.node_name);
            }
        } else {
            // Unknown senders still get their ack; nothing is recorded, so
            // they never show up in snapshots.
            debug!("Acking probe {} from unregistered node {}", req.value, req.node_name);
        }
        Ok(Response::new(AckResp { value: req.value }))
    }

    async fn peek(&self, _request: Request<PeekReq>) -> Result<Response<PeekResp>, Status> {
        let snapshot = self.runtime.snapshot_reader().peek();
        Ok(Response::new(serialize_snapshot(snapshot)))
    }
}
