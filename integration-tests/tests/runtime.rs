use std::{sync::Arc, time::Duration};

use peerwatch::{
    HealthError, HealthResult,
    config::HealthConfig,
    network::HealthNetwork,
    registry::{Peer, PeerAddr},
    runtime::HealthRuntime,
    snapshot::Snapshot,
    tracker::LivenessRecord,
};
use peerwatch_integration_tests::utils::{static_addr, wait_until};

/// Acks every probe immediately without touching the wire.
#[derive(Debug)]
struct LoopbackNetwork;

#[async_trait::async_trait]
impl HealthNetwork for LoopbackNetwork {
    fn local_node(&self) -> PeerAddr {
        static_addr([127, 0, 0, 1], 0)
    }

    async fn probe(&self, _peer: &Peer, _from_node: &str, value: u64) -> HealthResult<u64> {
        Ok(value)
    }

    async fn peek(&self, addr: PeerAddr) -> HealthResult<Snapshot> {
        Err(HealthError::unavailable(format!(
            "loopback network cannot peek {addr}"
        )))
    }
}

fn build_runtime(probe_interval: Duration) -> HealthRuntime {
    let config = HealthConfig::default().with_probe_interval(probe_interval);
    HealthRuntime::new("local", Arc::new(config), Arc::new(LoopbackNetwork))
}

#[tokio::test]
async fn probe_cycles_advance_all_peers() {
    let runtime = build_runtime(Duration::from_millis(50));
    runtime.register_peer("node1", static_addr([10, 0, 0, 1], 9090));
    runtime.register_peer("node2", static_addr([10, 0, 0, 2], 9090));
    runtime.start();

    let view = runtime.clone();
    let advanced = wait_until(
        || {
            let snapshot = view.snapshot();
            ["node1", "node2"].iter().all(|name| {
                snapshot
                    .node_info
                    .get(*name)
                    .map(|i| i.last_val_sent >= 3 && i.last_ack_from_node >= 3)
                    .unwrap_or(false)
            })
        },
        Duration::from_secs(10),
    )
    .await;
    assert!(advanced, "probe cycles stalled: {:?}", runtime.snapshot());

    for info in runtime.snapshot().node_info.values() {
        assert!(info.last_ack_from_node <= info.last_val_sent);
    }

    runtime.shutdown();
}

#[tokio::test]
async fn reregistration_resets_the_record() {
    let runtime = build_runtime(Duration::from_secs(60));
    runtime.register_peer("node1", static_addr([10, 0, 0, 1], 9090));
    runtime.tracker.record_sent("node1", 7).unwrap();

    runtime.register_peer("node1", static_addr([10, 0, 0, 2], 9090));

    assert_eq!(
        runtime.tracker.get("node1").unwrap(),
        LivenessRecord::default()
    );
    let snapshot = runtime.snapshot();
    assert_eq!(
        snapshot.node_info.get("node1").unwrap().ip_address.to_string(),
        "10.0.0.2"
    );
}

#[tokio::test]
async fn deregistering_unknown_peer_is_noop() {
    let runtime = build_runtime(Duration::from_secs(60));
    runtime.register_peer("node1", static_addr([10, 0, 0, 1], 9090));

    runtime.deregister_peer("unknown");
    assert_eq!(runtime.snapshot().node_info.len(), 1);

    runtime.deregister_peer("node1");
    assert!(runtime.snapshot().node_info.is_empty());
}
