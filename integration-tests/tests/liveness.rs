use std::time::Duration;

use peerwatch::snapshot::PeerHealth;
use peerwatch_integration_tests::utils::{start_node, unreachable_addr, wait_until};

const PROBE_INTERVAL: Duration = Duration::from_millis(100);
const WAIT: Duration = Duration::from_secs(10);

#[tokio::test]
async fn two_nodes_converge() {
    let (a, a_addr) = start_node("node-a", PROBE_INTERVAL).await;
    let (b, b_addr) = start_node("node-b", PROBE_INTERVAL).await;
    a.register_peer("node-b", b_addr);
    b.register_peer("node-a", a_addr);
    a.start();
    b.start();

    let view = a.clone();
    let converged = wait_until(
        || {
            view.snapshot()
                .node_info
                .get("node-b")
                .map(|i| i.last_ack_from_node >= 3 && i.last_ack_to_node >= 3)
                .unwrap_or(false)
        },
        WAIT,
    )
    .await;
    assert!(converged, "node-a never converged: {:?}", a.snapshot());

    let info = *a.snapshot().node_info.get("node-b").unwrap();
    assert!(info.last_ack_from_node <= info.last_val_sent);
    assert_eq!(info.health(a.config.stale_threshold), PeerHealth::Healthy);

    let info = *b.snapshot().node_info.get("node-a").unwrap();
    assert!(info.last_ack_from_node <= info.last_val_sent);
    assert_eq!(info.health(b.config.stale_threshold), PeerHealth::Healthy);

    a.shutdown();
    b.shutdown();
}

#[tokio::test]
async fn unreachable_peer_does_not_affect_others() {
    let (a, _) = start_node("node-a", PROBE_INTERVAL).await;
    let (b, b_addr) = start_node("node-b", PROBE_INTERVAL).await;
    let ghost_addr = unreachable_addr().await;
    a.register_peer("node-b", b_addr);
    a.register_peer("ghost", ghost_addr);
    a.start();

    let view = a.clone();
    let converged = wait_until(
        || {
            view.snapshot()
                .node_info
                .get("node-b")
                .map(|i| i.last_ack_from_node >= 3)
                .unwrap_or(false)
        },
        WAIT,
    )
    .await;
    assert!(converged, "healthy peer starved: {:?}", a.snapshot());

    let snapshot = a.snapshot();
    let ghost = snapshot.node_info.get("ghost").unwrap();
    // Probes keep going out; the record just never advances on the ack side.
    assert!(ghost.last_val_sent >= 2);
    assert_eq!(ghost.last_ack_from_node, 0);
    assert_eq!(ghost.last_ack_to_node, 0);
    assert_eq!(ghost.health(a.config.stale_threshold), PeerHealth::Probing);

    // node-b never registered node-a: it acks the probes but records nothing.
    assert!(b.snapshot().node_info.is_empty());

    a.shutdown();
}

#[tokio::test]
async fn deregistered_peer_never_reappears() {
    let (a, _) = start_node("node-a", PROBE_INTERVAL).await;
    let (b, b_addr) = start_node("node-b", PROBE_INTERVAL).await;
    a.register_peer("node-b", b_addr);
    a.start();

    let view = a.clone();
    let probed = wait_until(
        || {
            view.snapshot()
                .node_info
                .get("node-b")
                .map(|i| i.last_ack_from_node >= 1)
                .unwrap_or(false)
        },
        WAIT,
    )
    .await;
    assert!(probed, "node-b never acked: {:?}", a.snapshot());

    a.deregister_peer("node-b");
    assert!(a.snapshot().node_info.is_empty());

    // Any in-flight exchange completes against a dropped record and later
    // cycles skip the peer entirely.
    tokio::time::sleep(PROBE_INTERVAL * 5).await;
    assert!(a.snapshot().node_info.is_empty());

    a.shutdown();
    drop(b);
}
