use std::{net::IpAddr, time::Duration};

use peerwatch::{
    HealthError,
    network::HealthNetwork,
    snapshot::DisplayableSnapshot,
};
use peerwatch_integration_tests::utils::{start_node, static_addr, unreachable_addr};
use peerwatch_network_tonic::{
    network::HealthTonicNetwork,
    serde::{parse_ip, serialize_ip},
};

#[tokio::test]
async fn remote_peek_matches_local_snapshot() {
    let (node, addr) = start_node("node-a", Duration::from_secs(60)).await;
    node.register_peer("node1", static_addr([10, 0, 0, 1], 9090));
    node.tracker.record_sent("node1", 1).unwrap();
    node.tracker.record_ack_from("node1", 1).unwrap();

    let client = HealthTonicNetwork::new(0);
    let remote = client.peek(addr).await.unwrap();
    assert_eq!(remote, node.snapshot());

    let info = remote.node_info.get("node1").unwrap();
    assert_eq!(info.ip_address, IpAddr::from([10, 0, 0, 1]));
    assert_eq!(info.last_val_sent, 1);
    assert_eq!(info.last_ack_from_node, 1);
    assert_eq!(info.last_ack_to_node, 0);
}

#[tokio::test]
async fn peek_against_down_node_is_unavailable() {
    let addr = unreachable_addr().await;
    let err = HealthTonicNetwork::new(0).peek(addr).await.unwrap_err();
    assert!(matches!(err, HealthError::Unavailable(_, _)), "{err}");
}

#[tokio::test]
async fn snapshot_renders_as_table() {
    let (node, _) = start_node("node-a", Duration::from_secs(60)).await;
    node.register_peer("node1", static_addr([10, 0, 0, 1], 9090));
    node.tracker.record_sent("node1", 4).unwrap();
    node.tracker.record_ack_from("node1", 3).unwrap();

    let snapshot = node.snapshot();
    let table = DisplayableSnapshot(&snapshot).to_string();

    let mut lines = table.lines();
    let header = lines.next().unwrap();
    for column in [
        "Node",
        "IP Address",
        "Last Value Sent",
        "Last Ack From Node",
        "Last Ack To Node",
    ] {
        assert!(header.contains(column), "missing column in {header:?}");
    }
    let row = lines.nth(1).unwrap();
    assert!(row.contains("node1"));
    assert!(row.contains("10.0.0.1"));
    assert!(row.contains('4'));
    assert!(row.contains('3'));
}

#[test]
fn addresses_round_trip_as_octets() {
    let v4: IpAddr = "10.0.0.1".parse().unwrap();
    assert_eq!(parse_ip(&serialize_ip(v4)).unwrap(), v4);

    let v6: IpAddr = "fd00::1".parse().unwrap();
    assert_eq!(parse_ip(&serialize_ip(v6)).unwrap(), v6);

    let err = parse_ip(&[1, 2, 3]).unwrap_err();
    assert!(matches!(err, HealthError::Internal(_, _)), "{err}");
}
