use std::net::IpAddr;

use peerwatch::{
    HealthError, HealthResult,
    snapshot::{NodeInfo, Snapshot},
};

use crate::protobuf;

pub fn serialize_ip(ip: IpAddr) -> Vec<u8> {
    match ip {
        IpAddr::V4(v4) => v4.octets().to_vec(),
        IpAddr::V6(v6) => v6.octets().to_vec(),
    }
}

pub fn parse_ip(bytes: &[u8]) -> HealthResult<IpAddr> {
    if let Ok(octets) = <[u8; 4]>::try_from(bytes) {
        Ok(IpAddr::from(octets))
    } else if let Ok(octets) = <[u8; 16]>::try_from(bytes) {
        Ok(IpAddr::from(octets))
    } else {
        Err(HealthError::internal(format!(
            "Invalid address length {}, expected 4 or 16 octets",
            bytes.len()
        )))
    }
}

pub fn serialize_snapshot(snapshot: Snapshot) -> protobuf::PeekResp {
    let node_info = snapshot
        .node_info
        .into_iter()
        .map(|(name, info)| protobuf::NodeInfo {
            node_name: name,
            ip_address: serialize_ip(info.ip_address),
            last_val_sent: info.last_val_sent,
            last_ack_from_node: info.last_ack_from_node,
            last_ack_to_node: info.last_ack_to_node,
        })
        .collect();
    protobuf::PeekResp { node_info }
}

pub fn parse_snapshot(resp: protobuf::PeekResp) -> HealthResult<Snapshot> {
    let mut snapshot = Snapshot::default();
    for proto in resp.node_info {
        let info = NodeInfo {
            ip_address: parse_ip(&proto.ip_address)?,
            last_val_sent: proto.last_val_sent,
            last_ack_from_node: proto.last_ack_from_node,
            last_ack_to_node: proto.last_ack_to_node,
        };
        snapshot.node_info.insert(proto.node_name, info);
    }
    Ok(snapshot)
}
