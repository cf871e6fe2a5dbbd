use std::{env, error::Error, net::SocketAddr, sync::Arc, time::Duration};

use log::info;
use peerwatch::{
    config::HealthConfig,
    network::HealthNetwork,
    registry::PeerAddr,
    runtime::HealthRuntime,
    snapshot::DisplayableSnapshot,
};
use peerwatch_network_tonic::{
    network::HealthTonicNetwork,
    protobuf::health_tonic_service_server::HealthTonicServiceServer,
    server::HealthTonicServer,
};
use tonic::transport::Server;

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    env_logger::init();

    let command = env::args().nth(1).unwrap_or_else(|| "serve".to_string());
    match command.as_str() {
        "serve" => serve().await,
        "peek" => peek(env::args().nth(2)).await,
        other => Err(format!("Unknown command {other}, expected serve or peek").into()),
    }
}

/// Runs a health-checker node. Configured through the environment:
/// NODE_NAME, PORT, PROBE_INTERVAL_MS and PEERS (name=ip:port, comma
/// separated).
async fn serve() -> Result<(), Box<dyn Error>> {
    let node_name = env::var("NODE_NAME").unwrap_or_else(|_| "node".to_string());
    let port: u16 = env::var("PORT")
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or(50060);
    let probe_interval_ms: u64 = env::var("PROBE_INTERVAL_MS")
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or(2000);

    let config = HealthConfig::default()
        .with_probe_interval(Duration::from_millis(probe_interval_ms));
    let network = Arc::new(HealthTonicNetwork::new(port));
    let runtime = HealthRuntime::new(node_name.clone(), Arc::new(config), network);

    for (name, addr) in parse_peers(&env::var("PEERS").unwrap_or_default())? {
        runtime.register_peer(name, addr);
    }

    runtime.start();
    info!(
        "Node {} listening on port {}, probing {} peers every {}ms",
        node_name,
        port,
        runtime.registry.len(),
        probe_interval_ms
    );

    let service = HealthTonicServer::new(runtime.clone());
    Server::builder()
        .add_service(HealthTonicServiceServer::new(service))
        .serve(format!("0.0.0.0:{port}").parse()?)
        .await?;

    runtime.shutdown();
    Ok(())
}

/// Fetches a node's snapshot and prints the liveness table.
async fn peek(target: Option<String>) -> Result<(), Box<dyn Error>> {
    let target = target
        .or_else(|| env::var("TARGET").ok())
        .unwrap_or_else(|| "127.0.0.1:50060".to_string());
    let addr: SocketAddr = target.parse()?;

    let network = HealthTonicNetwork::new(0);
    let snapshot = network
        .peek(PeerAddr {
            ip: addr.ip(),
            port: addr.port(),
        })
        .await?;

    println!();
    println!("{}", DisplayableSnapshot(&snapshot));
    println!();
    Ok(())
}

fn parse_peers(list: &str) -> Result<Vec<(String, PeerAddr)>, Box<dyn Error>> {
    let mut peers = Vec::new();
    for entry in list.split(',').filter(|s| !s.is_empty()) {
        let (name, addr) = entry
            .split_once('=')
            .ok_or_else(|| format!("Invalid peer entry {entry}, expected name=ip:port"))?;
        let addr: SocketAddr = addr.parse()?;
        peers.push((
            name.to_string(),
            PeerAddr {
                ip: addr.ip(),
                port: addr.port(),
            },
        ));
    }
    Ok(peers)
}
