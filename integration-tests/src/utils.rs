use std::{
    net::{IpAddr, Ipv4Addr},
    sync::Arc,
    time::{Duration, Instant},
};

use peerwatch::{config::HealthConfig, registry::PeerAddr, runtime::HealthRuntime};
use peerwatch_network_tonic::{
    network::HealthTonicNetwork,
    protobuf::health_tonic_service_server::HealthTonicServiceServer,
    server::HealthTonicServer,
};
use tokio::net::TcpListener;
use tokio_stream::wrappers::TcpListenerStream;
use tonic::transport::Server;

/// Starts a node on an ephemeral localhost port: runtime plus tonic server.
/// The prober is not started; callers register peers first and call
/// `runtime.start()` themselves.
pub async fn start_node(name: &str, probe_interval: Duration) -> (HealthRuntime, PeerAddr) {
    let listener = TcpListener::bind("127.0.0.1:0")
        .await
        .expect("failed to bind localhost");
    let port = listener.local_addr().expect("listener has no addr").port();

    let config = HealthConfig::default().with_probe_interval(probe_interval);
    let network = Arc::new(HealthTonicNetwork::new(port));
    let runtime = HealthRuntime::new(name, Arc::new(config), network);

    let service = HealthTonicServer::new(runtime.clone());
    tokio::spawn(async move {
        Server::builder()
            .add_service(HealthTonicServiceServer::new(service))
            .serve_with_incoming(TcpListenerStream::new(listener))
            .await
            .expect("tonic server failed");
    });

    let addr = PeerAddr {
        ip: IpAddr::V4(Ipv4Addr::LOCALHOST),
        port,
    };
    (runtime, addr)
}

/// Reserves a localhost port with no one listening on it.
pub async fn unreachable_addr() -> PeerAddr {
    let listener = TcpListener::bind("127.0.0.1:0")
        .await
        .expect("failed to bind localhost");
    let port = listener.local_addr().expect("listener has no addr").port();
    drop(listener);
    PeerAddr {
        ip: IpAddr::V4(Ipv4Addr::LOCALHOST),
        port,
    }
}

/// Polls `cond` until it holds or `timeout` elapses.
pub async fn wait_until(cond: impl Fn() -> bool, timeout: Duration) -> bool {
    let start = Instant::now();
    while start.elapsed() < timeout {
        if cond() {
            return true;
        }
        tokio::time::sleep(Duration::from_millis(20)).await;
    }
    cond()
}

pub fn static_addr(ip: [u8; 4], port: u16) -> PeerAddr {
    PeerAddr {
        ip: IpAddr::V4(Ipv4Addr::from(ip)),
        port,
    }
}
