use std::{
    collections::HashMap,
    fmt::Display,
    net::IpAddr,
};

use parking_lot::RwLock;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PeerAddr {
    pub ip: IpAddr,
    pub port: u16,
}

impl Display for PeerAddr {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.ip, self.port)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Peer {
    pub name: String,
    pub addr: PeerAddr,
}

/// The set of known peer nodes and their network addresses. Registration and
/// deregistration are the only mutation points.
#[derive(Debug, Default)]
pub struct PeerRegistry {
    peers: RwLock<HashMap<String, PeerAddr>>,
}

impl PeerRegistry {
    pub fn new() -> Self {
        Self {
            peers: RwLock::new(HashMap::new()),
        }
    }

    /// Adds a peer, replacing any previous registration under the same name.
    pub fn register(&self, name: impl Into<String>, addr: PeerAddr) {
        self.peers.write().insert(name.into(), addr);
    }

    /// Removes a peer. Deregistering an unknown name is a no-op.
    pub fn deregister(&self, name: &str) {
        self.peers.write().remove(name);
    }

    pub fn contains(&self, name: &str) -> bool {
        self.peers.read().contains_key(name)
    }

    pub fn get(&self, name: &str) -> Option<PeerAddr> {
        self.peers.read().get(name).copied()
    }

    pub fn list(&self) -> Vec<Peer> {
        self.peers
            .read()
            .iter()
            .map(|(name, addr)| Peer {
                name: name.clone(),
                addr: *addr,
            })
            .collect()
    }

    pub fn len(&self) -> usize {
        self.peers.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.peers.read().is_empty()
    }
}
