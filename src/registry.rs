use std::collections::HashSet;
use std::net::SocketAddr;
use std::sync::Mutex;

use crate::error::{Error, Result};

/// Mutable peer set plus the currently believed Leader address, guarded by
/// one mutex — a snapshot of the peers is never taken out of sync with the
/// leader address it was read alongside. The local endpoint is never a
/// member of the peer set.
pub struct Registry {
    local: SocketAddr,
    inner: Mutex<Inner>,
}

struct Inner {
    peers: HashSet<SocketAddr>,
    leader: Option<SocketAddr>,
}

impl Registry {
    pub fn new(local: SocketAddr, initial_cluster: impl IntoIterator<Item = SocketAddr>) -> Self {
        let mut peers: HashSet<SocketAddr> = initial_cluster.into_iter().collect();
        peers.remove(&local);
        Self {
            local,
            inner: Mutex::new(Inner { peers, leader: None }),
        }
    }

    pub fn local(&self) -> SocketAddr {
        self.local
    }

    /// A snapshot of the current peer set, safe to iterate without holding
    /// the lock across a send.
    pub fn peers(&self) -> Vec<SocketAddr> {
        self.inner.lock().expect("registry lock poisoned").peers.iter().copied().collect()
    }

    pub fn peer_count(&self) -> usize {
        self.inner.lock().expect("registry lock poisoned").peers.len()
    }

    pub fn contains(&self, addr: &SocketAddr) -> bool {
        self.inner.lock().expect("registry lock poisoned").peers.contains(addr)
    }

    pub fn leader(&self) -> Option<SocketAddr> {
        self.inner.lock().expect("registry lock poisoned").leader
    }

    pub fn set_leader(&self, leader: Option<SocketAddr>) {
        self.inner.lock().expect("registry lock poisoned").leader = leader;
    }

    pub fn add(&self, addr: SocketAddr) -> Result<()> {
        if addr == self.local {
            return Ok(());
        }
        let mut inner = self.inner.lock().expect("registry lock poisoned");
        if !inner.peers.insert(addr) {
            return Err(Error::AlreadyExists(addr.to_string()));
        }
        Ok(())
    }

    pub fn remove(&self, addr: &SocketAddr) -> Result<()> {
        let mut inner = self.inner.lock().expect("registry lock poisoned");
        if !inner.peers.remove(addr) {
            return Err(Error::NotFound(addr.to_string()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn addr(port: u16) -> SocketAddr {
        format!("127.0.0.1:{}", port).parse().unwrap()
    }

    #[test]
    fn local_is_never_a_peer() {
        let reg = Registry::new(addr(1), vec![addr(1), addr(2)]);
        assert_eq!(reg.peers(), vec![addr(2)]);
    }

    #[test]
    fn add_then_del_returns_to_prior_state() {
        let reg = Registry::new(addr(1), vec![]);
        reg.add(addr(2)).unwrap();
        assert!(reg.contains(&addr(2)));
        reg.remove(&addr(2)).unwrap();
        assert!(!reg.contains(&addr(2)));
    }

    #[test]
    fn double_add_fails() {
        let reg = Registry::new(addr(1), vec![]);
        reg.add(addr(2)).unwrap();
        assert!(matches!(reg.add(addr(2)), Err(Error::AlreadyExists(_))));
    }

    #[test]
    fn del_absent_fails() {
        let reg = Registry::new(addr(1), vec![]);
        assert!(matches!(reg.remove(&addr(2)), Err(Error::NotFound(_))));
    }
}
