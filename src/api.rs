//! Control API: the public surface a host process uses to run a node and
//! observe or steer it. Everything here is a thin, synchronous-feeling
//! facade over [`crate::node::Shared`] — the actual role engine and
//! receiver loop live there and in the `node` submodules.

use std::net::SocketAddr;
use std::sync::Arc;

use crate::config::Config;
use crate::error::Result;
use crate::ledger::Role;
use crate::node::Shared;
use crate::subscribe::Subscription;

/// A single election node. Construct with [`Election::new`], start it with
/// [`Election::run`], and tear it down with [`Election::stop`]. The other
/// methods are cheap reads or registry mutations that work whether or not
/// the node is currently running.
pub struct Election {
    shared: Arc<Shared>,
}

impl Election {
    /// Validates `config` and builds a node in its initial `Shutdown`
    /// state. Nothing is bound or spawned until `run` is called.
    pub fn new(config: Config) -> Result<Self> {
        let validated = config.validate()?;
        Ok(Self { shared: Arc::new(Shared::new(&validated)) })
    }

    /// Binds the listen address and starts the Receiver and role engine.
    /// Fails with `AlreadyRunning` if this node has already been run once —
    /// a stopped node is not restartable.
    pub async fn run(&self) -> Result<()> {
        self.shared.start().await
    }

    /// Idempotent. No-op if the node was never run, or has already been
    /// stopped.
    pub fn stop(&self) {
        self.shared.stop()
    }

    pub fn term(&self) -> u64 {
        self.shared.ledger.term()
    }

    pub fn role(&self) -> Role {
        self.shared.ledger.role()
    }

    pub fn leader(&self) -> Option<SocketAddr> {
        self.shared.registry.leader()
    }

    pub fn local_addr(&self) -> SocketAddr {
        self.shared.local()
    }

    pub fn cluster(&self) -> Vec<SocketAddr> {
        self.shared.registry.peers()
    }

    /// Adds `addr` to the peer registry. Fails with `AlreadyExists` if it
    /// is already a member.
    pub fn add_member(&self, addr: SocketAddr) -> Result<()> {
        self.shared.add_member(addr)
    }

    /// Removes `addr` from the peer registry. Fails with `NotFound` if it
    /// is not currently a member.
    pub fn del_member(&self, addr: SocketAddr) -> Result<()> {
        self.shared.del_member(addr)
    }

    /// Subscribes to role, term, and membership change events. Delivery is
    /// best-effort: a subscriber that falls behind skips the events it
    /// missed rather than blocking the engine.
    pub fn subscribe(&self) -> Subscription {
        self.shared.subscribe()
    }
}
