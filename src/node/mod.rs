mod candidate;
mod follower;
mod leader;

use std::net::SocketAddr;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use log::debug;
use tokio::sync::{watch, OnceCell};

use crate::config::ValidConfig;
use crate::error::{Error, Result};
use crate::inbox::{channels, InboxReceivers, InboxSenders};
use crate::ledger::{Ledger, Role};
use crate::message::Message;
use crate::receiver;
use crate::registry::Registry;
use crate::subscribe::{NodeEvent, Publisher, Subscription};
use crate::timing::Timing;
use crate::transport::Transport;

/// State shared across the Receiver, every role loop, and Control API
/// callers. Term/Role are atomics inside `ledger`, the vote set is
/// `ledger`'s own RwLock, and peers + LeaderAddress share `registry`'s
/// single mutex.
///
/// Constructed once, before `Run`; the socket and the two background tasks
/// are filled in by `start()` and never replaced — once stopped, a node is
/// not restartable.
pub struct Shared {
    pub ledger: Ledger,
    pub registry: Registry,
    pub publisher: Publisher,
    pub senders: InboxSenders,
    receivers: Mutex<Option<InboxReceivers>>,
    pub timing: Timing,
    pub accept_unknown_senders: bool,
    transport: OnceCell<Arc<Transport>>,
    listen_addr: SocketAddr,
    stop_tx: watch::Sender<bool>,
    pub stop_rx: watch::Receiver<bool>,
    started: AtomicBool,
}

impl Shared {
    pub fn new(config: &ValidConfig) -> Self {
        let ledger = Ledger::new();
        let registry = Registry::new(config.listen_addr, config.cluster.iter().copied());
        let (senders, receivers) = channels();
        let (stop_tx, stop_rx) = watch::channel(false);
        Self {
            ledger,
            registry,
            publisher: Publisher::new(),
            senders,
            receivers: Mutex::new(Some(receivers)),
            timing: config.timing,
            accept_unknown_senders: config.accept_unknown_senders,
            transport: OnceCell::new(),
            listen_addr: config.listen_addr,
            stop_tx,
            stop_rx,
            started: AtomicBool::new(false),
        }
    }

    /// Binds the socket and starts the Receiver and the initial Candidate
    /// loop. Re-entrant calls, including after `Stop`, fail with
    /// `AlreadyRunning` — the node is not restartable.
    pub async fn start(self: &Arc<Self>) -> Result<()> {
        if self.started.swap(true, Ordering::SeqCst) {
            return Err(Error::AlreadyRunning);
        }
        let transport = Transport::bind(self.listen_addr).await?;
        self.transport
            .set(Arc::new(transport))
            .map_err(|_| Error::Internal("transport already bound".into()))?;

        let receivers = self
            .receivers
            .lock()
            .expect("receivers lock poisoned")
            .take()
            .expect("receivers taken exactly once");

        self.set_role(Role::Candidate);

        tokio::spawn(receiver::run(self.clone(), self.transport().clone(), self.senders.clone()));
        tokio::spawn(drive(self.clone(), receivers));
        Ok(())
    }

    /// Idempotent: signals every loop's stop channel, resets the ledger,
    /// and stops the Receiver.
    pub fn stop(&self) {
        if self.ledger.role() == Role::Shutdown {
            return;
        }
        let _ = self.stop_tx.send(true);
        self.ledger.reset();
        self.registry.set_leader(None);
        self.publisher.publish(NodeEvent::RoleChanged { role: Role::Shutdown });
        self.publisher.publish(NodeEvent::TermChanged { term: 0 });
    }

    fn transport(&self) -> &Arc<Transport> {
        self.transport.get().expect("transport is only used after start()")
    }

    /// Quorum size, counting self: `total = peers + 1`,
    /// `quorum = total / 2 + 1`.
    pub fn quorum(&self) -> usize {
        (self.registry.peer_count() + 1) / 2 + 1
    }

    pub fn total(&self) -> usize {
        self.registry.peer_count() + 1
    }

    /// The address peers should use to reach this node. Once bound, this
    /// is the socket's actual local address rather than the configured
    /// `listen_addr` — the two differ whenever `listen_addr` asks for an
    /// OS-assigned ephemeral port (`:0`).
    pub fn local(&self) -> SocketAddr {
        self.transport.get().map(|t| t.local_addr()).unwrap_or_else(|| self.registry.local())
    }

    pub async fn send(&self, to: SocketAddr, msg: Message) {
        if let Err(err) = self.transport().send(to, &msg).await {
            log::warn!("send to {} failed: {}", to, err);
        }
    }

    pub async fn broadcast(&self, msg: Message) {
        let peers = self.registry.peers();
        self.transport().broadcast(&peers, &msg).await;
    }

    pub fn set_role(&self, role: Role) {
        self.ledger.set_role(role);
        self.publisher.publish(NodeEvent::RoleChanged { role });
    }

    pub fn set_term(&self, term: u64) {
        self.ledger.set_term(term);
        self.publisher.publish(NodeEvent::TermChanged { term });
    }

    pub fn add_member(&self, addr: SocketAddr) -> Result<()> {
        self.registry.add(addr)?;
        self.publisher.publish(NodeEvent::MembershipChanged { added: Some(addr), removed: None });
        Ok(())
    }

    pub fn del_member(&self, addr: SocketAddr) -> Result<()> {
        self.registry.remove(&addr)?;
        self.publisher.publish(NodeEvent::MembershipChanged { added: None, removed: Some(addr) });
        Ok(())
    }

    pub fn subscribe(&self) -> Subscription {
        self.publisher.subscribe()
    }

    /// Returns immediately if `Stop` has already been called; otherwise
    /// resolves the next time it is.
    pub async fn wait_for_stop(&self) {
        let mut rx = self.stop_rx.clone();
        if *rx.borrow() {
            return;
        }
        while rx.changed().await.is_ok() {
            if *rx.borrow() {
                return;
            }
        }
    }
}

/// The role a loop hands control to when it returns. Transitions are
/// implemented as returning from one loop and entering the next, rather
/// than mutating role state out from under a running loop.
pub enum NextRole {
    Candidate,
    Follower,
    Leader,
    Shutdown,
}

/// Drives the role engine: exactly one of Candidate/Follower/Leader is live
/// at any instant, starting as Candidate.
async fn drive(shared: Arc<Shared>, mut inboxes: InboxReceivers) {
    let mut next = NextRole::Candidate;
    loop {
        next = match next {
            NextRole::Candidate => candidate::run(&shared, &mut inboxes).await,
            NextRole::Follower => follower::run(&shared, &mut inboxes).await,
            NextRole::Leader => leader::run(&shared, &mut inboxes).await,
            NextRole::Shutdown => {
                debug!("role engine stopped");
                return;
            }
        };
    }
}
