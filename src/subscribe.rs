use std::net::SocketAddr;

use tokio::sync::broadcast;

use crate::ledger::Role;

/// State-change events delivered to `Subscribe` callers.
#[derive(Clone, Debug, PartialEq)]
pub enum NodeEvent {
    RoleChanged { role: Role },
    TermChanged { term: u64 },
    MembershipChanged { added: Option<SocketAddr>, removed: Option<SocketAddr> },
}

/// Best-effort fan-out: slow subscribers are dropped rather than allowed to
/// back-pressure the engine.
const SUBSCRIBER_CAPACITY: usize = 64;

pub struct Publisher {
    tx: broadcast::Sender<NodeEvent>,
}

impl Publisher {
    pub fn new() -> Self {
        let (tx, _rx) = broadcast::channel(SUBSCRIBER_CAPACITY);
        Self { tx }
    }

    pub fn publish(&self, event: NodeEvent) {
        // No receivers is the common case (nobody subscribed); ignore it.
        let _ = self.tx.send(event);
    }

    pub fn subscribe(&self) -> Subscription {
        Subscription { rx: self.tx.subscribe() }
    }
}

impl Default for Publisher {
    fn default() -> Self {
        Self::new()
    }
}

/// A handle returned by `Subscribe`. `recv` skips over any events missed
/// due to lag rather than surfacing the gap to the caller: delivery is
/// best-effort only.
pub struct Subscription {
    rx: broadcast::Receiver<NodeEvent>,
}

impl Subscription {
    pub async fn recv(&mut self) -> Option<NodeEvent> {
        loop {
            match self.rx.recv().await {
                Ok(event) => return Some(event),
                Err(broadcast::error::RecvError::Lagged(_)) => continue,
                Err(broadcast::error::RecvError::Closed) => return None,
            }
        }
    }

    /// Releases the subscription.
    pub fn cancel(self) {
        drop(self);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn subscriber_receives_published_events() {
        let publisher = Publisher::new();
        let mut sub = publisher.subscribe();
        publisher.publish(NodeEvent::TermChanged { term: 1 });
        assert_eq!(sub.recv().await, Some(NodeEvent::TermChanged { term: 1 }));
    }

    #[tokio::test]
    async fn cancel_stops_delivery() {
        let publisher = Publisher::new();
        let sub = publisher.subscribe();
        sub.cancel();
        publisher.publish(NodeEvent::TermChanged { term: 1 });
        // No receivers left subscribed beyond this point; publish must not panic.
    }
}
