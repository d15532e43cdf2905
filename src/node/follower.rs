use std::sync::Arc;
use std::time::Duration;

use log::{info, warn};

use crate::inbox::InboxReceivers;
use crate::ledger::Role;
use crate::message::Message;
use crate::node::{NextRole, Shared};

/// Sends a ping to the known Leader and waits up to `timeout` for a pong,
/// adopting its Term if it is newer. Returns whether the probe succeeded.
///
/// The ping consumes a message straight off the shared pong inbox; since
/// this is the only call site that reads it, an outstanding probe and any
/// unrelated pong arriving in the meantime can never be confused for each
/// other.
async fn probe_leader(shared: &Arc<Shared>, inboxes: &mut InboxReceivers, timeout: Duration) -> bool {
    let Some(leader) = shared.registry.leader() else {
        return false;
    };
    shared.send(leader, Message::ping(shared.ledger.term())).await;
    match tokio::time::timeout(timeout, inboxes.pong.recv()).await {
        Ok(Some(msg)) => {
            if msg.term >= shared.ledger.term() {
                shared.set_term(msg.term);
            }
            true
        }
        _ => false,
    }
}

/// Follower policy. A periodic tick drives the heartbeat probe; a
/// timed-out probe prompts an election.
pub async fn run(shared: &Arc<Shared>, inboxes: &mut InboxReceivers) -> NextRole {
    shared.set_role(Role::Follower);
    if let Some(leader) = shared.registry.leader() {
        info!("following leader {} at term {}", leader, shared.ledger.term());
    }

    loop {
        tokio::select! {
            _ = tokio::time::sleep(shared.timing.heartbeat_interval) => {
                if probe_leader(shared, inboxes, shared.timing.ping_timeout).await {
                    continue;
                }
                warn!("leader heartbeat timed out, prompting an election");
                shared.broadcast(Message::new_term(shared.ledger.term())).await;
                return NextRole::Candidate;
            }

            // A candidate/leader role answers pings; a follower has no
            // authority to assert and ignores them.
            _ = inboxes.ping.recv() => {}
            _ = inboxes.pong.recv() => {}
            _ = inboxes.vote.recv() => {}
            _ = inboxes.vote_me.recv() => {}

            Some(msg) = inboxes.new_term.recv() => {
                if msg.term > shared.ledger.term() {
                    if probe_leader(shared, inboxes, shared.timing.ping_timeout).await {
                        continue;
                    }
                    return NextRole::Candidate;
                }
            }

            Some(msg) = inboxes.notify_leader.recv() => {
                if msg.term >= shared.ledger.term() {
                    if let Some(leader) = msg.leader.or(msg.sender) {
                        shared.set_term(msg.term);
                        shared.registry.set_leader(Some(leader));
                    }
                }
            }

            _ = shared.wait_for_stop() => return NextRole::Shutdown,
        }
    }
}
