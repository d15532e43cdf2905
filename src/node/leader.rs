use std::collections::HashSet;
use std::net::SocketAddr;
use std::sync::Arc;

use log::{info, warn};

use crate::inbox::InboxReceivers;
use crate::ledger::Role;
use crate::message::Message;
use crate::node::{NextRole, Shared};

/// Leader policy. Runs an isolation check on a fixed interval: if fewer
/// than a quorum of peers have been heard from via `ping` during the
/// interval, the Leader voluntarily steps down.
pub async fn run(shared: &Arc<Shared>, inboxes: &mut InboxReceivers) -> NextRole {
    shared.set_role(Role::Leader);
    let term = shared.ledger.term();
    let local = shared.local();
    // Invariant: Role=Leader implies LeaderAddress=self.
    shared.registry.set_leader(Some(local));
    info!("became leader for term {}", term);

    let mut heard: HashSet<SocketAddr> = HashSet::new();

    loop {
        tokio::select! {
            _ = tokio::time::sleep(shared.timing.isolation_interval) => {
                let quorum = shared.quorum();
                if heard.len() + 1 < quorum {
                    warn!(
                        "isolated: heard from {} of {} peers (need {}), stepping down",
                        heard.len(), shared.registry.peer_count(), quorum
                    );
                    shared.registry.set_leader(None);
                    return NextRole::Candidate;
                }
                heard.clear();
            }

            Some(msg) = inboxes.ping.recv() => {
                if msg.term == term {
                    if let Some(sender) = msg.sender {
                        heard.insert(sender);
                        shared.send(sender, Message::pong(term, local)).await;
                    }
                }
            }

            Some(msg) = inboxes.vote_me.recv() => {
                // Teach newcomers who the Leader is, without bumping Term.
                if let Some(sender) = msg.sender {
                    shared.send(sender, Message::pong(term, local)).await;
                }
            }

            Some(msg) = inboxes.notify_leader.recv() => {
                if msg.term >= term {
                    if let Some(leader) = msg.leader.or(msg.sender) {
                        info!("higher authority proclaimed leader {} at term {}, stepping down", leader, msg.term);
                        shared.set_term(msg.term);
                        shared.registry.set_leader(Some(leader));
                        return NextRole::Follower;
                    }
                }
            }

            _ = inboxes.pong.recv() => {}
            _ = inboxes.vote.recv() => {}
            _ = inboxes.new_term.recv() => {}

            _ = shared.wait_for_stop() => return NextRole::Shutdown,
        }
    }
}
