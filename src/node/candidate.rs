use std::sync::Arc;

use log::{debug, info};
use rand::Rng;

use crate::inbox::InboxReceivers;
use crate::ledger::Role;
use crate::message::Message;
use crate::node::{NextRole, Shared};

/// Candidate policy. On entry: become Candidate, bump Term, sleep a random
/// jitter to desynchronize concurrent candidates, then loop on the
/// election timer and the six inboxes.
pub async fn run(shared: &Arc<Shared>, inboxes: &mut InboxReceivers) -> NextRole {
    shared.set_role(Role::Candidate);
    let mut term = shared.ledger.term() + 1;
    shared.set_term(term);
    info!("starting election for term {}", term);

    let jitter_ms = rand::thread_rng().gen_range(
        shared.timing.jitter_min.as_millis() as u64..=shared.timing.jitter_max.as_millis() as u64,
    );
    tokio::select! {
        _ = tokio::time::sleep(std::time::Duration::from_millis(jitter_ms)) => {}
        _ = shared.wait_for_stop() => return NextRole::Shutdown,
    }

    let mut want: usize = 0;

    loop {
        tokio::select! {
            _ = tokio::time::sleep(shared.timing.election_timeout) => {
                if shared.ledger.voted(term) {
                    // Yield to whoever we already voted for this term.
                    term += 1;
                    shared.set_term(term);
                    continue;
                }
                debug!("soliciting votes for term {}", term);
                shared.broadcast(Message::vote_me(term)).await;
                want = 0;
                // Self-vote: inject a synthetic vote into our own inbox
                // rather than special-casing the count, so the `vote`
                // handling arm below is the single place that counts votes.
                let local = shared.local();
                let _ = shared.senders.vote.try_send(Message::vote(term).with_sender(local));
                if shared.registry.peer_count() == 0 {
                    info!("solo mode, becoming leader for term {}", term);
                    return NextRole::Leader;
                }
            }

            _ = inboxes.ping.recv() => {
                // A candidate has no Leader role to assert; ignore.
            }

            Some(msg) = inboxes.pong.recv() => {
                // A live Leader exists.
                let leader = msg.leader.or(msg.sender);
                if let Some(leader) = leader {
                    shared.set_term(msg.term);
                    shared.registry.set_leader(Some(leader));
                    info!("discovered live leader {} at term {}, following", leader, msg.term);
                    return NextRole::Follower;
                }
            }

            Some(msg) = inboxes.vote.recv() => {
                if msg.term == term {
                    want += 1;
                    debug!("have {} votes for term {} (need {})", want, term, shared.quorum());
                    if want >= shared.quorum() {
                        info!("won election for term {}, becoming leader", term);
                        shared.broadcast(Message::notify_leader(term, shared.local())).await;
                        return NextRole::Leader;
                    }
                }
            }

            Some(msg) = inboxes.vote_me.recv() => {
                if msg.term < term {
                    // Stale term: drop.
                } else {
                    if msg.term > term {
                        term = msg.term;
                        shared.set_term(term);
                    }
                    if !shared.ledger.voted(term) {
                        if let Some(sender) = msg.sender {
                            shared.send(sender, Message::vote(term)).await;
                            shared.ledger.voting(term);
                        }
                    }
                    // Already voted this term: drop silently rather than
                    // re-voting for the new asker.
                }
            }

            _ = inboxes.new_term.recv() => {
                // We are already trying to elect; ignore.
            }

            Some(msg) = inboxes.notify_leader.recv() => {
                if let Some(leader) = msg.leader.or(msg.sender) {
                    shared.set_term(msg.term);
                    shared.registry.set_leader(Some(leader));
                    info!("notified of leader {} at term {}, following", leader, msg.term);
                    return NextRole::Follower;
                }
            }

            _ = shared.wait_for_stop() => return NextRole::Shutdown,
        }
    }
}
