use tokio::sync::mpsc;

use crate::message::{Kind, Message};

/// Each inbox has capacity 1: coalescing is acceptable because role loops
/// treat repeat stimuli idempotently. A full inbox means the previous
/// message of that kind hasn't been consumed yet; the new one is dropped
/// rather than blocking the Receiver.
const INBOX_CAPACITY: usize = 1;

#[derive(Clone)]
pub struct InboxSenders {
    pub ping: mpsc::Sender<Message>,
    pub pong: mpsc::Sender<Message>,
    pub vote: mpsc::Sender<Message>,
    pub vote_me: mpsc::Sender<Message>,
    pub new_term: mpsc::Sender<Message>,
    pub notify_leader: mpsc::Sender<Message>,
}

pub struct InboxReceivers {
    pub ping: mpsc::Receiver<Message>,
    pub pong: mpsc::Receiver<Message>,
    pub vote: mpsc::Receiver<Message>,
    pub vote_me: mpsc::Receiver<Message>,
    pub new_term: mpsc::Receiver<Message>,
    pub notify_leader: mpsc::Receiver<Message>,
}

pub fn channels() -> (InboxSenders, InboxReceivers) {
    let (ping_tx, ping_rx) = mpsc::channel(INBOX_CAPACITY);
    let (pong_tx, pong_rx) = mpsc::channel(INBOX_CAPACITY);
    let (vote_tx, vote_rx) = mpsc::channel(INBOX_CAPACITY);
    let (vote_me_tx, vote_me_rx) = mpsc::channel(INBOX_CAPACITY);
    let (new_term_tx, new_term_rx) = mpsc::channel(INBOX_CAPACITY);
    let (notify_leader_tx, notify_leader_rx) = mpsc::channel(INBOX_CAPACITY);
    (
        InboxSenders {
            ping: ping_tx,
            pong: pong_tx,
            vote: vote_tx,
            vote_me: vote_me_tx,
            new_term: new_term_tx,
            notify_leader: notify_leader_tx,
        },
        InboxReceivers {
            ping: ping_rx,
            pong: pong_rx,
            vote: vote_rx,
            vote_me: vote_me_rx,
            new_term: new_term_rx,
            notify_leader: notify_leader_rx,
        },
    )
}

impl InboxSenders {
    /// Routes a decoded message to its kind's inbox. Drops it silently
    /// (beyond a debug log) if the inbox is already full.
    pub fn route(&self, msg: Message) {
        let kind = msg.kind;
        let result = match kind {
            Kind::Ping => self.ping.try_send(msg),
            Kind::Pong => self.pong.try_send(msg),
            Kind::Vote => self.vote.try_send(msg),
            Kind::VoteMe => self.vote_me.try_send(msg),
            Kind::NewTerm => self.new_term.try_send(msg),
            Kind::NotifyLeader => self.notify_leader.try_send(msg),
        };
        if let Err(err) = result {
            log::debug!("dropping {:?}: inbox full or closed ({})", kind, err);
        }
    }
}
