use std::net::SocketAddr;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Wire kind byte.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Kind {
    Ping = 0,
    Pong = 1,
    NewTerm = 2,
    Vote = 3,
    VoteMe = 4,
    NotifyLeader = 5,
}

impl Kind {
    fn from_byte(b: u8) -> Option<Self> {
        match b {
            0 => Some(Kind::Ping),
            1 => Some(Kind::Pong),
            2 => Some(Kind::NewTerm),
            3 => Some(Kind::Vote),
            4 => Some(Kind::VoteMe),
            5 => Some(Kind::NotifyLeader),
            _ => None,
        }
    }
}

/// A message exchanged between election peers.
///
/// `term` is carried by every kind. `leader` is only meaningful for `Pong`
/// and `NotifyLeader`. `sender` is never serialized — it is attached after
/// decode from the transport's reported source address.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Payload {
    pub term: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub leader: Option<String>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Message {
    pub kind: Kind,
    pub term: u64,
    pub leader: Option<SocketAddr>,
    pub sender: Option<SocketAddr>,
}

impl Message {
    pub fn ping(term: u64) -> Self {
        Self { kind: Kind::Ping, term, leader: None, sender: None }
    }

    pub fn pong(term: u64, leader: SocketAddr) -> Self {
        Self { kind: Kind::Pong, term, leader: Some(leader), sender: None }
    }

    pub fn new_term(term: u64) -> Self {
        Self { kind: Kind::NewTerm, term, leader: None, sender: None }
    }

    pub fn vote(term: u64) -> Self {
        Self { kind: Kind::Vote, term, leader: None, sender: None }
    }

    pub fn vote_me(term: u64) -> Self {
        Self { kind: Kind::VoteMe, term, leader: None, sender: None }
    }

    pub fn notify_leader(term: u64, leader: SocketAddr) -> Self {
        Self { kind: Kind::NotifyLeader, term, leader: Some(leader), sender: None }
    }

    /// Encodes `[kind_byte][json payload]`. Never fails for a well-formed
    /// in-memory message.
    pub fn encode(&self) -> Vec<u8> {
        let payload = Payload {
            term: self.term,
            leader: self.leader.map(|a| a.to_string()),
        };
        let body = serde_json::to_vec(&payload).expect("Payload always serializes");
        let mut out = Vec::with_capacity(body.len() + 1);
        out.push(self.kind as u8);
        out.extend_from_slice(&body);
        out
    }

    /// Decodes a datagram. `sender` is left unset; callers attach it from
    /// the transport's source-address report.
    pub fn decode(buf: &[u8]) -> Result<Self> {
        let (kind_byte, rest) = buf
            .split_first()
            .ok_or_else(|| Error::MalformedPacket("empty packet".into()))?;
        let kind = Kind::from_byte(*kind_byte)
            .ok_or_else(|| Error::MalformedPacket(format!("unknown kind byte {}", kind_byte)))?;
        let payload: Payload = serde_json::from_slice(rest)?;
        let leader = match payload.leader {
            Some(s) => Some(
                s.parse::<SocketAddr>()
                    .map_err(|e| Error::MalformedPacket(e.to_string()))?,
            ),
            None => None,
        };
        Ok(Self { kind, term: payload.term, leader, sender: None })
    }

    pub fn with_sender(mut self, sender: SocketAddr) -> Self {
        self.sender = Some(sender);
        self
    }
}
