use std::net::SocketAddr;

use log::{debug, warn};
use tokio::net::UdpSocket;

use crate::error::{Error, Result};
use crate::message::Message;

/// JSON payloads run larger than a binary encoding would, so the read
/// buffer is generous relative to the handful of fields each message
/// carries.
const READ_BUFFER_SIZE: usize = 512;

/// Owns the bound datagram socket. Reads happen only from the Receiver;
/// writes may happen from any task — the underlying UDP send is reentrant.
pub struct Transport {
    socket: UdpSocket,
    local: SocketAddr,
}

impl Transport {
    pub async fn bind(addr: SocketAddr) -> Result<Self> {
        let socket = UdpSocket::bind(addr)
            .await
            .map_err(|e| Error::BindFailed(e.to_string()))?;
        let local = socket.local_addr().map_err(|e| Error::BindFailed(e.to_string()))?;
        Ok(Self { socket, local })
    }

    pub fn local_addr(&self) -> SocketAddr {
        self.local
    }

    pub async fn recv(&self, buf: &mut [u8]) -> std::io::Result<(usize, SocketAddr)> {
        self.socket.recv_from(buf).await
    }

    /// Sends a single message. A failure is logged and swallowed by the
    /// caller's role loop rather than propagated — the next timer tick
    /// retries whatever the send was for; this just reports the raw
    /// `Result` upward.
    pub async fn send(&self, to: SocketAddr, msg: &Message) -> Result<()> {
        let buf = msg.encode();
        self.socket
            .send_to(&buf, to)
            .await
            .map(|_| ())
            .map_err(|e| Error::SendFailed(e.to_string()))
    }

    /// Broadcasts to every address in `peers`. Each send is fire-and-forget;
    /// a failed send is logged and does not abort the rest of the
    /// broadcast.
    pub async fn broadcast(&self, peers: &[SocketAddr], msg: &Message) {
        for &peer in peers {
            if let Err(err) = self.send(peer, msg).await {
                warn!("broadcast send to {} failed: {}", peer, err);
            } else {
                debug!("sent {:?} to {}", msg.kind, peer);
            }
        }
    }

    pub fn read_buffer() -> [u8; READ_BUFFER_SIZE] {
        [0u8; READ_BUFFER_SIZE]
    }
}
