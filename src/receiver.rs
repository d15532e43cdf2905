use std::sync::Arc;

use log::{debug, warn};

use crate::error::Error;
use crate::inbox::InboxSenders;
use crate::message::Message;
use crate::node::Shared;
use crate::transport::Transport;

/// Reads datagrams in a loop, decodes them, attaches the sender, and routes
/// them to the matching inbox. Exits as soon as the stop signal fires,
/// rather than waiting on a read error — UDP sockets have no shutdown
/// primitive to force a blocked `recv_from` to return, so the stop watch
/// channel already used by the role loops covers the Receiver too.
pub async fn run(shared: Arc<Shared>, transport: Arc<Transport>, senders: InboxSenders) {
    let mut buf = Transport::read_buffer();
    loop {
        tokio::select! {
            result = transport.recv(&mut buf) => match result {
                Ok((n, sender)) => {
                    if shared.accept_unknown_senders || sender == shared.registry.local() || shared.registry.contains(&sender) {
                        match Message::decode(&buf[..n]) {
                            Ok(msg) => senders.route(msg.with_sender(sender)),
                            Err(Error::MalformedPacket(reason)) => {
                                warn!("dropping malformed packet from {}: {}", sender, reason);
                            }
                            Err(err) => warn!("decode error from {}: {}", sender, err),
                        }
                    } else {
                        debug!("dropping datagram from unregistered sender {}", sender);
                    }
                }
                Err(err) => warn!("udp read failed: {}", err),
            },

            _ = shared.wait_for_stop() => {
                debug!("receiver exiting");
                return;
            }
        }
    }
}
