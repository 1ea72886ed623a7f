use crate::connection::ConnectionId;
use crate::message::{Event, EventType};
use axum::extract::ws::Message;
use dashmap::DashMap;
use log::*;
use std::collections::HashSet;
use tokio::sync::mpsc::UnboundedSender;

/// Sender half of a connection's outbound queue. The WebSocket writer task owns the receiver.
pub type OutboundSender = UnboundedSender<Message>;

/// The relay's only way of talking to clients.
///
/// Emission is fire-and-forget. Implementations must treat unknown or closed
/// connections as no-ops rather than errors.
pub trait Transport: Send + Sync {
    fn emit(&self, targets: &HashSet<ConnectionId>, event: &Event);

    /// Called once when a connection is released.
    fn detach(&self, _connection_id: &ConnectionId) {}
}

/// Transport backed by one unbounded channel per WebSocket connection.
#[derive(Default)]
pub struct ChannelTransport {
    senders: DashMap<ConnectionId, OutboundSender>,
}

impl ChannelTransport {
    pub fn new() -> Self {
        Self {
            senders: DashMap::new(),
        }
    }

    pub fn attach(&self, connection_id: ConnectionId, sender: OutboundSender) {
        self.senders.insert(connection_id, sender);
    }

    pub fn is_attached(&self, connection_id: &ConnectionId) -> bool {
        self.senders.contains_key(connection_id)
    }
}

impl Transport for ChannelTransport {
    fn emit(&self, targets: &HashSet<ConnectionId>, event: &Event) {
        if targets.is_empty() {
            return;
        }

        // Serialize once, then hand the same frame to every target
        let frame = match serde_json::to_string(event) {
            Ok(json) => json,
            Err(e) => {
                error!("Failed to serialize {} event: {e}", event.event_type());
                return;
            }
        };

        for connection_id in targets {
            match self.senders.get(connection_id) {
                Some(sender) => {
                    if let Err(e) = sender.send(Message::Text(frame.clone())) {
                        warn!(
                            "Failed to send {} to connection {}: {}. Connection is closing.",
                            event.event_type(),
                            connection_id,
                            e
                        );
                    }
                }
                None => {
                    debug!(
                        "Connection {} already detached, dropping {}",
                        connection_id,
                        event.event_type()
                    );
                }
            }
        }
    }

    fn detach(&self, connection_id: &ConnectionId) {
        self.senders.remove(connection_id);
    }
}
