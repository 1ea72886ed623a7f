use crate::connection::ConnectionId;
use crate::message::{ChatEvent, Event, EventType};
use crate::registry::Registry;
use crate::transport::Transport;
use log::*;
use std::collections::HashSet;
use std::sync::Arc;

/// Turns inbound chat events into outbound deliveries.
///
/// Target sets are snapshots taken from the registry; emission happens after
/// the registry lock is released. Delivery is best-effort: a recipient with no
/// live connections simply receives nothing.
#[derive(Clone)]
pub struct Router {
    registry: Arc<Registry>,
    transport: Arc<dyn Transport>,
}

impl Router {
    pub fn new(registry: Arc<Registry>, transport: Arc<dyn Transport>) -> Self {
        Self {
            registry,
            transport,
        }
    }

    /// Route one event and return how many connections it was emitted to.
    pub fn route(&self, event: &ChatEvent) -> usize {
        let (targets, outbound) = match event {
            ChatEvent::Message { payload, recipient } => (
                self.registry.connections_for(recipient),
                Event::ReceiveMessage {
                    message: payload.clone(),
                },
            ),
            ChatEvent::TypingStart {
                session_id,
                sender,
                recipient,
            } => (
                self.participants(sender, recipient),
                Event::UserTyping {
                    sender_id: sender.clone(),
                    chat_session_id: session_id.clone(),
                },
            ),
            ChatEvent::TypingStop {
                session_id,
                sender,
                recipient,
            } => (
                self.participants(sender, recipient),
                Event::UserStoppedTyping {
                    sender_id: sender.clone(),
                    chat_session_id: session_id.clone(),
                },
            ),
            ChatEvent::PairingNotice {
                waiting,
                session_id,
            } => (
                self.registry.connections_for(waiting),
                Event::StrangerConnected {
                    chat_session_id: session_id.clone(),
                },
            ),
        };

        if targets.is_empty() {
            debug!(
                "No live connections for {} event, dropping it",
                event.event_type()
            );
            return 0;
        }

        self.transport.emit(&targets, &outbound);
        debug!(
            "Emitted {} to {} connection(s)",
            outbound.event_type(),
            targets.len()
        );
        targets.len()
    }

    /// Recipient's connections plus the sender's own, so every tab of both users
    /// sees the typing indicator. The set union drops duplicates.
    fn participants(&self, sender: &str, recipient: &str) -> HashSet<ConnectionId> {
        let mut targets = self.registry.connections_for(recipient);
        if sender != recipient {
            targets.extend(self.registry.connections_for(sender));
        }
        targets
    }
}
