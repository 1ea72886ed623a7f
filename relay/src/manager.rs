use crate::connection::Handshake;
use crate::error::Error;
use crate::lifecycle::{ConnectionContext, ConnectionLifecycle};
use crate::message::{ChatEvent, EventType};
use crate::registry::Registry;
use crate::router::Router;
use crate::transport::{ChannelTransport, OutboundSender, Transport};
use log::*;
use std::sync::Arc;

/// Entry point used by the WebSocket layer: admission, routing and release of connections.
pub struct Manager {
    registry: Arc<Registry>,
    transport: Arc<ChannelTransport>,
    lifecycle: ConnectionLifecycle,
    router: Router,
}

impl Manager {
    pub fn new() -> Self {
        let registry = Arc::new(Registry::new());
        let transport = Arc::new(ChannelTransport::new());

        Self {
            lifecycle: ConnectionLifecycle::new(registry.clone(), transport.clone()),
            router: Router::new(registry.clone(), transport.clone()),
            registry,
            transport,
        }
    }

    /// Admit a connection and attach its outbound queue.
    ///
    /// The returned context keeps the connection registered until it is
    /// disconnected or dropped.
    pub fn connect(
        &self,
        handshake: Handshake,
        sender: OutboundSender,
    ) -> Result<ConnectionContext, Error> {
        let connection_id = handshake.connection_id.clone();

        // A rejected handshake never touches the transport
        if let Err(e) = handshake.identity() {
            warn!("Refusing connection {connection_id}: no user identity");
            return Err(e);
        }

        // Attach first so events routed right after admission are not lost
        self.transport.attach(connection_id.clone(), sender);

        match self.lifecycle.admit(handshake) {
            Ok(context) => {
                info!(
                    "Registered connection {} for user {} ({} user(s) online)",
                    context.connection_id(),
                    context.user_id(),
                    self.registry.user_count()
                );
                Ok(context)
            }
            Err(e) => {
                if self.registry.identity_of(&connection_id).is_none() {
                    self.transport.detach(&connection_id);
                }
                Err(e)
            }
        }
    }

    /// Route an event received on `context`'s connection.
    pub fn dispatch(&self, context: &ConnectionContext, event: &ChatEvent) -> usize {
        debug!(
            "Received {} from user {} on connection {}",
            event.event_type(),
            context.user_id(),
            context.connection_id()
        );
        self.router.route(event)
    }

    /// Release a connection. Safe to call more than once.
    pub fn disconnect(&self, context: &ConnectionContext) {
        if context.disconnect() {
            info!(
                "Unregistered connection {} for user {}",
                context.connection_id(),
                context.user_id()
            );
        }
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }
}

impl Default for Manager {
    fn default() -> Self {
        Self::new()
    }
}
