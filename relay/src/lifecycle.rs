use crate::connection::{ConnectionId, Handshake, UserId};
use crate::error::Error;
use crate::registry::Registry;
use crate::transport::Transport;
use log::*;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Admits connections into the registry and hands back the context that releases them.
#[derive(Clone)]
pub struct ConnectionLifecycle {
    registry: Arc<Registry>,
    transport: Arc<dyn Transport>,
}

impl ConnectionLifecycle {
    pub fn new(registry: Arc<Registry>, transport: Arc<dyn Transport>) -> Self {
        Self {
            registry,
            transport,
        }
    }

    /// Validate the claimed identity and register the connection under it.
    ///
    /// A missing or empty identity is rejected before the registry is touched.
    pub fn admit(&self, handshake: Handshake) -> Result<ConnectionContext, Error> {
        let user_id = match handshake.identity() {
            Ok(identity) => identity.to_owned(),
            Err(e) => {
                warn!(
                    "Rejecting connection {}: handshake carried no user identity",
                    handshake.connection_id
                );
                return Err(e);
            }
        };

        self.registry.add(&user_id, &handshake.connection_id);
        debug!(
            "Connection {} admitted for user {}",
            handshake.connection_id, user_id
        );

        Ok(ConnectionContext {
            user_id,
            connection_id: handshake.connection_id,
            registry: Arc::clone(&self.registry),
            transport: Arc::clone(&self.transport),
            released: AtomicBool::new(false),
        })
    }
}

/// Everything the relay knows about one admitted connection.
///
/// The connection stays registered for as long as this context is alive.
/// Dropping it (or calling [`ConnectionContext::disconnect`]) unregisters it
/// exactly once, whatever ended the connection.
pub struct ConnectionContext {
    user_id: UserId,
    connection_id: ConnectionId,
    registry: Arc<Registry>,
    transport: Arc<dyn Transport>,
    released: AtomicBool,
}

impl ConnectionContext {
    pub fn user_id(&self) -> &str {
        &self.user_id
    }

    pub fn connection_id(&self) -> &ConnectionId {
        &self.connection_id
    }

    /// Release the connection. Returns `false` if it had already been released.
    pub fn disconnect(&self) -> bool {
        if self.released.swap(true, Ordering::AcqRel) {
            return false;
        }

        // A reused id may already belong to a newer connection
        if self.registry.remove(&self.user_id, &self.connection_id) {
            self.transport.detach(&self.connection_id);
        }
        debug!(
            "Connection {} released for user {}",
            self.connection_id, self.user_id
        );
        true
    }
}

impl Drop for ConnectionContext {
    fn drop(&mut self) {
        self.disconnect();
    }
}

impl std::fmt::Debug for ConnectionContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConnectionContext")
            .field("user_id", &self.user_id)
            .field("connection_id", &self.connection_id)
            .field("released", &self.released.load(Ordering::Acquire))
            .finish()
    }
}
