use crate::error::Error;
use std::fmt;

// Identities are opaque strings supplied by the client handshake
pub type UserId = String;

/// Identifier for one physical connection, issued by the transport layer.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ConnectionId(String);

impl ConnectionId {
    pub fn new() -> Self {
        Self(uuid::Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for ConnectionId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ConnectionId {
    fn from(value: &str) -> Self {
        Self(value.to_owned())
    }
}

impl From<String> for ConnectionId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

/// What the transport knows about a connection at admission time.
#[derive(Debug, Clone)]
pub struct Handshake {
    pub connection_id: ConnectionId,
    /// Identity claimed by the client, if it sent one at all.
    pub claimed_identity: Option<String>,
}

impl Handshake {
    pub fn new(connection_id: ConnectionId, claimed_identity: Option<String>) -> Self {
        Self {
            connection_id,
            claimed_identity,
        }
    }

    /// The claimed identity, if it is usable. Missing or empty identities are rejected.
    pub fn identity(&self) -> Result<&str, Error> {
        match self.claimed_identity.as_deref() {
            Some(identity) if !identity.is_empty() => Ok(identity),
            _ => Err(Error::invalid_identity()),
        }
    }
}
