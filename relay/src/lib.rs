//! Real-time presence and relay for anonymous chat.
//!
//! This crate tracks which live connections belong to which user and fans
//! chat events out to every connection of the right users.
//!
//! # Architecture
//!
//! - **Registry**: user id -> set of live connection ids, guarded by one mutex.
//!   An entry exists only while it has at least one connection.
//! - **Lifecycle**: validates the handshake identity, registers the connection
//!   and returns a `ConnectionContext` that unregisters it exactly once.
//! - **Router**: computes the target connection set for each inbound
//!   `ChatEvent` and emits the matching outbound `Event`.
//! - **Transport**: the seam between the relay and the sockets. The
//!   `ChannelTransport` pushes JSON text frames onto per-connection queues.
//!
//! # Delivery
//!
//! - Best effort: an event for a user with no live connections is dropped.
//! - A user with several tabs receives every event on every tab.
//! - Typing indicators also reach the sender's other tabs, without duplicates.
//!
//! # Modules
//!
//! - `connection`: `ConnectionId`, `UserId` and the `Handshake`
//! - `registry`: the connection registry
//! - `lifecycle`: admission and release of connections
//! - `router`: event fan-out
//! - `transport`: the `Transport` trait and the channel-backed implementation
//! - `manager`: the facade used by the WebSocket layer
//! - `message`: inbound and outbound wire events

pub mod connection;
pub mod error;
pub mod lifecycle;
pub mod manager;
pub mod message;
pub mod registry;
pub mod router;
pub mod transport;

#[cfg(test)]
mod test_support;

pub use manager::Manager;
