//! WebSocket transport for the relay.
//!
//! `handler` performs the handshake and admits the connection before upgrading;
//! `connection` runs the per-connection reader/writer pair until the socket closes.

pub(crate) mod connection;
pub(crate) mod handler;
