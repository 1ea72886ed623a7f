//! Domain logic that sits between the web layer and storage.
//!
//! `web` depends on this crate rather than on `entity_api` directly, and every
//! lower-layer error is translated into `domain::error::Error` here.

pub use entity_api::{messages, Id};

pub mod error;
pub mod retention;
