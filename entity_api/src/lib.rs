pub use entity::{messages, Id};

pub mod error;
pub mod message;
