//! Error types for the relay
use std::error::Error as StdError;
use std::fmt;

/// Errors raised while admitting a connection.
///
/// Routing never fails: an offline recipient is an empty target set, not an error.
#[derive(Debug, PartialEq)]
pub struct Error {
    pub error_kind: RelayErrorKind,
}

#[derive(Debug, PartialEq)]
pub enum RelayErrorKind {
    // The handshake did not carry a usable user identity
    InvalidIdentity,
}

impl Error {
    pub fn invalid_identity() -> Self {
        Error {
            error_kind: RelayErrorKind::InvalidIdentity,
        }
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "Relay Error: {:?}", self)
    }
}

impl StdError for Error {}
