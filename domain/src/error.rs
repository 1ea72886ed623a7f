//! Error types for the `domain` layer.
use entity_api::error::{EntityApiErrorKind, Error as EntityApiError};
use relay::error::{Error as RelayError, RelayErrorKind};
use std::error::Error as StdError;
use std::fmt;

/// Top-level domain error type.
/// Errors in the Domain layer are modeled as a tree with `domain::error::Error` at the
/// root holding a tree of `error_kind` enums for the domain layer and the layers below it.
/// `source` keeps the original error. `web` only ever sees these kinds, never the
/// `entity_api` or `relay` errors directly, and maps them onto HTTP status codes.
#[derive(Debug)]
pub struct Error {
    pub source: Option<Box<dyn StdError + Send + Sync>>,
    pub error_kind: DomainErrorKind,
}

/// Enum representing the major categories of errors that can occur in the `domain` layer.
#[derive(Debug, PartialEq)]
pub enum DomainErrorKind {
    Internal(InternalErrorKind),
    External(ExternalErrorKind),
}

/// Enum representing the various kinds of internal errors that can occur in the `domain` layer.
#[derive(Debug, PartialEq)]
pub enum InternalErrorKind {
    Entity(EntityErrorKind),
    Connection(ConnectionErrorKind),
    Other(String),
}

/// Entity layer errors reduced to what the `domain` layer cares about.
#[derive(Debug, PartialEq)]
pub enum EntityErrorKind {
    NotFound,
    Other(String),
}

/// Errors raised while admitting a realtime connection.
#[derive(Debug, PartialEq)]
pub enum ConnectionErrorKind {
    InvalidIdentity,
}

/// Enum representing the various kinds of external errors that can occur in the `domain` layer.
#[derive(Debug, PartialEq)]
pub enum ExternalErrorKind {
    // The message store could not be reached or refused the operation
    StoreUnavailable,
    Other(String),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "Domain Error: {self:?}")
    }
}

impl StdError for Error {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        self.source
            .as_ref()
            .map(|e| e.as_ref() as &(dyn StdError + 'static))
    }
}

// This is where we translate errors from the `entity_api` layer to the `domain` layer.
impl From<EntityApiError> for Error {
    fn from(err: EntityApiError) -> Self {
        let error_kind = match err.error_kind {
            EntityApiErrorKind::SystemError => {
                DomainErrorKind::External(ExternalErrorKind::StoreUnavailable)
            }
            EntityApiErrorKind::RecordNotFound => {
                DomainErrorKind::Internal(InternalErrorKind::Entity(EntityErrorKind::NotFound))
            }
            EntityApiErrorKind::Other => DomainErrorKind::Internal(InternalErrorKind::Entity(
                EntityErrorKind::Other("EntityErrorKind".to_string()),
            )),
        };

        Error {
            source: Some(Box::new(err)),
            error_kind,
        }
    }
}

impl From<RelayError> for Error {
    fn from(err: RelayError) -> Self {
        let connection_error_kind = match err.error_kind {
            RelayErrorKind::InvalidIdentity => ConnectionErrorKind::InvalidIdentity,
        };

        Error {
            source: Some(Box::new(err)),
            error_kind: DomainErrorKind::Internal(InternalErrorKind::Connection(
                connection_error_kind,
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn database_system_errors_mean_the_store_is_unavailable() {
        let err: Error = EntityApiError {
            source: None,
            error_kind: EntityApiErrorKind::SystemError,
        }
        .into();

        assert_eq!(
            err.error_kind,
            DomainErrorKind::External(ExternalErrorKind::StoreUnavailable)
        );
        assert!(err.source().is_some());
    }

    #[test]
    fn relay_admission_errors_become_connection_errors() {
        let err: Error = RelayError::invalid_identity().into();

        assert_eq!(
            err.error_kind,
            DomainErrorKind::Internal(InternalErrorKind::Connection(
                ConnectionErrorKind::InvalidIdentity
            ))
        );
    }
}
