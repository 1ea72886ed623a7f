use std::error::Error as StdError;

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

use domain::error::{
    ConnectionErrorKind, DomainErrorKind, EntityErrorKind, Error as DomainError,
    ExternalErrorKind, InternalErrorKind,
};

use log::*;

pub type Result<T> = core::result::Result<T, Error>;

#[derive(Debug)]
pub struct Error(DomainError);

impl StdError for Error {}

impl std::fmt::Display for Error {
    fn fmt(&self, fmt: &mut std::fmt::Formatter) -> core::result::Result<(), std::fmt::Error> {
        write!(fmt, "{self:?}")
    }
}

// List of possible StatusCode variants https://docs.rs/http/latest/http/status/struct.StatusCode.html
impl IntoResponse for Error {
    fn into_response(self) -> Response {
        match self.0.error_kind {
            DomainErrorKind::Internal(internal_error_kind) => match internal_error_kind {
                InternalErrorKind::Connection(ConnectionErrorKind::InvalidIdentity) => {
                    (StatusCode::UNAUTHORIZED, "INVALID USER").into_response()
                }
                InternalErrorKind::Entity(EntityErrorKind::NotFound) => {
                    (StatusCode::NOT_FOUND, "NOT FOUND").into_response()
                }
                InternalErrorKind::Entity(EntityErrorKind::Other(reason))
                | InternalErrorKind::Other(reason) => {
                    error!("Internal error: {reason}");
                    (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL SERVER ERROR").into_response()
                }
            },
            DomainErrorKind::External(external_error_kind) => match external_error_kind {
                ExternalErrorKind::StoreUnavailable => {
                    (StatusCode::INTERNAL_SERVER_ERROR, "FAILED TO DELETE MESSAGES").into_response()
                }
                ExternalErrorKind::Other(reason) => {
                    error!("External error: {reason}");
                    (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL SERVER ERROR").into_response()
                }
            },
        }
    }
}

impl<E> From<E> for Error
where
    E: Into<DomainError>,
{
    fn from(err: E) -> Self {
        Self(err.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn status_of(error_kind: DomainErrorKind) -> StatusCode {
        Error(DomainError {
            source: None,
            error_kind,
        })
        .into_response()
        .status()
    }

    #[test]
    fn invalid_identity_is_unauthorized() {
        assert_eq!(
            status_of(DomainErrorKind::Internal(InternalErrorKind::Connection(
                ConnectionErrorKind::InvalidIdentity
            ))),
            StatusCode::UNAUTHORIZED
        );
    }

    #[test]
    fn store_failures_are_server_errors() {
        assert_eq!(
            status_of(DomainErrorKind::External(
                ExternalErrorKind::StoreUnavailable
            )),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn relay_errors_convert_through_the_domain_layer() {
        let err: Error = relay::error::Error::invalid_identity().into();
        assert_eq!(err.into_response().status(), StatusCode::UNAUTHORIZED);
    }
}
