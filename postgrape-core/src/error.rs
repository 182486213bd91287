use std::borrow::Cow;
use thiserror::Error;

/// Failures raised by postgrape itself, statement errors from the database travel as they are.
///
/// They are carried inside [`crate::Error`], test for them with `downcast_ref::<DataError>()`.
#[derive(Debug, Error)]
pub enum DataError {
    #[error("There are invalid arguments: {0}")]
    InvalidArguments(Cow<'static, str>),
    #[error("Could not acquire a connection from the pool")]
    ConnectionUnavailable(#[source] Box<dyn std::error::Error + Send + Sync>),
    #[error("The client was already released")]
    ClientReleased,
}

impl DataError {
    pub fn invalid_arguments(reason: impl Into<Cow<'static, str>>) -> Self {
        Self::InvalidArguments(reason.into())
    }
}
