//! Use cases behind the console routes, generic over [`ResourceGateway`].
//!
//! [`ResourceGateway`]: crate::backend::ResourceGateway

use thiserror::Error;

use crate::backend::BackendError;
use crate::forms::FormError;

pub mod auth;
pub mod resources;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ServiceError {
    #[error("unauthorized")]
    Unauthorized,

    #[error("not found")]
    NotFound,

    #[error("{0}")]
    Conflict(String),

    #[error("{0}")]
    Form(String),

    #[error("{0}")]
    Backend(String),
}

pub type ServiceResult<T> = Result<T, ServiceError>;

impl From<BackendError> for ServiceError {
    fn from(err: BackendError) -> Self {
        match err {
            BackendError::Unauthorized { .. } | BackendError::MissingToken => {
                ServiceError::Unauthorized
            }
            BackendError::NotFound => ServiceError::NotFound,
            BackendError::Conflict(_) => ServiceError::Conflict(err.user_message()),
            other => ServiceError::Backend(other.user_message()),
        }
    }
}

impl From<FormError> for ServiceError {
    fn from(err: FormError) -> Self {
        ServiceError::Form(err.to_string())
    }
}
