//! Sub-user management errors.

use expensa_shared::AppError;
use thiserror::Error;

use crate::auth::{PasswordError, StoreError};

/// Errors produced by sub-user management.
#[derive(Debug, Error)]
pub enum AccountError {
    /// Input failed validation.
    #[error("{0}")]
    Validation(String),

    /// Any account, verified or not, already owns the email.
    #[error("User already exists with this email")]
    AlreadyExists,

    /// No sub-user with that id belongs to the caller.
    #[error("User not found")]
    NotFound,

    /// Credentials email failed; the account was removed.
    #[error("Failed to create user or send email")]
    Delivery,

    /// Password hashing failed.
    #[error(transparent)]
    Password(#[from] PasswordError),

    /// Store failure.
    #[error(transparent)]
    Store(#[from] StoreError),
}

impl From<AccountError> for AppError {
    fn from(err: AccountError) -> Self {
        let message = err.to_string();
        match err {
            AccountError::Validation(_) => Self::Validation(message),
            AccountError::AlreadyExists => Self::Conflict(message),
            AccountError::NotFound => Self::NotFound(message),
            AccountError::Delivery => Self::ExternalService(message),
            AccountError::Password(_) => Self::Internal(message),
            AccountError::Store(store) => store.into(),
        }
    }
}
