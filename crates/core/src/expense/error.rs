//! Expense errors.

use expensa_shared::AppError;
use thiserror::Error;

use crate::auth::StoreError;

/// Errors produced by expense entry and reporting.
#[derive(Debug, Error)]
pub enum ExpenseError {
    /// Input failed validation.
    #[error("{0}")]
    Validation(String),

    /// A customer filter or field is not a well-formed ID.
    #[error("Invalid customer ID")]
    InvalidCustomer,

    /// The customer ID does not name an account.
    #[error("Customer not found")]
    CustomerNotFound,

    /// Store failure.
    #[error(transparent)]
    Store(StoreError),
}

impl From<StoreError> for ExpenseError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::MissingReference => Self::CustomerNotFound,
            other => Self::Store(other),
        }
    }
}

impl From<ExpenseError> for AppError {
    fn from(err: ExpenseError) -> Self {
        let message = err.to_string();
        match err {
            ExpenseError::Validation(_)
            | ExpenseError::InvalidCustomer
            | ExpenseError::CustomerNotFound => Self::Validation(message),
            ExpenseError::Store(store) => store.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_reference_means_unknown_customer() {
        let err: ExpenseError = StoreError::MissingReference.into();
        assert!(matches!(err, ExpenseError::CustomerNotFound));

        let app: AppError = err.into();
        assert_eq!(app.status_code(), 400);
        assert_eq!(app.to_string(), "Customer not found");
    }

    #[test]
    fn test_backend_failure_is_hidden() {
        let app: AppError = ExpenseError::from(StoreError::Backend("pool closed".into())).into();
        assert_eq!(app.status_code(), 500);
        assert_eq!(app.public_message(), "Internal Server Error");
    }
}
