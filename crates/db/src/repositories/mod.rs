//! Repository abstractions for data access.
//!
//! Repositories implement the `expensa-core` store ports, hiding the
//! `SeaORM` implementation details from the rest of the application.

pub mod expense;
pub mod user;

pub use expense::ExpenseRepository;
pub use user::UserRepository;

use expensa_core::auth::StoreError;
use sea_orm::{DbErr, SqlErr};

/// Maps a database error onto the store port's error.
pub(crate) fn store_err(err: DbErr) -> StoreError {
    match err.sql_err() {
        Some(SqlErr::UniqueConstraintViolation(_)) => StoreError::Duplicate,
        Some(SqlErr::ForeignKeyConstraintViolation(_)) => StoreError::MissingReference,
        _ => {
            tracing::error!(error = %err, "database error");
            StoreError::Backend(err.to_string())
        }
    }
}
