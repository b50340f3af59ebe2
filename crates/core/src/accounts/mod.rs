//! Admin-provisioned sub-user accounts.

mod error;
mod service;

#[cfg(test)]
mod tests;

pub use error::AccountError;
pub use service::{AccountService, CreateSubUserInput};
