//! Authentication workflow.
//!
//! This module provides:
//! - Password hashing with Argon2id
//! - One-time numeric codes and their SHA-256 digests
//! - The `UserStore` port and user records
//! - `AuthService`, the registration / login / reset state machine

mod codes;
mod error;
pub(crate) mod mail;
mod password;
pub(crate) mod provision;
mod service;
mod store;
pub(crate) mod validation;

#[cfg(test)]
pub(crate) mod testing;

pub use codes::{generate_code, generate_password, hash_code};
pub use error::AuthError;
pub use password::{PasswordError, hash_password, verify_password};
pub use service::{
    AuthService, AuthSession, LoginInput, MAX_RESET_ATTEMPTS, RESET_CODE_TTL, RESET_COOLDOWN,
    RegisterInput, ResetPasswordInput, VERIFICATION_CODE_TTL,
};
pub use store::{NewUser, StoreError, UserRecord, UserStore, UserView};

#[cfg(test)]
pub use store::MockUserStore;
