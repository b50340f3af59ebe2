//! Request middleware.

pub mod auth;

pub use auth::{AuthGate, AuthUser, auth_gate};
