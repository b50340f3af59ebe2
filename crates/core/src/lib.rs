//! Core business logic for Expensa.
//!
//! This crate contains pure business logic with ZERO web or database dependencies.
//! Persistence and mail delivery are reached through ports (`UserStore`,
//! `ExpenseStore`, `Mailer`) that outer crates implement.
//!
//! # Modules
//!
//! - `auth` - Registration, verification, login, token refresh, password reset
//! - `accounts` - Admin-provisioned sub-users
//! - `expense` - Expense entry and the filter/group/paginate/chart report

pub mod accounts;
pub mod auth;
pub mod expense;
