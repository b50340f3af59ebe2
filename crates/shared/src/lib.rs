//! Shared types, errors, and configuration for Expensa.
//!
//! This crate provides common types used across all other crates:
//! - Typed IDs for type-safe entity references
//! - Pagination types for list endpoints
//! - Application-wide error types
//! - Configuration management
//! - JWT claims and token signing
//! - Outbound clients (SMTP mailer, OCR upstream)

pub mod auth;
pub mod config;
pub mod email;
pub mod error;
pub mod jwt;
pub mod ocr;
pub mod types;

pub use auth::{Claims, Role, TokenKind, TokenPair};
pub use config::{AppConfig, EmailConfig, JwtConfig, OcrConfig};
pub use email::{EmailError, EmailService, Mailer};
pub use error::{AppError, AppResult};
pub use jwt::{JwtError, JwtService};
pub use ocr::{OcrClient, OcrError, OcrUpload};
