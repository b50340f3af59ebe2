//! Auth workflow error types.

use expensa_shared::{AppError, JwtError};
use thiserror::Error;

use super::password::PasswordError;
use super::store::StoreError;

/// Errors produced by the auth workflow.
///
/// The `Display` text of the client-facing variants is the exact message the
/// API returns.
#[derive(Debug, Error)]
pub enum AuthError {
    /// Input failed validation.
    #[error("{0}")]
    Validation(String),

    /// A verified account already owns the email.
    #[error("User already exists with this email")]
    AlreadyExists,

    /// No account matches the email and code pair.
    #[error("Invalid or expired verification code")]
    InvalidVerificationCode,

    /// The code matched but its window has passed.
    #[error("Verification code has expired")]
    VerificationExpired,

    /// Unknown email or wrong password.
    #[error("Invalid email or password")]
    InvalidCredentials,

    /// Correct credentials on an unverified account.
    #[error("Please verify your email before logging in")]
    EmailNotVerified,

    /// Refresh token failed signature, expiry, or kind checks.
    #[error("Invalid or expired refresh token")]
    InvalidRefreshToken,

    /// The token subject no longer exists.
    #[error("User not found")]
    UserNotFound,

    /// A reset code was issued less than the cooldown ago.
    #[error("Please wait before requesting another reset code")]
    ResetCooldown,

    /// `newPassword` and `confirmPassword` differ.
    #[error("Passwords do not match")]
    PasswordMismatch,

    /// New password below the minimum length.
    #[error("Password must be at least 6 characters long")]
    PasswordTooShort,

    /// No live reset code for the email.
    #[error("Invalid or expired reset code")]
    InvalidResetCode,

    /// Attempt budget exhausted inside the window.
    #[error("Too many failed attempts. Please request a new code")]
    TooManyAttempts,

    /// Wrong code; the counter was incremented.
    #[error("Invalid reset code. {remaining} attempts remaining")]
    WrongResetCode {
        /// Attempts left in the window.
        remaining: i32,
    },

    /// The new password equals the current one.
    #[error("New password cannot be the same as the old password")]
    SamePassword,

    /// Mail delivery failed and the operation was rolled back.
    #[error("{0}")]
    Delivery(&'static str),

    /// Password hashing failed.
    #[error(transparent)]
    Password(#[from] PasswordError),

    /// Token signing failed.
    #[error(transparent)]
    Token(#[from] JwtError),

    /// Store failure.
    #[error(transparent)]
    Store(#[from] StoreError),
}

impl From<AuthError> for AppError {
    fn from(err: AuthError) -> Self {
        let message = err.to_string();
        match err {
            AuthError::Validation(_)
            | AuthError::InvalidVerificationCode
            | AuthError::VerificationExpired
            | AuthError::PasswordMismatch
            | AuthError::PasswordTooShort
            | AuthError::InvalidResetCode
            | AuthError::WrongResetCode { .. }
            | AuthError::SamePassword => Self::Validation(message),
            AuthError::AlreadyExists => Self::Conflict(message),
            AuthError::InvalidCredentials
            | AuthError::InvalidRefreshToken
            | AuthError::UserNotFound => Self::Unauthorized(message),
            AuthError::EmailNotVerified => Self::Forbidden(message),
            AuthError::ResetCooldown | AuthError::TooManyAttempts => Self::RateLimited(message),
            AuthError::Delivery(_) => Self::ExternalService(message),
            AuthError::Password(_) | AuthError::Token(_) => Self::Internal(message),
            AuthError::Store(store) => store.into(),
        }
    }
}
