//! User persistence port.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use expensa_shared::types::UserId;
use expensa_shared::{AppError, Role};
use serde::Serialize;
use thiserror::Error;

/// Errors surfaced by store implementations.
#[derive(Debug, Error)]
pub enum StoreError {
    /// A unique constraint (email) rejected the write.
    #[error("duplicate key")]
    Duplicate,

    /// A foreign key pointed at a row that does not exist.
    #[error("missing reference")]
    MissingReference,

    /// Any other backend failure.
    #[error("{0}")]
    Backend(String),
}

impl From<StoreError> for AppError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Duplicate => Self::Conflict("User already exists with this email".into()),
            StoreError::MissingReference => Self::Validation("Referenced record not found".into()),
            StoreError::Backend(msg) => Self::Database(msg),
        }
    }
}

/// Full persisted user state, including credentials and one-time code state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserRecord {
    /// User ID.
    pub id: UserId,
    /// Display name.
    pub username: String,
    /// Lowercased email, unique.
    pub email: String,
    /// Phone number, digits only.
    pub phone: Option<String>,
    /// Argon2id PHC string.
    pub password_hash: String,
    /// Whether the email has been confirmed.
    pub is_verified: bool,
    /// Outstanding verification code.
    pub verification_code: Option<String>,
    /// Verification code expiry.
    pub verification_code_expires_at: Option<DateTime<Utc>>,
    /// SHA-256 hex digest of the outstanding reset code.
    pub reset_code_hash: Option<String>,
    /// Reset code expiry.
    pub reset_code_expires_at: Option<DateTime<Utc>>,
    /// Failed reset attempts inside the current window.
    pub reset_attempts: i32,
    /// End of the current attempt window.
    pub reset_attempts_expires_at: Option<DateTime<Utc>>,
    /// Account role.
    pub role: Role,
    /// Avatar URL.
    pub image: Option<String>,
    /// Admin that provisioned this account.
    pub created_by: Option<UserId>,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Last update timestamp.
    pub updated_at: DateTime<Utc>,
}

impl UserRecord {
    /// Returns the client-safe view.
    #[must_use]
    pub fn view(&self) -> UserView {
        UserView {
            id: self.id,
            username: self.username.clone(),
            email: self.email.clone(),
            phone_number: self.phone.clone(),
            is_verified: self.is_verified,
            role: self.role,
            image: self.image.clone(),
            created_by: self.created_by,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }

    /// Drops all password-reset state.
    pub fn clear_reset_state(&mut self) {
        self.reset_code_hash = None;
        self.reset_code_expires_at = None;
        self.reset_attempts = 0;
        self.reset_attempts_expires_at = None;
    }

    /// Drops the verification code.
    pub fn clear_verification_code(&mut self) {
        self.verification_code = None;
        self.verification_code_expires_at = None;
    }
}

/// Insert payload; the store assigns id and timestamps.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewUser {
    /// Display name.
    pub username: String,
    /// Lowercased email.
    pub email: String,
    /// Phone number.
    pub phone: Option<String>,
    /// Argon2id PHC string.
    pub password_hash: String,
    /// Initial verification state.
    pub is_verified: bool,
    /// Verification code to store.
    pub verification_code: Option<String>,
    /// Verification code expiry.
    pub verification_code_expires_at: Option<DateTime<Utc>>,
    /// Account role.
    pub role: Role,
    /// Provisioning admin.
    pub created_by: Option<UserId>,
}

/// Sanitized user view. Never carries the password hash or code state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserView {
    /// User ID.
    pub id: UserId,
    /// Display name.
    pub username: String,
    /// Email.
    pub email: String,
    /// Phone number.
    pub phone_number: Option<String>,
    /// Verification flag.
    pub is_verified: bool,
    /// Role.
    pub role: Role,
    /// Avatar URL.
    pub image: Option<String>,
    /// Provisioning admin.
    pub created_by: Option<UserId>,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Last update timestamp.
    pub updated_at: DateTime<Utc>,
}

/// Persistence port for user accounts.
///
/// Emails passed in are already normalized (trimmed, lowercased).
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UserStore: Send + Sync {
    /// Finds a user by email.
    async fn find_by_email(&self, email: &str) -> Result<Option<UserRecord>, StoreError>;

    /// Finds a user by ID.
    async fn find_by_id(&self, id: UserId) -> Result<Option<UserRecord>, StoreError>;

    /// Inserts a user. Fails with `StoreError::Duplicate` when the email is taken.
    async fn insert(&self, user: NewUser) -> Result<UserRecord, StoreError>;

    /// Persists every mutable field of `user` and returns the stored row.
    async fn update(&self, user: &UserRecord) -> Result<UserRecord, StoreError>;

    /// Hard-deletes a user.
    async fn delete(&self, id: UserId) -> Result<(), StoreError>;

    /// Lists accounts provisioned by `creator`, newest first.
    async fn list_created_by(&self, creator: UserId) -> Result<Vec<UserRecord>, StoreError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record() -> UserRecord {
        let now = Utc::now();
        UserRecord {
            id: UserId::new(),
            username: "alice".into(),
            email: "alice@example.com".into(),
            phone: Some("5551234".into()),
            password_hash: "$argon2id$secret".into(),
            is_verified: true,
            verification_code: Some("1234".into()),
            verification_code_expires_at: Some(now),
            reset_code_hash: Some("abc".into()),
            reset_code_expires_at: Some(now),
            reset_attempts: 3,
            reset_attempts_expires_at: Some(now),
            role: Role::Admin,
            image: None,
            created_by: None,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn test_view_hides_secrets() {
        let json = serde_json::to_value(record().view()).unwrap();
        let keys: Vec<&str> = json.as_object().unwrap().keys().map(String::as_str).collect();

        for hidden in ["password", "passwordHash", "verificationCode", "resetCodeHash", "resetAttempts"] {
            assert!(!keys.contains(&hidden), "{hidden} leaked");
        }
        assert_eq!(json["isVerified"], true);
        assert_eq!(json["role"], "admin");
        assert_eq!(json["phoneNumber"], "5551234");
    }

    #[test]
    fn test_clear_reset_state() {
        let mut user = record();
        user.clear_reset_state();
        assert!(user.reset_code_hash.is_none());
        assert!(user.reset_code_expires_at.is_none());
        assert_eq!(user.reset_attempts, 0);
        assert!(user.reset_attempts_expires_at.is_none());
    }

    #[test]
    fn test_duplicate_maps_to_conflict() {
        let err: AppError = StoreError::Duplicate.into();
        assert_eq!(err.status_code(), 409);
        assert_eq!(err.to_string(), "User already exists with this email");
    }
}
