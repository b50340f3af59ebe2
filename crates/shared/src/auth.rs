//! Authentication types for JWT and tokens.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::types::UserId;

/// Account role.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Sub-user provisioned by an admin.
    User,
    /// Self-registered account; sees every expense and manages sub-users.
    Admin,
}

impl Role {
    /// Returns the lowercase wire name.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::User => "user",
            Self::Admin => "admin",
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "user" => Ok(Self::User),
            "admin" => Ok(Self::Admin),
            _ => Err(format!("Unknown role: {s}")),
        }
    }
}

/// Which half of a token pair a JWT is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TokenKind {
    /// Presented on protected routes.
    Access,
    /// Exchanged for a new pair.
    Refresh,
}

/// JWT claims.
///
/// Access tokens carry `email` and `username`; refresh tokens carry only the
/// id and role.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    /// User ID.
    pub id: Uuid,
    /// User role.
    pub role: Role,
    /// User email (access tokens only).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    /// Username (access tokens only).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    /// Token kind.
    pub typ: TokenKind,
    /// Issued at timestamp.
    pub iat: i64,
    /// Expiration timestamp.
    pub exp: i64,
}

impl Claims {
    /// Creates access-token claims.
    #[must_use]
    pub fn access(
        user_id: UserId,
        email: &str,
        username: &str,
        role: Role,
        expires_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id: user_id.into_inner(),
            role,
            email: Some(email.to_string()),
            username: Some(username.to_string()),
            typ: TokenKind::Access,
            iat: Utc::now().timestamp(),
            exp: expires_at.timestamp(),
        }
    }

    /// Creates refresh-token claims.
    #[must_use]
    pub fn refresh(user_id: UserId, role: Role, expires_at: DateTime<Utc>) -> Self {
        Self {
            id: user_id.into_inner(),
            role,
            email: None,
            username: None,
            typ: TokenKind::Refresh,
            iat: Utc::now().timestamp(),
            exp: expires_at.timestamp(),
        }
    }

    /// Returns the user ID from claims.
    #[must_use]
    pub const fn user_id(&self) -> UserId {
        UserId::from_uuid(self.id)
    }
}

/// Token pair returned after login or refresh.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenPair {
    /// Access token.
    pub access_token: String,
    /// Refresh token.
    pub refresh_token: String,
}
