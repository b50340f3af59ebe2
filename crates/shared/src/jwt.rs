//! JWT token generation and validation.
//!
//! Tokens are HS256-signed with a shared secret. Access and refresh tokens
//! share the key but are told apart by the `typ` claim.

use chrono::{Duration, Utc};
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use thiserror::Error;

use crate::auth::{Claims, Role, TokenKind};
use crate::config::JwtConfig;
use crate::types::UserId;

/// Errors that can occur during JWT operations.
#[derive(Debug, Error)]
pub enum JwtError {
    /// Token encoding failed.
    #[error("failed to encode token: {0}")]
    Encoding(String),

    /// Token has expired.
    #[error("token has expired")]
    Expired,

    /// Token is malformed, badly signed, or of the wrong kind.
    #[error("invalid token")]
    Invalid,

    /// Token was rejected for another reason (e.g. not yet valid).
    #[error("token rejected: {0}")]
    Rejected(String),
}

/// JWT service for token operations.
#[derive(Clone)]
pub struct JwtService {
    access_ttl: Duration,
    refresh_ttl: Duration,
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
}

impl std::fmt::Debug for JwtService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JwtService")
            .field("access_ttl", &self.access_ttl)
            .field("refresh_ttl", &self.refresh_ttl)
            .field("encoding_key", &"[hidden]")
            .field("decoding_key", &"[hidden]")
            .finish()
    }
}

/// Upper bound on configured lifetimes, about a century.
const MAX_TTL_SECS: i64 = 100 * 31_536_000;

fn ttl(secs: u64) -> Duration {
    Duration::seconds(i64::try_from(secs).unwrap_or(MAX_TTL_SECS).min(MAX_TTL_SECS))
}

impl JwtService {
    /// Creates a new JWT service with the given configuration.
    #[must_use]
    pub fn new(config: &JwtConfig) -> Self {
        Self {
            access_ttl: ttl(config.access_token_expiry_secs),
            refresh_ttl: ttl(config.refresh_token_expiry_secs),
            encoding_key: EncodingKey::from_secret(config.secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(config.secret.as_bytes()),
        }
    }

    /// Generates an access token carrying `{id, email, username, role}`.
    ///
    /// # Errors
    ///
    /// Returns `JwtError::Encoding` if token generation fails.
    pub fn generate_access_token(
        &self,
        user_id: UserId,
        email: &str,
        username: &str,
        role: Role,
    ) -> Result<String, JwtError> {
        let claims = Claims::access(user_id, email, username, role, Utc::now() + self.access_ttl);
        self.sign(&claims)
    }

    /// Generates a refresh token carrying `{id, role}`.
    ///
    /// # Errors
    ///
    /// Returns `JwtError::Encoding` if token generation fails.
    pub fn generate_refresh_token(&self, user_id: UserId, role: Role) -> Result<String, JwtError> {
        let claims = Claims::refresh(user_id, role, Utc::now() + self.refresh_ttl);
        self.sign(&claims)
    }

    /// Signs arbitrary claims.
    ///
    /// # Errors
    ///
    /// Returns `JwtError::Encoding` if token generation fails.
    pub fn sign(&self, claims: &Claims) -> Result<String, JwtError> {
        encode(&Header::default(), claims, &self.encoding_key)
            .map_err(|e| JwtError::Encoding(e.to_string()))
    }

    /// Validates signature and expiry and decodes the claims.
    ///
    /// # Errors
    ///
    /// Returns `JwtError::Expired` if the token has expired,
    /// `JwtError::Invalid` if it is malformed or badly signed.
    pub fn validate_token(&self, token: &str) -> Result<Claims, JwtError> {
        use jsonwebtoken::errors::ErrorKind;

        decode::<Claims>(token, &self.decoding_key, &Validation::default())
            .map(|data| data.claims)
            .map_err(|e| match e.kind() {
                ErrorKind::ExpiredSignature => JwtError::Expired,
                ErrorKind::InvalidToken
                | ErrorKind::InvalidSignature
                | ErrorKind::Base64(_)
                | ErrorKind::Json(_)
                | ErrorKind::Utf8(_) => JwtError::Invalid,
                _ => JwtError::Rejected(e.to_string()),
            })
    }

    /// Validates a token and requires it to be of `kind`.
    ///
    /// # Errors
    ///
    /// As [`Self::validate_token`], plus `JwtError::Invalid` on a kind mismatch.
    pub fn validate_kind(&self, token: &str, kind: TokenKind) -> Result<Claims, JwtError> {
        let claims = self.validate_token(token)?;
        if claims.typ == kind {
            Ok(claims)
        } else {
            Err(JwtError::Invalid)
        }
    }

    /// Returns the access token lifetime in seconds.
    #[must_use]
    pub const fn access_token_expires_in(&self) -> i64 {
        self.access_ttl.num_seconds()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn create_test_service() -> JwtService {
        JwtService::new(&JwtConfig {
            secret: "test-secret-key-for-testing".to_string(),
            access_token_expiry_secs: 900,
            refresh_token_expiry_secs: 3600,
        })
    }

    #[test]
    fn test_access_token_round_trip() {
        let service = create_test_service();
        let user_id = UserId::new();

        let token = service
            .generate_access_token(user_id, "a@b.co", "alice", Role::Admin)
            .unwrap();
        let claims = service.validate_kind(&token, TokenKind::Access).unwrap();

        assert_eq!(claims.user_id(), user_id);
        assert_eq!(claims.role, Role::Admin);
        assert_eq!(claims.email.as_deref(), Some("a@b.co"));
    }

    #[test]
    fn test_refresh_token_is_not_an_access_token() {
        let service = create_test_service();
        let token = service
            .generate_refresh_token(UserId::new(), Role::User)
            .unwrap();

        assert!(service.validate_kind(&token, TokenKind::Refresh).is_ok());
        assert!(matches!(
            service.validate_kind(&token, TokenKind::Access),
            Err(JwtError::Invalid)
        ));
    }

    #[test]
    fn test_expired_token_is_classified() {
        let service = create_test_service();
        let mut claims = Claims::refresh(UserId::new(), Role::User, Utc::now());
        claims.exp = (Utc::now() - Duration::hours(1)).timestamp();
        let token = service.sign(&claims).unwrap();

        assert!(matches!(
            service.validate_token(&token),
            Err(JwtError::Expired)
        ));
    }

    #[test]
    fn test_invalid_token() {
        let service = create_test_service();
        assert!(matches!(
            service.validate_token("invalid.token.here"),
            Err(JwtError::Invalid)
        ));
    }

    #[test]
    fn test_token_signed_with_other_secret_is_invalid() {
        let other = JwtService::new(&JwtConfig {
            secret: "another-secret".to_string(),
            access_token_expiry_secs: 900,
            refresh_token_expiry_secs: 900,
        });
        let token = other
            .generate_access_token(UserId::new(), "a@b.co", "alice", Role::User)
            .unwrap();

        assert!(matches!(
            create_test_service().validate_token(&token),
            Err(JwtError::Invalid)
        ));
    }

    #[test]
    fn test_access_token_expires_in() {
        assert_eq!(create_test_service().access_token_expires_in(), 900);
    }
}
