//! Bearer-token gate for protected routes.

use std::sync::Arc;

use axum::{
    extract::{FromRequestParts, Request, State},
    http::{header::AUTHORIZATION, request::Parts},
    middleware::Next,
    response::Response,
};
use expensa_shared::types::UserId;
use expensa_shared::{AppError, Claims, JwtError, JwtService, Role, TokenKind};

use crate::response::ApiError;

/// Any authenticated caller.
pub const ANY_ROLE: &[Role] = &[];
/// Admins only.
pub const ADMIN: &[Role] = &[Role::Admin];
/// Admins and regular users.
pub const ADMIN_OR_USER: &[Role] = &[Role::Admin, Role::User];

/// Gate configuration: the verifier plus the roles let through.
///
/// An empty role set admits any authenticated caller.
#[derive(Debug, Clone)]
pub struct AuthGate {
    jwt: Arc<JwtService>,
    allowed: &'static [Role],
}

impl AuthGate {
    /// Creates a gate admitting `allowed` roles.
    #[must_use]
    pub const fn new(jwt: Arc<JwtService>, allowed: &'static [Role]) -> Self {
        Self { jwt, allowed }
    }

    /// Checks an `Authorization` header value and returns the access claims.
    ///
    /// # Errors
    ///
    /// `AppError::Unauthorized` for a missing, malformed, expired, or invalid
    /// token; `AppError::Forbidden` when the role is not admitted.
    pub fn check(&self, header: Option<&str>) -> Result<Claims, AppError> {
        let header = header.ok_or_else(|| AppError::Unauthorized("Access denied, token missing".into()))?;

        let mut parts = header.split_whitespace();
        let token = match (parts.next(), parts.next(), parts.next()) {
            (Some("Bearer"), Some(token), None) => token,
            _ => return Err(AppError::Unauthorized("Invalid token format".into())),
        };

        let claims = self
            .jwt
            .validate_kind(token, TokenKind::Access)
            .map_err(|e| match e {
                JwtError::Expired => AppError::Unauthorized("Token expired".into()),
                JwtError::Invalid => AppError::Unauthorized("Invalid token".into()),
                JwtError::Encoding(_) | JwtError::Rejected(_) => {
                    AppError::Unauthorized("Unauthorized".into())
                }
            })?;

        if !self.allowed.is_empty() && !self.allowed.contains(&claims.role) {
            tracing::warn!(user_id = %claims.id, role = %claims.role, "role not permitted");
            return Err(AppError::Forbidden("Unauthorized, role mismatch".into()));
        }

        Ok(claims)
    }
}

/// Middleware that validates the bearer token and stores the claims in
/// request extensions for [`AuthUser`].
pub async fn auth_gate(
    State(gate): State<AuthGate>,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let header = request
        .headers()
        .get(AUTHORIZATION)
        .map(|h| h.to_str().unwrap_or_default());

    let claims = gate.check(header)?;
    request.extensions_mut().insert(claims);
    Ok(next.run(request).await)
}

/// Extractor for the authenticated caller's claims.
#[derive(Debug, Clone)]
pub struct AuthUser(pub Claims);

impl AuthUser {
    /// Returns the caller's ID.
    #[must_use]
    pub const fn user_id(&self) -> UserId {
        self.0.user_id()
    }

    /// Returns the caller's role.
    #[must_use]
    pub const fn role(&self) -> Role {
        self.0.role
    }
}

impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<Claims>()
            .cloned()
            .map(AuthUser)
            .ok_or_else(|| ApiError(AppError::Unauthorized("Unauthorized".into())))
    }
}
