//! Registration, verification, login, token refresh, and password reset.

use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use expensa_shared::{JwtService, Mailer, Role, TokenKind};
use serde::{Deserialize, Serialize};
use validator::Validate;

use super::codes::{generate_code, hash_code};
use super::error::AuthError;
use super::mail::{self, Letter};
use super::password::{hash_password, verify_against_dummy, verify_password};
use super::provision::{Confirm, ProvisionError, provision};
use super::store::{NewUser, StoreError, UserRecord, UserStore, UserView};
use super::validation::{describe, normalize_email, validate_phone};

/// Lifetime of an email verification code.
pub const VERIFICATION_CODE_TTL: Duration = Duration::hours(24);
/// Lifetime of a password reset code and of its attempt window.
pub const RESET_CODE_TTL: Duration = Duration::minutes(15);
/// Minimum spacing between two reset codes for the same account.
pub const RESET_COOLDOWN: Duration = Duration::minutes(2);
/// Failed reset attempts allowed per window.
pub const MAX_RESET_ATTEMPTS: i32 = 5;

const MIN_PASSWORD_LEN: usize = 6;

/// Registration payload.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct RegisterInput {
    /// Display name, 3 to 30 characters after trimming.
    #[serde(default)]
    #[validate(length(min = 3, max = 30, message = "Username must be between 3 and 30 characters long"))]
    pub username: String,
    /// Email address.
    #[serde(default)]
    #[validate(email(message = "Please enter a valid email address"))]
    pub email: String,
    /// Phone number, 7 to 15 digits.
    #[serde(default)]
    #[validate(custom(function = "validate_phone"))]
    pub phone: String,
    /// Plaintext password.
    #[serde(default)]
    #[validate(length(min = 6, message = "Password must be at least 6 characters long"))]
    pub password: String,
}

impl RegisterInput {
    fn normalized(self) -> Self {
        Self {
            username: self.username.trim().to_string(),
            email: normalize_email(&self.email),
            phone: self.phone.trim().to_string(),
            password: self.password,
        }
    }
}

/// Login payload.
#[derive(Debug, Clone, Deserialize)]
pub struct LoginInput {
    /// Email address.
    #[serde(default)]
    pub email: String,
    /// Plaintext password.
    #[serde(default)]
    pub password: String,
}

/// Password reset payload.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResetPasswordInput {
    /// Account email.
    #[serde(default)]
    pub email: String,
    /// Plaintext reset code from the email.
    #[serde(default)]
    pub reset_code: String,
    /// Desired password.
    #[serde(default)]
    pub new_password: String,
    /// Must equal `new_password`.
    #[serde(default)]
    pub confirm_password: String,
}

/// A signed-in user with a fresh token pair.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthSession {
    /// Sanitized user.
    pub user: UserView,
    /// Access token.
    pub access_token: String,
    /// Refresh token.
    pub refresh_token: String,
}

/// Auth workflow over a user store and a mailer.
///
/// Every time-dependent operation has an `*_at` variant taking `now`, which the
/// plain variant calls with `Utc::now()`.
#[derive(Clone)]
pub struct AuthService {
    users: Arc<dyn UserStore>,
    mailer: Arc<dyn Mailer>,
    jwt: Arc<JwtService>,
}

impl AuthService {
    /// Creates a new auth service.
    pub fn new(users: Arc<dyn UserStore>, mailer: Arc<dyn Mailer>, jwt: Arc<JwtService>) -> Self {
        Self { users, mailer, jwt }
    }

    async fn send(&self, to: &str, letter: &Letter) -> Result<(), expensa_shared::EmailError> {
        self.mailer.send(to, letter.subject, &letter.html).await
    }

    /// Registers an unverified account and emails its verification code.
    ///
    /// A verified owner of the email blocks registration; an unverified one is
    /// evicted first. If the email cannot be delivered the new row is removed.
    pub async fn register(&self, input: RegisterInput) -> Result<UserView, AuthError> {
        self.register_at(input, Utc::now()).await
    }

    /// [`Self::register`] at a fixed instant.
    pub async fn register_at(
        &self,
        input: RegisterInput,
        now: DateTime<Utc>,
    ) -> Result<UserView, AuthError> {
        let input = input.normalized();
        input
            .validate()
            .map_err(|e| AuthError::Validation(describe(&e)))?;

        if let Some(existing) = self.users.find_by_email(&input.email).await? {
            if existing.is_verified {
                tracing::warn!(email = %input.email, "registration rejected, email taken");
                return Err(AuthError::AlreadyExists);
            }
            self.users.delete(existing.id).await?;
            tracing::info!(user_id = %existing.id, "evicted stale unverified account");
        }

        let code = generate_code();
        let new_user = NewUser {
            username: input.username.clone(),
            email: input.email.clone(),
            phone: Some(input.phone),
            password_hash: hash_password(&input.password)?,
            is_verified: false,
            verification_code: Some(code.clone()),
            verification_code_expires_at: Some(now + VERIFICATION_CODE_TTL),
            role: Role::Admin,
            created_by: None,
        };

        let letter = mail::verification(&input.username, &code);
        let record = provision(
            self.users.as_ref(),
            new_user,
            self.send(&input.email, &letter),
            Confirm::KeepPending,
        )
        .await
        .map_err(|err| match err {
            ProvisionError::Store(StoreError::Duplicate) => AuthError::AlreadyExists,
            ProvisionError::Store(store) => AuthError::Store(store),
            ProvisionError::Delivery(e) => {
                tracing::error!(email = %input.email, error = %e, "verification email failed");
                AuthError::Delivery("Failed to send verification email")
            }
        })?;

        tracing::info!(user_id = %record.id, "user registered");
        Ok(record.view())
    }

    /// Consumes a verification code and activates the account.
    pub async fn verify_email(&self, email: &str, code: &str) -> Result<UserView, AuthError> {
        self.verify_email_at(email, code, Utc::now()).await
    }

    /// [`Self::verify_email`] at a fixed instant.
    pub async fn verify_email_at(
        &self,
        email: &str,
        code: &str,
        now: DateTime<Utc>,
    ) -> Result<UserView, AuthError> {
        if email.trim().is_empty() || code.is_empty() {
            return Err(AuthError::Validation(
                "Email and verification code are required".into(),
            ));
        }

        let email = normalize_email(email);
        let mut user = self
            .users
            .find_by_email(&email)
            .await?
            .filter(|u| u.verification_code.as_deref() == Some(code))
            .ok_or(AuthError::InvalidVerificationCode)?;

        if user.verification_code_expires_at.is_some_and(|at| at < now) {
            tracing::warn!(user_id = %user.id, "expired verification code presented");
            user.clear_verification_code();
            self.users.update(&user).await?;
            return Err(AuthError::VerificationExpired);
        }

        user.is_verified = true;
        user.clear_verification_code();
        let user = self.users.update(&user).await?;

        tracing::info!(user_id = %user.id, "email verified");
        Ok(user.view())
    }

    /// Issues a fresh verification code to an unverified account.
    ///
    /// Unknown and already-verified emails succeed silently.
    pub async fn resend_verification(&self, email: &str) -> Result<(), AuthError> {
        self.resend_verification_at(email, Utc::now()).await
    }

    /// [`Self::resend_verification`] at a fixed instant.
    pub async fn resend_verification_at(
        &self,
        email: &str,
        now: DateTime<Utc>,
    ) -> Result<(), AuthError> {
        let email = normalize_email(email);
        let Some(mut user) = self.users.find_by_email(&email).await? else {
            return Ok(());
        };
        if user.is_verified {
            return Ok(());
        }

        let code = generate_code();
        user.verification_code = Some(code.clone());
        user.verification_code_expires_at = Some(now + VERIFICATION_CODE_TTL);
        let user = self.users.update(&user).await?;

        self.send(&user.email, &mail::verification(&user.username, &code))
            .await
            .map_err(|e| {
                tracing::error!(user_id = %user.id, error = %e, "verification email failed");
                AuthError::Delivery("Failed to send verification email")
            })?;

        tracing::info!(user_id = %user.id, "verification code re-sent");
        Ok(())
    }

    /// Checks credentials and issues a token pair.
    ///
    /// Unknown email and wrong password are indistinguishable, and both pay
    /// for one Argon2 verification; a correct password on an unverified
    /// account is reported distinctly.
    pub async fn login(&self, input: LoginInput) -> Result<AuthSession, AuthError> {
        if input.email.trim().is_empty() || input.password.is_empty() {
            return Err(AuthError::Validation("Email and password are required".into()));
        }

        let email = normalize_email(&input.email);
        let Some(user) = self.users.find_by_email(&email).await? else {
            verify_against_dummy(&input.password);
            return Err(AuthError::InvalidCredentials);
        };

        if !verify_password(&input.password, &user.password_hash)? {
            tracing::warn!(user_id = %user.id, "login rejected, wrong password");
            return Err(AuthError::InvalidCredentials);
        }

        if !user.is_verified {
            return Err(AuthError::EmailNotVerified);
        }

        tracing::info!(user_id = %user.id, "user logged in");
        self.session(&user)
    }

    /// Exchanges a refresh token for a new pair.
    ///
    /// The presented token is not revoked.
    pub async fn refresh(&self, refresh_token: &str) -> Result<AuthSession, AuthError> {
        if refresh_token.is_empty() {
            return Err(AuthError::Validation("Refresh token is required".into()));
        }

        let claims = self
            .jwt
            .validate_kind(refresh_token, TokenKind::Refresh)
            .map_err(|_| AuthError::InvalidRefreshToken)?;

        let user = self
            .users
            .find_by_id(claims.user_id())
            .await?
            .ok_or(AuthError::UserNotFound)?;

        self.session(&user)
    }

    fn session(&self, user: &UserRecord) -> Result<AuthSession, AuthError> {
        Ok(AuthSession {
            user: user.view(),
            access_token: self.jwt.generate_access_token(
                user.id,
                &user.email,
                &user.username,
                user.role,
            )?,
            refresh_token: self.jwt.generate_refresh_token(user.id, user.role)?,
        })
    }

    /// Emails a reset code if the account exists.
    ///
    /// Succeeds for unknown emails. A second request inside the cooldown is
    /// rejected; a failed delivery clears the reset state again.
    pub async fn forgot_password(&self, email: &str) -> Result<(), AuthError> {
        self.forgot_password_at(email, Utc::now()).await
    }

    /// [`Self::forgot_password`] at a fixed instant.
    pub async fn forgot_password_at(&self, email: &str, now: DateTime<Utc>) -> Result<(), AuthError> {
        if email.trim().is_empty() {
            return Err(AuthError::Validation("Email is required".into()));
        }

        let email = normalize_email(email);
        let Some(mut user) = self.users.find_by_email(&email).await? else {
            return Ok(());
        };

        if let Some(expires_at) = user.reset_code_expires_at.filter(|at| *at > now) {
            let issued_at = expires_at - RESET_CODE_TTL;
            if now - issued_at < RESET_COOLDOWN {
                tracing::warn!(user_id = %user.id, "reset code requested during cooldown");
                return Err(AuthError::ResetCooldown);
            }
        }

        let code = generate_code();
        user.reset_code_hash = Some(hash_code(&code));
        user.reset_code_expires_at = Some(now + RESET_CODE_TTL);
        user.reset_attempts = 0;
        user.reset_attempts_expires_at = Some(now + RESET_CODE_TTL);
        let mut user = self.users.update(&user).await?;

        if let Err(e) = self
            .send(&user.email, &mail::reset_code(&user.username, &code))
            .await
        {
            tracing::error!(user_id = %user.id, error = %e, "reset email failed");
            user.clear_reset_state();
            if let Err(store) = self.users.update(&user).await {
                tracing::error!(user_id = %user.id, error = %store, "failed to clear reset state");
            }
            return Err(AuthError::Delivery("Failed to send password reset email"));
        }

        tracing::info!(user_id = %user.id, "reset code issued");
        Ok(())
    }

    /// Sets a new password given a live reset code.
    pub async fn reset_password(&self, input: ResetPasswordInput) -> Result<(), AuthError> {
        self.reset_password_at(input, Utc::now()).await
    }

    /// [`Self::reset_password`] at a fixed instant.
    pub async fn reset_password_at(
        &self,
        input: ResetPasswordInput,
        now: DateTime<Utc>,
    ) -> Result<(), AuthError> {
        if input.email.trim().is_empty()
            || input.reset_code.is_empty()
            || input.new_password.is_empty()
            || input.confirm_password.is_empty()
        {
            return Err(AuthError::Validation("All fields are required".into()));
        }
        if input.new_password != input.confirm_password {
            return Err(AuthError::PasswordMismatch);
        }
        if input.new_password.chars().count() < MIN_PASSWORD_LEN {
            return Err(AuthError::PasswordTooShort);
        }

        let email = normalize_email(&input.email);
        let mut user = self
            .users
            .find_by_email(&email)
            .await?
            .filter(|u| u.reset_code_expires_at.is_some_and(|at| at > now))
            .ok_or(AuthError::InvalidResetCode)?;

        if user.reset_attempts_expires_at.is_some_and(|at| at > now) {
            if user.reset_attempts >= MAX_RESET_ATTEMPTS {
                tracing::warn!(user_id = %user.id, "reset attempts exhausted");
                return Err(AuthError::TooManyAttempts);
            }
        } else {
            user.reset_attempts = 0;
            user.reset_attempts_expires_at = Some(now + RESET_CODE_TTL);
        }

        if user.reset_code_hash.as_deref() != Some(hash_code(&input.reset_code).as_str()) {
            user.reset_attempts += 1;
            let user = self.users.update(&user).await?;
            tracing::warn!(user_id = %user.id, attempts = user.reset_attempts, "wrong reset code");
            return Err(AuthError::WrongResetCode {
                remaining: (MAX_RESET_ATTEMPTS - user.reset_attempts).max(0),
            });
        }

        if verify_password(&input.new_password, &user.password_hash)? {
            return Err(AuthError::SamePassword);
        }

        user.password_hash = hash_password(&input.new_password)?;
        user.clear_reset_state();
        let user = self.users.update(&user).await?;
        tracing::info!(user_id = %user.id, "password reset");

        if let Err(e) = self
            .send(&user.email, &mail::reset_confirmation(&user.username))
            .await
        {
            tracing::warn!(user_id = %user.id, error = %e, "reset confirmation email failed");
        }

        Ok(())
    }
}
