//! Sub-user provisioning, listing, and removal.

use std::sync::Arc;

use expensa_shared::types::UserId;
use expensa_shared::{Mailer, Role};
use serde::Deserialize;
use validator::Validate;

use super::error::AccountError;
use crate::auth::mail;
use crate::auth::provision::{Confirm, ProvisionError, provision};
use crate::auth::validation::{describe, normalize_email, validate_phone};
use crate::auth::{NewUser, StoreError, UserStore, UserView, generate_password, hash_password};

/// Payload for `POST /user/create`.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateSubUserInput {
    /// Display name.
    #[serde(default)]
    #[validate(length(min = 3, max = 30, message = "Username must be between 3 and 30 characters long"))]
    pub username: String,
    /// Email address.
    #[serde(default)]
    #[validate(email(message = "Please enter a valid email address"))]
    pub email: String,
    /// Optional phone number.
    #[serde(default)]
    #[validate(custom(function = "validate_phone"))]
    pub phone: Option<String>,
}

impl CreateSubUserInput {
    fn normalized(self) -> Self {
        Self {
            username: self.username.trim().to_string(),
            email: normalize_email(&self.email),
            phone: self
                .phone
                .map(|p| p.trim().to_string())
                .filter(|p| !p.is_empty()),
        }
    }
}

/// Manages accounts that an admin creates on behalf of others.
#[derive(Clone)]
pub struct AccountService {
    users: Arc<dyn UserStore>,
    mailer: Arc<dyn Mailer>,
}

impl AccountService {
    /// Creates a new account service.
    pub fn new(users: Arc<dyn UserStore>, mailer: Arc<dyn Mailer>) -> Self {
        Self { users, mailer }
    }

    /// Creates a verified `user`-role account owned by `admin_id` and emails
    /// it a generated password.
    ///
    /// The row is inserted unverified, the credentials are sent, and only then
    /// is it activated. A delivery failure deletes the row.
    pub async fn create_sub_user(
        &self,
        admin_id: UserId,
        input: CreateSubUserInput,
    ) -> Result<UserView, AccountError> {
        if input.username.trim().is_empty() || input.email.trim().is_empty() {
            return Err(AccountError::Validation(
                "Username and email are required".into(),
            ));
        }
        let input = input.normalized();
        input
            .validate()
            .map_err(|e| AccountError::Validation(describe(&e)))?;

        if self.users.find_by_email(&input.email).await?.is_some() {
            tracing::warn!(email = %input.email, "sub-user rejected, email taken");
            return Err(AccountError::AlreadyExists);
        }

        let password = generate_password();
        let new_user = NewUser {
            username: input.username.clone(),
            email: input.email.clone(),
            phone: input.phone.clone(),
            password_hash: hash_password(&password)?,
            is_verified: false,
            verification_code: None,
            verification_code_expires_at: None,
            role: Role::User,
            created_by: Some(admin_id),
        };

        let letter = mail::sub_user_credentials(&input.username, &input.email, &password);
        let record = provision(
            self.users.as_ref(),
            new_user,
            self.mailer.send(&input.email, letter.subject, &letter.html),
            Confirm::Activate,
        )
        .await
        .map_err(|err| match err {
            ProvisionError::Store(StoreError::Duplicate) => AccountError::AlreadyExists,
            ProvisionError::Store(store) => AccountError::Store(store),
            ProvisionError::Delivery(e) => {
                tracing::error!(email = %input.email, error = %e, "credentials email failed");
                AccountError::Delivery
            }
        })?;

        tracing::info!(user_id = %record.id, admin_id = %admin_id, "sub-user created");
        Ok(record.view())
    }

    /// Lists accounts created by `admin_id`, newest first.
    pub async fn list_sub_users(&self, admin_id: UserId) -> Result<Vec<UserView>, AccountError> {
        let mut rows = self.users.list_created_by(admin_id).await?;
        rows.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(rows.iter().map(|u| u.view()).collect())
    }

    /// Deletes a sub-user created by `admin_id`.
    ///
    /// Accounts created by someone else are reported as not found.
    pub async fn delete_sub_user(
        &self,
        admin_id: UserId,
        user_id: UserId,
    ) -> Result<(), AccountError> {
        let user = self
            .users
            .find_by_id(user_id)
            .await?
            .filter(|u| u.created_by == Some(admin_id))
            .ok_or(AccountError::NotFound)?;

        self.users.delete(user.id).await?;
        tracing::info!(user_id = %user.id, admin_id = %admin_id, "sub-user deleted");
        Ok(())
    }
}
