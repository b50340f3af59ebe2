//! User repository for database operations.

use async_trait::async_trait;
use chrono::{DateTime, FixedOffset, Utc};
use expensa_core::auth::{NewUser, StoreError, UserRecord, UserStore};
use expensa_shared::types::UserId;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, Set,
};
use uuid::Uuid;

use super::store_err;
use crate::entities::users;

/// User repository backed by the `users` table.
#[derive(Debug, Clone)]
pub struct UserRepository {
    db: DatabaseConnection,
}

impl UserRepository {
    /// Creates a new user repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

fn to_utc(at: DateTime<FixedOffset>) -> DateTime<Utc> {
    at.with_timezone(&Utc)
}

fn to_fixed(at: DateTime<Utc>) -> DateTime<FixedOffset> {
    at.fixed_offset()
}

impl From<users::Model> for UserRecord {
    fn from(m: users::Model) -> Self {
        Self {
            id: UserId::from_uuid(m.id),
            username: m.username,
            email: m.email,
            phone: m.phone,
            password_hash: m.password_hash,
            is_verified: m.is_verified,
            verification_code: m.verification_code,
            verification_code_expires_at: m.verification_code_expires_at.map(to_utc),
            reset_code_hash: m.reset_code_hash,
            reset_code_expires_at: m.reset_code_expires_at.map(to_utc),
            reset_attempts: m.reset_attempts,
            reset_attempts_expires_at: m.reset_attempts_expires_at.map(to_utc),
            role: m.role.into(),
            image: m.image,
            created_by: m.created_by.map(UserId::from_uuid),
            created_at: to_utc(m.created_at),
            updated_at: to_utc(m.updated_at),
        }
    }
}

/// Active model carrying every mutable column of `user`.
fn active_model(user: &UserRecord) -> users::ActiveModel {
    users::ActiveModel {
        id: Set(user.id.into_inner()),
        username: Set(user.username.clone()),
        email: Set(user.email.clone()),
        phone: Set(user.phone.clone()),
        password_hash: Set(user.password_hash.clone()),
        is_verified: Set(user.is_verified),
        verification_code: Set(user.verification_code.clone()),
        verification_code_expires_at: Set(user.verification_code_expires_at.map(to_fixed)),
        reset_code_hash: Set(user.reset_code_hash.clone()),
        reset_code_expires_at: Set(user.reset_code_expires_at.map(to_fixed)),
        reset_attempts: Set(user.reset_attempts),
        reset_attempts_expires_at: Set(user.reset_attempts_expires_at.map(to_fixed)),
        role: Set(user.role.into()),
        image: Set(user.image.clone()),
        created_by: Set(user.created_by.map(UserId::into_inner)),
        created_at: Set(to_fixed(user.created_at)),
        updated_at: Set(to_fixed(Utc::now())),
    }
}

#[async_trait]
impl UserStore for UserRepository {
    async fn find_by_email(&self, email: &str) -> Result<Option<UserRecord>, StoreError> {
        users::Entity::find()
            .filter(users::Column::Email.eq(email))
            .one(&self.db)
            .await
            .map(|found| found.map(UserRecord::from))
            .map_err(store_err)
    }

    async fn find_by_id(&self, id: UserId) -> Result<Option<UserRecord>, StoreError> {
        users::Entity::find_by_id(id.into_inner())
            .one(&self.db)
            .await
            .map(|found| found.map(UserRecord::from))
            .map_err(store_err)
    }

    async fn insert(&self, user: NewUser) -> Result<UserRecord, StoreError> {
        let now = Utc::now().fixed_offset();
        let model = users::ActiveModel {
            id: Set(Uuid::now_v7()),
            username: Set(user.username),
            email: Set(user.email),
            phone: Set(user.phone),
            password_hash: Set(user.password_hash),
            is_verified: Set(user.is_verified),
            verification_code: Set(user.verification_code),
            verification_code_expires_at: Set(user.verification_code_expires_at.map(to_fixed)),
            reset_code_hash: Set(None),
            reset_code_expires_at: Set(None),
            reset_attempts: Set(0),
            reset_attempts_expires_at: Set(None),
            role: Set(user.role.into()),
            image: Set(None),
            created_by: Set(user.created_by.map(UserId::into_inner)),
            created_at: Set(now),
            updated_at: Set(now),
        };

        model
            .insert(&self.db)
            .await
            .map(UserRecord::from)
            .map_err(store_err)
    }

    async fn update(&self, user: &UserRecord) -> Result<UserRecord, StoreError> {
        active_model(user)
            .update(&self.db)
            .await
            .map(UserRecord::from)
            .map_err(store_err)
    }

    async fn delete(&self, id: UserId) -> Result<(), StoreError> {
        users::Entity::delete_by_id(id.into_inner())
            .exec(&self.db)
            .await
            .map_err(store_err)?;
        Ok(())
    }

    async fn list_created_by(&self, creator: UserId) -> Result<Vec<UserRecord>, StoreError> {
        users::Entity::find()
            .filter(users::Column::CreatedBy.eq(creator.into_inner()))
            .order_by_desc(users::Column::CreatedAt)
            .all(&self.db)
            .await
            .map(|rows| rows.into_iter().map(UserRecord::from).collect())
            .map_err(store_err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::sea_orm_active_enums::UserRole;
    use expensa_shared::Role;

    fn model() -> users::Model {
        let at = Utc::now().fixed_offset();
        users::Model {
            id: Uuid::now_v7(),
            username: "alice".into(),
            email: "alice@example.com".into(),
            phone: Some("5551234".into()),
            password_hash: "$argon2id$hash".into(),
            is_verified: true,
            verification_code: None,
            verification_code_expires_at: None,
            reset_code_hash: Some("ab".repeat(32)),
            reset_code_expires_at: Some(at),
            reset_attempts: 2,
            reset_attempts_expires_at: Some(at),
            role: UserRole::Admin,
            image: None,
            created_by: None,
            created_at: at,
            updated_at: at,
        }
    }

    #[test]
    fn test_model_round_trips_through_record() {
        let model = model();
        let record = UserRecord::from(model.clone());

        assert_eq!(record.id.into_inner(), model.id);
        assert_eq!(record.role, Role::Admin);
        assert_eq!(record.reset_attempts, 2);
        assert_eq!(record.reset_code_expires_at, model.reset_code_expires_at.map(to_utc));

        let active = active_model(&record);
        assert_eq!(active.email, Set(model.email));
        assert_eq!(active.role, Set(UserRole::Admin));
        assert_eq!(active.reset_code_hash, Set(model.reset_code_hash));
    }
}
