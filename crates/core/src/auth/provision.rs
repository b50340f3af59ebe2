//! Provisional account creation: insert, deliver, then confirm or roll back.
//!
//! A provisional row is always unverified, so it cannot log in while the
//! delivery step is in flight.

use std::future::Future;

use expensa_shared::EmailError;

use super::store::{NewUser, StoreError, UserRecord, UserStore};

/// What the confirm step does after a successful delivery.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Confirm {
    /// Keep the account unverified (the user still has to enter a code).
    KeepPending,
    /// Mark the account verified.
    Activate,
}

/// Failure of a provisioning run. The provisional row is gone in every case.
#[derive(Debug)]
pub enum ProvisionError {
    /// Insert or confirm failed.
    Store(StoreError),
    /// Delivery failed.
    Delivery(EmailError),
}

/// Inserts `new_user` unverified, awaits `deliver`, then confirms or rolls back.
pub async fn provision<F>(
    users: &dyn UserStore,
    mut new_user: NewUser,
    deliver: F,
    confirm: Confirm,
) -> Result<UserRecord, ProvisionError>
where
    F: Future<Output = Result<(), EmailError>> + Send,
{
    new_user.is_verified = false;
    let mut record = users.insert(new_user).await.map_err(ProvisionError::Store)?;

    if let Err(err) = deliver.await {
        rollback(users, &record).await;
        return Err(ProvisionError::Delivery(err));
    }

    if confirm == Confirm::Activate {
        record.is_verified = true;
        record = match users.update(&record).await {
            Ok(stored) => stored,
            Err(err) => {
                rollback(users, &record).await;
                return Err(ProvisionError::Store(err));
            }
        };
    }

    Ok(record)
}

async fn rollback(users: &dyn UserStore, record: &UserRecord) {
    if let Err(err) = users.delete(record.id).await {
        tracing::error!(
            user_id = %record.id,
            error = %err,
            "failed to roll back provisional account"
        );
    } else {
        tracing::warn!(user_id = %record.id, "provisional account rolled back");
    }
}
