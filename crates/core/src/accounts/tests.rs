use std::sync::Arc;

use chrono::{Duration, Utc};
use expensa_shared::Role;
use expensa_shared::types::UserId;

use super::*;
use crate::auth::testing::{InMemoryUsers, RecordingMailer};
use crate::auth::{MockUserStore, StoreError, UserStore, verify_password};

fn service() -> (Arc<InMemoryUsers>, Arc<RecordingMailer>, AccountService) {
    let users = Arc::new(InMemoryUsers::default());
    let mailer = Arc::new(RecordingMailer::default());
    let service = AccountService::new(users.clone(), mailer.clone());
    (users, mailer, service)
}

fn input(email: &str) -> CreateSubUserInput {
    CreateSubUserInput {
        username: "bob".into(),
        email: email.into(),
        phone: Some("5550001".into()),
    }
}

fn password_from(body: &str) -> String {
    let marker = "<strong>Password:</strong> ";
    let start = body.find(marker).unwrap() + marker.len();
    body[start..start + 10].to_string()
}

#[tokio::test]
async fn test_create_sub_user_activates_after_delivery() {
    let (users, mailer, service) = service();
    let admin = UserId::new();

    let view = service.create_sub_user(admin, input("Bob@X.io")).await.unwrap();

    assert!(view.is_verified);
    assert_eq!(view.role, Role::User);
    assert_eq!(view.created_by, Some(admin));
    assert_eq!(view.email, "bob@x.io");

    let sent = mailer.sent();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].subject, "Your New Account Details");
    let password = password_from(&sent[0].body);
    assert!(password.chars().all(|c| c.is_ascii_hexdigit()));

    let stored = users.by_email("bob@x.io").unwrap();
    assert!(verify_password(&password, &stored.password_hash).unwrap());
}

#[tokio::test]
async fn test_create_sub_user_rolls_back_on_delivery_failure() {
    let (users, mailer, service) = service();
    mailer.set_failing(true);

    let err = service
        .create_sub_user(UserId::new(), input("bob@x.io"))
        .await
        .unwrap_err();

    assert!(matches!(err, AccountError::Delivery));
    assert!(users.all().is_empty());
}

#[tokio::test]
async fn test_create_sub_user_rejects_any_existing_email() {
    let (_users, _mailer, service) = service();
    let admin = UserId::new();
    service.create_sub_user(admin, input("bob@x.io")).await.unwrap();

    let err = service
        .create_sub_user(admin, input("BOB@x.io"))
        .await
        .unwrap_err();
    assert!(matches!(err, AccountError::AlreadyExists));
}

#[tokio::test]
async fn test_create_sub_user_requires_username_and_email() {
    let (_users, _mailer, service) = service();
    let mut missing = input("");
    missing.username = "bob".into();

    let err = service
        .create_sub_user(UserId::new(), missing)
        .await
        .unwrap_err();
    assert_eq!(err.to_string(), "Username and email are required");

    let mut bad_phone = input("bob@x.io");
    bad_phone.phone = Some("12".into());
    assert!(matches!(
        service.create_sub_user(UserId::new(), bad_phone).await,
        Err(AccountError::Validation(_))
    ));
}

#[tokio::test]
async fn test_create_sub_user_duplicate_insert_is_conflict() {
    let mut store = MockUserStore::new();
    store.expect_find_by_email().returning(|_| Ok(None));
    store.expect_insert().returning(|_| Err(StoreError::Duplicate));
    let service = AccountService::new(Arc::new(store), Arc::new(RecordingMailer::default()));

    assert!(matches!(
        service.create_sub_user(UserId::new(), input("bob@x.io")).await,
        Err(AccountError::AlreadyExists)
    ));
}

#[tokio::test]
async fn test_list_sub_users_is_scoped_and_newest_first() {
    let (users, _mailer, service) = service();
    let admin = UserId::new();
    let other = UserId::new();
    service.create_sub_user(admin, input("one@x.io")).await.unwrap();
    service.create_sub_user(admin, input("two@x.io")).await.unwrap();
    service.create_sub_user(other, input("three@x.io")).await.unwrap();

    let mut older = users.by_email("one@x.io").unwrap();
    older.created_at = Utc::now() - Duration::days(1);
    users.update(&older).await.unwrap();

    let listed = service.list_sub_users(admin).await.unwrap();
    let emails: Vec<_> = listed.iter().map(|u| u.email.as_str()).collect();
    assert_eq!(emails, ["two@x.io", "one@x.io"]);
}

#[tokio::test]
async fn test_delete_sub_user_only_for_creator() {
    let (users, _mailer, service) = service();
    let admin = UserId::new();
    let view = service.create_sub_user(admin, input("bob@x.io")).await.unwrap();

    assert!(matches!(
        service.delete_sub_user(UserId::new(), view.id).await,
        Err(AccountError::NotFound)
    ));
    assert_eq!(users.all().len(), 1);

    service.delete_sub_user(admin, view.id).await.unwrap();
    assert!(users.all().is_empty());

    assert!(matches!(
        service.delete_sub_user(admin, view.id).await,
        Err(AccountError::NotFound)
    ));
}
