//! In-memory fakes for the user store and mailer ports.

use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use chrono::Utc;
use expensa_shared::types::UserId;
use expensa_shared::{EmailError, Mailer};

use super::store::{NewUser, StoreError, UserRecord, UserStore};

/// Vec-backed user store enforcing email uniqueness.
#[derive(Default)]
pub struct InMemoryUsers {
    rows: Mutex<Vec<UserRecord>>,
}

impl InMemoryUsers {
    pub fn all(&self) -> Vec<UserRecord> {
        self.rows.lock().unwrap().clone()
    }

    pub fn by_email(&self, email: &str) -> Option<UserRecord> {
        self.all().into_iter().find(|u| u.email == email)
    }

    pub fn put(&self, record: UserRecord) {
        self.rows.lock().unwrap().push(record);
    }
}

#[async_trait]
impl UserStore for InMemoryUsers {
    async fn find_by_email(&self, email: &str) -> Result<Option<UserRecord>, StoreError> {
        Ok(self.by_email(email))
    }

    async fn find_by_id(&self, id: UserId) -> Result<Option<UserRecord>, StoreError> {
        Ok(self.all().into_iter().find(|u| u.id == id))
    }

    async fn insert(&self, user: NewUser) -> Result<UserRecord, StoreError> {
        let mut rows = self.rows.lock().unwrap();
        if rows.iter().any(|u| u.email == user.email) {
            return Err(StoreError::Duplicate);
        }
        let now = Utc::now();
        let record = UserRecord {
            id: UserId::new(),
            username: user.username,
            email: user.email,
            phone: user.phone,
            password_hash: user.password_hash,
            is_verified: user.is_verified,
            verification_code: user.verification_code,
            verification_code_expires_at: user.verification_code_expires_at,
            reset_code_hash: None,
            reset_code_expires_at: None,
            reset_attempts: 0,
            reset_attempts_expires_at: None,
            role: user.role,
            image: None,
            created_by: user.created_by,
            created_at: now,
            updated_at: now,
        };
        rows.push(record.clone());
        Ok(record)
    }

    async fn update(&self, user: &UserRecord) -> Result<UserRecord, StoreError> {
        let mut rows = self.rows.lock().unwrap();
        let row = rows
            .iter_mut()
            .find(|u| u.id == user.id)
            .ok_or_else(|| StoreError::Backend("row vanished".into()))?;
        *row = user.clone();
        row.updated_at = Utc::now();
        Ok(row.clone())
    }

    async fn delete(&self, id: UserId) -> Result<(), StoreError> {
        self.rows.lock().unwrap().retain(|u| u.id != id);
        Ok(())
    }

    async fn list_created_by(&self, creator: UserId) -> Result<Vec<UserRecord>, StoreError> {
        let mut rows: Vec<_> = self
            .all()
            .into_iter()
            .filter(|u| u.created_by == Some(creator))
            .collect();
        rows.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(rows)
    }
}

/// A captured outbound message.
#[derive(Debug, Clone)]
pub struct SentMail {
    pub to: String,
    pub subject: String,
    pub body: String,
}

/// Mailer that records messages and can be told to fail.
#[derive(Default)]
pub struct RecordingMailer {
    sent: Mutex<Vec<SentMail>>,
    failing: AtomicBool,
}

impl RecordingMailer {
    pub fn failing() -> Self {
        let mailer = Self::default();
        mailer.set_failing(true);
        mailer
    }

    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    pub fn sent(&self) -> Vec<SentMail> {
        self.sent.lock().unwrap().clone()
    }

    /// Pulls the first 4-digit run out of the latest body.
    pub fn last_code(&self) -> Option<String> {
        let body = self.sent().last()?.body.clone();
        body.as_bytes()
            .windows(4)
            .enumerate()
            .find(|(i, w)| {
                w.iter().all(u8::is_ascii_digit)
                    && !body.as_bytes().get(i + 4).is_some_and(u8::is_ascii_digit)
                    && (*i == 0 || !body.as_bytes()[i - 1].is_ascii_digit())
            })
            .map(|(_, w)| String::from_utf8_lossy(w).into_owned())
    }
}

#[async_trait]
impl Mailer for RecordingMailer {
    async fn send(&self, to: &str, subject: &str, html_body: &str) -> Result<(), EmailError> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(EmailError::SendError("relay unavailable".into()));
        }
        self.sent.lock().unwrap().push(SentMail {
            to: to.to_string(),
            subject: subject.to_string(),
            body: html_body.to_string(),
        });
        Ok(())
    }
}
