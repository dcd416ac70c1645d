use std::collections::HashMap;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use time::OffsetDateTime;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::core::time::now_utc;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub(crate) enum UserRole {
    #[default]
    Student,
    Teacher,
}

#[derive(Debug, Clone)]
pub(crate) struct User {
    pub(crate) id: String,
    pub(crate) name: String,
    pub(crate) email: String,
    pub(crate) role: UserRole,
    pub(crate) hashed_password: String,
    pub(crate) created_at: OffsetDateTime,
}

pub(crate) struct CreateUser<'a> {
    pub name: &'a str,
    pub email: &'a str,
    pub role: UserRole,
    pub hashed_password: String,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub(crate) enum UserStoreError {
    #[error("user with this email already exists")]
    EmailTaken,
}

#[derive(Debug, Default)]
struct Inner {
    by_id: HashMap<String, User>,
    id_by_email: HashMap<String, String>,
    /// Logged-out tokens mapped to their expiry (unix seconds).
    revoked: HashMap<String, i64>,
}

/// Process-lifetime user directory. Nothing is persisted.
#[derive(Debug, Clone, Default)]
pub(crate) struct UserStore {
    inner: Arc<RwLock<Inner>>,
}

pub(crate) fn normalize_email(email: &str) -> String {
    email.trim().to_ascii_lowercase()
}

impl UserStore {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) async fn create(&self, params: CreateUser<'_>) -> Result<User, UserStoreError> {
        let email = normalize_email(params.email);
        let mut inner = self.inner.write().await;
        if inner.id_by_email.contains_key(&email) {
            return Err(UserStoreError::EmailTaken);
        }

        let user = User {
            id: Uuid::new_v4().to_string(),
            name: params.name.trim().to_string(),
            email: email.clone(),
            role: params.role,
            hashed_password: params.hashed_password,
            created_at: now_utc(),
        };
        inner.id_by_email.insert(email, user.id.clone());
        inner.by_id.insert(user.id.clone(), user.clone());
        Ok(user)
    }

    pub(crate) async fn find_by_id(&self, id: &str) -> Option<User> {
        self.inner.read().await.by_id.get(id).cloned()
    }

    pub(crate) async fn find_by_email(&self, email: &str) -> Option<User> {
        let inner = self.inner.read().await;
        inner.id_by_email.get(&normalize_email(email)).and_then(|id| inner.by_id.get(id)).cloned()
    }

    /// Remembers `token` as logged out until `expires_at`. Expired entries are
    /// pruned on every call.
    pub(crate) async fn revoke_token(&self, token: &str, expires_at: i64) {
        let now = now_utc().unix_timestamp();
        let mut inner = self.inner.write().await;
        inner.revoked.retain(|_, exp| *exp > now);
        inner.revoked.insert(token.to_string(), expires_at);
    }

    pub(crate) async fn is_revoked(&self, token: &str) -> bool {
        self.inner.read().await.revoked.contains_key(token)
    }
}
