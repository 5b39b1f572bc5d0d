use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::error::{UserError, UserResult};
use crate::models::User;

/// Persistence port for users.
///
/// Implementations only ever see and return live users: a deleted user is
/// invisible to every method and frees its email for reuse.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Persist a new user. Fails with `DuplicateEmail` if a live user already has the email.
    async fn create(&self, user: &User) -> UserResult<()>;

    async fn get_by_id(&self, id: Uuid) -> UserResult<User>;

    async fn get_by_email(&self, email: &str) -> UserResult<User>;

    /// Overwrite the mutable state of the live user with the same id.
    async fn update(&self, user: &User) -> UserResult<()>;

    /// Soft delete.
    async fn delete(&self, id: Uuid) -> UserResult<()>;

    /// Newest first.
    async fn list(&self, limit: u64, offset: u64) -> UserResult<Vec<User>>;
}

#[derive(Debug, Clone)]
struct StoredUser {
    user: User,
    deleted_at: Option<DateTime<Utc>>,
}

impl StoredUser {
    fn live(&self) -> Option<&User> {
        self.deleted_at.is_none().then_some(&self.user)
    }
}

/// In-memory implementation of UserRepository (for development/testing)
#[derive(Debug, Default, Clone)]
pub struct InMemoryUserRepository {
    users: Arc<RwLock<HashMap<Uuid, StoredUser>>>,
}

impl InMemoryUserRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl UserRepository for InMemoryUserRepository {
    async fn create(&self, user: &User) -> UserResult<()> {
        let mut users = self.users.write().await;

        let taken = users
            .values()
            .filter_map(StoredUser::live)
            .any(|existing| existing.email() == user.email());
        if taken {
            return Err(UserError::DuplicateEmail(user.email().to_string()));
        }

        users.insert(
            user.id(),
            StoredUser {
                user: user.clone(),
                deleted_at: None,
            },
        );
        Ok(())
    }

    async fn get_by_id(&self, id: Uuid) -> UserResult<User> {
        let users = self.users.read().await;
        users
            .get(&id)
            .and_then(StoredUser::live)
            .cloned()
            .ok_or(UserError::NotFound)
    }

    async fn get_by_email(&self, email: &str) -> UserResult<User> {
        let users = self.users.read().await;
        users
            .values()
            .filter_map(StoredUser::live)
            .find(|user| user.email() == email)
            .cloned()
            .ok_or(UserError::NotFound)
    }

    async fn update(&self, user: &User) -> UserResult<()> {
        let mut users = self.users.write().await;
        match users.get_mut(&user.id()) {
            Some(stored) if stored.deleted_at.is_none() => {
                stored.user = user.clone();
                Ok(())
            }
            _ => Err(UserError::NotFound),
        }
    }

    async fn delete(&self, id: Uuid) -> UserResult<()> {
        let mut users = self.users.write().await;
        match users.get_mut(&id) {
            Some(stored) if stored.deleted_at.is_none() => {
                stored.deleted_at = Some(Utc::now());
                Ok(())
            }
            _ => Err(UserError::NotFound),
        }
    }

    async fn list(&self, limit: u64, offset: u64) -> UserResult<Vec<User>> {
        let users = self.users.read().await;

        let mut live: Vec<&User> = users.values().filter_map(StoredUser::live).collect();
        live.sort_by(|a, b| {
            b.created_at()
                .cmp(&a.created_at())
                .then_with(|| b.id().cmp(&a.id()))
        });

        let offset = usize::try_from(offset).unwrap_or(usize::MAX);
        let limit = usize::try_from(limit).unwrap_or(usize::MAX);

        Ok(live.into_iter().skip(offset).take(limit).cloned().collect())
    }
}
