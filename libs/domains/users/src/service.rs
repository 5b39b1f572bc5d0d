use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tracing::instrument;
use uuid::Uuid;

use crate::error::{UserError, UserResult};
use crate::models::User;
use crate::repository::UserRepository;

/// User use cases over an injected [`UserRepository`].
///
/// Holds no per-request state, so one instance is shared by all handlers.
pub struct UserService<R: UserRepository> {
    repository: Arc<R>,
    store_timeout: Option<Duration>,
}

impl<R: UserRepository> Clone for UserService<R> {
    fn clone(&self) -> Self {
        Self {
            repository: Arc::clone(&self.repository),
            store_timeout: self.store_timeout,
        }
    }
}

impl<R: UserRepository> UserService<R> {
    pub fn new(repository: R) -> Self {
        Self::from_shared(Arc::new(repository))
    }

    pub fn from_shared(repository: Arc<R>) -> Self {
        Self {
            repository,
            store_timeout: None,
        }
    }

    /// Every store call fails with [`UserError::Timeout`] once `timeout` elapses.
    pub fn with_store_timeout(repository: R, timeout: Duration) -> Self {
        Self {
            repository: Arc::new(repository),
            store_timeout: Some(timeout),
        }
    }

    async fn store<T>(&self, call: impl Future<Output = UserResult<T>>) -> UserResult<T> {
        match self.store_timeout {
            Some(timeout) => tokio::time::timeout(timeout, call)
                .await
                .map_err(|_| UserError::Timeout(timeout))?,
            None => call.await,
        }
    }

    /// Register a new user; the email must not belong to a live user.
    #[instrument(skip(self, name))]
    pub async fn create_user(&self, email: &str, name: &str) -> UserResult<User> {
        match self.store(self.repository.get_by_email(email)).await {
            Ok(_) => return Err(UserError::DuplicateEmail(email.to_string())),
            Err(UserError::NotFound) => {}
            Err(err) => return Err(err),
        }

        let user = User::new(email, name)?;
        self.store(self.repository.create(&user)).await?;

        Ok(user)
    }

    #[instrument(skip(self))]
    pub async fn get_user(&self, id: Uuid) -> UserResult<User> {
        self.store(self.repository.get_by_id(id)).await
    }

    #[instrument(skip(self))]
    pub async fn get_user_by_email(&self, email: &str) -> UserResult<User> {
        self.store(self.repository.get_by_email(email)).await
    }

    /// Rename a user and persist the whole entity.
    #[instrument(skip(self, name))]
    pub async fn update_user(&self, id: Uuid, name: &str) -> UserResult<User> {
        let mut user = self.store(self.repository.get_by_id(id)).await?;
        user.rename(name)?;
        self.store(self.repository.update(&user)).await?;

        Ok(user)
    }

    #[instrument(skip(self))]
    pub async fn delete_user(&self, id: Uuid) -> UserResult<()> {
        self.store(self.repository.delete(id)).await
    }

    /// Newest first. Page bounds are the caller's concern.
    #[instrument(skip(self))]
    pub async fn list_users(&self, limit: u64, offset: u64) -> UserResult<Vec<User>> {
        self.store(self.repository.list(limit, offset)).await
    }
}
