//! Persistence seams.
//!
//! Handlers only see these traits. Ownership is never enforced here: stores return whatever
//! they hold and `AccessPolicy` decides what the caller may see. `list_by_owner` filters by
//! owner purely as a query optimization.

pub mod memory;
pub mod postgres;

use async_trait::async_trait;
use uuid::Uuid;

use crate::error::AppError;
use crate::models::{NewUser, Todo, TodoQuery, User};

pub use memory::{InMemoryTodoStore, InMemoryUserDirectory};
pub use postgres::{PgTodoStore, PgUserDirectory};

#[async_trait]
pub trait UserDirectory: Send + Sync {
    /// Exact match on the normalized key. Absence is `Ok(None)`.
    async fn find_by_key(&self, key: &str) -> Result<Option<User>, AppError>;

    async fn exists_by_key(&self, key: &str) -> Result<bool, AppError> {
        Ok(self.find_by_key(key).await?.is_some())
    }

    /// Fails with `AppError::DuplicateKey` if the key is taken, even under concurrent inserts.
    async fn create(&self, user: NewUser) -> Result<User, AppError>;
}

#[async_trait]
pub trait TodoStore: Send + Sync {
    async fn insert(&self, todo: Todo) -> Result<Todo, AppError>;

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Todo>, AppError>;

    /// Newest first.
    async fn list_by_owner(&self, owner_id: Uuid, query: &TodoQuery)
        -> Result<Vec<Todo>, AppError>;

    /// Persists the mutable fields of `todo`. The owner column is never rewritten.
    async fn update(&self, todo: Todo) -> Result<Todo, AppError>;

    /// Returns whether a row was removed.
    async fn delete(&self, id: Uuid) -> Result<bool, AppError>;
}

pub(crate) fn duplicate_key(key: &str) -> AppError {
    AppError::DuplicateKey(format!("An account with key '{}' already exists", key))
}
