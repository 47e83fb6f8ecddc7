use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;
use uuid::Uuid;

use super::{duplicate_key, TodoStore, UserDirectory};
use crate::error::AppError;
use crate::models::{normalize_key, NewUser, Todo, TodoQuery, User};

/// Users keyed by normalized email. Check and insert happen under one write lock.
#[derive(Default)]
pub struct InMemoryUserDirectory {
    users: RwLock<HashMap<String, User>>,
}

impl InMemoryUserDirectory {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl UserDirectory for InMemoryUserDirectory {
    async fn find_by_key(&self, key: &str) -> Result<Option<User>, AppError> {
        Ok(self.users.read().await.get(&normalize_key(key)).cloned())
    }

    async fn create(&self, user: NewUser) -> Result<User, AppError> {
        let user = User::new(user);
        let mut users = self.users.write().await;
        if users.contains_key(&user.email) {
            return Err(duplicate_key(&user.email));
        }
        users.insert(user.email.clone(), user.clone());
        Ok(user)
    }
}

#[derive(Default)]
pub struct InMemoryTodoStore {
    todos: RwLock<HashMap<Uuid, Todo>>,
}

impl InMemoryTodoStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl TodoStore for InMemoryTodoStore {
    async fn insert(&self, todo: Todo) -> Result<Todo, AppError> {
        self.todos.write().await.insert(todo.id, todo.clone());
        Ok(todo)
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Todo>, AppError> {
        Ok(self.todos.read().await.get(&id).cloned())
    }

    async fn list_by_owner(
        &self,
        owner_id: Uuid,
        query: &TodoQuery,
    ) -> Result<Vec<Todo>, AppError> {
        let mut todos: Vec<Todo> = self
            .todos
            .read()
            .await
            .values()
            .filter(|t| t.owner_id == owner_id)
            .filter(|t| query.completed.map_or(true, |c| t.completed == c))
            .cloned()
            .collect();
        todos.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(todos)
    }

    async fn update(&self, todo: Todo) -> Result<Todo, AppError> {
        let mut todos = self.todos.write().await;
        let stored = todos
            .get_mut(&todo.id)
            .ok_or_else(|| AppError::NotFound("Todo not found".into()))?;

        stored.title = todo.title;
        stored.description = todo.description;
        stored.completed = todo.completed;
        stored.deadline = todo.deadline;
        stored.updated_at = todo.updated_at;
        Ok(stored.clone())
    }

    async fn delete(&self, id: Uuid) -> Result<bool, AppError> {
        Ok(self.todos.write().await.remove(&id).is_some())
    }
}
