use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use super::{duplicate_key, TodoStore, UserDirectory};
use crate::error::AppError;
use crate::models::{normalize_key, NewUser, Todo, TodoQuery, User};

const TODO_COLUMNS: &str =
    "id, owner_id, title, description, completed, deadline, created_at, updated_at";

/// Users table backed directory. The `UNIQUE` constraint on `email` is the source of truth
/// for key uniqueness.
#[derive(Clone)]
pub struct PgUserDirectory {
    pool: PgPool,
}

impl PgUserDirectory {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UserDirectory for PgUserDirectory {
    async fn find_by_key(&self, key: &str) -> Result<Option<User>, AppError> {
        let user = sqlx::query_as::<_, User>(
            "SELECT id, email, username, password_hash, created_at FROM users WHERE email = $1",
        )
        .bind(normalize_key(key))
        .fetch_optional(&self.pool)
        .await?;
        Ok(user)
    }

    async fn exists_by_key(&self, key: &str) -> Result<bool, AppError> {
        let exists: (bool,) =
            sqlx::query_as("SELECT EXISTS(SELECT 1 FROM users WHERE email = $1)")
                .bind(normalize_key(key))
                .fetch_one(&self.pool)
                .await?;
        Ok(exists.0)
    }

    async fn create(&self, user: NewUser) -> Result<User, AppError> {
        let user = User::new(user);
        sqlx::query_as::<_, User>(
            "INSERT INTO users (id, email, username, password_hash, created_at)
             VALUES ($1, $2, $3, $4, $5)
             RETURNING id, email, username, password_hash, created_at",
        )
        .bind(user.id)
        .bind(&user.email)
        .bind(&user.username)
        .bind(&user.password_hash)
        .bind(user.created_at)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| match e {
            sqlx::Error::Database(ref db) if db.is_unique_violation() => duplicate_key(&user.email),
            other => other.into(),
        })
    }
}

#[derive(Clone)]
pub struct PgTodoStore {
    pool: PgPool,
}

impl PgTodoStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl TodoStore for PgTodoStore {
    async fn insert(&self, todo: Todo) -> Result<Todo, AppError> {
        let sql = format!(
            "INSERT INTO todos ({cols}) VALUES ($1, $2, $3, $4, $5, $6, $7, $8) RETURNING {cols}",
            cols = TODO_COLUMNS
        );
        let todo = sqlx::query_as::<_, Todo>(&sql)
            .bind(todo.id)
            .bind(todo.owner_id)
            .bind(todo.title)
            .bind(todo.description)
            .bind(todo.completed)
            .bind(todo.deadline)
            .bind(todo.created_at)
            .bind(todo.updated_at)
            .fetch_one(&self.pool)
            .await?;
        Ok(todo)
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Todo>, AppError> {
        let sql = format!("SELECT {} FROM todos WHERE id = $1", TODO_COLUMNS);
        let todo = sqlx::query_as::<_, Todo>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(todo)
    }

    async fn list_by_owner(
        &self,
        owner_id: Uuid,
        query: &TodoQuery,
    ) -> Result<Vec<Todo>, AppError> {
        let sql = format!(
            "SELECT {} FROM todos
             WHERE owner_id = $1 AND ($2::BOOLEAN IS NULL OR completed = $2)
             ORDER BY created_at DESC",
            TODO_COLUMNS
        );
        let todos = sqlx::query_as::<_, Todo>(&sql)
            .bind(owner_id)
            .bind(query.completed)
            .fetch_all(&self.pool)
            .await?;
        Ok(todos)
    }

    async fn update(&self, todo: Todo) -> Result<Todo, AppError> {
        let sql = format!(
            "UPDATE todos
             SET title = $1, description = $2, completed = $3, deadline = $4, updated_at = $5
             WHERE id = $6
             RETURNING {}",
            TODO_COLUMNS
        );
        let todo = sqlx::query_as::<_, Todo>(&sql)
            .bind(todo.title)
            .bind(todo.description)
            .bind(todo.completed)
            .bind(todo.deadline)
            .bind(todo.updated_at)
            .bind(todo.id)
            .fetch_optional(&self.pool)
            .await?;
        todo.ok_or_else(|| AppError::NotFound("Todo not found".into()))
    }

    async fn delete(&self, id: Uuid) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM todos WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
