use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;
use validator::Validate;

use crate::auth::policy::Owned;

/// Input structure for creating a todo.
///
/// There is deliberately no owner field: the owner is always the authenticated caller,
/// and any `owner_id` a client sends is dropped during deserialization.
#[derive(Debug, Serialize, Deserialize, Validate)]
pub struct TodoInput {
    /// Must be between 1 and 200 characters.
    #[validate(length(min = 1, max = 200))]
    pub title: String,

    /// Maximum length of 1000 characters if provided.
    #[validate(length(max = 1000))]
    pub description: Option<String>,

    #[serde(default)]
    pub completed: bool,

    pub deadline: Option<DateTime<Utc>>,
}

/// Partial update for an existing todo. Absent fields are left unchanged.
#[derive(Debug, Default, Serialize, Deserialize, Validate)]
pub struct TodoPatch {
    #[validate(length(min = 1, max = 200))]
    pub title: Option<String>,

    #[validate(length(max = 1000))]
    pub description: Option<String>,

    pub completed: Option<bool>,

    pub deadline: Option<DateTime<Utc>>,
}

/// A task record as stored and returned by the API.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct Todo {
    pub id: Uuid,
    /// Set once at creation from the caller's identity, never reassigned.
    pub owner_id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub completed: bool,
    pub deadline: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Query parameters accepted when listing the caller's todos.
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct TodoQuery {
    pub completed: Option<bool>,
}

impl Todo {
    pub fn new(input: TodoInput, owner_id: Uuid) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            owner_id,
            title: input.title,
            description: input.description,
            completed: input.completed,
            deadline: input.deadline,
            created_at: now,
            updated_at: now,
        }
    }

    /// Applies the present fields of `patch` and bumps `updated_at`.
    pub fn apply(&mut self, patch: TodoPatch) {
        if let Some(title) = patch.title {
            self.title = title;
        }
        if let Some(description) = patch.description {
            self.description = Some(description);
        }
        if let Some(completed) = patch.completed {
            self.completed = completed;
        }
        if let Some(deadline) = patch.deadline {
            self.deadline = Some(deadline);
        }
        self.updated_at = Utc::now();
    }
}

impl Owned for Todo {
    fn owner_id(&self) -> Uuid {
        self.owner_id
    }
}
