use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;
use validator::Validate;

/// Input structure for creating or updating a todo item.
#[derive(Debug, Serialize, Deserialize, Validate)]
pub struct TodoInput {
    /// The title of the item. Must be between 1 and 100 characters.
    #[validate(length(min = 1, max = 100))]
    pub title: String,

    /// Optional free-form description, capped at 1000 characters.
    #[validate(length(max = 1000))]
    pub description: Option<String>,

    /// Completion flag; omitted means not completed.
    #[serde(default)]
    pub completed: bool,
}

/// A todo item as stored and returned by the API. Each item belongs to
/// exactly one account and is removed with it.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Todo {
    pub id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub completed: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    /// Identifier of the owning account.
    pub user_id: Uuid,
}

impl Todo {
    pub fn new(input: TodoInput, user_id: Uuid) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            title: input.title,
            description: input.description,
            completed: input.completed,
            created_at: now,
            updated_at: now,
            user_id,
        }
    }

    /// Applies an update payload in place, refreshing `updated_at`.
    pub fn apply(&mut self, input: TodoInput) {
        self.title = input.title;
        self.description = input.description;
        self.completed = input.completed;
        self.updated_at = Utc::now();
    }
}
