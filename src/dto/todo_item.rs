use crate::domain;
use crate::domain::not_blank;
use chrono::{DateTime, Utc};
use derive_more::Display;
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

/// DTO for creating a new todo item via the API
#[derive(Deserialize, Display, Validate, ToSchema)]
#[display("\"{title}\"")]
#[serde(rename_all = "camelCase")]
#[cfg_attr(test, derive(Serialize))]
pub struct NewTodoItem {
    #[validate(length(min = 1, max = 200), custom = "not_blank")]
    #[schema(example = "Buy groceries")]
    pub title: String,
    #[validate(length(max = 1000))]
    #[schema(example = "Milk, eggs, bread")]
    pub description: Option<String>,
}

impl From<NewTodoItem> for domain::todo_item::NewTodoItem {
    fn from(value: NewTodoItem) -> Self {
        domain::todo_item::NewTodoItem {
            title: value.title,
            description: value.description,
        }
    }
}

/// DTO for replacing the content of a todo item via the API. Every field overwrites the
/// stored value, so leaving out `description` clears it.
#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
#[cfg_attr(test, derive(Serialize))]
pub struct UpdateTodoItem {
    /// Must match the ID in the request path when provided
    #[schema(example = 10)]
    pub id: Option<i32>,
    #[validate(length(min = 1, max = 200), custom = "not_blank")]
    #[schema(example = "Buy groceries")]
    pub title: String,
    #[validate(length(max = 1000))]
    #[schema(example = "Milk, eggs, bread")]
    pub description: Option<String>,
    #[serde(default)]
    #[schema(example = true)]
    pub is_completed: bool,
}

impl From<UpdateTodoItem> for domain::todo_item::UpdateTodoItem {
    fn from(value: UpdateTodoItem) -> Self {
        domain::todo_item::UpdateTodoItem {
            title: value.title,
            description: value.description,
            is_completed: value.is_completed,
        }
    }
}

/// DTO for a todo item returned from the API
#[derive(Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
#[cfg_attr(test, derive(Deserialize, PartialEq, Eq, Debug))]
pub struct TodoItem {
    #[schema(example = 10)]
    pub id: i32,
    #[schema(example = "Buy groceries")]
    pub title: String,
    #[schema(example = "Milk, eggs, bread")]
    pub description: Option<String>,
    #[schema(example = false)]
    pub is_completed: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<domain::todo_item::TodoItem> for TodoItem {
    fn from(value: domain::todo_item::TodoItem) -> Self {
        TodoItem {
            id: value.id,
            title: value.title,
            description: value.description,
            is_completed: value.is_completed,
            created_at: value.created_at,
            updated_at: value.updated_at,
        }
    }
}

/// Query string for narrowing the todo item list down by completion status
#[derive(Debug, Default, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct StatusFilter {
    /// Only return items with this completion status
    pub is_completed: Option<bool>,
}
