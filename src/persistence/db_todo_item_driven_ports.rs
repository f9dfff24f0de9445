use crate::domain;
use crate::domain::todo_item::{NewTodoItem, TodoItem};
use crate::external_connections::{ConnectionHandle, ExternalConnectivity};
use anyhow::{Context, Error};
use chrono::{DateTime, Utc};
use sqlx::{FromRow, query, query_as};

pub struct DbTodoItemReader;

#[derive(FromRow)]
struct TodoItemRow {
    id: i32,
    title: String,
    description: Option<String>,
    is_completed: bool,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<TodoItemRow> for domain::todo_item::TodoItem {
    fn from(value: TodoItemRow) -> Self {
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

impl domain::todo_item::driven_ports::TodoItemReader for DbTodoItemReader {
    async fn all_items(
        &self,
        ext_cxn: &mut impl ExternalConnectivity,
    ) -> Result<Vec<TodoItem>, Error> {
        let mut cxn = ext_cxn.database_cxn().await?;

        let todo_items: Vec<TodoItem> = query_as::<_, TodoItemRow>(
            "SELECT ti.* FROM todo_item ti ORDER BY ti.created_at DESC, ti.id DESC",
        )
        .fetch_all(cxn.borrow_connection())
        .await
        .context("trying to fetch all todo items")?
        .into_iter()
        .map(TodoItem::from)
        .collect();

        Ok(todo_items)
    }

    async fn item_by_id(
        &self,
        item_id: i32,
        ext_cxn: &mut impl ExternalConnectivity,
    ) -> Result<Option<TodoItem>, Error> {
        let mut cxn = ext_cxn.database_cxn().await?;

        let todo_item: Option<TodoItem> =
            query_as::<_, TodoItemRow>("SELECT ti.* FROM todo_item ti WHERE ti.id = $1")
                .bind(item_id)
                .fetch_optional(cxn.borrow_connection())
                .await
                .context("trying to fetch a todo item by ID")?
                .map(TodoItem::from);

        Ok(todo_item)
    }

    async fn items_by_status(
        &self,
        is_completed: bool,
        ext_cxn: &mut impl ExternalConnectivity,
    ) -> Result<Vec<TodoItem>, Error> {
        let mut cxn = ext_cxn.database_cxn().await?;

        let todo_items: Vec<TodoItem> = query_as::<_, TodoItemRow>(
            "SELECT ti.* FROM todo_item ti WHERE ti.is_completed = $1 ORDER BY ti.created_at DESC, ti.id DESC",
        )
        .bind(is_completed)
        .fetch_all(cxn.borrow_connection())
        .await
        .context("trying to fetch todo items by completion status")?
        .into_iter()
        .map(TodoItem::from)
        .collect();

        Ok(todo_items)
    }
}

pub struct DbTodoItemWriter;

impl domain::todo_item::driven_ports::TodoItemWriter for DbTodoItemWriter {
    async fn insert(
        &self,
        new_item: &NewTodoItem,
        timestamp: DateTime<Utc>,
        ext_cxn: &mut impl ExternalConnectivity,
    ) -> Result<TodoItem, Error> {
        let mut cxn = ext_cxn.database_cxn().await?;

        let inserted = query_as::<_, TodoItemRow>(
            "INSERT INTO todo_item(title, description, is_completed, created_at, updated_at) \
             VALUES ($1, $2, FALSE, $3, $3) RETURNING *",
        )
        .bind(&new_item.title)
        .bind(&new_item.description)
        .bind(timestamp)
        .fetch_one(cxn.borrow_connection())
        .await
        .context("trying to insert a new todo item into the database")?;

        Ok(inserted.into())
    }

    async fn update(
        &self,
        item: &TodoItem,
        ext_cxn: &mut impl ExternalConnectivity,
    ) -> Result<bool, Error> {
        let mut cxn = ext_cxn.database_cxn().await?;

        let result = query(
            "UPDATE todo_item SET title = $1, description = $2, is_completed = $3, updated_at = $4 \
             WHERE id = $5",
        )
        .bind(&item.title)
        .bind(&item.description)
        .bind(item.is_completed)
        .bind(item.updated_at)
        .bind(item.id)
        .execute(cxn.borrow_connection())
        .await
        .context("trying to update a todo item in the database")?;

        Ok(result.rows_affected() > 0)
    }

    async fn delete(
        &self,
        item_id: i32,
        ext_cxn: &mut impl ExternalConnectivity,
    ) -> Result<bool, Error> {
        let mut cxn = ext_cxn.database_cxn().await?;

        let result = query("DELETE FROM todo_item WHERE id = $1")
            .bind(item_id)
            .execute(cxn.borrow_connection())
            .await
            .context("trying to remove a todo item from the database")?;

        Ok(result.rows_affected() > 0)
    }
}
