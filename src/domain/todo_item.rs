use crate::domain::not_blank;
use crate::domain::todo_item::driven_ports::{Clock, SystemClock, TodoItemReader, TodoItemWriter};
use crate::domain::todo_item::driving_ports::TodoItemError;
use crate::external_connections::ExternalConnectivity;
use anyhow::Context;
use chrono::{DateTime, Utc};
use tracing::{error, info, warn};
use validator::Validate;

#[derive(PartialEq, Eq, Debug, Clone)]
pub struct TodoItem {
    pub id: i32,
    pub title: String,
    pub description: Option<String>,
    pub is_completed: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl TodoItem {
    /// Replaces every caller-editable field with the content of [update]. A missing description
    /// in the update clears the stored one.
    pub fn apply_update(&mut self, update: &UpdateTodoItem, at: DateTime<Utc>) {
        self.title = update.title.clone();
        self.description = update.description.clone();
        self.is_completed = update.is_completed;
        self.touch(at);
    }

    /// Flips the completion flag
    pub fn toggle(&mut self, at: DateTime<Utc>) {
        self.is_completed = !self.is_completed;
        self.touch(at);
    }

    // updated_at may never precede created_at, even if the wall clock steps backwards
    fn touch(&mut self, at: DateTime<Utc>) {
        self.updated_at = at.max(self.created_at);
    }
}

#[derive(Debug, Validate)]
#[cfg_attr(test, derive(Clone, PartialEq, Eq))]
pub struct NewTodoItem {
    #[validate(length(max = 200), custom = "not_blank")]
    pub title: String,
    #[validate(length(max = 1000))]
    pub description: Option<String>,
}

#[derive(Debug, Validate)]
#[cfg_attr(test, derive(Clone, PartialEq, Eq))]
pub struct UpdateTodoItem {
    #[validate(length(max = 200), custom = "not_blank")]
    pub title: String,
    #[validate(length(max = 1000))]
    pub description: Option<String>,
    pub is_completed: bool,
}

pub mod driven_ports {
    use super::*;
    use crate::external_connections::ExternalConnectivity;
    use chrono::SubsecRound;

    pub trait TodoItemReader {
        /// Every stored item, newest first
        async fn all_items(
            &self,
            ext_cxn: &mut impl ExternalConnectivity,
        ) -> Result<Vec<TodoItem>, anyhow::Error>;
        async fn item_by_id(
            &self,
            item_id: i32,
            ext_cxn: &mut impl ExternalConnectivity,
        ) -> Result<Option<TodoItem>, anyhow::Error>;
        /// Items whose completion flag matches [is_completed], newest first
        async fn items_by_status(
            &self,
            is_completed: bool,
            ext_cxn: &mut impl ExternalConnectivity,
        ) -> Result<Vec<TodoItem>, anyhow::Error>;
    }

    pub trait TodoItemWriter {
        /// Stores a new, incomplete item stamped with [timestamp] as both its creation
        /// and last update time. Returns the stored item with its generated ID.
        async fn insert(
            &self,
            new_item: &NewTodoItem,
            timestamp: DateTime<Utc>,
            ext_cxn: &mut impl ExternalConnectivity,
        ) -> Result<TodoItem, anyhow::Error>;

        /// Overwrites the mutable fields of the stored item with the same ID.
        /// Returns false if no such item exists.
        async fn update(
            &self,
            item: &TodoItem,
            ext_cxn: &mut impl ExternalConnectivity,
        ) -> Result<bool, anyhow::Error>;

        /// Returns false if there was nothing to delete
        async fn delete(
            &self,
            item_id: i32,
            ext_cxn: &mut impl ExternalConnectivity,
        ) -> Result<bool, anyhow::Error>;
    }

    /// Source of the timestamps stamped onto todo items
    pub trait Clock {
        fn now(&self) -> DateTime<Utc>;
    }

    /// Reads the system's wall clock at microsecond precision, the finest PostgreSQL
    /// TIMESTAMPTZ stores, so stamped items match what gets read back
    pub struct SystemClock;

    impl Clock for SystemClock {
        fn now(&self) -> DateTime<Utc> {
            Utc::now().trunc_subsecs(6)
        }
    }
}

pub mod driving_ports {
    use super::*;
    use thiserror::Error;
    use validator::ValidationErrors;

    #[derive(Debug, Error)]
    pub enum TodoItemError {
        #[error("todo item input was invalid: {0}")]
        Invalid(ValidationErrors),
        #[error("todo item {0} does not exist")]
        NotFound(i32),
        #[error(transparent)]
        PortError(#[from] anyhow::Error),
    }

    impl From<ValidationErrors> for TodoItemError {
        fn from(value: ValidationErrors) -> Self {
            Self::Invalid(value)
        }
    }


    pub trait TodoItemPort {
        async fn all_items(
            &self,
            ext_cxn: &mut impl ExternalConnectivity,
            item_read: &impl driven_ports::TodoItemReader,
        ) -> Result<Vec<TodoItem>, TodoItemError>;
        async fn item_by_id(
            &self,
            item_id: i32,
            ext_cxn: &mut impl ExternalConnectivity,
            item_read: &impl driven_ports::TodoItemReader,
        ) -> Result<TodoItem, TodoItemError>;
        async fn items_by_status(
            &self,
            is_completed: bool,
            ext_cxn: &mut impl ExternalConnectivity,
            item_read: &impl driven_ports::TodoItemReader,
        ) -> Result<Vec<TodoItem>, TodoItemError>;
        async fn create_item(
            &self,
            new_item: &NewTodoItem,
            ext_cxn: &mut impl ExternalConnectivity,
            item_write: &impl driven_ports::TodoItemWriter,
        ) -> Result<TodoItem, TodoItemError>;
        async fn update_item(
            &self,
            item_id: i32,
            update: &UpdateTodoItem,
            ext_cxn: &mut impl ExternalConnectivity,
            item_read: &impl driven_ports::TodoItemReader,
            item_write: &impl driven_ports::TodoItemWriter,
        ) -> Result<TodoItem, TodoItemError>;
        async fn toggle_item(
            &self,
            item_id: i32,
            ext_cxn: &mut impl ExternalConnectivity,
            item_read: &impl driven_ports::TodoItemReader,
            item_write: &impl driven_ports::TodoItemWriter,
        ) -> Result<TodoItem, TodoItemError>;
        /// Returns false rather than an error when the item doesn't exist
        async fn delete_item(
            &self,
            item_id: i32,
            ext_cxn: &mut impl ExternalConnectivity,
            item_write: &impl driven_ports::TodoItemWriter,
        ) -> Result<bool, TodoItemError>;
    }
}

pub struct TodoItemService<C = SystemClock> {
    clock: C,
}

impl TodoItemService {
    pub fn new() -> TodoItemService {
        TodoItemService { clock: SystemClock }
    }
}

impl Default for TodoItemService {
    fn default() -> Self {
        Self::new()
    }
}

impl<C: Clock> TodoItemService<C> {
    pub fn with_clock(clock: C) -> TodoItemService<C> {
        TodoItemService { clock }
    }

    async fn existing_item(
        &self,
        item_id: i32,
        ext_cxn: &mut impl ExternalConnectivity,
        item_read: &impl TodoItemReader,
    ) -> Result<TodoItem, TodoItemError> {
        let found = item_read
            .item_by_id(item_id, &mut *ext_cxn)
            .await
            .context("looking up a todo item by ID")
            .inspect_err(|err| error!(item_id, "Todo item lookup failure: {err:#}"))?;

        match found {
            Some(item) => Ok(item),
            None => {
                warn!(item_id, "Todo item does not exist");
                Err(TodoItemError::NotFound(item_id))
            }
        }
    }

    async fn save_changes(
        &self,
        item: TodoItem,
        ext_cxn: &mut impl ExternalConnectivity,
        item_write: &impl TodoItemWriter,
    ) -> Result<TodoItem, TodoItemError> {
        let item_id = item.id;
        let was_updated = item_write
            .update(&item, &mut *ext_cxn)
            .await
            .context("saving changes to a todo item")
            .inspect_err(|err| error!(item_id, "Todo item save failure: {err:#}"))?;

        if !was_updated {
            warn!(item_id, "Todo item disappeared before changes could be saved");
            return Err(TodoItemError::NotFound(item_id));
        }

        Ok(item)
    }
}

impl<C: Clock + Sync> driving_ports::TodoItemPort for TodoItemService<C> {
    async fn all_items(
        &self,
        ext_cxn: &mut impl ExternalConnectivity,
        item_read: &impl TodoItemReader,
    ) -> Result<Vec<TodoItem>, TodoItemError> {
        info!("Fetching all todo items");
        let items = item_read
            .all_items(&mut *ext_cxn)
            .await
            .context("fetching all todo items")
            .inspect_err(|err| error!("Todo item listing failure: {err:#}"))?;

        info!(count = items.len(), "Fetched todo items");
        Ok(items)
    }

    async fn item_by_id(
        &self,
        item_id: i32,
        ext_cxn: &mut impl ExternalConnectivity,
        item_read: &impl TodoItemReader,
    ) -> Result<TodoItem, TodoItemError> {
        info!(item_id, "Fetching todo item");
        self.existing_item(item_id, ext_cxn, item_read).await
    }

    async fn items_by_status(
        &self,
        is_completed: bool,
        ext_cxn: &mut impl ExternalConnectivity,
        item_read: &impl TodoItemReader,
    ) -> Result<Vec<TodoItem>, TodoItemError> {
        info!(is_completed, "Fetching todo items by completion status");
        let items = item_read
            .items_by_status(is_completed, &mut *ext_cxn)
            .await
            .context("fetching todo items by completion status")
            .inspect_err(|err| error!(is_completed, "Todo item listing failure: {err:#}"))?;

        info!(count = items.len(), is_completed, "Fetched todo items");
        Ok(items)
    }

    async fn create_item(
        &self,
        new_item: &NewTodoItem,
        ext_cxn: &mut impl ExternalConnectivity,
        item_write: &impl TodoItemWriter,
    ) -> Result<TodoItem, TodoItemError> {
        info!(title = %new_item.title, "Creating todo item");
        new_item
            .validate()
            .inspect_err(|issues| warn!("Rejected new todo item: {issues}"))?;

        let created = item_write
            .insert(new_item, self.clock.now(), &mut *ext_cxn)
            .await
            .context("inserting a new todo item")
            .inspect_err(|err| error!("Todo item create failure: {err:#}"))?;

        info!(item_id = created.id, "Created todo item");
        Ok(created)
    }

    async fn update_item(
        &self,
        item_id: i32,
        update: &UpdateTodoItem,
        ext_cxn: &mut impl ExternalConnectivity,
        item_read: &impl TodoItemReader,
        item_write: &impl TodoItemWriter,
    ) -> Result<TodoItem, TodoItemError> {
        info!(item_id, "Updating todo item");
        update
            .validate()
            .inspect_err(|issues| warn!(item_id, "Rejected todo item update: {issues}"))?;

        let mut item = self.existing_item(item_id, &mut *ext_cxn, item_read).await?;
        item.apply_update(update, self.clock.now());
        let updated = self.save_changes(item, &mut *ext_cxn, item_write).await?;

        info!(item_id, "Updated todo item");
        Ok(updated)
    }

    async fn toggle_item(
        &self,
        item_id: i32,
        ext_cxn: &mut impl ExternalConnectivity,
        item_read: &impl TodoItemReader,
        item_write: &impl TodoItemWriter,
    ) -> Result<TodoItem, TodoItemError> {
        info!(item_id, "Toggling todo item");
        let mut item = self.existing_item(item_id, &mut *ext_cxn, item_read).await?;
        item.toggle(self.clock.now());
        let toggled = self.save_changes(item, &mut *ext_cxn, item_write).await?;

        info!(
            item_id,
            is_completed = toggled.is_completed,
            "Toggled todo item"
        );
        Ok(toggled)
    }

    async fn delete_item(
        &self,
        item_id: i32,
        ext_cxn: &mut impl ExternalConnectivity,
        item_write: &impl TodoItemWriter,
    ) -> Result<bool, TodoItemError> {
        info!(item_id, "Deleting todo item");
        let was_deleted = item_write
            .delete(item_id, &mut *ext_cxn)
            .await
            .context("deleting a todo item")
            .inspect_err(|err| error!(item_id, "Todo item delete failure: {err:#}"))?;

        if was_deleted {
            info!(item_id, "Deleted todo item");
        } else {
            warn!(item_id, "Todo item to delete does not exist");
        }
        Ok(was_deleted)
    }
}
