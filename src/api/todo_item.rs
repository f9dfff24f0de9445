use crate::domain::todo_item::driven_ports::{TodoItemReader, TodoItemWriter};
use crate::domain::todo_item::driving_ports::TodoItemPort;
use crate::external_connections::ExternalConnectivity;
use crate::routing_utils::{
    InvalidRequestResponse, Json, NotFoundResponse, Path, TodoItemErrorResponse,
    ValidationErrorResponse,
};
use crate::{AppState, SharedData, domain, dto, persistence};
use axum::Router;
use axum::extract::{Query, State};
use axum::http::{StatusCode, header};
use axum::response::ErrorResponse;
use axum::routing::{get, patch};
use std::sync::Arc;
use tracing::{info, warn};
use utoipa::OpenApi;
use validator::Validate;

#[derive(OpenApi)]
#[openapi(
    paths(
        list_todo_items,
        get_todo_item,
        create_todo_item,
        update_todo_item,
        toggle_todo_item,
        delete_todo_item
    ),
    tags((name = "Todo Items", description = "Create, read, update, toggle, and delete todo items"))
)]
/// Defines the OpenAPI documentation for the todo item API
pub struct TodoItemApi;

/// Builds a router for everything under "/todoitems"
pub fn todo_item_routes() -> Router<Arc<SharedData>> {
    Router::new()
        .route(
            "/",
            get(
                |State(app_state): AppState, Query(filter): Query<dto::StatusFilter>| async move {
                    let mut ext_cxn = app_state.ext_cxn.clone();
                    let item_service = domain::todo_item::TodoItemService::new();
                    let item_read = persistence::db_todo_item_driven_ports::DbTodoItemReader;

                    list_todo_items(filter, &mut ext_cxn, &item_service, &item_read).await
                },
            )
            .post(
                |State(app_state): AppState, Json(new_item): Json<dto::NewTodoItem>| async move {
                    let mut ext_cxn = app_state.ext_cxn.clone();
                    let item_service = domain::todo_item::TodoItemService::new();
                    let item_write = persistence::db_todo_item_driven_ports::DbTodoItemWriter;

                    create_todo_item(new_item, &mut ext_cxn, &item_service, &item_write).await
                },
            ),
        )
        .route(
            "/:item_id",
            get(
                |State(app_state): AppState, Path(item_id): Path<i32>| async move {
                    let mut ext_cxn = app_state.ext_cxn.clone();
                    let item_service = domain::todo_item::TodoItemService::new();
                    let item_read = persistence::db_todo_item_driven_ports::DbTodoItemReader;

                    get_todo_item(item_id, &mut ext_cxn, &item_service, &item_read).await
                },
            )
            .put(
                |State(app_state): AppState,
                 Path(item_id): Path<i32>,
                 Json(update): Json<dto::UpdateTodoItem>| async move {
                    let mut ext_cxn = app_state.ext_cxn.clone();
                    let item_service = domain::todo_item::TodoItemService::new();
                    let item_read = persistence::db_todo_item_driven_ports::DbTodoItemReader;
                    let item_write = persistence::db_todo_item_driven_ports::DbTodoItemWriter;

                    update_todo_item(
                        item_id,
                        update,
                        &mut ext_cxn,
                        &item_service,
                        &item_read,
                        &item_write,
                    )
                    .await
                },
            )
            .delete(
                |State(app_state): AppState, Path(item_id): Path<i32>| async move {
                    let mut ext_cxn = app_state.ext_cxn.clone();
                    let item_service = domain::todo_item::TodoItemService::new();
                    let item_write = persistence::db_todo_item_driven_ports::DbTodoItemWriter;

                    delete_todo_item(item_id, &mut ext_cxn, &item_service, &item_write).await
                },
            ),
        )
        .route(
            "/:item_id/toggle",
            patch(
                |State(app_state): AppState, Path(item_id): Path<i32>| async move {
                    let mut ext_cxn = app_state.ext_cxn.clone();
                    let item_service = domain::todo_item::TodoItemService::new();
                    let item_read = persistence::db_todo_item_driven_ports::DbTodoItemReader;
                    let item_write = persistence::db_todo_item_driven_ports::DbTodoItemWriter;

                    toggle_todo_item(item_id, &mut ext_cxn, &item_service, &item_read, &item_write)
                        .await
                },
            ),
        )
}

#[utoipa::path(
    get,
    path = "/todoitems",
    tag = "Todo Items",
    params(dto::StatusFilter),
    responses(
        (status = 200, description = "Todo items, newest first", body = [dto::TodoItem]),
        (status = 500, description = "The todo items could not be read", body = crate::routing_utils::BasicErrorResponse),
    ),
)]
/// Retrieves every todo item, optionally narrowed down by completion status
async fn list_todo_items(
    filter: dto::StatusFilter,
    ext_cxn: &mut impl ExternalConnectivity,
    item_service: &impl TodoItemPort,
    item_read: &impl TodoItemReader,
) -> Result<Json<Vec<dto::TodoItem>>, ErrorResponse> {
    info!(is_completed = ?filter.is_completed, "Requested todo items");
    let items_result = match filter.is_completed {
        Some(is_completed) => {
            item_service
                .items_by_status(is_completed, &mut *ext_cxn, item_read)
                .await
        }
        None => item_service.all_items(&mut *ext_cxn, item_read).await,
    };
    let items = items_result.map_err(TodoItemErrorResponse)?;

    Ok(Json(items.into_iter().map(dto::TodoItem::from).collect()))
}

#[utoipa::path(
    get,
    path = "/todoitems/{item_id}",
    tag = "Todo Items",
    params(("item_id" = i32, Path, description = "ID of the todo item")),
    responses(
        (status = 200, description = "The requested todo item", body = dto::TodoItem),
        (status = 404, description = "No todo item has that ID", body = crate::routing_utils::BasicErrorResponse),
        (status = 500, description = "The todo item could not be read", body = crate::routing_utils::BasicErrorResponse),
    ),
)]
/// Retrieves a single todo item
async fn get_todo_item(
    item_id: i32,
    ext_cxn: &mut impl ExternalConnectivity,
    item_service: &impl TodoItemPort,
    item_read: &impl TodoItemReader,
) -> Result<Json<dto::TodoItem>, ErrorResponse> {
    info!(item_id, "Requested todo item");
    let item = item_service
        .item_by_id(item_id, &mut *ext_cxn, item_read)
        .await
        .map_err(TodoItemErrorResponse)?;

    Ok(Json(item.into()))
}

#[utoipa::path(
    post,
    path = "/todoitems",
    tag = "Todo Items",
    request_body = dto::NewTodoItem,
    responses(
        (status = 201, description = "The todo item was created", body = dto::TodoItem,
            headers(("location" = String, description = "Path of the created todo item"))),
        (status = 400, description = "The submitted todo item was invalid", body = crate::routing_utils::BasicErrorResponse),
        (status = 500, description = "The todo item could not be saved", body = crate::routing_utils::BasicErrorResponse),
    ),
)]
/// Creates a todo item
async fn create_todo_item(
    new_item: dto::NewTodoItem,
    ext_cxn: &mut impl ExternalConnectivity,
    item_service: &impl TodoItemPort,
    item_write: &impl TodoItemWriter,
) -> Result<(StatusCode, [(header::HeaderName, String); 1], Json<dto::TodoItem>), ErrorResponse> {
    info!("Attempt to create todo item: {new_item}");
    new_item
        .validate()
        .map_err(ValidationErrorResponse::from)?;

    let domain_item = domain::todo_item::NewTodoItem::from(new_item);
    let created = item_service
        .create_item(&domain_item, &mut *ext_cxn, item_write)
        .await
        .map_err(TodoItemErrorResponse)?;

    let location = format!("/todoitems/{}", created.id);
    Ok((
        StatusCode::CREATED,
        [(header::LOCATION, location)],
        Json(created.into()),
    ))
}

#[utoipa::path(
    put,
    path = "/todoitems/{item_id}",
    tag = "Todo Items",
    params(("item_id" = i32, Path, description = "ID of the todo item")),
    request_body = dto::UpdateTodoItem,
    responses(
        (status = 204, description = "The todo item was replaced"),
        (status = 400, description = "The update was invalid or its ID did not match the path", body = crate::routing_utils::BasicErrorResponse),
        (status = 404, description = "No todo item has that ID", body = crate::routing_utils::BasicErrorResponse),
        (status = 500, description = "The todo item could not be saved", body = crate::routing_utils::BasicErrorResponse),
    ),
)]
/// Replaces the content of a todo item
async fn update_todo_item(
    item_id: i32,
    update: dto::UpdateTodoItem,
    ext_cxn: &mut impl ExternalConnectivity,
    item_service: &impl TodoItemPort,
    item_read: &impl TodoItemReader,
    item_write: &impl TodoItemWriter,
) -> Result<StatusCode, ErrorResponse> {
    info!(item_id, "Updating todo item");
    if let Some(body_id) = update.id.filter(|body_id| *body_id != item_id) {
        warn!(item_id, body_id, "Todo item update had mismatched IDs");
        return Err(InvalidRequestResponse(format!(
            "ID in request body ({body_id}) does not match ID in path ({item_id})"
        ))
        .into());
    }
    update
        .validate()
        .map_err(ValidationErrorResponse::from)?;

    let domain_update = domain::todo_item::UpdateTodoItem::from(update);
    item_service
        .update_item(item_id, &domain_update, &mut *ext_cxn, item_read, item_write)
        .await
        .map_err(TodoItemErrorResponse)?;

    Ok(StatusCode::NO_CONTENT)
}

#[utoipa::path(
    patch,
    path = "/todoitems/{item_id}/toggle",
    tag = "Todo Items",
    params(("item_id" = i32, Path, description = "ID of the todo item")),
    responses(
        (status = 200, description = "The todo item with its completion status flipped", body = dto::TodoItem),
        (status = 404, description = "No todo item has that ID", body = crate::routing_utils::BasicErrorResponse),
        (status = 500, description = "The todo item could not be saved", body = crate::routing_utils::BasicErrorResponse),
    ),
)]
/// Flips a todo item between complete and incomplete
async fn toggle_todo_item(
    item_id: i32,
    ext_cxn: &mut impl ExternalConnectivity,
    item_service: &impl TodoItemPort,
    item_read: &impl TodoItemReader,
    item_write: &impl TodoItemWriter,
) -> Result<Json<dto::TodoItem>, ErrorResponse> {
    info!(item_id, "Toggling todo item");
    let toggled = item_service
        .toggle_item(item_id, &mut *ext_cxn, item_read, item_write)
        .await
        .map_err(TodoItemErrorResponse)?;

    Ok(Json(toggled.into()))
}

#[utoipa::path(
    delete,
    path = "/todoitems/{item_id}",
    tag = "Todo Items",
    params(("item_id" = i32, Path, description = "ID of the todo item")),
    responses(
        (status = 204, description = "The todo item was deleted"),
        (status = 404, description = "No todo item has that ID", body = crate::routing_utils::BasicErrorResponse),
        (status = 500, description = "The todo item could not be deleted", body = crate::routing_utils::BasicErrorResponse),
    ),
)]
/// Deletes a todo item
async fn delete_todo_item(
    item_id: i32,
    ext_cxn: &mut impl ExternalConnectivity,
    item_service: &impl TodoItemPort,
    item_write: &impl TodoItemWriter,
) -> Result<StatusCode, ErrorResponse> {
    info!(item_id, "Deleting todo item");
    let was_deleted = item_service
        .delete_item(item_id, &mut *ext_cxn, item_write)
        .await
        .map_err(TodoItemErrorResponse)?;

    if was_deleted {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(NotFoundResponse.into())
    }
}
