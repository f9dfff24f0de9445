use utoipa::OpenApi;

pub mod todo_item;

pub use todo_item::{NewTodoItem, StatusFilter, TodoItem, UpdateTodoItem};

/// Collects the API's DTO schemas so they can be merged into the generated OpenAPI document
#[derive(OpenApi)]
#[openapi(components(schemas(
    NewTodoItem,
    UpdateTodoItem,
    TodoItem,
    crate::routing_utils::BasicErrorResponse,
    crate::routing_utils::ExtraInfo,
    crate::routing_utils::ValidationErrorSchema,
)))]
pub struct OpenApiSchemas;
