use crate::dto;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

#[derive(OpenApi)]
#[openapi(info(
    title = "Todo Items API",
    description = "Create, list, update, toggle, and delete todo items stored in PostgreSQL"
))]
struct TodoApi;

/// Constructs the route on the API that renders the swagger UI and returns the OpenAPI schema.
/// Merges in OpenAPI definitions from other locations in the app, such as the [dto] package
/// and submodules of [api][crate::api]
pub fn build_documentation() -> SwaggerUi {
    SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", api_documentation())
}

/// Assembles the full OpenAPI document for the service
pub fn api_documentation() -> utoipa::openapi::OpenApi {
    let mut api_docs = TodoApi::openapi();
    api_docs.merge(dto::OpenApiSchemas::openapi());
    api_docs.merge(super::todo_item::TodoItemApi::openapi());

    api_docs
}
