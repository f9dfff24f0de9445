use axum::Router;
use axum::extract::State;
use std::sync::Arc;

pub mod api;
pub mod app_env;
pub mod db;
pub mod domain;
pub mod dto;
pub mod external_connections;
pub mod logging;
pub mod persistence;
pub mod routing_utils;

/// Data every request handler needs access to
pub struct SharedData {
    pub ext_cxn: persistence::ExternalConnectivity,
}

pub type AppState = State<Arc<SharedData>>;

/// Assembles the todo item routes, the swagger UI, and request tracing into the service's router
pub fn build_router(shared: Arc<SharedData>) -> Router {
    let router = Router::new()
        .nest("/todoitems", api::todo_item::todo_item_routes())
        .merge(api::swagger_main::build_documentation())
        .with_state(shared);

    logging::attach_tracing_http(router)
}
