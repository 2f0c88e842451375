use axum::{routing::get, Router};

use admin_cell::admin_routes;
use appointment_cell::appointment_routes;
use auth_cell::auth_routes;
use message_cell::message_routes;
use shared_utils::AppState;
use user_cell::user_routes;

pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(|| async { "Healthcare API is running!" }))
        .nest("/auth", auth_routes(state.clone()))
        .nest("/appointments", appointment_routes(state.clone()))
        .nest("/admin", admin_routes(state.clone()))
        .nest("/users", user_routes(state.clone()))
        .nest("/messages", message_routes(state))
}
