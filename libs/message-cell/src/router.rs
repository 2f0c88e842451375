use axum::{
    middleware,
    routing::{get, post, put},
    Router,
};

use shared_utils::extractor::auth_middleware;
use shared_utils::AppState;

use crate::handlers;

pub fn message_routes(state: AppState) -> Router {
    let protected_routes = Router::new()
        .route("/", post(handlers::send_message))
        .route("/conversations", get(handlers::get_conversations))
        .route("/{user_id}", get(handlers::get_messages))
        .route("/{user_id}/read", put(handlers::mark_as_read))
        .layer(middleware::from_fn_with_state(state.clone(), auth_middleware));

    Router::new()
        .merge(protected_routes)
        .with_state(state)
}
