use axum::{
    middleware,
    routing::{get, put},
    Router,
};

use shared_utils::extractor::auth_middleware;
use shared_utils::AppState;

use crate::handlers;

pub fn admin_routes(state: AppState) -> Router {
    let protected_routes = Router::new()
        .route("/stats", get(handlers::get_stats))
        .route("/doctors", get(handlers::get_all_doctors))
        .route("/doctors/pending", get(handlers::get_pending_doctors))
        .route("/doctors/{doctor_id}/approve", put(handlers::approve_doctor))
        .route("/doctors/{doctor_id}/reject", put(handlers::reject_doctor))
        .layer(middleware::from_fn_with_state(state.clone(), auth_middleware));

    Router::new()
        .merge(protected_routes)
        .with_state(state)
}
