use axum::{
    extract::DefaultBodyLimit,
    middleware,
    routing::{get, post},
    Router,
};

use shared_utils::extractor::auth_middleware;
use shared_utils::AppState;

use crate::handlers;

const MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;

pub fn user_routes(state: AppState) -> Router {
    let protected_routes = Router::new()
        .route("/doctors", get(handlers::get_doctors))
        .route("/patients", get(handlers::get_patients))
        .route(
            "/records",
            get(handlers::get_records).post(handlers::create_record),
        )
        // `{id}` is a patient id here and a record id below; the router needs one name per segment.
        .route("/records/{id}", get(handlers::get_patient_records))
        .route(
            "/records/{id}/upload",
            post(handlers::upload_document).layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES)),
        )
        .route("/stats", get(handlers::get_stats))
        .layer(middleware::from_fn_with_state(state.clone(), auth_middleware));

    Router::new()
        .merge(protected_routes)
        .with_state(state)
}
