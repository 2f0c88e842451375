// libs/auth-cell/src/handlers.rs
use axum::{
    extract::{Extension, State},
    http::StatusCode,
    Json,
};
use serde_json::{json, Value};

use shared_models::error::AppError;
use shared_models::user::User;
use shared_utils::AppState;

use crate::models::{LoginRequest, RegisterRequest, Registration};
use crate::services::AuthService;

pub async fn register(
    State(state): State<AppState>,
    Json(request): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<Value>), AppError> {
    let service = AuthService::new(&state);

    let body = match service.register(request).await? {
        Registration::PendingApproval(doctor) => json!({
            "success": true,
            "message": "Registration successful! Your account is pending admin approval. You will receive an email once approved.",
            "data": doctor
        }),
        Registration::Active(session) => json!({
            "success": true,
            "message": "Registration successful",
            "data": session
        }),
    };

    Ok((StatusCode::CREATED, Json(body)))
}

pub async fn login(
    State(state): State<AppState>,
    Json(request): Json<LoginRequest>,
) -> Result<Json<Value>, AppError> {
    let session = AuthService::new(&state).login(request).await?;

    Ok(Json(json!({
        "success": true,
        "data": session
    })))
}

pub async fn profile(Extension(user): Extension<User>) -> Json<Value> {
    Json(json!({
        "success": true,
        "data": user
    }))
}
