use axum::{
    extract::{Extension, Path, State},
    http::StatusCode,
    Json,
};
use serde_json::{json, Value};
use uuid::Uuid;

use shared_models::error::AppError;
use shared_models::user::User;
use shared_utils::AppState;

use crate::models::SendMessageRequest;
use crate::services::MessageService;

pub async fn send_message(
    State(state): State<AppState>,
    Extension(user): Extension<User>,
    Json(request): Json<SendMessageRequest>,
) -> Result<(StatusCode, Json<Value>), AppError> {
    let message = MessageService::new(state.db.clone()).send(&user, request).await?;

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "success": true,
            "data": message
        })),
    ))
}

pub async fn get_conversations(
    State(state): State<AppState>,
    Extension(user): Extension<User>,
) -> Result<Json<Value>, AppError> {
    let conversations = MessageService::new(state.db.clone())
        .conversations(user.id)
        .await?;

    Ok(Json(json!({
        "success": true,
        "count": conversations.len(),
        "data": conversations
    })))
}

pub async fn get_messages(
    State(state): State<AppState>,
    Path(other_id): Path<Uuid>,
    Extension(user): Extension<User>,
) -> Result<Json<Value>, AppError> {
    let messages = MessageService::new(state.db.clone())
        .thread(user.id, other_id)
        .await?;

    Ok(Json(json!({
        "success": true,
        "count": messages.len(),
        "data": messages
    })))
}

pub async fn mark_as_read(
    State(state): State<AppState>,
    Path(other_id): Path<Uuid>,
    Extension(user): Extension<User>,
) -> Result<Json<Value>, AppError> {
    let updated = MessageService::new(state.db.clone())
        .mark_read(user.id, other_id)
        .await?;

    Ok(Json(json!({
        "success": true,
        "message": "Messages marked as read",
        "count": updated
    })))
}
