// libs/appointment-cell/src/handlers.rs
use axum::{
    extract::{Extension, Path, State},
    http::StatusCode,
    Json,
};
use serde_json::{json, Value};
use uuid::Uuid;

use shared_models::error::AppError;
use shared_models::user::{Role, User};
use shared_utils::extractor::authorize;
use shared_utils::AppState;

use crate::models::{CreateAppointmentRequest, UpdateStatusRequest};
use crate::services::{AppointmentBookingService, AppointmentLifecycleService};

pub async fn create_appointment(
    State(state): State<AppState>,
    Extension(user): Extension<User>,
    Json(request): Json<CreateAppointmentRequest>,
) -> Result<(StatusCode, Json<Value>), AppError> {
    authorize(&user, &[Role::Patient])?;

    let appointment = AppointmentBookingService::new(&state)
        .create(&user, request)
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "success": true,
            "data": appointment
        })),
    ))
}

pub async fn list_appointments(
    State(state): State<AppState>,
    Extension(user): Extension<User>,
) -> Result<Json<Value>, AppError> {
    let appointments = AppointmentBookingService::new(&state).list_for(&user).await?;

    Ok(Json(json!({
        "success": true,
        "count": appointments.len(),
        "data": appointments
    })))
}

pub async fn list_all_appointments(
    State(state): State<AppState>,
    Extension(user): Extension<User>,
) -> Result<Json<Value>, AppError> {
    authorize(&user, &[Role::Admin])?;

    let appointments = AppointmentBookingService::new(&state).list_all().await?;

    Ok(Json(json!({
        "success": true,
        "count": appointments.len(),
        "data": appointments
    })))
}

pub async fn update_status(
    State(state): State<AppState>,
    Path(appointment_id): Path<Uuid>,
    Extension(user): Extension<User>,
    Json(request): Json<UpdateStatusRequest>,
) -> Result<Json<Value>, AppError> {
    authorize(&user, &[Role::Doctor, Role::Admin])?;

    let appointment = AppointmentLifecycleService::new(&state)
        .update_status(appointment_id, request)
        .await?;

    Ok(Json(json!({
        "success": true,
        "data": appointment
    })))
}
