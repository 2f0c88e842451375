use axum::{
    extract::{Extension, Path, State},
    Json,
};
use serde_json::{json, Value};
use uuid::Uuid;

use shared_models::error::AppError;
use shared_models::user::{Role, User};
use shared_utils::extractor::authorize;
use shared_utils::AppState;

use crate::models::RejectDoctorRequest;
use crate::services::{DoctorApprovalService, StatsService};

pub async fn get_stats(
    State(state): State<AppState>,
    Extension(user): Extension<User>,
) -> Result<Json<Value>, AppError> {
    authorize(&user, &[Role::Admin])?;

    let stats = StatsService::new(state.db.clone()).dashboard().await?;

    Ok(Json(json!({
        "success": true,
        "data": stats
    })))
}

pub async fn get_pending_doctors(
    State(state): State<AppState>,
    Extension(user): Extension<User>,
) -> Result<Json<Value>, AppError> {
    authorize(&user, &[Role::Admin])?;

    let doctors = DoctorApprovalService::new(&state).pending_doctors().await?;

    Ok(Json(json!({
        "success": true,
        "count": doctors.len(),
        "data": doctors
    })))
}

pub async fn get_all_doctors(
    State(state): State<AppState>,
    Extension(user): Extension<User>,
) -> Result<Json<Value>, AppError> {
    authorize(&user, &[Role::Admin])?;

    let doctors = DoctorApprovalService::new(&state).all_doctors().await?;

    Ok(Json(json!({
        "success": true,
        "count": doctors.len(),
        "data": doctors
    })))
}

pub async fn approve_doctor(
    State(state): State<AppState>,
    Path(doctor_id): Path<Uuid>,
    Extension(user): Extension<User>,
) -> Result<Json<Value>, AppError> {
    authorize(&user, &[Role::Admin])?;

    let outcome = DoctorApprovalService::new(&state)
        .approve(&user, doctor_id)
        .await?;

    if outcome.email_queued {
        Ok(Json(json!({
            "success": true,
            "message": "Doctor approved successfully and notification email queued",
            "data": outcome.doctor
        })))
    } else {
        Ok(Json(json!({
            "success": true,
            "message": "Doctor approved successfully but the notification email could not be queued",
            "data": outcome.doctor,
            "email_warning": "Notification service unavailable"
        })))
    }
}

pub async fn reject_doctor(
    State(state): State<AppState>,
    Path(doctor_id): Path<Uuid>,
    Extension(user): Extension<User>,
    body: Option<Json<RejectDoctorRequest>>,
) -> Result<Json<Value>, AppError> {
    authorize(&user, &[Role::Admin])?;

    let request = body.map(|Json(r)| r).unwrap_or_default();
    DoctorApprovalService::new(&state)
        .reject(doctor_id, request.reason())
        .await?;

    Ok(Json(json!({
        "success": true,
        "message": "Doctor application rejected and notification sent"
    })))
}
