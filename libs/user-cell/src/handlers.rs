// libs/user-cell/src/handlers.rs
use axum::{
    extract::{Extension, Multipart, Path, Query, State},
    http::StatusCode,
    Json,
};
use serde_json::{json, Value};
use tracing::debug;
use uuid::Uuid;

use admin_cell::StatsService;
use shared_models::error::AppError;
use shared_models::user::{Role, User};
use shared_utils::extractor::authorize;
use shared_utils::AppState;

use crate::models::{CreateRecordRequest, DoctorQuery, UploadedFile};
use crate::services::{RecordService, UserDirectoryService};

/// Multipart field carrying the uploaded document.
pub const DOCUMENT_FIELD: &str = "document";

pub async fn get_doctors(
    State(state): State<AppState>,
    Query(query): Query<DoctorQuery>,
) -> Result<Json<Value>, AppError> {
    let doctors = UserDirectoryService::new(state.db.clone())
        .doctors(query.department.as_deref())
        .await?;

    Ok(Json(json!({
        "success": true,
        "count": doctors.len(),
        "data": doctors
    })))
}

pub async fn get_patients(
    State(state): State<AppState>,
    Extension(user): Extension<User>,
) -> Result<Json<Value>, AppError> {
    authorize(&user, &[Role::Doctor, Role::Admin])?;

    let patients = UserDirectoryService::new(state.db.clone()).patients().await?;

    Ok(Json(json!({
        "success": true,
        "count": patients.len(),
        "data": patients
    })))
}

pub async fn create_record(
    State(state): State<AppState>,
    Extension(user): Extension<User>,
    Json(request): Json<CreateRecordRequest>,
) -> Result<(StatusCode, Json<Value>), AppError> {
    authorize(&user, &[Role::Doctor])?;

    let record = RecordService::new(&state).create(&user, request).await?;

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "success": true,
            "message": "Medical record created successfully",
            "data": record
        })),
    ))
}

pub async fn get_records(
    State(state): State<AppState>,
    Extension(user): Extension<User>,
) -> Result<Json<Value>, AppError> {
    let records = RecordService::new(&state).list_for(&user).await?;

    Ok(Json(json!({
        "success": true,
        "count": records.len(),
        "data": records
    })))
}

pub async fn get_patient_records(
    State(state): State<AppState>,
    Path(patient_id): Path<Uuid>,
    Extension(user): Extension<User>,
) -> Result<Json<Value>, AppError> {
    authorize(&user, &[Role::Doctor, Role::Admin])?;

    let records = RecordService::new(&state).list_for_patient(patient_id).await?;

    Ok(Json(json!({
        "success": true,
        "count": records.len(),
        "data": records
    })))
}

pub async fn upload_document(
    State(state): State<AppState>,
    Path(record_id): Path<Uuid>,
    Extension(user): Extension<User>,
    mut multipart: Multipart,
) -> Result<Json<Value>, AppError> {
    authorize(&user, &[Role::Doctor])?;

    let mut upload = None;
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::BadRequest(format!("Invalid multipart body: {}", e)))?
    {
        if field.name() != Some(DOCUMENT_FIELD) {
            debug!("Ignoring multipart field {:?}", field.name());
            continue;
        }
        let filename = field.file_name().unwrap_or("document").to_string();
        let bytes = field
            .bytes()
            .await
            .map_err(|e| AppError::BadRequest(format!("Failed to read file data: {}", e)))?;
        upload = Some(UploadedFile { filename, bytes: bytes.to_vec() });
    }

    let file = upload.ok_or_else(|| AppError::BadRequest("Please upload a file".to_string()))?;

    let record = RecordService::new(&state)
        .attach_document(&user, record_id, file)
        .await?;

    Ok(Json(json!({
        "success": true,
        "message": "Document uploaded successfully",
        "data": record
    })))
}

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
