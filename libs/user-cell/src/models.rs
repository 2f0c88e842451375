// libs/user-cell/src/models.rs
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use shared_models::error::AppError;
use shared_models::user::UserSummary;

// ==============================================================================
// MEDICAL RECORDS
// ==============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecordDocument {
    /// Name the file was uploaded with.
    pub filename: String,
    /// Where the file was stored on disk.
    pub path: String,
    pub upload_date: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Record {
    pub id: Uuid,
    pub patient_id: Uuid,
    pub doctor_id: Uuid,
    pub visit_date: DateTime<Utc>,
    pub diagnosis: String,
    pub prescription: Option<String>,
    pub test_results: Option<String>,
    pub notes: Option<String>,
    #[serde(default)]
    pub documents: Vec<RecordDocument>,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub patient: Option<UserSummary>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub doctor: Option<UserSummary>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct CreateRecordRequest {
    pub patient: Option<Uuid>,
    pub diagnosis: Option<String>,
    pub prescription: Option<String>,
    pub test_results: Option<String>,
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct NewRecord {
    pub patient_id: Uuid,
    pub doctor_id: Uuid,
    pub diagnosis: String,
    pub prescription: Option<String>,
    pub test_results: Option<String>,
    pub notes: Option<String>,
    pub visit_date: DateTime<Utc>,
    pub documents: Vec<RecordDocument>,
}

impl CreateRecordRequest {
    pub fn validate(self, doctor_id: Uuid) -> Result<NewRecord, UserError> {
        let diagnosis = self
            .diagnosis
            .map(|d| d.trim().to_string())
            .filter(|d| !d.is_empty());

        let (Some(patient_id), Some(diagnosis)) = (self.patient, diagnosis) else {
            return Err(UserError::Validation(
                "Patient ID and diagnosis are required".to_string(),
            ));
        };

        Ok(NewRecord {
            patient_id,
            doctor_id,
            diagnosis,
            prescription: self.prescription,
            test_results: self.test_results,
            notes: self.notes,
            visit_date: Utc::now(),
            documents: Vec::new(),
        })
    }
}

/// File pulled out of a multipart upload.
#[derive(Debug)]
pub struct UploadedFile {
    pub filename: String,
    pub bytes: Vec<u8>,
}

// ==============================================================================
// QUERY PARAMETERS
// ==============================================================================

#[derive(Debug, Default, Deserialize)]
pub struct DoctorQuery {
    pub department: Option<String>,
}

// ==============================================================================
// ERRORS
// ==============================================================================

#[derive(Error, Debug)]
pub enum UserError {
    #[error("{0}")]
    Validation(String),

    #[error("Patient not found")]
    PatientNotFound,

    #[error("Record not found")]
    RecordNotFound,

    #[error("Not authorized to update this record")]
    NotRecordAuthor,

    #[error("Failed to store upload: {0}")]
    Storage(#[from] std::io::Error),

    #[error("Database error: {0}")]
    Database(#[from] anyhow::Error),
}

impl From<UserError> for AppError {
    fn from(err: UserError) -> Self {
        match err {
            UserError::Validation(msg) => AppError::ValidationError(msg),
            UserError::PatientNotFound | UserError::RecordNotFound => AppError::NotFound(err.to_string()),
            UserError::NotRecordAuthor => AppError::Forbidden(err.to_string()),
            UserError::Storage(e) => AppError::Internal(e.to_string()),
            UserError::Database(e) => AppError::Database(e.to_string()),
        }
    }
}
