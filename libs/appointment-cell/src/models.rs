// libs/appointment-cell/src/models.rs
use std::fmt;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use shared_models::error::AppError;
use shared_models::user::UserSummary;

// ==============================================================================
// CORE APPOINTMENT MODELS
// ==============================================================================

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum AppointmentStatus {
    #[default]
    Pending,
    Confirmed,
    Cancelled,
    Completed,
}

impl fmt::Display for AppointmentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            AppointmentStatus::Pending => "pending",
            AppointmentStatus::Confirmed => "confirmed",
            AppointmentStatus::Cancelled => "cancelled",
            AppointmentStatus::Completed => "completed",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Appointment {
    pub id: Uuid,
    pub patient_id: Uuid,
    pub doctor_id: Uuid,
    pub appointment_date: NaiveDate,
    /// Free-text slot such as "10:30 AM".
    pub appointment_time: String,
    pub department: String,
    pub reason: String,
    #[serde(default)]
    pub status: AppointmentStatus,
    pub notes: Option<String>,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,

    // Present only when the row was read with embedded users.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub patient: Option<UserSummary>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub doctor: Option<UserSummary>,
}

// ==============================================================================
// REQUEST MODELS
// ==============================================================================

#[derive(Debug, Clone, Default, Deserialize)]
pub struct CreateAppointmentRequest {
    pub doctor: Option<Uuid>,
    pub appointment_date: Option<NaiveDate>,
    pub appointment_time: Option<String>,
    pub department: Option<String>,
    pub reason: Option<String>,
}

/// Row written to `appointments`. Status always starts at pending.
#[derive(Debug, Clone, Serialize)]
pub struct NewAppointment {
    pub patient_id: Uuid,
    pub doctor_id: Uuid,
    pub appointment_date: NaiveDate,
    pub appointment_time: String,
    pub department: String,
    pub reason: String,
    pub status: AppointmentStatus,
}

fn required(value: Option<String>) -> Option<String> {
    value.map(|v| v.trim().to_string()).filter(|v| !v.is_empty())
}

impl CreateAppointmentRequest {
    pub fn validate(self, patient_id: Uuid) -> Result<NewAppointment, AppointmentError> {
        let (Some(doctor_id), Some(appointment_date), Some(appointment_time), Some(department), Some(reason)) = (
            self.doctor,
            self.appointment_date,
            required(self.appointment_time),
            required(self.department),
            required(self.reason),
        ) else {
            return Err(AppointmentError::Validation(
                "Please provide doctor, appointment_date, appointment_time, department and reason".to_string(),
            ));
        };

        Ok(NewAppointment {
            patient_id,
            doctor_id,
            appointment_date,
            appointment_time,
            department,
            reason,
            status: AppointmentStatus::Pending,
        })
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct UpdateStatusRequest {
    pub status: Option<AppointmentStatus>,
    pub notes: Option<String>,
}

// ==============================================================================
// ERROR TYPES
// ==============================================================================

#[derive(Error, Debug)]
pub enum AppointmentError {
    #[error("Appointment not found")]
    NotFound,

    #[error("Doctor not found")]
    DoctorNotFound,

    #[error("{0}")]
    Validation(String),

    #[error("Database error: {0}")]
    Database(#[from] anyhow::Error),
}

impl From<AppointmentError> for AppError {
    fn from(err: AppointmentError) -> Self {
        match err {
            AppointmentError::NotFound | AppointmentError::DoctorNotFound => {
                AppError::NotFound(err.to_string())
            }
            AppointmentError::Validation(msg) => AppError::ValidationError(msg),
            AppointmentError::Database(e) => AppError::Database(e.to_string()),
        }
    }
}
