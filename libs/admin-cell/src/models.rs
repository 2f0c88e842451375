use serde::{Deserialize, Serialize};
use thiserror::Error;

use shared_models::error::AppError;
use shared_models::user::{User, UserSummary};

pub const DEFAULT_REJECTION_REASON: &str = "Your application did not meet our requirements";

/// Counters shown on the admin dashboard.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct DashboardStats {
    pub total_patients: usize,
    /// Approved doctors only.
    pub total_doctors: usize,
    pub pending_doctors: usize,
    pub total_appointments: usize,
    pub pending_appointments: usize,
}

/// A doctor row with the approving admin embedded as `approver`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DoctorListing {
    #[serde(flatten)]
    pub doctor: User,
    #[serde(default)]
    pub approver: Option<UserSummary>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RejectDoctorRequest {
    pub reason: Option<String>,
}

impl RejectDoctorRequest {
    pub fn reason(&self) -> String {
        self.reason
            .as_deref()
            .map(str::trim)
            .filter(|r| !r.is_empty())
            .unwrap_or(DEFAULT_REJECTION_REASON)
            .to_string()
    }
}

#[derive(Debug)]
pub struct ApprovalOutcome {
    pub doctor: User,
    /// False when the notification queue refused the approval email.
    pub email_queued: bool,
}

#[derive(Error, Debug)]
pub enum AdminError {
    #[error("Doctor not found")]
    DoctorNotFound,

    #[error("User is not a doctor")]
    NotADoctor,

    #[error("Doctor is already approved")]
    AlreadyApproved,

    #[error("Database error: {0}")]
    Database(#[from] anyhow::Error),
}

impl From<AdminError> for AppError {
    fn from(err: AdminError) -> Self {
        match err {
            AdminError::DoctorNotFound => AppError::NotFound(err.to_string()),
            AdminError::NotADoctor | AdminError::AlreadyApproved => AppError::BadRequest(err.to_string()),
            AdminError::Database(e) => AppError::Database(e.to_string()),
        }
    }
}
