use std::sync::Arc;

use chrono::Utc;
use serde_json::json;
use tracing::{debug, info, warn};
use uuid::Uuid;

use shared_config::AppConfig;
use shared_database::SupabaseClient;
use shared_models::user::{User, PUBLIC_USER_COLUMNS};
use shared_notifications::templates::{doctor_approved_email, doctor_rejected_email};
use shared_notifications::{Notification, NotificationDispatcher};
use shared_utils::AppState;

use crate::models::{AdminError, ApprovalOutcome, DoctorListing};

pub struct DoctorApprovalService {
    db: Arc<SupabaseClient>,
    config: Arc<AppConfig>,
    notifier: NotificationDispatcher,
}

impl DoctorApprovalService {
    pub fn new(state: &AppState) -> Self {
        Self {
            db: state.db.clone(),
            config: state.config.clone(),
            notifier: state.notifier.clone(),
        }
    }

    pub async fn pending_doctors(&self) -> Result<Vec<User>, AdminError> {
        let query = format!(
            "select={}&role=eq.doctor&is_approved=eq.false&order=created_at.desc",
            PUBLIC_USER_COLUMNS
        );
        Ok(self.db.select("users", &query).await?)
    }

    /// Every doctor, approved or not, with the approving admin embedded.
    pub async fn all_doctors(&self) -> Result<Vec<DoctorListing>, AdminError> {
        let query = format!(
            "select={},approver:users!approved_by(id,name,email)&role=eq.doctor&order=created_at.desc",
            PUBLIC_USER_COLUMNS
        );
        Ok(self.db.select("users", &query).await?)
    }

    async fn find_doctor(&self, doctor_id: Uuid) -> Result<User, AdminError> {
        let query = format!("select={}&id=eq.{}", PUBLIC_USER_COLUMNS, doctor_id);
        let user: User = self
            .db
            .select_one("users", &query)
            .await?
            .ok_or(AdminError::DoctorNotFound)?;

        if !user.is_doctor() {
            return Err(AdminError::NotADoctor);
        }
        Ok(user)
    }

    pub async fn approve(&self, admin: &User, doctor_id: Uuid) -> Result<ApprovalOutcome, AdminError> {
        let doctor = self.find_doctor(doctor_id).await?;
        if doctor.is_approved {
            return Err(AdminError::AlreadyApproved);
        }

        let filter = format!("id=eq.{}&select={}", doctor_id, PUBLIC_USER_COLUMNS);
        let patch = json!({
            "is_approved": true,
            "approved_by": admin.id,
            "approved_at": Utc::now(),
        });
        let doctor: User = self
            .db
            .update::<User>("users", &filter, patch)
            .await?
            .into_iter()
            .next()
            .ok_or(AdminError::DoctorNotFound)?;

        info!("Doctor {} approved by admin {}", doctor.id, admin.id);

        let content = doctor_approved_email(
            &doctor.name,
            &doctor.email,
            doctor.specialization.as_deref().unwrap_or_default(),
            &doctor.department.map(|d| d.to_string()).unwrap_or_default(),
            &self.config.frontend_url,
        );
        let email_queued = self
            .notifier
            .dispatch(Notification::email(&doctor.email, content))
            .is_ok();

        Ok(ApprovalOutcome { doctor, email_queued })
    }

    /// Deletes the doctor's account and emails the reason.
    pub async fn reject(&self, doctor_id: Uuid, reason: String) -> Result<(), AdminError> {
        let doctor = self.find_doctor(doctor_id).await?;

        self.db
            .delete("users", &format!("id=eq.{}", doctor_id))
            .await?;
        info!("Doctor {} rejected and removed: {}", doctor.id, reason);

        let content = doctor_rejected_email(&doctor.name, &reason);
        if self
            .notifier
            .dispatch(Notification::email(&doctor.email, content))
            .is_err()
        {
            warn!("Rejection email for {} was not queued", doctor.email);
        } else {
            debug!("Rejection email queued for {}", doctor.email);
        }

        Ok(())
    }
}
