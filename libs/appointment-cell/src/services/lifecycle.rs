// libs/appointment-cell/src/services/lifecycle.rs
use std::sync::Arc;

use serde_json::{json, Map, Value};
use tracing::{debug, info, warn};
use uuid::Uuid;

use shared_database::SupabaseClient;
use shared_models::user::UserSummary;
use shared_notifications::templates::{
    appointment_cancelled_email, appointment_cancelled_sms, appointment_confirmed_email,
    appointment_confirmed_sms,
};
use shared_notifications::{Notification, NotificationDispatcher};
use shared_utils::AppState;

use crate::models::{Appointment, AppointmentError, AppointmentStatus, UpdateStatusRequest};
use crate::services::POPULATED_SELECT;

pub struct AppointmentLifecycleService {
    db: Arc<SupabaseClient>,
    notifier: NotificationDispatcher,
}

impl AppointmentLifecycleService {
    pub fn new(state: &AppState) -> Self {
        Self {
            db: state.db.clone(),
            notifier: state.notifier.clone(),
        }
    }

    /// Overwrites the status (and notes when non-blank) with no transition checks,
    /// then queues the notifications bound to the new status. Returns the stored
    /// row without embedded users.
    pub async fn update_status(
        &self,
        appointment_id: Uuid,
        request: UpdateStatusRequest,
    ) -> Result<Appointment, AppointmentError> {
        let status = request
            .status
            .ok_or_else(|| AppointmentError::Validation("Please provide a status".to_string()))?;

        let query = format!("select={}&id=eq.{}", POPULATED_SELECT, appointment_id);
        let current: Appointment = self
            .db
            .select_one("appointments", &query)
            .await?
            .ok_or(AppointmentError::NotFound)?;

        let mut patch = Map::new();
        patch.insert("status".to_string(), json!(status));
        // Blank notes leave the stored notes untouched.
        if let Some(notes) = request.notes.filter(|n| !n.trim().is_empty()) {
            patch.insert("notes".to_string(), Value::String(notes));
        }

        let filter = format!("id=eq.{}", appointment_id);
        let updated: Appointment = self
            .db
            .update::<Appointment>("appointments", &filter, Value::Object(patch))
            .await?
            .into_iter()
            .next()
            .ok_or(AppointmentError::NotFound)?;

        info!(
            "Appointment {} moved from {} to {}",
            appointment_id, current.status, updated.status
        );

        let outgoing = status_notifications(&current, status);
        if !outgoing.is_empty() && self.notifier.dispatch_all(outgoing).is_err() {
            warn!("Status notifications for appointment {} were dropped", appointment_id);
        }

        Ok(updated)
    }
}

/// Notifications owed to the patient when `appointment` moves to `status`.
/// Only confirmation and cancellation notify; a missing phone skips the SMS.
pub fn status_notifications(appointment: &Appointment, status: AppointmentStatus) -> Vec<Notification> {
    if !matches!(status, AppointmentStatus::Confirmed | AppointmentStatus::Cancelled) {
        debug!("No notifications for status {}", status);
        return Vec::new();
    }

    let Some(patient) = appointment.patient.as_ref() else {
        warn!("Appointment {} has no patient details, skipping notifications", appointment.id);
        return Vec::new();
    };
    let doctor_name = appointment
        .doctor
        .as_ref()
        .map(|d| d.name.as_str())
        .unwrap_or("your doctor");

    let date = appointment.appointment_date;
    let time = appointment.appointment_time.as_str();

    let (sms, email) = match status {
        AppointmentStatus::Confirmed => (
            appointment_confirmed_sms(doctor_name, date, time),
            appointment_confirmed_email(&patient.name, doctor_name, date, time),
        ),
        _ => (
            appointment_cancelled_sms(doctor_name),
            appointment_cancelled_email(&patient.name, doctor_name, date, time),
        ),
    };

    let mut outgoing = Vec::with_capacity(2);
    match phone_of(patient) {
        Some(phone) => outgoing.push(Notification::sms(phone, sms)),
        None => warn!("Patient {} has no phone number, skipping SMS", patient.id),
    }
    match patient.email.as_deref() {
        Some(email_to) => outgoing.push(Notification::email(email_to, email)),
        None => warn!("Patient {} has no email address, skipping email", patient.id),
    }
    outgoing
}

fn phone_of(patient: &UserSummary) -> Option<&str> {
    patient.phone.as_deref().filter(|p| !p.trim().is_empty())
}
