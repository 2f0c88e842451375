// libs/appointment-cell/src/services/booking.rs
use std::sync::Arc;

use tracing::{debug, info, warn};
use uuid::Uuid;

use shared_database::SupabaseClient;
use shared_models::user::{Role, User};
use shared_notifications::templates::{appointment_requested_email, appointment_requested_sms};
use shared_notifications::{Notification, NotificationDispatcher};
use shared_utils::AppState;

use crate::models::{Appointment, AppointmentError, CreateAppointmentRequest};
use crate::services::POPULATED_SELECT;

pub struct AppointmentBookingService {
    db: Arc<SupabaseClient>,
    notifier: NotificationDispatcher,
}

impl AppointmentBookingService {
    pub fn new(state: &AppState) -> Self {
        Self {
            db: state.db.clone(),
            notifier: state.notifier.clone(),
        }
    }

    /// Books a pending appointment for `patient` and queues the "request received"
    /// SMS and email. Returns the row with patient and doctor embedded.
    pub async fn create(
        &self,
        patient: &User,
        request: CreateAppointmentRequest,
    ) -> Result<Appointment, AppointmentError> {
        let new = request.validate(patient.id)?;

        let doctor = self.find_approved_doctor(new.doctor_id).await?;

        let row = serde_json::to_value(&new).map_err(|e| AppointmentError::Database(e.into()))?;
        let created: Appointment = self.db.insert("appointments", row).await?;
        info!(
            "Appointment {} booked by patient {} with doctor {}",
            created.id, patient.id, doctor.id
        );

        let appointment = match self.find_populated(created.id).await? {
            Some(populated) => populated,
            None => {
                warn!("Appointment {} not readable after insert", created.id);
                created
            }
        };

        self.notify_requested(patient, &doctor, &appointment);

        Ok(appointment)
    }

    async fn find_approved_doctor(&self, doctor_id: Uuid) -> Result<User, AppointmentError> {
        let query = format!(
            "select=id,name,email,role,specialization,department,is_active,is_approved&id=eq.{}&role=eq.doctor&is_approved=eq.true",
            doctor_id
        );
        self.db
            .select_one::<User>("users", &query)
            .await?
            .ok_or(AppointmentError::DoctorNotFound)
    }

    async fn find_populated(&self, id: Uuid) -> Result<Option<Appointment>, AppointmentError> {
        let query = format!("select={}&id=eq.{}", POPULATED_SELECT, id);
        Ok(self.db.select_one("appointments", &query).await?)
    }

    fn notify_requested(&self, patient: &User, doctor: &User, appointment: &Appointment) {
        let mut outgoing = Vec::with_capacity(2);

        match patient.phone.as_deref().filter(|p| !p.trim().is_empty()) {
            Some(phone) => outgoing.push(Notification::sms(
                phone,
                appointment_requested_sms(appointment.appointment_date, &appointment.appointment_time),
            )),
            None => warn!("Patient {} has no phone number, skipping SMS", patient.id),
        }

        outgoing.push(Notification::email(
            &patient.email,
            appointment_requested_email(
                &patient.name,
                &doctor.name,
                &appointment.department,
                appointment.appointment_date,
                &appointment.appointment_time,
            ),
        ));

        if self.notifier.dispatch_all(outgoing).is_err() {
            warn!("Booking notifications for appointment {} were dropped", appointment.id);
        }
    }

    /// Appointments visible to `user`: patients see their own, doctors see the ones
    /// assigned to them, admins see everything. Newest date first.
    pub async fn list_for(&self, user: &User) -> Result<Vec<Appointment>, AppointmentError> {
        let scope = match user.role {
            Role::Patient => Some(format!("patient_id=eq.{}", user.id)),
            Role::Doctor => Some(format!("doctor_id=eq.{}", user.id)),
            Role::Admin => None,
        };
        debug!("Listing appointments for {} {}", user.role, user.id);
        self.list(scope).await
    }

    pub async fn list_all(&self) -> Result<Vec<Appointment>, AppointmentError> {
        self.list(None).await
    }

    async fn list(&self, scope: Option<String>) -> Result<Vec<Appointment>, AppointmentError> {
        let mut query = format!("select={}&order=appointment_date.desc", POPULATED_SELECT);
        if let Some(filter) = scope {
            query.push('&');
            query.push_str(&filter);
        }
        Ok(self.db.select::<Appointment>("appointments", &query).await?)
    }
}
