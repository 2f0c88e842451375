use std::sync::Arc;

use futures::try_join;
use tracing::debug;

use shared_database::SupabaseClient;

use crate::models::{AdminError, DashboardStats};

pub struct StatsService {
    db: Arc<SupabaseClient>,
}

impl StatsService {
    pub fn new(db: Arc<SupabaseClient>) -> Self {
        Self { db }
    }

    /// Runs the five counts concurrently.
    pub async fn dashboard(&self) -> Result<DashboardStats, AdminError> {
        let (total_patients, total_doctors, pending_doctors, total_appointments, pending_appointments) = try_join!(
            self.db.count("users", "role=eq.patient"),
            self.db.count("users", "role=eq.doctor&is_approved=eq.true"),
            self.db.count("users", "role=eq.doctor&is_approved=eq.false"),
            self.db.count("appointments", ""),
            self.db.count("appointments", "status=eq.pending"),
        )?;

        let stats = DashboardStats {
            total_patients,
            total_doctors,
            pending_doctors,
            total_appointments,
            pending_appointments,
        };
        debug!("Dashboard stats: {:?}", stats);
        Ok(stats)
    }
}
