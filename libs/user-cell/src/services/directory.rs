use std::sync::Arc;

use tracing::debug;

use shared_database::SupabaseClient;
use shared_models::user::{User, PUBLIC_USER_COLUMNS};

use crate::models::UserError;

pub struct UserDirectoryService {
    db: Arc<SupabaseClient>,
}

impl UserDirectoryService {
    pub fn new(db: Arc<SupabaseClient>) -> Self {
        Self { db }
    }

    /// Approved doctors, optionally narrowed to one department.
    pub async fn doctors(&self, department: Option<&str>) -> Result<Vec<User>, UserError> {
        let mut query = format!(
            "select={}&role=eq.doctor&is_approved=eq.true&order=name.asc",
            PUBLIC_USER_COLUMNS
        );
        if let Some(department) = department.map(str::trim).filter(|d| !d.is_empty()) {
            debug!("Filtering doctors by department {}", department);
            query.push_str(&format!("&department=eq.{}", urlencoding::encode(department)));
        }
        Ok(self.db.select("users", &query).await?)
    }

    pub async fn patients(&self) -> Result<Vec<User>, UserError> {
        let query = format!("select={}&role=eq.patient&order=name.asc", PUBLIC_USER_COLUMNS);
        Ok(self.db.select("users", &query).await?)
    }
}
