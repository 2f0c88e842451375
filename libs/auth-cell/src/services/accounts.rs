use std::sync::Arc;

use chrono::NaiveDate;
use serde::Serialize;
use tracing::debug;

use shared_database::SupabaseClient;
use shared_models::user::{Department, Gender, Role, User};

use crate::models::AuthError;

/// Row written to `users` on registration or seeding.
#[derive(Debug, Clone, Serialize)]
pub struct NewAccount {
    pub name: String,
    pub email: String,
    pub password_hash: String,
    pub phone: Option<String>,
    pub role: Role,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub specialization: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub department: Option<Department>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub experience: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date_of_birth: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gender: Option<Gender>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    pub is_active: bool,
    pub is_approved: bool,
}

pub struct AccountStore {
    db: Arc<SupabaseClient>,
}

impl AccountStore {
    pub fn new(db: Arc<SupabaseClient>) -> Self {
        Self { db }
    }

    /// Full row including the password hash. Only for credential checks.
    pub async fn find_by_email(&self, email: &str) -> Result<Option<User>, AuthError> {
        let query = format!("select=*&email=eq.{}", urlencoding::encode(email));
        Ok(self.db.select_one::<User>("users", &query).await?)
    }

    pub async fn email_exists(&self, email: &str) -> Result<bool, AuthError> {
        let query = format!("select=id&email=eq.{}", urlencoding::encode(email));
        let rows: Vec<serde_json::Value> = self.db.select("users", &query).await?;
        Ok(!rows.is_empty())
    }

    pub async fn insert(&self, account: NewAccount) -> Result<User, AuthError> {
        debug!("Creating {} account for {}", account.role, account.email);
        let row = serde_json::to_value(&account).map_err(|e| AuthError::Database(e.into()))?;
        Ok(self.db.insert::<User>("users", row).await?)
    }
}
