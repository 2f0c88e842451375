// libs/user-cell/src/services/records.rs
use std::sync::Arc;

use serde_json::json;
use tracing::{info, warn};
use uuid::Uuid;

use shared_database::SupabaseClient;
use shared_models::user::{Role, User};
use shared_utils::AppState;

use crate::models::{CreateRecordRequest, Record, UploadedFile, UserError};
use crate::services::uploads::store_upload;

const POPULATED_SELECT: &str = "*,patient:users!patient_id(id,name,email,phone),\
doctor:users!doctor_id(id,name,specialization,department)";

pub struct RecordService {
    db: Arc<SupabaseClient>,
    upload_dir: String,
}

impl RecordService {
    pub fn new(state: &AppState) -> Self {
        Self {
            db: state.db.clone(),
            upload_dir: state.config.upload_dir.clone(),
        }
    }

    pub async fn create(&self, doctor: &User, request: CreateRecordRequest) -> Result<Record, UserError> {
        let new = request.validate(doctor.id)?;

        let query = format!("select=id,role&id=eq.{}", new.patient_id);
        let patient: Option<serde_json::Value> = self.db.select_one("users", &query).await?;
        let is_patient = patient
            .as_ref()
            .and_then(|p| p.get("role"))
            .and_then(|r| r.as_str())
            == Some(Role::Patient.as_str());
        if !is_patient {
            return Err(UserError::PatientNotFound);
        }

        let row = serde_json::to_value(&new).map_err(|e| UserError::Database(e.into()))?;
        let created: Record = self.db.insert("records", row).await?;
        info!("Doctor {} created record {} for patient {}", doctor.id, created.id, new.patient_id);

        match self.find_populated(created.id).await? {
            Some(record) => Ok(record),
            None => {
                warn!("Record {} not readable after insert", created.id);
                Ok(created)
            }
        }
    }

    async fn find_populated(&self, id: Uuid) -> Result<Option<Record>, UserError> {
        let query = format!("select={}&id=eq.{}", POPULATED_SELECT, id);
        Ok(self.db.select_one("records", &query).await?)
    }

    /// Patients only ever see their own records; doctors and admins see all.
    pub async fn list_for(&self, user: &User) -> Result<Vec<Record>, UserError> {
        match user.role {
            Role::Patient => self.list(Some(user.id)).await,
            Role::Doctor | Role::Admin => self.list(None).await,
        }
    }

    pub async fn list_for_patient(&self, patient_id: Uuid) -> Result<Vec<Record>, UserError> {
        self.list(Some(patient_id)).await
    }

    async fn list(&self, patient_id: Option<Uuid>) -> Result<Vec<Record>, UserError> {
        let mut query = format!("select={}&order=created_at.desc", POPULATED_SELECT);
        if let Some(patient_id) = patient_id {
            query.push_str(&format!("&patient_id=eq.{}", patient_id));
        }
        Ok(self.db.select("records", &query).await?)
    }

    /// Stores the file and appends its descriptor. Only the record's author may attach.
    pub async fn attach_document(
        &self,
        doctor: &User,
        record_id: Uuid,
        file: UploadedFile,
    ) -> Result<Record, UserError> {
        let query = format!("select=*&id=eq.{}", record_id);
        let record: Record = self
            .db
            .select_one("records", &query)
            .await?
            .ok_or(UserError::RecordNotFound)?;

        if record.doctor_id != doctor.id {
            return Err(UserError::NotRecordAuthor);
        }

        let document = store_upload(&self.upload_dir, file).await?;

        let mut documents = record.documents;
        documents.push(document);

        let filter = format!("id=eq.{}", record_id);
        let updated = self
            .db
            .update::<Record>("records", &filter, json!({ "documents": documents }))
            .await?
            .into_iter()
            .next()
            .ok_or(UserError::RecordNotFound)?;

        info!("Document attached to record {} ({} total)", record_id, updated.documents.len());
        Ok(updated)
    }
}
