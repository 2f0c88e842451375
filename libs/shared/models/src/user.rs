use std::fmt;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Columns that are safe to hand back to clients. Everything except the password hash.
pub const PUBLIC_USER_COLUMNS: &str = "id,name,email,phone,role,specialization,department,experience,\
date_of_birth,gender,address,avatar,is_active,is_approved,approved_by,approved_at,rejection_reason,\
created_at,updated_at";

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    Doctor,
    #[default]
    Patient,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::Doctor => "doctor",
            Role::Patient => "patient",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum Department {
    Cardiology,
    Neurology,
    Orthopedics,
    Pediatrics,
    Dermatology,
    #[serde(rename = "General Medicine")]
    GeneralMedicine,
}

impl fmt::Display for Department {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Department::Cardiology => "Cardiology",
            Department::Neurology => "Neurology",
            Department::Orthopedics => "Orthopedics",
            Department::Pediatrics => "Pediatrics",
            Department::Dermatology => "Dermatology",
            Department::GeneralMedicine => "General Medicine",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum Gender {
    Male,
    Female,
    Other,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    #[serde(default, skip_serializing)]
    pub password_hash: Option<String>,
    pub phone: Option<String>,
    #[serde(default)]
    pub role: Role,
    pub specialization: Option<String>,
    pub department: Option<Department>,
    pub experience: Option<i32>,
    pub date_of_birth: Option<NaiveDate>,
    pub gender: Option<Gender>,
    pub address: Option<String>,
    pub avatar: Option<String>,
    #[serde(default = "default_true")]
    pub is_active: bool,
    #[serde(default = "default_true")]
    pub is_approved: bool,
    pub approved_by: Option<Uuid>,
    pub approved_at: Option<DateTime<Utc>>,
    pub rejection_reason: Option<String>,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

fn default_true() -> bool {
    true
}

impl User {
    pub fn is_doctor(&self) -> bool {
        self.role == Role::Doctor
    }

    /// Doctors stay locked out until an admin approves them.
    pub fn awaiting_approval(&self) -> bool {
        self.is_doctor() && !self.is_approved
    }

    pub fn summary(&self) -> UserSummary {
        UserSummary {
            id: self.id,
            name: self.name.clone(),
            email: Some(self.email.clone()),
            phone: self.phone.clone(),
            role: Some(self.role),
            specialization: self.specialization.clone(),
            department: self.department,
            avatar: self.avatar.clone(),
        }
    }
}

/// Projection used when another document embeds a user reference.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct UserSummary {
    pub id: Uuid,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<Role>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub specialization: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub department: Option<Department>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avatar: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_password_hash_is_never_serialized() {
        let user: User = serde_json::from_value(json!({
            "id": Uuid::new_v4(),
            "name": "Dr. Who",
            "email": "who@example.com",
            "password_hash": "$argon2id$secret",
            "phone": "9876543210",
            "role": "doctor",
            "specialization": "Time",
            "department": "General Medicine",
            "is_approved": false
        }))
        .unwrap();

        assert_eq!(user.password_hash.as_deref(), Some("$argon2id$secret"));
        assert!(user.awaiting_approval());

        let out = serde_json::to_value(&user).unwrap();
        assert!(out.get("password_hash").is_none());
        assert_eq!(out["department"], "General Medicine");
        assert_eq!(out["role"], "doctor");
    }

    #[test]
    fn test_approval_defaults_to_true() {
        let user: User = serde_json::from_value(json!({
            "id": Uuid::new_v4(),
            "name": "Pat",
            "email": "pat@example.com"
        }))
        .unwrap();

        assert_eq!(user.role, Role::Patient);
        assert!(user.is_active);
        assert!(!user.awaiting_approval());
    }
}
