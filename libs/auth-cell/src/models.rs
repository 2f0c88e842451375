use std::sync::OnceLock;

use chrono::NaiveDate;
use regex::Regex;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use shared_models::error::AppError;
use shared_models::user::{Department, Gender, Role};

pub const MIN_PASSWORD_LENGTH: usize = 6;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RegisterRequest {
    pub name: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
    pub phone: Option<String>,
    pub role: Option<Role>,
    pub specialization: Option<String>,
    pub department: Option<Department>,
    pub experience: Option<i32>,
    pub date_of_birth: Option<NaiveDate>,
    pub gender: Option<Gender>,
    pub address: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LoginRequest {
    pub email: Option<String>,
    pub password: Option<String>,
}

/// A registration that passed boundary validation.
#[derive(Debug, Clone)]
pub struct ValidRegistration {
    pub name: String,
    pub email: String,
    pub password: String,
    pub phone: String,
    pub role: Role,
    pub specialization: Option<String>,
    pub department: Option<Department>,
    pub experience: Option<i32>,
    pub date_of_birth: Option<NaiveDate>,
    pub gender: Option<Gender>,
    pub address: Option<String>,
}

fn present(value: &Option<String>) -> Option<String> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

fn email_pattern() -> &'static Regex {
    static EMAIL: OnceLock<Regex> = OnceLock::new();
    EMAIL.get_or_init(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("valid email regex"))
}

pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

impl RegisterRequest {
    pub fn validate(self) -> Result<ValidRegistration, AuthError> {
        let (Some(name), Some(email), Some(password), Some(phone)) = (
            present(&self.name),
            present(&self.email),
            self.password.clone().filter(|p| !p.is_empty()),
            present(&self.phone),
        ) else {
            return Err(AuthError::Validation(
                "Please provide all required fields: name, email, password, and phone".to_string(),
            ));
        };

        let email = normalize_email(&email);
        if !email_pattern().is_match(&email) {
            return Err(AuthError::Validation("Please provide a valid email".to_string()));
        }

        if password.chars().count() < MIN_PASSWORD_LENGTH {
            return Err(AuthError::Validation(format!(
                "Password must be at least {} characters",
                MIN_PASSWORD_LENGTH
            )));
        }

        let role = self.role.unwrap_or_default();
        if role == Role::Admin {
            return Err(AuthError::AdminRegistration);
        }

        let specialization = present(&self.specialization);
        if role == Role::Doctor && (specialization.is_none() || self.department.is_none()) {
            return Err(AuthError::Validation(
                "Specialization and department are required for doctors".to_string(),
            ));
        }

        let is_doctor = role == Role::Doctor;

        Ok(ValidRegistration {
            name,
            email,
            password,
            phone,
            role,
            specialization: specialization.filter(|_| is_doctor),
            department: self.department.filter(|_| is_doctor),
            experience: self.experience.filter(|_| is_doctor),
            date_of_birth: self.date_of_birth,
            gender: self.gender,
            address: present(&self.address),
        })
    }
}

#[derive(Debug, Serialize)]
pub struct PendingDoctorResponse {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub role: Role,
    pub is_approved: bool,
}

#[derive(Debug, Serialize)]
pub struct SessionResponse {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub role: Role,
    pub phone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub specialization: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub department: Option<Department>,
    pub is_approved: bool,
    pub token: String,
}

#[derive(Debug)]
pub enum Registration {
    PendingApproval(PendingDoctorResponse),
    Active(SessionResponse),
}

#[derive(Error, Debug)]
pub enum AuthError {
    #[error("{0}")]
    Validation(String),

    #[error("User with this email already exists")]
    EmailTaken,

    #[error("Admin accounts cannot be self-registered")]
    AdminRegistration,

    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("Your account is pending admin approval. You will receive an email once your account is approved.")]
    PendingApproval,

    #[error("Your account has been deactivated. Please contact support.")]
    Deactivated,

    #[error("Password hashing failed: {0}")]
    Password(String),

    #[error("Token error: {0}")]
    Token(String),

    #[error("Database error: {0}")]
    Database(#[from] anyhow::Error),
}

impl From<AuthError> for AppError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::Validation(msg) => AppError::ValidationError(msg),
            AuthError::EmailTaken => AppError::BadRequest(err.to_string()),
            AuthError::AdminRegistration | AuthError::PendingApproval | AuthError::Deactivated => {
                AppError::Forbidden(err.to_string())
            }
            AuthError::InvalidCredentials => AppError::Auth(err.to_string()),
            AuthError::Password(_) | AuthError::Token(_) => AppError::Internal(err.to_string()),
            AuthError::Database(e) => AppError::Database(e.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    fn patient() -> RegisterRequest {
        RegisterRequest {
            name: Some("Pat Doe".into()),
            email: Some("  Pat@Example.COM ".into()),
            password: Some("secret1".into()),
            phone: Some("9876543210".into()),
            ..Default::default()
        }
    }

    #[test]
    fn test_patient_registration_is_normalised() {
        let valid = patient().validate().unwrap();
        assert_eq!(valid.email, "pat@example.com");
        assert_eq!(valid.role, Role::Patient);
    }

    #[test]
    fn test_missing_phone_is_rejected() {
        let req = RegisterRequest { phone: None, ..patient() };
        assert_matches!(req.validate(), Err(AuthError::Validation(msg)) if msg.contains("phone"));
    }

    #[test]
    fn test_short_password_is_rejected() {
        let req = RegisterRequest { password: Some("12345".into()), ..patient() };
        assert_matches!(req.validate(), Err(AuthError::Validation(_)));
    }

    #[test]
    fn test_invalid_email_is_rejected() {
        let req = RegisterRequest { email: Some("not-an-email".into()), ..patient() };
        assert_matches!(req.validate(), Err(AuthError::Validation(_)));
    }

    #[test]
    fn test_doctor_requires_specialization_and_department() {
        let req = RegisterRequest {
            role: Some(Role::Doctor),
            specialization: Some("Cardiologist".into()),
            ..patient()
        };
        assert_matches!(req.validate(), Err(AuthError::Validation(msg)) if msg.contains("department"));

        let req = RegisterRequest {
            role: Some(Role::Doctor),
            specialization: Some("Cardiologist".into()),
            department: Some(Department::Cardiology),
            ..patient()
        };
        assert!(req.validate().is_ok());
    }

    #[test]
    fn test_admin_cannot_self_register() {
        let req = RegisterRequest { role: Some(Role::Admin), ..patient() };
        assert_matches!(req.validate(), Err(AuthError::AdminRegistration));
    }

    #[test]
    fn test_patient_doctor_fields_are_dropped() {
        let req = RegisterRequest {
            specialization: Some("Ignored".into()),
            department: Some(Department::Neurology),
            ..patient()
        };
        let valid = req.validate().unwrap();
        assert!(valid.specialization.is_none());
        assert!(valid.department.is_none());
    }
}
