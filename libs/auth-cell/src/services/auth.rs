use std::sync::Arc;

use chrono::Duration;
use tracing::{debug, info, warn};

use shared_config::AppConfig;
use shared_models::user::{Role, User};
use shared_notifications::templates::{doctor_registration_pending_email, patient_welcome_email};
use shared_notifications::{Notification, NotificationDispatcher};
use shared_utils::jwt::{issue_token, parse_expiry};
use shared_utils::AppState;

use crate::models::{
    normalize_email, AuthError, LoginRequest, PendingDoctorResponse, RegisterRequest,
    Registration, SessionResponse,
};
use crate::services::accounts::{AccountStore, NewAccount};
use crate::services::password::{hash_password_blocking, verify_password_blocking};

const DEFAULT_TOKEN_TTL_DAYS: i64 = 30;

pub struct AuthService {
    accounts: AccountStore,
    config: Arc<AppConfig>,
    notifier: NotificationDispatcher,
}

impl AuthService {
    pub fn new(state: &AppState) -> Self {
        Self {
            accounts: AccountStore::new(state.db.clone()),
            config: state.config.clone(),
            notifier: state.notifier.clone(),
        }
    }

    fn token_ttl(&self) -> Duration {
        parse_expiry(&self.config.jwt_expires_in).unwrap_or_else(|| {
            warn!(
                "Unrecognised JWT_EXPIRE '{}', using {} days",
                self.config.jwt_expires_in, DEFAULT_TOKEN_TTL_DAYS
            );
            Duration::days(DEFAULT_TOKEN_TTL_DAYS)
        })
    }

    fn session(&self, user: &User) -> Result<SessionResponse, AuthError> {
        let token = issue_token(
            &user.id.to_string(),
            &user.email,
            user.role,
            &self.config.jwt_secret,
            self.token_ttl(),
        )
        .map_err(AuthError::Token)?;

        Ok(SessionResponse {
            id: user.id,
            name: user.name.clone(),
            email: user.email.clone(),
            role: user.role,
            phone: user.phone.clone(),
            specialization: user.specialization.clone(),
            department: user.department,
            is_approved: user.is_approved,
            token,
        })
    }

    pub async fn register(&self, request: RegisterRequest) -> Result<Registration, AuthError> {
        let valid = request.validate()?;

        if self.accounts.email_exists(&valid.email).await? {
            debug!("Registration refused, {} already registered", valid.email);
            return Err(AuthError::EmailTaken);
        }

        let password_hash = hash_password_blocking(valid.password).await?;
        let is_doctor = valid.role == Role::Doctor;

        let user = self
            .accounts
            .insert(NewAccount {
                name: valid.name,
                email: valid.email,
                password_hash,
                phone: Some(valid.phone),
                role: valid.role,
                specialization: valid.specialization,
                department: valid.department,
                experience: valid.experience,
                date_of_birth: valid.date_of_birth,
                gender: valid.gender,
                address: valid.address,
                is_active: true,
                is_approved: !is_doctor,
            })
            .await?;

        info!("Registered {} {}", user.role, user.id);

        if is_doctor {
            let content = doctor_registration_pending_email(
                &user.name,
                &user.email,
                user.specialization.as_deref().unwrap_or_default(),
                &user.department.map(|d| d.to_string()).unwrap_or_default(),
            );
            // Queue failures are already logged by the dispatcher.
            let _ = self.notifier.dispatch(Notification::email(&user.email, content));

            return Ok(Registration::PendingApproval(PendingDoctorResponse {
                id: user.id,
                name: user.name,
                email: user.email,
                role: user.role,
                is_approved: user.is_approved,
            }));
        }

        let content = patient_welcome_email(&user.name, &user.email, user.role.as_str());
        let _ = self.notifier.dispatch(Notification::email(&user.email, content));

        Ok(Registration::Active(self.session(&user)?))
    }

    pub async fn login(&self, request: LoginRequest) -> Result<SessionResponse, AuthError> {
        let (Some(email), Some(password)) = (
            request.email.filter(|e| !e.trim().is_empty()),
            request.password.filter(|p| !p.is_empty()),
        ) else {
            return Err(AuthError::Validation(
                "Please provide email and password".to_string(),
            ));
        };

        let user = self
            .accounts
            .find_by_email(&normalize_email(&email))
            .await?
            .ok_or(AuthError::InvalidCredentials)?;

        // Pending doctors are told so whether or not the password is right.
        if user.awaiting_approval() {
            debug!("Login refused, doctor {} awaiting approval", user.id);
            return Err(AuthError::PendingApproval);
        }

        let Some(hash) = user.password_hash.clone() else {
            warn!("User {} has no stored password hash", user.id);
            return Err(AuthError::InvalidCredentials);
        };

        if !verify_password_blocking(password, hash).await? {
            return Err(AuthError::InvalidCredentials);
        }

        if !user.is_active {
            return Err(AuthError::Deactivated);
        }

        info!("User {} logged in", user.id);
        self.session(&user)
    }
}
