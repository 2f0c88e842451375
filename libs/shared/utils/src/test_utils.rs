use std::sync::Arc;
use std::time::Duration as StdDuration;

use async_trait::async_trait;
use axum::{
    body::{to_bytes, Body},
    http::{header, Method, Request},
    response::Response,
};
use chrono::{Duration, Utc};
use serde_json::{json, Value};
use tokio::sync::mpsc;
use uuid::Uuid;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use shared_config::AppConfig;
use shared_models::user::{Role, User};
use shared_notifications::{
    EmailReceipt, EmailSender, Notification, NotificationDispatcher, NotificationError,
    SmsReceipt, SmsSender,
};

use crate::jwt::issue_token;
use crate::state::AppState;

pub struct TestConfig {
    pub jwt_secret: String,
    pub supabase_url: String,
    pub supabase_service_key: String,
    pub frontend_url: String,
    pub upload_dir: String,
}

impl Default for TestConfig {
    fn default() -> Self {
        Self {
            jwt_secret: "test-secret-key-for-jwt-validation-must-be-long-enough".to_string(),
            supabase_url: "http://localhost:54321".to_string(),
            supabase_service_key: "test-service-key".to_string(),
            frontend_url: "http://localhost:5173".to_string(),
            upload_dir: "uploads".to_string(),
        }
    }
}

impl TestConfig {
    pub fn with_database(url: &str) -> Self {
        Self {
            supabase_url: url.to_string(),
            ..Self::default()
        }
    }

    pub fn to_app_config(&self) -> AppConfig {
        AppConfig {
            supabase_url: self.supabase_url.clone(),
            supabase_service_key: self.supabase_service_key.clone(),
            jwt_secret: self.jwt_secret.clone(),
            jwt_expires_in: "30d".to_string(),
            mail_relay_url: String::new(),
            mail_relay_api_key: String::new(),
            mail_from: String::new(),
            twilio_account_sid: String::new(),
            twilio_auth_token: String::new(),
            twilio_phone_number: String::new(),
            twilio_api_base_url: String::new(),
            sms_country_code: "91".to_string(),
            frontend_url: self.frontend_url.clone(),
            upload_dir: self.upload_dir.clone(),
            port: 0,
        }
    }

    pub fn to_arc(&self) -> Arc<AppConfig> {
        Arc::new(self.to_app_config())
    }
}

#[derive(Debug, Clone)]
pub struct TestUser {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub role: Role,
    pub phone: Option<String>,
    pub is_approved: bool,
    pub is_active: bool,
}

impl Default for TestUser {
    fn default() -> Self {
        Self::new("test@example.com", Role::Patient)
    }
}

impl TestUser {
    pub fn new(email: &str, role: Role) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: email.split('@').next().unwrap_or("user").to_string(),
            email: email.to_string(),
            role,
            phone: Some("9876543210".to_string()),
            is_approved: true,
            is_active: true,
        }
    }

    pub fn doctor(email: &str) -> Self {
        Self::new(email, Role::Doctor)
    }

    pub fn patient(email: &str) -> Self {
        Self::new(email, Role::Patient)
    }

    pub fn admin(email: &str) -> Self {
        Self::new(email, Role::Admin)
    }

    pub fn pending(mut self) -> Self {
        self.is_approved = false;
        self
    }

    pub fn without_phone(mut self) -> Self {
        self.phone = None;
        self
    }

    pub fn to_json(&self) -> Value {
        let doctor = self.role == Role::Doctor;
        let specialization = doctor.then_some("General Practice");
        let department = doctor.then_some("General Medicine");
        json!({
            "id": self.id,
            "name": self.name,
            "email": self.email,
            "phone": self.phone,
            "role": self.role,
            "specialization": specialization,
            "department": department,
            "is_active": self.is_active,
            "is_approved": self.is_approved,
            "created_at": "2024-01-01T00:00:00Z",
            "updated_at": "2024-01-01T00:00:00Z"
        })
    }

    pub fn to_user(&self) -> User {
        serde_json::from_value(self.to_json()).expect("test user is a valid User")
    }

    pub fn summary_json(&self) -> Value {
        json!({
            "id": self.id,
            "name": self.name,
            "email": self.email,
            "phone": self.phone,
        })
    }

    pub fn token(&self, secret: &str) -> String {
        JwtTestUtils::create_test_token(self, secret, Some(24))
    }
}

pub struct JwtTestUtils;

impl JwtTestUtils {
    pub fn create_test_token(user: &TestUser, secret: &str, exp_hours: Option<i64>) -> String {
        issue_token(
            &user.id.to_string(),
            &user.email,
            user.role,
            secret,
            Duration::hours(exp_hours.unwrap_or(24)),
        )
        .expect("test secret is not empty")
    }

    pub fn create_expired_token(user: &TestUser, secret: &str) -> String {
        Self::create_test_token(user, secret, Some(-1))
    }

    pub fn create_invalid_signature_token(user: &TestUser) -> String {
        Self::create_test_token(user, "wrong-secret", Some(24))
    }

    pub fn create_malformed_token() -> String {
        "invalid.token.format".to_string()
    }
}

pub struct MockSupabaseResponses;

impl MockSupabaseResponses {
    pub fn appointment_response(
        id: Uuid,
        patient: &TestUser,
        doctor: &TestUser,
        status: &str,
        populated: bool,
    ) -> Value {
        let mut row = json!({
            "id": id,
            "patient_id": patient.id,
            "doctor_id": doctor.id,
            "appointment_date": "2026-03-14",
            "appointment_time": "10:30 AM",
            "department": "General Medicine",
            "reason": "Persistent cough",
            "status": status,
            "notes": null,
            "created_at": Utc::now().to_rfc3339(),
            "updated_at": Utc::now().to_rfc3339()
        });
        if populated {
            row["patient"] = patient.summary_json();
            row["doctor"] = doctor.summary_json();
        }
        row
    }

    pub fn record_response(id: Uuid, patient: &TestUser, doctor: &TestUser) -> Value {
        json!({
            "id": id,
            "patient_id": patient.id,
            "doctor_id": doctor.id,
            "visit_date": "2026-03-14T10:30:00Z",
            "diagnosis": "Seasonal allergies",
            "prescription": "Cetirizine 10mg",
            "test_results": null,
            "notes": null,
            "documents": [],
            "created_at": "2026-03-14T10:30:00Z",
            "updated_at": "2026-03-14T10:30:00Z"
        })
    }

    pub fn message_response(id: Uuid, sender: &TestUser, receiver: &TestUser, content: &str, minutes_ago: i64) -> Value {
        json!({
            "id": id,
            "sender_id": sender.id,
            "receiver_id": receiver.id,
            "content": content,
            "is_read": false,
            "created_at": (Utc::now() - Duration::minutes(minutes_ago)).to_rfc3339(),
            "sender": { "id": sender.id, "name": sender.name, "role": sender.role },
            "receiver": { "id": receiver.id, "name": receiver.name, "role": receiver.role }
        })
    }

    pub fn error_response(message: &str, code: &str) -> Value {
        json!({
            "message": message,
            "code": code
        })
    }
}

/// Answers the auth middleware's user lookup for `user`.
pub async fn mount_authenticated_user(server: &MockServer, user: &TestUser) {
    Mock::given(method("GET"))
        .and(path("/rest/v1/users"))
        .and(query_param("id", format!("eq.{}", user.id)))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([user.to_json()])))
        .mount(server)
        .await;
}

/// Transport double that forwards every notification to the test instead of sending it.
pub struct CapturingTransport {
    tx: mpsc::UnboundedSender<Notification>,
}

#[async_trait]
impl EmailSender for CapturingTransport {
    async fn send_email(&self, to: &str, subject: &str, html: &str) -> Result<EmailReceipt, NotificationError> {
        let _ = self.tx.send(Notification::Email {
            to: to.to_string(),
            subject: subject.to_string(),
            html: html.to_string(),
        });
        Ok(EmailReceipt::default())
    }
}

#[async_trait]
impl SmsSender for CapturingTransport {
    async fn send_sms(&self, to: &str, body: &str) -> Result<SmsReceipt, NotificationError> {
        let _ = self.tx.send(Notification::sms(to, body));
        Ok(SmsReceipt {
            sid: "SMTEST".to_string(),
            status: "queued".to_string(),
            to: to.to_string(),
            error_code: None,
            error_message: None,
        })
    }
}

/// Transport double standing in for an unreachable gateway.
pub struct FailingTransport;

#[async_trait]
impl EmailSender for FailingTransport {
    async fn send_email(&self, _to: &str, _subject: &str, _html: &str) -> Result<EmailReceipt, NotificationError> {
        Err(NotificationError::Rejected {
            status: 503,
            message: "mail relay unreachable".to_string(),
        })
    }
}

#[async_trait]
impl SmsSender for FailingTransport {
    async fn send_sms(&self, _to: &str, _body: &str) -> Result<SmsReceipt, NotificationError> {
        Err(NotificationError::Rejected {
            status: 503,
            message: "sms gateway unreachable".to_string(),
        })
    }
}

pub struct NotificationCapture {
    rx: mpsc::UnboundedReceiver<Notification>,
}

impl NotificationCapture {
    pub async fn next(&mut self) -> Option<Notification> {
        tokio::time::timeout(StdDuration::from_secs(2), self.rx.recv())
            .await
            .ok()
            .flatten()
    }

    pub async fn take(&mut self, count: usize) -> Vec<Notification> {
        let mut out = Vec::with_capacity(count);
        for _ in 0..count {
            match self.next().await {
                Some(n) => out.push(n),
                None => break,
            }
        }
        out
    }

    /// True when nothing arrives within a short grace period.
    pub async fn is_quiet(&mut self) -> bool {
        tokio::time::timeout(StdDuration::from_millis(200), self.rx.recv())
            .await
            .is_err()
    }
}

/// State whose notifications are captured for inspection.
pub fn capturing_state(config: AppConfig) -> (AppState, NotificationCapture) {
    let (tx, rx) = mpsc::unbounded_channel();
    let transport = Arc::new(CapturingTransport { tx });
    let (notifier, _) = NotificationDispatcher::spawn(transport.clone(), transport);
    (AppState::new(Arc::new(config), notifier), NotificationCapture { rx })
}

/// State whose notification gateway always fails.
pub fn failing_state(config: AppConfig) -> AppState {
    let transport = Arc::new(FailingTransport);
    let (notifier, _) = NotificationDispatcher::spawn(transport.clone(), transport);
    AppState::new(Arc::new(config), notifier)
}

pub fn json_request(method: Method, uri: &str, token: Option<&str>, body: Option<Value>) -> Request<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
    }
    let body = match body {
        Some(value) => {
            builder = builder.header(header::CONTENT_TYPE, "application/json");
            Body::from(value.to_string())
        }
        None => Body::empty(),
    };
    builder.body(body).expect("valid test request")
}

pub async fn read_json(response: Response) -> Value {
    let bytes = to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("readable response body");
    serde_json::from_slice(&bytes).unwrap_or(Value::Null)
}
