use assert_matches::assert_matches;
use axum::http::{Method, StatusCode};
use serde_json::{json, Value};
use tower::ServiceExt;
use wiremock::matchers::{body_partial_json, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use auth_cell::auth_routes;
use auth_cell::services::password::hash_password;
use shared_models::user::Role;
use shared_notifications::Notification;
use shared_utils::test_utils::{
    capturing_state, json_request, mount_authenticated_user, read_json, JwtTestUtils, TestConfig,
    TestUser,
};

fn stored_row(user: &TestUser, password: &str) -> Value {
    let mut row = user.to_json();
    row["password_hash"] = json!(hash_password(password).unwrap());
    row
}

async fn mount_login_lookup(server: &MockServer, email: &str, rows: Value) {
    Mock::given(method("GET"))
        .and(path("/rest/v1/users"))
        .and(query_param("select", "*"))
        .and(query_param("email", format!("eq.{}", email)))
        .respond_with(ResponseTemplate::new(200).set_body_json(rows))
        .mount(server)
        .await;
}

async fn mount_email_check(server: &MockServer, email: &str, rows: Value) {
    Mock::given(method("GET"))
        .and(path("/rest/v1/users"))
        .and(query_param("select", "id"))
        .and(query_param("email", format!("eq.{}", email)))
        .respond_with(ResponseTemplate::new(200).set_body_json(rows))
        .mount(server)
        .await;
}

fn login_body(email: &str, password: &str) -> Option<Value> {
    Some(json!({ "email": email, "password": password }))
}

#[tokio::test]
async fn test_patient_registration_returns_token_and_sends_welcome() {
    let server = MockServer::start().await;
    let config = TestConfig::with_database(&server.uri());
    let (state, mut capture) = capturing_state(config.to_app_config());

    let patient = TestUser::patient("new.patient@example.com");
    mount_email_check(&server, &patient.email, json!([])).await;
    Mock::given(method("POST"))
        .and(path("/rest/v1/users"))
        .and(body_partial_json(json!({
            "email": "new.patient@example.com",
            "role": "patient",
            "is_approved": true
        })))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!([patient.to_json()])))
        .expect(1)
        .mount(&server)
        .await;

    let response = auth_routes(state)
        .oneshot(json_request(
            Method::POST,
            "/register",
            None,
            Some(json!({
                "name": "New Patient",
                "email": "New.Patient@Example.com",
                "password": "secret1",
                "phone": "9876543210"
            })),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::CREATED);
    let body = read_json(response).await;
    assert_eq!(body["success"], true);
    assert!(body["data"]["token"].as_str().is_some_and(|t| t.split('.').count() == 3));

    assert_matches!(
        capture.next().await,
        Some(Notification::Email { to, subject, .. })
            if to == "new.patient@example.com" && subject.contains("Welcome")
    );
}

#[tokio::test]
async fn test_doctor_registration_is_pending_without_token() {
    let server = MockServer::start().await;
    let config = TestConfig::with_database(&server.uri());
    let (state, mut capture) = capturing_state(config.to_app_config());

    let doctor = TestUser::doctor("dr.house@example.com").pending();
    mount_email_check(&server, &doctor.email, json!([])).await;
    Mock::given(method("POST"))
        .and(path("/rest/v1/users"))
        .and(body_partial_json(json!({ "role": "doctor", "is_approved": false })))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!([doctor.to_json()])))
        .expect(1)
        .mount(&server)
        .await;

    let response = auth_routes(state)
        .oneshot(json_request(
            Method::POST,
            "/register",
            None,
            Some(json!({
                "name": "Gregory House",
                "email": "dr.house@example.com",
                "password": "vicodin",
                "phone": "9876543210",
                "role": "doctor",
                "specialization": "Diagnostics",
                "department": "General Medicine"
            })),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::CREATED);
    let body = read_json(response).await;
    assert_eq!(body["data"]["is_approved"], false);
    assert!(body["data"].get("token").is_none());

    assert_matches!(
        capture.next().await,
        Some(Notification::Email { subject, .. }) if subject.contains("Pending Approval")
    );
}

#[tokio::test]
async fn test_duplicate_email_is_rejected() {
    let server = MockServer::start().await;
    let (state, mut capture) = capturing_state(TestConfig::with_database(&server.uri()).to_app_config());

    mount_email_check(&server, "taken@example.com", json!([{ "id": uuid::Uuid::new_v4() }])).await;
    Mock::given(method("POST"))
        .and(path("/rest/v1/users"))
        .respond_with(ResponseTemplate::new(201))
        .expect(0)
        .mount(&server)
        .await;

    let response = auth_routes(state)
        .oneshot(json_request(
            Method::POST,
            "/register",
            None,
            Some(json!({
                "name": "Someone",
                "email": "taken@example.com",
                "password": "secret1",
                "phone": "9876543210"
            })),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = read_json(response).await;
    assert_eq!(body["success"], false);
    assert_eq!(body["message"], "User with this email already exists");
    assert!(capture.is_quiet().await);
}

#[tokio::test]
async fn test_register_validation_errors() {
    let (state, _capture) = capturing_state(TestConfig::default().to_app_config());
    let app = auth_routes(state);

    let cases = [
        (json!({ "name": "A", "email": "a@example.com", "password": "secret1" }), StatusCode::BAD_REQUEST),
        (json!({ "name": "A", "email": "a@example.com", "password": "123", "phone": "1" }), StatusCode::BAD_REQUEST),
        (json!({ "name": "A", "email": "nope", "password": "secret1", "phone": "1" }), StatusCode::BAD_REQUEST),
        (
            json!({ "name": "A", "email": "a@example.com", "password": "secret1", "phone": "1", "role": "doctor" }),
            StatusCode::BAD_REQUEST,
        ),
        (
            json!({ "name": "A", "email": "a@example.com", "password": "secret1", "phone": "1", "role": "admin" }),
            StatusCode::FORBIDDEN,
        ),
    ];

    for (body, expected) in cases {
        let response = app
            .clone()
            .oneshot(json_request(Method::POST, "/register", None, Some(body.clone())))
            .await
            .unwrap();
        assert_eq!(response.status(), expected, "body: {}", body);
    }
}

#[tokio::test]
async fn test_pending_doctor_cannot_login_regardless_of_password() {
    let server = MockServer::start().await;
    let (state, _capture) = capturing_state(TestConfig::with_database(&server.uri()).to_app_config());

    let doctor = TestUser::doctor("pending.doc@example.com").pending();
    mount_login_lookup(&server, &doctor.email, json!([stored_row(&doctor, "right-password")])).await;

    let app = auth_routes(state);
    for password in ["right-password", "wrong-password"] {
        let response = app
            .clone()
            .oneshot(json_request(Method::POST, "/login", None, login_body(&doctor.email, password)))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::FORBIDDEN);
        let body = read_json(response).await;
        assert!(body["message"].as_str().unwrap().contains("pending admin approval"));
    }
}

#[tokio::test]
async fn test_approved_doctor_can_login() {
    let server = MockServer::start().await;
    let (state, _capture) = capturing_state(TestConfig::with_database(&server.uri()).to_app_config());

    let doctor = TestUser::doctor("approved.doc@example.com");
    mount_login_lookup(&server, &doctor.email, json!([stored_row(&doctor, "right-password")])).await;

    let response = auth_routes(state)
        .oneshot(json_request(Method::POST, "/login", None, login_body(&doctor.email, "right-password")))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = read_json(response).await;
    assert_eq!(body["data"]["id"], json!(doctor.id));
    assert_eq!(body["data"]["role"], json!(Role::Doctor));
    assert!(body["data"]["token"].is_string());
}

#[tokio::test]
async fn test_wrong_password_and_unknown_email_share_a_message() {
    let server = MockServer::start().await;
    let (state, _capture) = capturing_state(TestConfig::with_database(&server.uri()).to_app_config());

    let patient = TestUser::patient("pat@example.com");
    mount_login_lookup(&server, &patient.email, json!([stored_row(&patient, "secret1")])).await;
    // A rejected doctor's row is deleted, so the lookup comes back empty.
    mount_login_lookup(&server, "rejected.doc@example.com", json!([])).await;

    let app = auth_routes(state);
    for (email, password) in [("pat@example.com", "not-it"), ("rejected.doc@example.com", "secret1")] {
        let response = app
            .clone()
            .oneshot(json_request(Method::POST, "/login", None, login_body(email, password)))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(read_json(response).await["message"], "Invalid credentials");
    }
}

#[tokio::test]
async fn test_rejected_doctor_login_is_invalid_credentials_not_pending() {
    let server = MockServer::start().await;
    let (state, _capture) = capturing_state(TestConfig::with_database(&server.uri()).to_app_config());

    let doctor = TestUser::doctor("rejected.doc@example.com").pending();
    // Before rejection the row is pending; rejection deletes it.
    Mock::given(method("GET"))
        .and(path("/rest/v1/users"))
        .and(query_param("email", format!("eq.{}", doctor.email)))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([stored_row(&doctor, "secret1")])))
        .up_to_n_times(1)
        .mount(&server)
        .await;
    mount_login_lookup(&server, &doctor.email, json!([])).await;

    let app = auth_routes(state);
    let before = app
        .clone()
        .oneshot(json_request(Method::POST, "/login", None, login_body(&doctor.email, "secret1")))
        .await
        .unwrap();
    assert_eq!(before.status(), StatusCode::FORBIDDEN);

    let after = app
        .oneshot(json_request(Method::POST, "/login", None, login_body(&doctor.email, "secret1")))
        .await
        .unwrap();
    assert_eq!(after.status(), StatusCode::UNAUTHORIZED);
    let body = read_json(after).await;
    assert_eq!(body["message"], "Invalid credentials");
    assert!(!body["message"].as_str().unwrap().contains("pending"));
}

#[tokio::test]
async fn test_deactivated_user_cannot_login() {
    let server = MockServer::start().await;
    let (state, _capture) = capturing_state(TestConfig::with_database(&server.uri()).to_app_config());

    let mut patient = TestUser::patient("gone@example.com");
    patient.is_active = false;
    mount_login_lookup(&server, &patient.email, json!([stored_row(&patient, "secret1")])).await;

    let response = auth_routes(state)
        .oneshot(json_request(Method::POST, "/login", None, login_body(&patient.email, "secret1")))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_login_requires_both_fields() {
    let (state, _capture) = capturing_state(TestConfig::default().to_app_config());

    let response = auth_routes(state)
        .oneshot(json_request(Method::POST, "/login", None, Some(json!({ "email": "a@example.com" }))))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_profile_returns_caller_without_password() {
    let server = MockServer::start().await;
    let config = TestConfig::with_database(&server.uri());
    let (state, _capture) = capturing_state(config.to_app_config());

    let patient = TestUser::patient("me@example.com");
    mount_authenticated_user(&server, &patient).await;

    let token = patient.token(&config.jwt_secret);
    let response = auth_routes(state)
        .oneshot(json_request(Method::GET, "/profile", Some(&token), None))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = read_json(response).await;
    assert_eq!(body["data"]["email"], "me@example.com");
    assert!(body["data"].get("password_hash").is_none());
}

#[tokio::test]
async fn test_profile_rejects_missing_and_bad_tokens() {
    let config = TestConfig::default();
    let (state, _capture) = capturing_state(config.to_app_config());
    let app = auth_routes(state);

    let user = TestUser::default();
    let tokens = [
        None,
        Some(JwtTestUtils::create_expired_token(&user, &config.jwt_secret)),
        Some(JwtTestUtils::create_invalid_signature_token(&user)),
        Some(JwtTestUtils::create_malformed_token()),
    ];

    for token in tokens {
        let response = app
            .clone()
            .oneshot(json_request(Method::GET, "/profile", token.as_deref(), None))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }
}
