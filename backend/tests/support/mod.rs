//! Shared fixtures for API integration tests.
//!
//! Each test assembles the exact production graph (`build_state` +
//! `build_app`) around in-memory stores seeded with one user per role, then
//! drives the API over HTTP the way a client would.

use std::sync::Arc;

use actix_http::Request;
use actix_web::dev::{Service, ServiceResponse};
use actix_web::http::{Method, StatusCode, header};
use actix_web::{test, web};
use serde_json::{Value, json};

use backend::domain::ports::{PasswordHasher as _, UserStore as _};
use backend::domain::{DisplayName, EmailAddress, Role, User, UserId, UserRecord, default_session_ttl};
use backend::inbound::http::health::HealthState;
use backend::outbound::persistence::{InMemoryLeadStore, InMemoryUserStore};
use backend::outbound::security::Argon2PasswordHasher;
use backend::server::{build_app, build_state};

/// Shared password for every seeded account.
pub const PASSWORD: &str = "correct horse battery staple";

const TOKEN_SECRET: &[u8] = b"integration-test-secret-integration";

/// The accounts present after [`spawn`].
pub struct SeededUsers {
    pub superadmin: User,
    pub subadmin: User,
    pub agent1: User,
    pub agent2: User,
}

fn seeded_user(name: &str, email: &str, role: Role) -> User {
    User::new(
        UserId::random(),
        DisplayName::new(name).expect("seed name"),
        EmailAddress::new(email).expect("seed email"),
        role,
    )
}

/// Boot an app over freshly seeded stores.
pub async fn spawn() -> (
    impl Service<Request, Response = ServiceResponse, Error = actix_web::Error>,
    SeededUsers,
) {
    let users = Arc::new(InMemoryUserStore::new());
    let leads = Arc::new(InMemoryLeadStore::new());

    let seeded = SeededUsers {
        superadmin: seeded_user("Root", "root@crm.example", Role::Superadmin),
        subadmin: seeded_user("Sub Admin", "sub@crm.example", Role::Subadmin),
        agent1: seeded_user("Agent One", "agent1@crm.example", Role::Agent),
        agent2: seeded_user("Agent Two", "agent2@crm.example", Role::Agent),
    };
    // One digest shared across the seeds keeps the fixture fast.
    let hash = Argon2PasswordHasher::new().hash(PASSWORD).expect("hash");
    for user in [
        &seeded.superadmin,
        &seeded.subadmin,
        &seeded.agent1,
        &seeded.agent2,
    ] {
        users
            .insert(UserRecord::new(user.clone(), hash.clone()))
            .await
            .expect("seed user");
    }

    let state = build_state(users, leads, TOKEN_SECRET, default_session_ttl());
    let app = test::init_service(build_app(state, web::Data::new(HealthState::new()))).await;
    (app, seeded)
}

/// Log in and return the bearer token.
pub async fn login<S>(app: &S, email: &str) -> String
where
    S: Service<Request, Response = ServiceResponse, Error = actix_web::Error>,
{
    let (status, body) = request(
        app,
        Method::POST,
        "/api/auth/login",
        None,
        Some(json!({ "email": email, "password": PASSWORD })),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "login failed: {body}");
    body.get("token")
        .and_then(Value::as_str)
        .expect("token in login response")
        .to_owned()
}

/// Issue a request with an optional bearer token and JSON body; returns the
/// status and the parsed body (`Value::Null` for empty responses).
pub async fn request<S>(
    app: &S,
    method: Method,
    path: &str,
    token: Option<&str>,
    body: Option<Value>,
) -> (StatusCode, Value)
where
    S: Service<Request, Response = ServiceResponse, Error = actix_web::Error>,
{
    let mut builder = test::TestRequest::with_uri(path).method(method);
    if let Some(token) = token {
        builder = builder.insert_header((header::AUTHORIZATION, format!("Bearer {token}")));
    }
    if let Some(body) = body {
        builder = builder.set_json(body);
    }
    let response = test::call_service(app, builder.to_request()).await;
    let status = response.status();
    let bytes = test::read_body(response).await;
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or_else(|_| {
            Value::String(String::from_utf8_lossy(&bytes).into_owned())
        })
    };
    (status, value)
}

/// The `code` field of an error payload.
pub fn error_code(body: &Value) -> &str {
    body.get("code")
        .and_then(Value::as_str)
        .unwrap_or_default()
}
