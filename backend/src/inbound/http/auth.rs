//! Authentication API handlers.
//!
//! ```text
//! POST /api/auth/login {"email":"ada@example.com","password":"secret","role":"subadmin"}
//! ```

use actix_web::{post, web};
use serde::{Deserialize, Serialize};
use serde_json::json;
use utoipa::ToSchema;

use crate::domain::{Error, LoginCredentials, LoginValidationError, User};
use crate::inbound::http::ApiResult;
use crate::inbound::http::state::HttpState;

/// Login request body for `POST /api/auth/login`.
///
/// `role` is optional; when present the login fails unless the account
/// actually holds that role.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
    #[serde(default)]
    pub role: Option<String>,
}

/// Login response: the bearer token plus the profile the client renders.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponse {
    pub token: String,
    /// RFC 3339 instant after which the token stops working.
    #[schema(format = "date-time")]
    pub expires_at: String,
    pub user: User,
}

/// Authenticate and issue a signed session token.
#[utoipa::path(
    post,
    path = "/api/auth/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Login success", body = LoginResponse),
        (status = 400, description = "Invalid request", body = Error),
        (status = 401, description = "Invalid credentials", body = Error),
        (status = 403, description = "Role mismatch", body = Error),
        (status = 500, description = "Internal server error", body = Error)
    ),
    tags = ["auth"],
    operation_id = "login",
    security([])
)]
#[post("/auth/login")]
pub async fn login(
    state: web::Data<HttpState>,
    payload: web::Json<LoginRequest>,
) -> ApiResult<web::Json<LoginResponse>> {
    let payload = payload.into_inner();
    let credentials = LoginCredentials::try_from_parts(
        &payload.email,
        &payload.password,
        payload.role.as_deref(),
    )
    .map_err(map_login_validation_error)?;

    let authenticated = state.login.authenticate(&credentials).await?;
    Ok(web::Json(LoginResponse {
        token: authenticated.token,
        expires_at: authenticated.session.expires_at().to_rfc3339(),
        user: authenticated.user,
    }))
}

fn map_login_validation_error(err: LoginValidationError) -> Error {
    match err {
        LoginValidationError::InvalidEmail => Error::invalid_request("email must be a valid address")
            .with_details(json!({ "field": "email", "code": "invalid_email" })),
        LoginValidationError::EmptyPassword => Error::invalid_request("password must not be empty")
            .with_details(json!({ "field": "password", "code": "empty_password" })),
        LoginValidationError::UnknownRole => {
            Error::invalid_request("role must be one of superadmin, subadmin, or agent")
                .with_details(json!({ "field": "role", "code": "unknown_role" }))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ports::{AuthenticatedSession, MockLoginService};
    use crate::domain::{
        DisplayName, EmailAddress, Role, Session, UserId, default_session_ttl,
    };
    use crate::inbound::http::test_utils::test_state;
    use actix_web::{App, test as actix_test, web};
    use chrono::Utc;
    use rstest::rstest;
    use serde_json::Value;
    use std::sync::Arc;

    fn fixture_user() -> User {
        User::new(
            UserId::new("3fa85f64-5717-4562-b3fc-2c963f66afa6").expect("id"),
            DisplayName::new("Ada Lovelace").expect("name"),
            EmailAddress::new("ada@example.com").expect("email"),
            Role::Subadmin,
        )
    }

    fn state_with_login(login: MockLoginService) -> HttpState {
        let mut state = test_state(b"auth-handler-test-secret-value!!");
        state.login = Arc::new(login);
        state
    }

    async fn post_login(state: HttpState, body: &LoginRequest) -> (actix_web::http::StatusCode, Value) {
        let app = actix_test::init_service(
            App::new()
                .app_data(web::Data::new(state))
                .service(web::scope("/api").service(login)),
        )
        .await;
        let request = actix_test::TestRequest::post()
            .uri("/api/auth/login")
            .set_json(body)
            .to_request();
        let response = actix_test::call_service(&app, request).await;
        let status = response.status();
        let body = actix_test::read_body(response).await;
        let value: Value = serde_json::from_slice(&body).expect("JSON body");
        (status, value)
    }

    #[rstest]
    #[case("not-an-email", "pw", None, "email", "invalid_email")]
    #[case("ada@example.com", "", None, "password", "empty_password")]
    #[case(
        "ada@example.com",
        "pw",
        Some("support-agent"),
        "role",
        "unknown_role"
    )]
    #[actix_web::test]
    async fn malformed_payloads_are_rejected_with_field_details(
        #[case] email: &str,
        #[case] password: &str,
        #[case] role: Option<&str>,
        #[case] field: &str,
        #[case] detail_code: &str,
    ) {
        let mut login_service = MockLoginService::new();
        login_service.expect_authenticate().never();
        let (status, value) = post_login(
            state_with_login(login_service),
            &LoginRequest {
                email: email.into(),
                password: password.into(),
                role: role.map(Into::into),
            },
        )
        .await;
        assert_eq!(status, actix_web::http::StatusCode::BAD_REQUEST);
        assert_eq!(
            value.get("code").and_then(Value::as_str),
            Some("invalid_request")
        );
        let details = value.get("details").expect("details present");
        assert_eq!(details.get("field").and_then(Value::as_str), Some(field));
        assert_eq!(
            details.get("code").and_then(Value::as_str),
            Some(detail_code)
        );
    }

    #[actix_web::test]
    async fn successful_login_returns_token_expiry_and_profile() {
        let user = fixture_user();
        let session = Session::issue(
            user.id().clone(),
            user.role(),
            Utc::now(),
            default_session_ttl(),
        );
        let mut login_service = MockLoginService::new();
        let response_session = session.clone();
        let response_user = user.clone();
        login_service.expect_authenticate().returning(move |_| {
            Ok(AuthenticatedSession {
                token: "signed-token".to_owned(),
                session: response_session.clone(),
                user: response_user.clone(),
            })
        });

        let (status, value) = post_login(
            state_with_login(login_service),
            &LoginRequest {
                email: "ada@example.com".into(),
                password: "password".into(),
                role: Some("subadmin".into()),
            },
        )
        .await;
        assert_eq!(status, actix_web::http::StatusCode::OK);
        assert_eq!(
            value.get("token").and_then(Value::as_str),
            Some("signed-token")
        );
        assert_eq!(
            value.get("expiresAt").and_then(Value::as_str),
            Some(session.expires_at().to_rfc3339().as_str())
        );
        let profile = value.get("user").expect("user present");
        assert_eq!(
            profile.get("email").and_then(Value::as_str),
            Some("ada@example.com")
        );
        assert_eq!(profile.get("role").and_then(Value::as_str), Some("subadmin"));
    }

    #[actix_web::test]
    async fn credential_failures_pass_through_as_unauthorised() {
        let mut login_service = MockLoginService::new();
        login_service
            .expect_authenticate()
            .returning(|_| Err(Error::invalid_credentials("invalid email or password")));
        let (status, value) = post_login(
            state_with_login(login_service),
            &LoginRequest {
                email: "ada@example.com".into(),
                password: "wrong".into(),
                role: None,
            },
        )
        .await;
        assert_eq!(status, actix_web::http::StatusCode::UNAUTHORIZED);
        assert_eq!(
            value.get("code").and_then(Value::as_str),
            Some("invalid_credentials")
        );
    }
}
