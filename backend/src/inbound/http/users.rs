//! User provisioning API handlers, superadmin only.
//!
//! ```text
//! POST   /api/users
//! GET    /api/users
//! PUT    /api/users/{id}
//! DELETE /api/users/{id}
//! ```

use actix_web::{HttpResponse, delete, get, post, put, web};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::str::FromStr;
use utoipa::ToSchema;
use zeroize::Zeroizing;

use crate::domain::{
    DisplayName, EmailAddress, Error, NewUser, Role, User, UserChanges, UserId,
};
use crate::inbound::http::ApiResult;
use crate::inbound::http::identity::Caller;
use crate::inbound::http::state::HttpState;

/// Request body for `POST /api/users`.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateUserRequest {
    pub email: String,
    pub password: String,
    /// `subadmin` or `agent`; the superadmin role cannot be provisioned.
    pub role: String,
    /// Optional display name; defaults to the email local part.
    #[serde(default)]
    pub name: Option<String>,
}

/// Request body for `PUT /api/users/{id}`. Absent fields stay unchanged.
#[derive(Debug, Default, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateUserRequest {
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub password: Option<String>,
    #[serde(default)]
    pub role: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
}

fn field_error(message: impl Into<String>, field: &str) -> Error {
    Error::invalid_request(message).with_details(json!({ "field": field }))
}

fn parse_email(raw: &str) -> Result<EmailAddress, Error> {
    EmailAddress::new(raw).map_err(|err| field_error(err.to_string(), "email"))
}

fn parse_role(raw: &str) -> Result<Role, Error> {
    Role::from_str(raw).map_err(|err| field_error(err.to_string(), "role"))
}

fn parse_name(raw: String) -> Result<DisplayName, Error> {
    DisplayName::new(raw).map_err(|err| field_error(err.to_string(), "name"))
}

fn parse_password(raw: String) -> Result<Zeroizing<String>, Error> {
    if raw.is_empty() {
        return Err(field_error("password must not be empty", "password"));
    }
    Ok(Zeroizing::new(raw))
}

fn parse_user_id(raw: &str) -> Result<UserId, Error> {
    UserId::new(raw).map_err(|err| field_error(err.to_string(), "id"))
}

/// Provision a subadmin or agent account.
#[utoipa::path(
    post,
    path = "/api/users",
    request_body = CreateUserRequest,
    responses(
        (status = 201, description = "User created", body = User),
        (status = 400, description = "Invalid request", body = Error),
        (status = 401, description = "Unauthenticated", body = Error),
        (status = 403, description = "Forbidden", body = Error),
        (status = 409, description = "Email already in use", body = Error),
        (status = 500, description = "Internal server error", body = Error)
    ),
    tags = ["users"],
    operation_id = "createUser"
)]
#[post("/users")]
pub async fn create_user(
    state: web::Data<HttpState>,
    caller: Caller,
    payload: web::Json<CreateUserRequest>,
) -> ApiResult<HttpResponse> {
    let payload = payload.into_inner();
    let new_user = NewUser {
        email: parse_email(&payload.email)?,
        password: parse_password(payload.password)?,
        role: parse_role(&payload.role)?,
        name: payload.name.map(parse_name).transpose()?,
    };
    let user = state.users.create(caller.context(), new_user).await?;
    Ok(HttpResponse::Created().json(user))
}

/// List every subadmin and agent account.
#[utoipa::path(
    get,
    path = "/api/users",
    responses(
        (status = 200, description = "Users", body = [User]),
        (status = 401, description = "Unauthenticated", body = Error),
        (status = 403, description = "Forbidden", body = Error),
        (status = 500, description = "Internal server error", body = Error)
    ),
    tags = ["users"],
    operation_id = "listUsers"
)]
#[get("/users")]
pub async fn list_users(
    state: web::Data<HttpState>,
    caller: Caller,
) -> ApiResult<web::Json<Vec<User>>> {
    let users = state.users.list(caller.context()).await?;
    Ok(web::Json(users))
}

/// Update an existing account.
#[utoipa::path(
    put,
    path = "/api/users/{id}",
    request_body = UpdateUserRequest,
    params(
        ("id" = String, Path, description = "User identifier")
    ),
    responses(
        (status = 200, description = "Updated user", body = User),
        (status = 400, description = "Invalid request", body = Error),
        (status = 401, description = "Unauthenticated", body = Error),
        (status = 403, description = "Forbidden", body = Error),
        (status = 404, description = "Not found", body = Error),
        (status = 409, description = "Email already in use", body = Error),
        (status = 500, description = "Internal server error", body = Error)
    ),
    tags = ["users"],
    operation_id = "updateUser"
)]
#[put("/users/{id}")]
pub async fn update_user(
    state: web::Data<HttpState>,
    caller: Caller,
    path: web::Path<String>,
    payload: web::Json<UpdateUserRequest>,
) -> ApiResult<web::Json<User>> {
    let id = parse_user_id(&path.into_inner())?;
    let payload = payload.into_inner();
    let changes = UserChanges {
        name: payload.name.map(parse_name).transpose()?,
        email: payload.email.as_deref().map(parse_email).transpose()?,
        role: payload.role.as_deref().map(parse_role).transpose()?,
        password: payload.password.map(parse_password).transpose()?,
    };
    let user = state.users.update(caller.context(), &id, changes).await?;
    Ok(web::Json(user))
}

/// Remove an account.
#[utoipa::path(
    delete,
    path = "/api/users/{id}",
    params(
        ("id" = String, Path, description = "User identifier")
    ),
    responses(
        (status = 204, description = "User deleted"),
        (status = 400, description = "Invalid request", body = Error),
        (status = 401, description = "Unauthenticated", body = Error),
        (status = 403, description = "Forbidden", body = Error),
        (status = 404, description = "Not found", body = Error),
        (status = 500, description = "Internal server error", body = Error)
    ),
    tags = ["users"],
    operation_id = "deleteUser"
)]
#[delete("/users/{id}")]
pub async fn delete_user(
    state: web::Data<HttpState>,
    caller: Caller,
    path: web::Path<String>,
) -> ApiResult<HttpResponse> {
    let id = parse_user_id(&path.into_inner())?;
    state.users.delete(caller.context(), &id).await?;
    Ok(HttpResponse::NoContent().finish())
}
