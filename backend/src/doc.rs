//! OpenAPI documentation configuration.
//!
//! This module defines the [`ApiDoc`] struct which generates the OpenAPI
//! specification for the REST API. It registers:
//!
//! - **Paths**: All HTTP endpoints from the inbound layer (auth, users,
//!   leads, health)
//! - **Schemas**: Domain payloads and handler DTOs
//! - **Security**: The bearer-token authentication scheme
//!
//! The generated specification backs Swagger UI in debug builds.

use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};

use crate::domain::{
    AgentPerformance, Error, ErrorCode, ImportFailure, LeadStatus, Role, StatusCounts, User,
};
use crate::inbound::http::auth::{LoginRequest, LoginResponse};
use crate::inbound::http::leads::{
    CreateLeadRequest, DashboardResponse, ImportReport, LeadResponse, UpdateLeadRequest,
};
use crate::inbound::http::users::{CreateUserRequest, UpdateUserRequest};

/// Enrich the generated document with the bearer-token security scheme.
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi
            .components
            .get_or_insert_with(utoipa::openapi::Components::default);

        components.add_security_scheme(
            "BearerToken",
            SecurityScheme::Http(
                HttpBuilder::new()
                    .scheme(HttpAuthScheme::Bearer)
                    .bearer_format("JWT")
                    .build(),
            ),
        );
    }
}

/// OpenAPI document for the REST API.
/// Swagger UI is enabled in debug builds only and used by tooling.
#[derive(OpenApi)]
#[openapi(
    modifiers(&SecurityAddon),
    info(
        title = "Lead-management backend API",
        description = "HTTP interface for role-gated lead management and dashboards."
    ),
    servers(
        (url = "/", description = "Relative to the deployment base URL")
    ),
    security(("BearerToken" = [])),
    paths(
        crate::inbound::http::auth::login,
        crate::inbound::http::users::create_user,
        crate::inbound::http::users::list_users,
        crate::inbound::http::users::update_user,
        crate::inbound::http::users::delete_user,
        crate::inbound::http::leads::create_lead,
        crate::inbound::http::leads::list_leads,
        crate::inbound::http::leads::my_leads,
        crate::inbound::http::leads::update_lead,
        crate::inbound::http::leads::delete_lead,
        crate::inbound::http::leads::dashboard_stats,
        crate::inbound::http::leads::export_leads,
        crate::inbound::http::leads::import_leads,
        crate::inbound::http::health::ready,
        crate::inbound::http::health::live,
    ),
    components(schemas(
        Error,
        ErrorCode,
        Role,
        User,
        LeadStatus,
        StatusCounts,
        AgentPerformance,
        ImportFailure,
        LoginRequest,
        LoginResponse,
        CreateUserRequest,
        UpdateUserRequest,
        CreateLeadRequest,
        UpdateLeadRequest,
        LeadResponse,
        DashboardResponse,
        ImportReport,
    )),
    tags(
        (name = "auth", description = "Login and session issuance"),
        (name = "users", description = "User provisioning, superadmin only"),
        (name = "leads", description = "Lead management and dashboards"),
        (name = "health", description = "Endpoints for health checks")
    )
)]
pub struct ApiDoc;
