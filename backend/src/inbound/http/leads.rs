//! Lead API handlers.
//!
//! ```text
//! GET    /api/leads/dashboard
//! GET    /api/leads/export
//! POST   /api/leads/import
//! GET    /api/leads/mine
//! GET    /api/leads
//! POST   /api/leads
//! PUT    /api/leads/{id}
//! DELETE /api/leads/{id}
//! ```
//!
//! Register the literal paths before the `{id}` routes so `dashboard`,
//! `export`, `import`, and `mine` are never captured as an id.

use actix_web::http::header;
use actix_web::{HttpResponse, delete, get, post, put, web};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::json;
use std::str::FromStr;
use utoipa::ToSchema;

use crate::domain::{
    AgentPerformance, DashboardStats, EmailAddress, Error, ImportFailure, ImportOutcome, Lead,
    LeadDraft, LeadId, LeadPatch, LeadStatus, PhoneNumber, StatusCounts, UserId,
};
use crate::inbound::http::ApiResult;
use crate::inbound::http::identity::Caller;
use crate::inbound::http::state::HttpState;
use crate::outbound::tabular::{RowError, leads_to_csv, parse_leads_csv};

/// Request body for `POST /api/leads`.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateLeadRequest {
    pub name: String,
    pub email: String,
    pub phone: String,
    #[serde(default)]
    pub source: Option<String>,
    /// Defaults to `new`.
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub tags: Option<Vec<String>>,
    #[serde(default)]
    pub notes: Option<Vec<String>>,
    #[serde(default)]
    pub assigned_to: Option<String>,
}

/// Request body for `PUT /api/leads/{id}`. Absent fields stay unchanged;
/// `assignedTo: null` explicitly clears the assignment.
#[derive(Debug, Default, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateLeadRequest {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub source: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub tags: Option<Vec<String>>,
    #[serde(default)]
    pub notes: Option<Vec<String>>,
    #[serde(default, deserialize_with = "double_option")]
    #[schema(value_type = Option<String>, nullable)]
    pub assigned_to: Option<Option<String>>,
}

/// Distinguish an absent field (outer `None`) from an explicit `null`
/// (`Some(None)`).
fn double_option<'de, T, D>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    Deserialize::deserialize(deserializer).map(Some)
}

/// Query parameters for `GET /api/leads`.
#[derive(Debug, Default, Deserialize)]
pub struct ListLeadsQuery {
    status: Option<String>,
}

/// Lead payload returned by every lead endpoint.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LeadResponse {
    #[schema(format = "uuid")]
    pub id: String,
    pub name: String,
    pub email: String,
    pub phone: String,
    pub source: Option<String>,
    pub status: LeadStatus,
    pub tags: Vec<String>,
    pub notes: Vec<String>,
    #[schema(format = "uuid")]
    pub assigned_to: Option<String>,
    #[schema(format = "uuid")]
    pub created_by: String,
    #[schema(format = "date-time")]
    pub created_at: String,
    #[schema(format = "date-time")]
    pub updated_at: String,
}

impl From<Lead> for LeadResponse {
    fn from(lead: Lead) -> Self {
        Self {
            id: lead.id().to_string(),
            name: lead.name().to_owned(),
            email: lead.email().to_string(),
            phone: lead.phone().to_string(),
            source: lead.source().map(ToOwned::to_owned),
            status: lead.status(),
            tags: lead.tags().to_vec(),
            notes: lead.notes().to_vec(),
            assigned_to: lead.assigned_to().map(ToString::to_string),
            created_by: lead.created_by().to_string(),
            created_at: lead.created_at().to_rfc3339(),
            updated_at: lead.updated_at().to_rfc3339(),
        }
    }
}

/// Dashboard payload for `GET /api/leads/dashboard`.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DashboardResponse {
    pub total_leads: u64,
    pub status_counts: StatusCounts,
    pub agent_performance: Vec<AgentPerformance>,
    pub recent_leads: Vec<LeadResponse>,
    pub conversion_rate: f64,
}

impl From<DashboardStats> for DashboardResponse {
    fn from(stats: DashboardStats) -> Self {
        Self {
            total_leads: stats.total_leads,
            status_counts: stats.status_counts,
            agent_performance: stats.agent_performance,
            recent_leads: stats
                .recent_leads
                .into_iter()
                .map(LeadResponse::from)
                .collect(),
            conversion_rate: stats.conversion_rate,
        }
    }
}

/// Import summary for `POST /api/leads/import`.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ImportReport {
    pub imported: u64,
    /// Rows that were skipped, parse failures and duplicates alike, ordered
    /// by line.
    pub failures: Vec<ImportFailure>,
}

fn field_error(message: impl Into<String>, field: &str) -> Error {
    Error::invalid_request(message).with_details(json!({ "field": field }))
}

fn parse_email(raw: &str) -> Result<EmailAddress, Error> {
    EmailAddress::new(raw).map_err(|err| field_error(err.to_string(), "email"))
}

fn parse_phone(raw: &str) -> Result<PhoneNumber, Error> {
    PhoneNumber::new(raw).map_err(|err| field_error(err.to_string(), "phone"))
}

fn parse_status(raw: &str) -> Result<LeadStatus, Error> {
    LeadStatus::from_str(raw).map_err(|err| field_error(err.to_string(), "status"))
}

fn parse_assignee(raw: &str) -> Result<UserId, Error> {
    UserId::new(raw).map_err(|err| field_error(err.to_string(), "assignedTo"))
}

fn parse_lead_id(raw: &str) -> Result<LeadId, Error> {
    LeadId::new(raw).map_err(|err| field_error(err.to_string(), "id"))
}

/// Create a lead.
#[utoipa::path(
    post,
    path = "/api/leads",
    request_body = CreateLeadRequest,
    responses(
        (status = 201, description = "Lead created", body = LeadResponse),
        (status = 400, description = "Invalid request", body = Error),
        (status = 401, description = "Unauthenticated", body = Error),
        (status = 403, description = "Forbidden", body = Error),
        (status = 409, description = "Duplicate email or phone", body = Error),
        (status = 500, description = "Internal server error", body = Error)
    ),
    tags = ["leads"],
    operation_id = "createLead"
)]
#[post("/leads")]
pub async fn create_lead(
    state: web::Data<HttpState>,
    caller: Caller,
    payload: web::Json<CreateLeadRequest>,
) -> ApiResult<HttpResponse> {
    let payload = payload.into_inner();
    let mut draft = LeadDraft::new(
        payload.name,
        parse_email(&payload.email)?,
        parse_phone(&payload.phone)?,
    );
    draft.source = payload.source;
    if let Some(status) = payload.status.as_deref() {
        draft.status = parse_status(status)?;
    }
    draft.tags = payload.tags.unwrap_or_default();
    draft.notes = payload.notes.unwrap_or_default();
    draft.assigned_to = payload
        .assigned_to
        .as_deref()
        .map(parse_assignee)
        .transpose()?;

    let lead = state.leads.create(caller.context(), draft).await?;
    Ok(HttpResponse::Created().json(LeadResponse::from(lead)))
}

/// List every visible lead, optionally narrowed by status.
#[utoipa::path(
    get,
    path = "/api/leads",
    params(
        ("status" = Option<String>, Query, description = "Only leads in this status")
    ),
    responses(
        (status = 200, description = "Leads", body = [LeadResponse]),
        (status = 400, description = "Invalid request", body = Error),
        (status = 401, description = "Unauthenticated", body = Error),
        (status = 403, description = "Forbidden", body = Error),
        (status = 500, description = "Internal server error", body = Error)
    ),
    tags = ["leads"],
    operation_id = "listLeads"
)]
#[get("/leads")]
pub async fn list_leads(
    state: web::Data<HttpState>,
    caller: Caller,
    query: web::Query<ListLeadsQuery>,
) -> ApiResult<web::Json<Vec<LeadResponse>>> {
    let status = query.status.as_deref().map(parse_status).transpose()?;
    let leads = state.leads.list(caller.context(), status).await?;
    Ok(web::Json(leads.into_iter().map(LeadResponse::from).collect()))
}

/// List leads assigned to the caller.
#[utoipa::path(
    get,
    path = "/api/leads/mine",
    responses(
        (status = 200, description = "Assigned leads", body = [LeadResponse]),
        (status = 401, description = "Unauthenticated", body = Error),
        (status = 500, description = "Internal server error", body = Error)
    ),
    tags = ["leads"],
    operation_id = "myLeads"
)]
#[get("/leads/mine")]
pub async fn my_leads(
    state: web::Data<HttpState>,
    caller: Caller,
) -> ApiResult<web::Json<Vec<LeadResponse>>> {
    let leads = state.leads.list_assigned(caller.context()).await?;
    Ok(web::Json(leads.into_iter().map(LeadResponse::from).collect()))
}

/// Update a lead.
#[utoipa::path(
    put,
    path = "/api/leads/{id}",
    request_body = UpdateLeadRequest,
    params(
        ("id" = String, Path, description = "Lead identifier")
    ),
    responses(
        (status = 200, description = "Updated lead", body = LeadResponse),
        (status = 400, description = "Invalid request", body = Error),
        (status = 401, description = "Unauthenticated", body = Error),
        (status = 403, description = "Forbidden", body = Error),
        (status = 404, description = "Not found", body = Error),
        (status = 409, description = "Duplicate email or phone", body = Error),
        (status = 500, description = "Internal server error", body = Error)
    ),
    tags = ["leads"],
    operation_id = "updateLead"
)]
#[put("/leads/{id}")]
pub async fn update_lead(
    state: web::Data<HttpState>,
    caller: Caller,
    path: web::Path<String>,
    payload: web::Json<UpdateLeadRequest>,
) -> ApiResult<web::Json<LeadResponse>> {
    let id = parse_lead_id(&path.into_inner())?;
    let payload = payload.into_inner();
    let patch = LeadPatch {
        name: payload.name,
        email: payload.email.as_deref().map(parse_email).transpose()?,
        phone: payload.phone.as_deref().map(parse_phone).transpose()?,
        source: payload.source,
        status: payload.status.as_deref().map(parse_status).transpose()?,
        tags: payload.tags,
        notes: payload.notes,
        assigned_to: match payload.assigned_to {
            None => None,
            Some(None) => Some(None),
            Some(Some(raw)) => Some(Some(parse_assignee(&raw)?)),
        },
    };
    let lead = state.leads.update(caller.context(), &id, patch).await?;
    Ok(web::Json(LeadResponse::from(lead)))
}

/// Delete a lead.
#[utoipa::path(
    delete,
    path = "/api/leads/{id}",
    params(
        ("id" = String, Path, description = "Lead identifier")
    ),
    responses(
        (status = 204, description = "Lead deleted"),
        (status = 400, description = "Invalid request", body = Error),
        (status = 401, description = "Unauthenticated", body = Error),
        (status = 403, description = "Forbidden", body = Error),
        (status = 404, description = "Not found", body = Error),
        (status = 500, description = "Internal server error", body = Error)
    ),
    tags = ["leads"],
    operation_id = "deleteLead"
)]
#[delete("/leads/{id}")]
pub async fn delete_lead(
    state: web::Data<HttpState>,
    caller: Caller,
    path: web::Path<String>,
) -> ApiResult<HttpResponse> {
    let id = parse_lead_id(&path.into_inner())?;
    state.leads.delete(caller.context(), &id).await?;
    Ok(HttpResponse::NoContent().finish())
}

/// Dashboard statistics over the caller's visible leads.
#[utoipa::path(
    get,
    path = "/api/leads/dashboard",
    responses(
        (status = 200, description = "Dashboard statistics", body = DashboardResponse),
        (status = 401, description = "Unauthenticated", body = Error),
        (status = 500, description = "Internal server error", body = Error)
    ),
    tags = ["leads"],
    operation_id = "dashboardStats"
)]
#[get("/leads/dashboard")]
pub async fn dashboard_stats(
    state: web::Data<HttpState>,
    caller: Caller,
) -> ApiResult<web::Json<DashboardResponse>> {
    let stats = state.dashboard.compute_stats(caller.context()).await?;
    Ok(web::Json(DashboardResponse::from(stats)))
}

/// Export every visible lead as CSV.
#[utoipa::path(
    get,
    path = "/api/leads/export",
    responses(
        (status = 200, description = "CSV document with one row per lead"),
        (status = 401, description = "Unauthenticated", body = Error),
        (status = 403, description = "Forbidden", body = Error),
        (status = 500, description = "Internal server error", body = Error)
    ),
    tags = ["leads"],
    operation_id = "exportLeads"
)]
#[get("/leads/export")]
pub async fn export_leads(state: web::Data<HttpState>, caller: Caller) -> ApiResult<HttpResponse> {
    let leads = state.leads.export(caller.context()).await?;
    let document = leads_to_csv(&leads)?;
    Ok(HttpResponse::Ok()
        .content_type("text/csv; charset=utf-8")
        .insert_header((
            header::CONTENT_DISPOSITION,
            "attachment; filename=\"leads.csv\"",
        ))
        .body(document))
}

/// Bulk-import leads from a CSV body.
#[utoipa::path(
    post,
    path = "/api/leads/import",
    request_body(content = String, content_type = "text/csv"),
    responses(
        (status = 200, description = "Import report", body = ImportReport),
        (status = 400, description = "Unparseable upload", body = Error),
        (status = 401, description = "Unauthenticated", body = Error),
        (status = 403, description = "Forbidden", body = Error),
        (status = 500, description = "Internal server error", body = Error)
    ),
    tags = ["leads"],
    operation_id = "importLeads"
)]
#[post("/leads/import")]
pub async fn import_leads(
    state: web::Data<HttpState>,
    caller: Caller,
    body: web::Bytes,
) -> ApiResult<web::Json<ImportReport>> {
    let (rows, row_errors) = parse_leads_csv(&body)?;
    let drafts = rows.into_iter().map(|row| (row.line, row.draft)).collect();
    let outcome = state.leads.import(caller.context(), drafts).await?;
    Ok(web::Json(merge_report(outcome, row_errors)))
}

fn merge_report(outcome: ImportOutcome, row_errors: Vec<RowError>) -> ImportReport {
    let mut failures: Vec<ImportFailure> = row_errors
        .into_iter()
        .map(|err| ImportFailure {
            line: err.line,
            reason: err.message,
        })
        .chain(outcome.failures)
        .collect();
    failures.sort_by_key(|failure| failure.line);
    ImportReport {
        imported: outcome.imported,
        failures,
    }
}
