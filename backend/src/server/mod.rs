//! Server assembly: state wiring, app construction, and the run loop.

pub mod config;

pub use config::{AppConfig, BootstrapSuperadmin};

use std::sync::Arc;

use actix_web::dev::{ServiceFactory, ServiceRequest, ServiceResponse};
use actix_web::{App, HttpServer, web};
use chrono::TimeDelta;
use mockable::{Clock, DefaultClock};
#[cfg(debug_assertions)]
use utoipa::OpenApi;
#[cfg(debug_assertions)]
use utoipa_swagger_ui::SwaggerUi;

#[cfg(debug_assertions)]
use crate::doc::ApiDoc;
use crate::domain::{Authenticator, DashboardService, LeadService, UserService};
use crate::inbound::http::health::{self, HealthState};
use crate::inbound::http::state::HttpState;
use crate::inbound::http::{auth, leads, users};
use crate::outbound::persistence::{InMemoryLeadStore, InMemoryUserStore};
use crate::outbound::security::{Argon2PasswordHasher, JwtSessionCodec};
use crate::seed;

/// Wire the HTTP state over the given stores.
///
/// Exposed so integration tests can assemble the exact production graph
/// around stores they control.
pub fn build_state(
    users: Arc<InMemoryUserStore>,
    leads: Arc<InMemoryLeadStore>,
    token_secret: &[u8],
    session_ttl: TimeDelta,
) -> HttpState {
    let hasher = Arc::new(Argon2PasswordHasher::new());
    let sessions = Arc::new(JwtSessionCodec::new(token_secret));
    let clock: Arc<dyn Clock> = Arc::new(DefaultClock);
    HttpState {
        login: Arc::new(Authenticator::new(
            users.clone(),
            hasher.clone(),
            sessions.clone(),
            clock.clone(),
            session_ttl,
        )),
        users: Arc::new(UserService::new(users.clone(), hasher)),
        leads: Arc::new(LeadService::new(leads.clone(), clock.clone())),
        dashboard: Arc::new(DashboardService::new(leads, users)),
        sessions,
        clock,
    }
}

/// Assemble the application: API scope, health probes, and (in debug
/// builds) Swagger UI.
pub fn build_app(
    state: HttpState,
    health_state: web::Data<HealthState>,
) -> App<
    impl ServiceFactory<
        ServiceRequest,
        Config = (),
        Response = ServiceResponse,
        Error = actix_web::Error,
        InitError = (),
    >,
> {
    // Literal lead paths go first so they are never captured by `{id}`.
    let api = web::scope("/api")
        .app_data(web::Data::new(state))
        .service(auth::login)
        .service(users::create_user)
        .service(users::list_users)
        .service(users::update_user)
        .service(users::delete_user)
        .service(leads::dashboard_stats)
        .service(leads::export_leads)
        .service(leads::import_leads)
        .service(leads::my_leads)
        .service(leads::list_leads)
        .service(leads::create_lead)
        .service(leads::update_lead)
        .service(leads::delete_lead);

    let app = App::new()
        .app_data(health_state)
        .service(api)
        .service(health::ready)
        .service(health::live);

    #[cfg(debug_assertions)]
    let app =
        app.service(SwaggerUi::new("/docs/{_:.*}").url("/api-docs/openapi.json", ApiDoc::openapi()));

    app
}

/// Seed the bootstrap superadmin, bind the server, and run it.
pub async fn run(config: AppConfig) -> std::io::Result<()> {
    let users = Arc::new(InMemoryUserStore::new());
    let leads = Arc::new(InMemoryLeadStore::new());

    if let Some(bootstrap) = &config.bootstrap_superadmin {
        let hasher = Argon2PasswordHasher::new();
        seed::ensure_superadmin(
            users.as_ref(),
            &hasher,
            &bootstrap.email,
            bootstrap.password.as_str(),
        )
        .await
        .map_err(|err| std::io::Error::other(format!("superadmin seeding failed: {err}")))?;
    }

    let state = build_state(users, leads, &config.token_secret, config.session_ttl);
    let health_state = web::Data::new(HealthState::new());
    // Clone for the server factory so the readiness flag stays shared.
    let server_health_state = health_state.clone();
    let server = HttpServer::new(move || build_app(state.clone(), server_health_state.clone()))
        .bind(config.bind_addr)?;

    health_state.mark_ready();
    server.run().await
}
