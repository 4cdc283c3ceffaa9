//! Bearer-token identity extractor.
//!
//! Replaces request-attached ambient identity with an explicit value:
//! handlers declare a [`Caller`] parameter, the extractor verifies the
//! `Authorization` header against the session codec, checks the expiry
//! against the injected clock, and hands the handler a
//! [`CallerContext`] to thread through domain calls.

use actix_web::http::header;
use actix_web::{FromRequest, HttpRequest, dev::Payload, web};
use futures_util::future::{Ready, ready};
use mockable::Clock as _;

use crate::domain::policy::CallerContext;
use crate::domain::Error;
use crate::inbound::http::state::HttpState;

const MISSING_TOKEN: &str = "missing bearer token";

/// Authenticated caller, extracted per request.
#[derive(Debug, Clone)]
pub struct Caller(CallerContext);

impl Caller {
    /// Borrow the caller context.
    pub fn context(&self) -> &CallerContext {
        &self.0
    }

    /// Take ownership of the caller context.
    pub fn into_context(self) -> CallerContext {
        self.0
    }
}

fn caller_from_request(req: &HttpRequest) -> Result<Caller, Error> {
    let state = req
        .app_data::<web::Data<HttpState>>()
        .ok_or_else(|| Error::internal("http state is not configured"))?;

    let header_value = req
        .headers()
        .get(header::AUTHORIZATION)
        .ok_or_else(|| Error::unauthenticated(MISSING_TOKEN))?
        .to_str()
        .map_err(|_| Error::unauthenticated(MISSING_TOKEN))?;
    let token = header_value
        .strip_prefix("Bearer ")
        .ok_or_else(|| Error::unauthenticated(MISSING_TOKEN))?;

    let session = state.sessions.verify(token)?;
    if session.is_expired(state.clock.utc()) {
        return Err(Error::unauthenticated("session expired, log in again"));
    }
    Ok(Caller(CallerContext::new(
        session.user_id().clone(),
        session.role(),
    )))
}

impl FromRequest for Caller {
    type Error = Error;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        ready(caller_from_request(req))
    }
}
