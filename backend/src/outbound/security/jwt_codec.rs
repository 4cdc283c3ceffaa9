//! JWT session codec adapter.
//!
//! Sessions travel as HS256-signed bearer tokens carrying the user id, the
//! role, and the expiry in the standard `exp` claim. Verification failures
//! of every kind collapse into one `unauthenticated` error so clients learn
//! nothing about why a token was rejected.

use chrono::DateTime;
use jsonwebtoken::{
    Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode,
};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::domain::error::Error;
use crate::domain::ports::SessionCodec;
use crate::domain::role::Role;
use crate::domain::session::Session;
use crate::domain::user::UserId;

const INVALID_TOKEN: &str = "session token is invalid or expired";

#[derive(Debug, Serialize, Deserialize)]
struct Claims {
    sub: String,
    role: Role,
    exp: i64,
}

/// [`SessionCodec`] backed by HS256 JWTs.
pub struct JwtSessionCodec {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
}

impl JwtSessionCodec {
    /// Build a codec from the shared signing secret.
    pub fn new(secret: &[u8]) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        // The session expiry is exact; no clock-skew grace on top of it.
        validation.leeway = 0;
        Self {
            encoding_key: EncodingKey::from_secret(secret),
            decoding_key: DecodingKey::from_secret(secret),
            validation,
        }
    }
}

impl SessionCodec for JwtSessionCodec {
    fn sign(&self, session: &Session) -> Result<String, Error> {
        let claims = Claims {
            sub: session.user_id().to_string(),
            role: session.role(),
            exp: session.expires_at().timestamp(),
        };
        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .map_err(|err| Error::internal(format!("failed to sign session token: {err}")))
    }

    fn verify(&self, token: &str) -> Result<Session, Error> {
        let data = decode::<Claims>(token, &self.decoding_key, &self.validation).map_err(|err| {
            debug!(error = %err, "session token rejected");
            Error::unauthenticated(INVALID_TOKEN)
        })?;
        let user_id = UserId::new(&data.claims.sub).map_err(|err| {
            debug!(error = %err, "session token carried a malformed user id");
            Error::unauthenticated(INVALID_TOKEN)
        })?;
        let expires_at = DateTime::from_timestamp(data.claims.exp, 0)
            .ok_or_else(|| Error::unauthenticated(INVALID_TOKEN))?;
        Ok(Session::from_claims(user_id, data.claims.role, expires_at))
    }
}
