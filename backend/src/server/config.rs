//! Application configuration loaded from the environment.

use std::env;
use std::net::SocketAddr;

use chrono::TimeDelta;
use tracing::warn;
use uuid::Uuid;
use zeroize::Zeroizing;

use crate::domain::default_session_ttl;

const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8080";
const DEFAULT_SECRET_PATH: &str = "/var/run/secrets/token_secret";

/// Bootstrap superadmin credentials seeded at startup.
#[derive(Debug, Clone)]
pub struct BootstrapSuperadmin {
    pub email: String,
    pub password: Zeroizing<String>,
}

/// Runtime configuration for the HTTP server.
pub struct AppConfig {
    /// Address the server binds to (`BIND_ADDR`).
    pub bind_addr: SocketAddr,
    /// Secret the session codec signs tokens with (`TOKEN_SECRET_FILE`).
    pub token_secret: Zeroizing<Vec<u8>>,
    /// Session time-to-live (`SESSION_TTL_SECS`, default one hour).
    pub session_ttl: TimeDelta,
    /// Superadmin seeded at startup when `SUPERADMIN_EMAIL` and
    /// `SUPERADMIN_PASSWORD` are both set.
    pub bootstrap_superadmin: Option<BootstrapSuperadmin>,
}

impl AppConfig {
    /// Load configuration from the process environment.
    ///
    /// The signing secret is read from the file named by
    /// `TOKEN_SECRET_FILE`. When the file is unreadable, debug builds (or
    /// `TOKEN_ALLOW_EPHEMERAL=1`) fall back to a process-lifetime random
    /// secret; release builds refuse to start, because an ephemeral secret
    /// silently invalidates every outstanding session on restart.
    pub fn from_env() -> std::io::Result<Self> {
        let bind_addr = env::var("BIND_ADDR").unwrap_or_else(|_| DEFAULT_BIND_ADDR.into());
        let bind_addr: SocketAddr = bind_addr
            .parse()
            .map_err(|err| std::io::Error::other(format!("invalid BIND_ADDR {bind_addr}: {err}")))?;

        let secret_path =
            env::var("TOKEN_SECRET_FILE").unwrap_or_else(|_| DEFAULT_SECRET_PATH.into());
        let token_secret = match std::fs::read(&secret_path) {
            Ok(bytes) => Zeroizing::new(bytes),
            Err(err) => {
                let allow_dev = env::var("TOKEN_ALLOW_EPHEMERAL").ok().as_deref() == Some("1");
                if cfg!(debug_assertions) || allow_dev {
                    warn!(path = %secret_path, error = %err, "using ephemeral token secret (dev only)");
                    ephemeral_secret()
                } else {
                    return Err(std::io::Error::other(format!(
                        "failed to read token secret at {secret_path}: {err}"
                    )));
                }
            }
        };

        let session_ttl = match env::var("SESSION_TTL_SECS") {
            Ok(raw) => {
                let seconds: i64 = raw.parse().map_err(|err| {
                    std::io::Error::other(format!("invalid SESSION_TTL_SECS {raw}: {err}"))
                })?;
                if seconds <= 0 {
                    return Err(std::io::Error::other(
                        "SESSION_TTL_SECS must be positive".to_owned(),
                    ));
                }
                TimeDelta::seconds(seconds)
            }
            Err(_) => default_session_ttl(),
        };

        let bootstrap_superadmin = match (env::var("SUPERADMIN_EMAIL"), env::var("SUPERADMIN_PASSWORD"))
        {
            (Ok(email), Ok(password)) => Some(BootstrapSuperadmin {
                email,
                password: Zeroizing::new(password),
            }),
            _ => None,
        };

        Ok(Self {
            bind_addr,
            token_secret,
            session_ttl,
            bootstrap_superadmin,
        })
    }
}

fn ephemeral_secret() -> Zeroizing<Vec<u8>> {
    let mut bytes = Vec::with_capacity(32);
    bytes.extend_from_slice(Uuid::new_v4().as_bytes());
    bytes.extend_from_slice(Uuid::new_v4().as_bytes());
    Zeroizing::new(bytes)
}
