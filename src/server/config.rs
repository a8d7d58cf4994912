//! Environment-driven server configuration.

use std::env;
use std::path::PathBuf;

use tracing::warn;

const DEFAULT_BIND_ADDR: &str = "0.0.0.0:4000";
const DEFAULT_DATABASE: &str = "tastebook";
const DEFAULT_UPLOADS_DIR: &str = "uploads";
/// 30 days.
const DEFAULT_TOKEN_TTL_HOURS: i64 = 720;

/// Credentials for the bootstrap admin account, created on startup when it
/// does not already exist.
#[derive(Debug, Clone)]
pub struct AdminBootstrap {
    pub name: String,
    pub email: String,
    pub password: String,
}

/// Runtime configuration assembled from the environment.
///
/// | Variable           | Default        | Meaning                                    |
/// |--------------------|----------------|--------------------------------------------|
/// | `BIND_ADDR`        | `0.0.0.0:4000` | Listen address                             |
/// | `MONGODB_URI`      | unset          | Document store; in-memory store when unset |
/// | `MONGODB_DATABASE` | `tastebook`    | Database name                              |
/// | `TOKEN_SECRET`     | required       | HMAC secret for bearer tokens              |
/// | `TOKEN_TTL_HOURS`  | `720`          | Token lifetime                             |
/// | `UPLOADS_DIR`      | `uploads`      | Where uploaded images are stored           |
/// | `ADMIN_NAME`/`ADMIN_EMAIL`/`ADMIN_PASSWORD` | unset | Bootstrap admin account |
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub bind_addr: String,
    pub mongodb_uri: Option<String>,
    pub mongodb_database: String,
    pub token_secret: String,
    pub token_ttl_hours: i64,
    pub uploads_dir: PathBuf,
    pub admin: Option<AdminBootstrap>,
}

fn non_empty(var: &str) -> Option<String> {
    env::var(var).ok().filter(|value| !value.trim().is_empty())
}

impl ServerConfig {
    /// Read configuration from the environment.
    ///
    /// # Errors
    /// Fails when `TOKEN_SECRET` is unset in a release build, or when
    /// `TOKEN_TTL_HOURS` is set but not a positive integer.
    pub fn from_env() -> std::io::Result<Self> {
        let token_secret = match non_empty("TOKEN_SECRET") {
            Some(secret) => secret,
            None if cfg!(debug_assertions) => {
                warn!("TOKEN_SECRET unset; using an ephemeral secret (dev only)");
                uuid::Uuid::new_v4().to_string()
            }
            None => {
                return Err(std::io::Error::other("TOKEN_SECRET must be set"));
            }
        };

        let token_ttl_hours = match non_empty("TOKEN_TTL_HOURS") {
            Some(raw) => raw
                .parse::<i64>()
                .ok()
                .filter(|hours| *hours > 0)
                .ok_or_else(|| {
                    std::io::Error::other("TOKEN_TTL_HOURS must be a positive integer")
                })?,
            None => DEFAULT_TOKEN_TTL_HOURS,
        };

        let admin = match (
            non_empty("ADMIN_NAME"),
            non_empty("ADMIN_EMAIL"),
            non_empty("ADMIN_PASSWORD"),
        ) {
            (Some(name), Some(email), Some(password)) => Some(AdminBootstrap {
                name,
                email: email.to_lowercase(),
                password,
            }),
            (None, None, None) => None,
            _ => {
                return Err(std::io::Error::other(
                    "ADMIN_NAME, ADMIN_EMAIL, and ADMIN_PASSWORD must be set together",
                ));
            }
        };

        Ok(Self {
            bind_addr: non_empty("BIND_ADDR").unwrap_or_else(|| DEFAULT_BIND_ADDR.to_owned()),
            mongodb_uri: non_empty("MONGODB_URI"),
            mongodb_database: non_empty("MONGODB_DATABASE")
                .unwrap_or_else(|| DEFAULT_DATABASE.to_owned()),
            token_secret,
            token_ttl_hours,
            uploads_dir: PathBuf::from(
                non_empty("UPLOADS_DIR").unwrap_or_else(|| DEFAULT_UPLOADS_DIR.to_owned()),
            ),
            admin,
        })
    }
}
