//! Configuration loaded from environment variables (a `.env` file is honoured).
//!
//! # Environment Variables
//!
//! ## Required
//! - `SESSION_KEY` - Cookie signing/encryption key, at least 64 bytes
//!
//! ## Optional
//! - `DATABASE_URL` - SQLite URL; when absent the store runs unconfigured
//! - `HOST` - Bind address (default: 0.0.0.0)
//! - `PORT` - Listen port (default: 8080)
//! - `SESSION_TTL_MINUTES` - Absolute session lifetime (default: 480)
//! - `SESSION_IDLE_MINUTES` - Inactivity timeout (default: 60)
//! - `COOKIE_SECURE` - Only send the session cookie over HTTPS (default: true)
//! - `DEGRADE_READS` - Serve empty lists while the store is down (default: true)
//! - `NOTIFY_RECIPIENT` - Address for new request notifications
//!
//! ## Optional (bootstrap admin, created when the username does not exist)
//! - `ADMIN_USERNAME`, `ADMIN_PASSWORD`, `ADMIN_EMAIL`

use std::net::{IpAddr, SocketAddr};

use actix_web::cookie::Key;
use thiserror::Error;

pub const MIN_SESSION_KEY_LEN: usize = 64;
const DEFAULT_HOST: &str = "0.0.0.0";
const DEFAULT_PORT: u16 = 8080;
const DEFAULT_SESSION_TTL_MINUTES: i64 = 480;
const DEFAULT_SESSION_IDLE_MINUTES: i64 = 60;
const DEFAULT_NOTIFY_RECIPIENT: &str = "owner@localhost";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

#[derive(Clone)]
pub struct AppConfig {
    pub database_url: Option<String>,
    pub host: IpAddr,
    pub port: u16,
    session_key: Vec<u8>,
    pub session_ttl_minutes: i64,
    pub session_idle_minutes: i64,
    pub cookie_secure: bool,
    pub degrade_reads: bool,
    pub notify_recipient: String,
    pub bootstrap_admin: Option<BootstrapAdmin>,
}

#[derive(Clone)]
pub struct BootstrapAdmin {
    pub username: String,
    pub password: String,
    pub email: String,
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("database_url", &self.database_url)
            .field("host", &self.host)
            .field("port", &self.port)
            .field("session_key", &"[REDACTED]")
            .field("session_ttl_minutes", &self.session_ttl_minutes)
            .field("session_idle_minutes", &self.session_idle_minutes)
            .field("cookie_secure", &self.cookie_secure)
            .field("degrade_reads", &self.degrade_reads)
            .field("notify_recipient", &self.notify_recipient)
            .field("bootstrap_admin", &self.bootstrap_admin)
            .finish()
    }
}

impl std::fmt::Debug for BootstrapAdmin {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BootstrapAdmin")
            .field("username", &self.username)
            .field("password", &"[REDACTED]")
            .field("email", &self.email)
            .finish()
    }
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from any key/value source; blank values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let session_key = get("SESSION_KEY")
            .ok_or_else(|| ConfigError::MissingEnvVar("SESSION_KEY".into()))?
            .into_bytes();
        if session_key.len() < MIN_SESSION_KEY_LEN {
            return Err(ConfigError::InvalidEnvVar(
                "SESSION_KEY".into(),
                format!("must be at least {} bytes", MIN_SESSION_KEY_LEN),
            ));
        }

        let host: IpAddr = parse_or("HOST", get("HOST"), || {
            DEFAULT_HOST.parse().map_err(|_| {
                ConfigError::InvalidEnvVar("HOST".into(), "invalid default".into())
            })
        })?;
        let port: u16 = parse_or("PORT", get("PORT"), || Ok(DEFAULT_PORT))?;
        let session_ttl_minutes = positive(
            "SESSION_TTL_MINUTES",
            parse_or("SESSION_TTL_MINUTES", get("SESSION_TTL_MINUTES"), || {
                Ok(DEFAULT_SESSION_TTL_MINUTES)
            })?,
        )?;
        let session_idle_minutes = positive(
            "SESSION_IDLE_MINUTES",
            parse_or("SESSION_IDLE_MINUTES", get("SESSION_IDLE_MINUTES"), || {
                Ok(DEFAULT_SESSION_IDLE_MINUTES)
            })?,
        )?;

        let bootstrap_admin = match get("ADMIN_USERNAME") {
            Some(username) => Some(BootstrapAdmin {
                username,
                password: get("ADMIN_PASSWORD")
                    .ok_or_else(|| ConfigError::MissingEnvVar("ADMIN_PASSWORD".into()))?,
                email: get("ADMIN_EMAIL")
                    .ok_or_else(|| ConfigError::MissingEnvVar("ADMIN_EMAIL".into()))?,
            }),
            None => None,
        };

        Ok(Self {
            database_url: get("DATABASE_URL"),
            host,
            port,
            session_key,
            session_ttl_minutes,
            session_idle_minutes,
            cookie_secure: parse_bool("COOKIE_SECURE", get("COOKIE_SECURE"), true)?,
            degrade_reads: parse_bool("DEGRADE_READS", get("DEGRADE_READS"), true)?,
            notify_recipient: get("NOTIFY_RECIPIENT")
                .unwrap_or_else(|| DEFAULT_NOTIFY_RECIPIENT.to_string()),
            bootstrap_admin,
        })
    }

    pub const fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }

    pub fn session_key(&self) -> Key {
        Key::from(self.session_key.as_slice())
    }
}

fn parse_or<T, D>(key: &str, value: Option<String>, default: D) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
    D: FnOnce() -> Result<T, ConfigError>,
{
    match value {
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|e: T::Err| ConfigError::InvalidEnvVar(key.to_string(), e.to_string())),
        None => default(),
    }
}

fn positive(key: &str, value: i64) -> Result<i64, ConfigError> {
    if value > 0 {
        Ok(value)
    } else {
        Err(ConfigError::InvalidEnvVar(
            key.to_string(),
            "must be greater than zero".into(),
        ))
    }
}

fn parse_bool(key: &str, value: Option<String>, default: bool) -> Result<bool, ConfigError> {
    let Some(raw) = value else {
        return Ok(default);
    };
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        other => Err(ConfigError::InvalidEnvVar(
            key.to_string(),
            format!("expected a boolean, got {:?}", other),
        )),
    }
}
