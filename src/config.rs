// src/config.rs

use std::env;
use dotenvy::dotenv;

/// Number of users shown on the main page when no `limit` is given.
pub const USERS_PER_PAGE: i64 = 20;

/// Upper bound for the `limit` query parameter of the main page.
pub const MAX_USERS_PER_PAGE: i64 = 100;

/// Longest accepted session lifetime (one year), in seconds.
pub const MAX_SESSION_TTL: u64 = 60 * 60 * 24 * 365;

/// Name of the cookie holding the signed session token.
pub const SESSION_COOKIE: &str = "social_session";

#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub bind_addr: String,
    pub session_key: String,
    /// Session cookie lifetime in seconds.
    pub session_ttl: u64,
    pub rust_log: String,
}

impl Config {
    /// Reads the process configuration from the environment (and `.env`).
    ///
    /// `SESSION_KEY` is the only required variable.
    pub fn from_env() -> Result<Self, env::VarError> {
        dotenv().ok();

        let database_url = env::var("DATABASE_URL")
            .unwrap_or_else(|_| "sqlite://social_network.db".to_string());

        let bind_addr = env::var("BIND_ADDR")
            .unwrap_or_else(|_| "0.0.0.0:8080".to_string());

        let session_key = env::var("SESSION_KEY")?;

        let session_ttl = env::var("SESSION_TTL_SECS")
            .ok()
            .and_then(|v| v.parse::<u64>().ok())
            .unwrap_or(60 * 60 * 24)
            .min(MAX_SESSION_TTL);

        let rust_log = env::var("RUST_LOG")
            .unwrap_or_else(|_| "info".to_string());

        Ok(Self {
            database_url,
            bind_addr,
            session_key,
            session_ttl,
            rust_log,
        })
    }
}
