// src/common/config.rs
//! Environment configuration
//!
//! Values are read once at startup (after `.env` has been loaded) and passed
//! down explicitly. Nothing else in the crate reads the environment.

use std::env;
use tracing::{info, warn};

/// Which table store backs the service
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreBackend {
    /// Local SQLite database through sqlx
    Sqlite { database_url: String },
    /// Hosted PostgREST endpoint (Supabase)
    Supabase { url: String, access_key: String },
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub port: u16,
    pub cors_origins: Vec<String>,
    pub google_client_id: Option<String>,
    pub store: StoreBackend,
    pub jwt_secret: String,
    pub session_ttl_hours: i64,
    pub reset_db: bool,
    pub sentry_dsn: Option<String>,
}

const DEFAULT_PORT: u16 = 5001;
const DEFAULT_SESSION_TTL_HOURS: i64 = 24;
/// One year
const MAX_SESSION_TTL_HOURS: i64 = 24 * 365;
const DEFAULT_DATABASE_URL: &str = "sqlite://ctag_api.db";
const DEFAULT_CORS_ORIGINS: &str = "http://localhost:3000";

impl AppConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds the config from an arbitrary key lookup; empty values count as unset
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let port = match get("PORT").map(|p| p.parse::<u16>()) {
            Some(Ok(port)) => port,
            Some(Err(e)) => {
                warn!("Invalid PORT value: {e}, using default {DEFAULT_PORT}");
                DEFAULT_PORT
            }
            None => DEFAULT_PORT,
        };

        let cors_origins = get("CORS_ORIGINS")
            .unwrap_or_else(|| DEFAULT_CORS_ORIGINS.to_string())
            .split(',')
            .map(|origin| origin.trim().to_string())
            .filter(|origin| !origin.is_empty())
            .collect();

        let store = match (get("SUPABASE_URL"), get("SUPABASE_ANON_KEY")) {
            (Some(url), Some(access_key)) => StoreBackend::Supabase {
                url: url.trim_end_matches('/').to_string(),
                access_key,
            },
            (Some(_), None) | (None, Some(_)) => {
                warn!("Only one of SUPABASE_URL / SUPABASE_ANON_KEY is set, falling back to SQLite");
                StoreBackend::Sqlite {
                    database_url: get("DATABASE_URL")
                        .unwrap_or_else(|| DEFAULT_DATABASE_URL.to_string()),
                }
            }
            (None, None) => StoreBackend::Sqlite {
                database_url: get("DATABASE_URL")
                    .unwrap_or_else(|| DEFAULT_DATABASE_URL.to_string()),
            },
        };

        let jwt_secret = get("JWT_SECRET").unwrap_or_else(|| {
            warn!("JWT_SECRET not set, using an insecure development secret");
            "replace_with_strong_secret".to_string()
        });

        let session_ttl_hours = match get("SESSION_TTL_HOURS").map(|v| v.parse::<i64>()) {
            Some(Ok(hours)) if (1..=MAX_SESSION_TTL_HOURS).contains(&hours) => hours,
            Some(_) => {
                warn!(
                    "SESSION_TTL_HOURS must be between 1 and {MAX_SESSION_TTL_HOURS}, using default {DEFAULT_SESSION_TTL_HOURS}"
                );
                DEFAULT_SESSION_TTL_HOURS
            }
            None => DEFAULT_SESSION_TTL_HOURS,
        };

        let google_client_id = get("GOOGLE_CLIENT_ID");
        if google_client_id.is_none() {
            warn!("GOOGLE_CLIENT_ID not set, Google sign-in will reject every token");
        }

        let config = Self {
            port,
            cors_origins,
            google_client_id,
            store,
            jwt_secret,
            session_ttl_hours,
            reset_db: get("RESET_DB").map_or(false, |v| v.eq_ignore_ascii_case("true")),
            sentry_dsn: get("SENTRY_DSN"),
        };

        info!(
            port = config.port,
            store = config.store.kind(),
            session_ttl_hours = config.session_ttl_hours,
            "Configuration loaded"
        );

        config
    }
}

impl StoreBackend {
    pub fn kind(&self) -> &'static str {
        match self {
            StoreBackend::Sqlite { .. } => "sqlite",
            StoreBackend::Supabase { .. } => "supabase",
        }
    }
}
