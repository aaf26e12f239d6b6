// ABOUTME: Environment-based configuration for the meal planner server
// ABOUTME: Typed server, database, auth and CORS settings loaded from environment variables
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Meal Planner Contributors

//! Server configuration read from environment variables.
//!
//! Every setting has a default except `JWT_SECRET` in production. Outside
//! production a random secret is generated at startup, so tokens do not
//! survive a restart.

use crate::constants::{auth, limits, ports};
use crate::errors::{AppError, AppResult};
use rand::distributions::Alphanumeric;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::env;
use std::fmt::{self, Display};
use std::net::{IpAddr, Ipv4Addr};
use std::path::PathBuf;
use tracing::{info, warn};

const GENERATED_SECRET_LENGTH: usize = 64;

/// Environment type for security and other configurations
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    /// Local development
    #[default]
    Development,
    /// Production deployment
    Production,
    /// Automated tests
    Testing,
}

impl Environment {
    /// Parse from string with fallback
    #[must_use]
    pub fn from_str_or_default(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "production" | "prod" => Self::Production,
            "testing" | "test" => Self::Testing,
            _ => Self::Development,
        }
    }

    /// Check if this is a production environment
    #[must_use]
    pub const fn is_production(self) -> bool {
        matches!(self, Self::Production)
    }
}

impl Display for Environment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Development => write!(f, "development"),
            Self::Production => write!(f, "production"),
            Self::Testing => write!(f, "testing"),
        }
    }
}

/// Type-safe database location
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum DatabaseUrl {
    /// `SQLite` database with file path
    SQLite {
        /// Path to `SQLite` database file
        path: PathBuf,
    },
    /// In-memory `SQLite` (for testing)
    Memory,
}

impl DatabaseUrl {
    /// Parse from string
    ///
    /// Accepts `sqlite:<path>`, `sqlite::memory:` and bare file paths.
    ///
    /// # Errors
    ///
    /// Returns an error for empty strings and non-SQLite URLs
    pub fn parse_url(s: &str) -> AppResult<Self> {
        let s = s.trim();
        if s.is_empty() {
            return Err(AppError::config("DATABASE_URL must not be empty"));
        }

        if let Some(path_str) = s.strip_prefix("sqlite:") {
            let path_str = path_str.trim_start_matches("//");
            if path_str == ":memory:" || path_str.is_empty() {
                Ok(Self::Memory)
            } else {
                Ok(Self::SQLite {
                    path: PathBuf::from(path_str),
                })
            }
        } else if s.contains("://") {
            Err(AppError::config(format!(
                "Unsupported DATABASE_URL scheme: {s} (only sqlite is supported)"
            )))
        } else {
            Ok(Self::SQLite {
                path: PathBuf::from(s),
            })
        }
    }

    /// Convert to connection string
    #[must_use]
    pub fn to_connection_string(&self) -> String {
        match self {
            Self::SQLite { path } => format!("sqlite:{}", path.display()),
            Self::Memory => "sqlite::memory:".into(),
        }
    }

    /// Check if this is an in-memory database
    #[must_use]
    pub const fn is_memory(&self) -> bool {
        matches!(self, Self::Memory)
    }
}

impl Default for DatabaseUrl {
    fn default() -> Self {
        Self::SQLite {
            path: PathBuf::from("./data/mealplan.db"),
        }
    }
}

impl Display for DatabaseUrl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_connection_string())
    }
}

/// Database settings
#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    /// Database location
    pub url: DatabaseUrl,
    /// Maximum pooled connections (forced to 1 for in-memory databases)
    pub max_connections: u32,
}

/// Token settings
#[derive(Clone)]
pub struct AuthConfig {
    /// HS256 signing secret
    pub jwt_secret: String,
    /// Token lifetime
    pub jwt_expiry_hours: i64,
    /// True when the secret was generated at startup
    pub secret_generated: bool,
}

impl fmt::Debug for AuthConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AuthConfig")
            .field("jwt_secret", &"[REDACTED]")
            .field("jwt_expiry_hours", &self.jwt_expiry_hours)
            .field("secret_generated", &self.secret_generated)
            .finish()
    }
}

/// Cross-origin settings
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CorsConfig {
    /// Comma separated origins, `*` for any
    pub allowed_origins: String,
}

/// Complete server configuration
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Deployment environment
    pub environment: Environment,
    /// Bind address
    pub host: IpAddr,
    /// HTTP port
    pub http_port: u16,
    /// Database settings
    pub database: DatabaseConfig,
    /// Token settings
    pub auth: AuthConfig,
    /// Cross-origin settings
    pub cors: CorsConfig,
}

impl ServerConfig {
    /// Load configuration from environment variables
    ///
    /// # Errors
    ///
    /// Returns an error if a variable holds an unparseable value, or if
    /// `JWT_SECRET` is missing in production
    pub fn from_env() -> AppResult<Self> {
        info!("Loading configuration from environment variables");
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load configuration through an arbitrary key lookup
    ///
    /// # Errors
    ///
    /// Same as [`ServerConfig::from_env`]
    pub fn from_lookup<F>(lookup: F) -> AppResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| {
            lookup(key)
                .map(|value| value.trim().to_owned())
                .filter(|value| !value.is_empty())
        };

        let environment = var("ENVIRONMENT")
            .map(|value| Environment::from_str_or_default(&value))
            .unwrap_or_default();

        let host = parse_or("HOST", var("HOST"), IpAddr::V4(Ipv4Addr::LOCALHOST))?;
        let http_port = parse_or("HTTP_PORT", var("HTTP_PORT"), ports::DEFAULT_HTTP_PORT)?;

        let url = match var("DATABASE_URL") {
            Some(raw) => DatabaseUrl::parse_url(&raw)?,
            None => DatabaseUrl::default(),
        };
        let max_connections = parse_or(
            "DATABASE_MAX_CONNECTIONS",
            var("DATABASE_MAX_CONNECTIONS"),
            limits::DEFAULT_MAX_CONNECTIONS,
        )?;
        if max_connections == 0 {
            return Err(AppError::config("DATABASE_MAX_CONNECTIONS must be at least 1"));
        }

        let jwt_expiry_hours = parse_or(
            "JWT_EXPIRY_HOURS",
            var("JWT_EXPIRY_HOURS"),
            auth::DEFAULT_TOKEN_EXPIRY_HOURS,
        )?;
        if jwt_expiry_hours <= 0 {
            return Err(AppError::config("JWT_EXPIRY_HOURS must be positive"));
        }

        let (jwt_secret, secret_generated) = match var("JWT_SECRET") {
            Some(secret) => (secret, false),
            None if environment.is_production() => {
                return Err(AppError::config("JWT_SECRET is required in production"));
            }
            None => {
                warn!("JWT_SECRET not set, generating a random secret for this process");
                (generate_secret(), true)
            }
        };

        Ok(Self {
            environment,
            host,
            http_port,
            database: DatabaseConfig {
                url,
                max_connections,
            },
            auth: AuthConfig {
                jwt_secret,
                jwt_expiry_hours,
                secret_generated,
            },
            cors: CorsConfig {
                allowed_origins: var("CORS_ALLOWED_ORIGINS").unwrap_or_else(|| "*".to_owned()),
            },
        })
    }

    /// Configuration for tests: in-memory database, fixed secret
    #[must_use]
    pub fn for_testing() -> Self {
        Self {
            environment: Environment::Testing,
            host: IpAddr::V4(Ipv4Addr::LOCALHOST),
            http_port: 0,
            database: DatabaseConfig {
                url: DatabaseUrl::Memory,
                max_connections: 1,
            },
            auth: AuthConfig {
                jwt_secret: "test-secret-for-mealplan-server-tests".to_owned(),
                jwt_expiry_hours: auth::DEFAULT_TOKEN_EXPIRY_HOURS,
                secret_generated: false,
            },
            cors: CorsConfig {
                allowed_origins: "*".to_owned(),
            },
        }
    }

    /// Get a summary of the configuration for logging (without secrets)
    #[must_use]
    pub fn summary(&self) -> String {
        format!(
            "Meal Planner Server Configuration:\n\
             - Environment: {}\n\
             - Listen: {}:{}\n\
             - Database: {} (max {} connections)\n\
             - JWT Secret: {}\n\
             - Token Expiry: {}h\n\
             - CORS Origins: {}",
            self.environment,
            self.host,
            self.http_port,
            self.database.url,
            self.database.max_connections,
            if self.auth.secret_generated {
                "generated"
            } else {
                "configured"
            },
            self.auth.jwt_expiry_hours,
            self.cors.allowed_origins
        )
    }
}

fn parse_or<T>(key: &str, value: Option<String>, default: T) -> AppResult<T>
where
    T: std::str::FromStr,
    T::Err: Display,
{
    value.map_or(Ok(default), |raw| {
        raw.parse()
            .map_err(|e| AppError::config(format!("Invalid {key} value '{raw}': {e}")))
    })
}

fn generate_secret() -> String {
    rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(GENERATED_SECRET_LENGTH)
        .map(char::from)
        .collect()
}
