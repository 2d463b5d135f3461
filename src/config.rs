// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Runtime Configuration
//!
//! This module defines environment variable names and default values used
//! throughout the application. Configuration is loaded from the environment
//! once at startup into [`Settings`].
//!
//! ## Environment Variables
//!
//! | Variable | Description | Default |
//! |----------|-------------|---------|
//! | `HOST` | Server bind address | `0.0.0.0` |
//! | `PORT` | Server bind port | `8080` |
//! | `AUTH_TYPE` | `basic_auth`, `auth`, or unset for no authentication | unset |
//! | `AUTH_EXCLUDED_PATHS` | Comma-separated exempt paths | see [`DEFAULT_EXCLUDED_PATHS`] |
//! | `DATA_DIR` | Root directory for the user database | `./data` |
//! | `USER_DB_PATH` | redb file holding users | `$DATA_DIR/users.redb` |
//! | `SEED_USER_EMAIL` | Email of a user created at startup | Optional |
//! | `SEED_USER_PASSWORD` | Secret of the seeded user | Required with `SEED_USER_EMAIL` |
//! | `LOG_FORMAT` | Logging format (`json` or `pretty`) | `pretty` |
//! | `RUST_LOG` | Log level filter | `info,tower_http=debug` |

use std::path::PathBuf;

use crate::auth::{AuthScheme, ExemptionList};

pub const HOST_ENV: &str = "HOST";
pub const PORT_ENV: &str = "PORT";
pub const AUTH_TYPE_ENV: &str = "AUTH_TYPE";
pub const AUTH_EXCLUDED_PATHS_ENV: &str = "AUTH_EXCLUDED_PATHS";

/// Environment variable name for the data directory path.
///
/// The user database lives here unless `USER_DB_PATH` points elsewhere.
///
/// # Default
/// `./data`
pub const DATA_DIR_ENV: &str = "DATA_DIR";
pub const USER_DB_PATH_ENV: &str = "USER_DB_PATH";
pub const SEED_USER_EMAIL_ENV: &str = "SEED_USER_EMAIL";
pub const SEED_USER_PASSWORD_ENV: &str = "SEED_USER_PASSWORD";
pub const LOG_FORMAT_ENV: &str = "LOG_FORMAT";

pub const DEFAULT_HOST: &str = "0.0.0.0";
pub const DEFAULT_PORT: u16 = 8080;
pub const DEFAULT_DATA_DIR: &str = "./data";
pub const USER_DB_FILE: &str = "users.redb";
pub const DEFAULT_LOG_FILTER: &str = "info,tower_http=debug";

/// Paths reachable without credentials unless `AUTH_EXCLUDED_PATHS` is set.
pub const DEFAULT_EXCLUDED_PATHS: &str =
    "/api/v1/status/,/api/v1/unauthorized/,/api/v1/forbidden/,/health/,/api-doc/openapi.json";

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("invalid {PORT_ENV} value: {0:?}")]
    InvalidPort(String),

    #[error("unknown {AUTH_TYPE_ENV} value: {0:?} (expected basic_auth, auth or none)")]
    UnknownAuthType(String),

    #[error("unknown {LOG_FORMAT_ENV} value: {0:?} (expected json or pretty)")]
    UnknownLogFormat(String),

    #[error("{SEED_USER_EMAIL_ENV} is set but {SEED_USER_PASSWORD_ENV} is not")]
    IncompleteSeedUser,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LogFormat {
    Json,
    #[default]
    Pretty,
}

/// User created at startup if absent.
#[derive(Clone, PartialEq, Eq)]
pub struct SeedUser {
    pub email: String,
    pub password: String,
}

impl std::fmt::Debug for SeedUser {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SeedUser")
            .field("email", &self.email)
            .field("password", &"<redacted>")
            .finish()
    }
}

#[derive(Debug, Clone)]
pub struct Settings {
    pub host: String,
    pub port: u16,
    pub auth_scheme: AuthScheme,
    pub exemptions: ExemptionList,
    pub user_db_path: PathBuf,
    pub seed_user: Option<SeedUser>,
    pub log_format: LogFormat,
}

impl Settings {
    /// Load settings from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Load settings through `lookup`, which returns a variable's value if set.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let host = lookup(HOST_ENV).unwrap_or_else(|| DEFAULT_HOST.to_string());

        let port = match lookup(PORT_ENV) {
            Some(raw) => raw.trim().parse::<u16>().map_err(|_| ConfigError::InvalidPort(raw))?,
            None => DEFAULT_PORT,
        };

        let auth_scheme = match lookup(AUTH_TYPE_ENV) {
            Some(raw) => AuthScheme::parse(&raw).ok_or(ConfigError::UnknownAuthType(raw))?,
            None => AuthScheme::Disabled,
        };

        let exemptions = ExemptionList::from_csv(
            lookup(AUTH_EXCLUDED_PATHS_ENV)
                .as_deref()
                .unwrap_or(DEFAULT_EXCLUDED_PATHS),
        );

        let data_dir = PathBuf::from(lookup(DATA_DIR_ENV).unwrap_or_else(|| DEFAULT_DATA_DIR.to_string()));
        let user_db_path = lookup(USER_DB_PATH_ENV)
            .map(PathBuf::from)
            .unwrap_or_else(|| data_dir.join(USER_DB_FILE));

        let seed_user = match (lookup(SEED_USER_EMAIL_ENV), lookup(SEED_USER_PASSWORD_ENV)) {
            (Some(email), Some(password)) => Some(SeedUser { email, password }),
            (Some(_), None) => return Err(ConfigError::IncompleteSeedUser),
            (None, _) => None,
        };

        let log_format = match lookup(LOG_FORMAT_ENV).as_deref().map(str::trim) {
            None | Some("") | Some("pretty") => LogFormat::Pretty,
            Some("json") => LogFormat::Json,
            Some(other) => return Err(ConfigError::UnknownLogFormat(other.to_string())),
        };

        Ok(Self {
            host,
            port,
            auth_scheme,
            exemptions,
            user_db_path,
            seed_user,
            log_format,
        })
    }

    /// `host:port` for binding the listener.
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
