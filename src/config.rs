// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Runtime Configuration
//!
//! Configuration is loaded from the environment at startup.
//!
//! ## Environment Variables
//!
//! | Variable | Description | Default |
//! |----------|-------------|---------|
//! | `DATABASE_URL` | Postgres connection string | Required |
//! | `HOST` | Server bind address | `0.0.0.0` |
//! | `PORT` | Server bind port | `8080` |
//! | `DB_MAX_CONNECTIONS` | Connection pool size | `10` |
//! | `DB_ACQUIRE_TIMEOUT_SECS` | Wait for a pooled connection | `5` |
//! | `TOKEN_TTL_SECS` | Session token lifetime, at most `86400` | `3600` |
//! | `REVOCATION_SWEEP_SECS` | Revoked-token prune interval | `300` |
//! | `CORS_ALLOWED_ORIGINS` | Comma-separated origin allow-list | `http://localhost,http://localhost:4200` |
//! | `TLS_CERT_PATH` | PEM certificate chain (enables HTTPS with `TLS_KEY_PATH`) | Unset |
//! | `TLS_KEY_PATH` | PEM private key | Unset |
//! | `LOG_FORMAT` | Logging format (`json` or `pretty`) | `pretty` |
//! | `RUST_LOG` | Log level filter | `info,tower_http=debug` |

use std::collections::HashMap;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

pub const DATABASE_URL_ENV: &str = "DATABASE_URL";
pub const HOST_ENV: &str = "HOST";
pub const PORT_ENV: &str = "PORT";
pub const DB_MAX_CONNECTIONS_ENV: &str = "DB_MAX_CONNECTIONS";
pub const DB_ACQUIRE_TIMEOUT_ENV: &str = "DB_ACQUIRE_TIMEOUT_SECS";
pub const TOKEN_TTL_ENV: &str = "TOKEN_TTL_SECS";
pub const REVOCATION_SWEEP_ENV: &str = "REVOCATION_SWEEP_SECS";
pub const CORS_ALLOWED_ORIGINS_ENV: &str = "CORS_ALLOWED_ORIGINS";
pub const TLS_CERT_PATH_ENV: &str = "TLS_CERT_PATH";
pub const TLS_KEY_PATH_ENV: &str = "TLS_KEY_PATH";
pub const LOG_FORMAT_ENV: &str = "LOG_FORMAT";

/// Longest accepted `TOKEN_TTL_SECS` (24 hours).
pub const MAX_TOKEN_TTL_SECS: u64 = 86_400;

/// Origins allowed when `CORS_ALLOWED_ORIGINS` is unset.
pub const DEFAULT_ALLOWED_ORIGINS: &[&str] = &["http://localhost", "http://localhost:4200"];

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{0} is required")]
    Missing(&'static str),

    #[error("{name} has an invalid value: {value}")]
    Invalid { name: &'static str, value: String },

    #[error("{0} and {1} must be set together")]
    Incomplete(&'static str, &'static str),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TlsPaths {
    pub cert: PathBuf,
    pub key: PathBuf,
}

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub database_url: String,
    pub bind_addr: SocketAddr,
    pub db_max_connections: u32,
    pub db_acquire_timeout: Duration,
    pub token_ttl: Duration,
    pub revocation_sweep_interval: Duration,
    pub allowed_origins: Vec<String>,
    pub tls: Option<TlsPaths>,
}

impl ServerConfig {
    /// Load from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_vars(&std::env::vars().collect())
    }

    /// Load from an explicit variable map.
    pub fn from_vars(vars: &HashMap<String, String>) -> Result<Self, ConfigError> {
        let get = |name: &str| vars.get(name).map(|v| v.trim()).filter(|v| !v.is_empty());

        let database_url = get(DATABASE_URL_ENV)
            .ok_or(ConfigError::Missing(DATABASE_URL_ENV))?
            .to_string();

        let host = get(HOST_ENV).unwrap_or("0.0.0.0");
        let port: u16 = parse_or(get(PORT_ENV), PORT_ENV, 8080)?;
        let bind_addr: SocketAddr = format!("{host}:{port}")
            .parse()
            .map_err(|_| ConfigError::Invalid {
                name: HOST_ENV,
                value: host.to_string(),
            })?;

        let db_max_connections = parse_or(get(DB_MAX_CONNECTIONS_ENV), DB_MAX_CONNECTIONS_ENV, 10)?;
        let db_acquire_timeout = parse_or(get(DB_ACQUIRE_TIMEOUT_ENV), DB_ACQUIRE_TIMEOUT_ENV, 5)?;
        let token_ttl = parse_or(get(TOKEN_TTL_ENV), TOKEN_TTL_ENV, 3600)?;
        let sweep = parse_or(get(REVOCATION_SWEEP_ENV), REVOCATION_SWEEP_ENV, 300)?;

        if db_max_connections == 0 {
            return Err(ConfigError::Invalid {
                name: DB_MAX_CONNECTIONS_ENV,
                value: "0".to_string(),
            });
        }
        if token_ttl > MAX_TOKEN_TTL_SECS {
            return Err(ConfigError::Invalid {
                name: TOKEN_TTL_ENV,
                value: token_ttl.to_string(),
            });
        }
        for (name, value) in [(TOKEN_TTL_ENV, token_ttl), (REVOCATION_SWEEP_ENV, sweep)] {
            if value == 0 {
                return Err(ConfigError::Invalid {
                    name,
                    value: "0".to_string(),
                });
            }
        }

        let allowed_origins = match get(CORS_ALLOWED_ORIGINS_ENV) {
            Some(list) => list
                .split(',')
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect(),
            None => DEFAULT_ALLOWED_ORIGINS.iter().map(|s| s.to_string()).collect(),
        };

        let tls = match (get(TLS_CERT_PATH_ENV), get(TLS_KEY_PATH_ENV)) {
            (Some(cert), Some(key)) => Some(TlsPaths {
                cert: PathBuf::from(cert),
                key: PathBuf::from(key),
            }),
            (None, None) => None,
            _ => return Err(ConfigError::Incomplete(TLS_CERT_PATH_ENV, TLS_KEY_PATH_ENV)),
        };

        Ok(Self {
            database_url,
            bind_addr,
            db_max_connections,
            db_acquire_timeout: Duration::from_secs(db_acquire_timeout),
            token_ttl: Duration::from_secs(token_ttl),
            revocation_sweep_interval: Duration::from_secs(sweep),
            allowed_origins,
            tls,
        })
    }

    /// Token lifetime as a chrono duration for the codec.
    pub fn token_ttl_chrono(&self) -> chrono::Duration {
        chrono::Duration::from_std(self.token_ttl).unwrap_or(crate::auth::codec::DEFAULT_TOKEN_TTL)
    }
}

fn parse_or<T: std::str::FromStr>(raw: Option<&str>, name: &'static str, default: T) -> Result<T, ConfigError> {
    match raw {
        Some(value) => value.parse().map_err(|_| ConfigError::Invalid {
            name,
            value: value.to_string(),
        }),
        None => Ok(default),
    }
}
