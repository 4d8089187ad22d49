// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Runtime Configuration
//!
//! Configuration is read from the environment once at startup and is
//! immutable for the lifetime of the process. The signing secret and token
//! ttl are handed to [`TokenCodec`](crate::auth::TokenCodec) by reference;
//! nothing else reads them.
//!
//! ## Environment Variables
//!
//! | Variable | Description | Default |
//! |----------|-------------|---------|
//! | `JWT_SECRET` | HMAC-SHA256 signing secret | Required |
//! | `JWT_EXPIRATION_MS` | Token time-to-live in milliseconds | `3600000` |
//! | `HOST` | Server bind address | `0.0.0.0` |
//! | `PORT` | Server bind port | `8080` |
//! | `DEBUG_ROUTES` | Mount `/h2-console` and `/docs` and make them public | `false` |
//! | `LOG_FORMAT` | Logging format (`json` or `pretty`) | `pretty` |
//! | `RUST_LOG` | Log level filter | `info,tower_http=debug` |

use std::net::SocketAddr;
use std::time::Duration;

use thiserror::Error;

pub const JWT_SECRET_ENV: &str = "JWT_SECRET";
pub const JWT_EXPIRATION_ENV: &str = "JWT_EXPIRATION_MS";
pub const HOST_ENV: &str = "HOST";
pub const PORT_ENV: &str = "PORT";
pub const DEBUG_ROUTES_ENV: &str = "DEBUG_ROUTES";
pub const LOG_FORMAT_ENV: &str = "LOG_FORMAT";

/// Default token lifetime (one hour).
pub const DEFAULT_TOKEN_TTL: Duration = Duration::from_millis(3_600_000);

/// Tokens carry whole-second timestamps, so anything shorter would issue a
/// token whose expiry equals its issue time.
pub const MIN_TOKEN_TTL: Duration = Duration::from_secs(1);

/// Upper bound on token lifetime (ten years). Keeps `iat + ttl` far from the
/// end of the representable date range.
pub const MAX_TOKEN_TTL: Duration = Duration::from_secs(10 * 365 * 24 * 60 * 60);

/// Startup configuration errors. These abort the process; they never reach
/// a request.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("JWT_SECRET must be set to a non-empty value")]
    MissingSecret,
    #[error("token ttl must be at least one second, got {0} ms")]
    TtlTooShort(u128),
    #[error("invalid value for {var}: {value}")]
    InvalidValue { var: &'static str, value: String },
}

/// Signing configuration for issued tokens.
#[derive(Clone)]
pub struct TokenConfig {
    pub secret: String,
    pub ttl: Duration,
}

impl TokenConfig {
    pub fn new(secret: impl Into<String>, ttl: Duration) -> Self {
        Self {
            secret: secret.into(),
            ttl,
        }
    }
}

impl std::fmt::Debug for TokenConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenConfig")
            .field("secret", &"<redacted>")
            .field("ttl", &self.ttl)
            .finish()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    Json,
    #[default]
    Pretty,
}

/// Process-wide configuration.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub token: TokenConfig,
    /// Exposes the developer console and API docs without authentication.
    pub debug_routes: bool,
    pub log_format: LogFormat,
}

impl AppConfig {
    /// Load configuration from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    /// Load configuration from an arbitrary variable source.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let secret = lookup(JWT_SECRET_ENV)
            .filter(|s| !s.is_empty())
            .ok_or(ConfigError::MissingSecret)?;

        let ttl = match lookup(JWT_EXPIRATION_ENV) {
            Some(raw) => {
                let millis: u64 = raw.trim().parse().map_err(|_| ConfigError::InvalidValue {
                    var: JWT_EXPIRATION_ENV,
                    value: raw.clone(),
                })?;
                Duration::from_millis(millis)
            }
            None => DEFAULT_TOKEN_TTL,
        };
        if ttl < MIN_TOKEN_TTL {
            return Err(ConfigError::TtlTooShort(ttl.as_millis()));
        }
        if ttl > MAX_TOKEN_TTL {
            return Err(ConfigError::InvalidValue {
                var: JWT_EXPIRATION_ENV,
                value: ttl.as_millis().to_string(),
            });
        }

        let host = lookup(HOST_ENV).unwrap_or_else(|| "0.0.0.0".to_string());
        let port = match lookup(PORT_ENV) {
            Some(raw) => raw.trim().parse().map_err(|_| ConfigError::InvalidValue {
                var: PORT_ENV,
                value: raw.clone(),
            })?,
            None => 8080,
        };

        let debug_routes = lookup(DEBUG_ROUTES_ENV)
            .map(|v| parse_flag(&v))
            .transpose()
            .map_err(|value| ConfigError::InvalidValue {
                var: DEBUG_ROUTES_ENV,
                value,
            })?
            .unwrap_or(false);

        let log_format = match lookup(LOG_FORMAT_ENV).as_deref() {
            Some("json") => LogFormat::Json,
            _ => LogFormat::Pretty,
        };

        Ok(Self {
            host,
            port,
            token: TokenConfig::new(secret, ttl),
            debug_routes,
            log_format,
        })
    }

    pub fn bind_addr(&self) -> Result<SocketAddr, ConfigError> {
        let raw = format!("{}:{}", self.host, self.port);
        raw.parse().map_err(|_| ConfigError::InvalidValue {
            var: HOST_ENV,
            value: raw,
        })
    }
}

fn parse_flag(value: &str) -> Result<bool, String> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" | "" => Ok(false),
        _ => Err(value.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn defaults_apply_when_only_secret_is_set() {
        let config = AppConfig::from_lookup(lookup(&[(JWT_SECRET_ENV, "s3cret")])).unwrap();
        assert_eq!(config.token.secret, "s3cret");
        assert_eq!(config.token.ttl, DEFAULT_TOKEN_TTL);
        assert_eq!(config.port, 8080);
        assert!(!config.debug_routes);
        assert_eq!(config.log_format, LogFormat::Pretty);
        assert_eq!(config.bind_addr().unwrap().port(), 8080);
    }

    #[test]
    fn missing_or_empty_secret_is_rejected() {
        assert!(matches!(
            AppConfig::from_lookup(lookup(&[])),
            Err(ConfigError::MissingSecret)
        ));
        assert!(matches!(
            AppConfig::from_lookup(lookup(&[(JWT_SECRET_ENV, "")])),
            Err(ConfigError::MissingSecret)
        ));
    }

    #[test]
    fn ttl_is_read_in_milliseconds() {
        let config = AppConfig::from_lookup(lookup(&[
            (JWT_SECRET_ENV, "s"),
            (JWT_EXPIRATION_ENV, "86400000"),
        ]))
        .unwrap();
        assert_eq!(config.token.ttl, Duration::from_secs(86_400));
    }

    #[test]
    fn sub_second_ttl_is_rejected() {
        let result = AppConfig::from_lookup(lookup(&[
            (JWT_SECRET_ENV, "s"),
            (JWT_EXPIRATION_ENV, "500"),
        ]));
        assert!(matches!(result, Err(ConfigError::TtlTooShort(500))));
    }

    #[test]
    fn ttl_beyond_ten_years_is_rejected() {
        let result = AppConfig::from_lookup(lookup(&[
            (JWT_SECRET_ENV, "s"),
            (JWT_EXPIRATION_ENV, "9000000000000000000"),
        ]));
        assert!(matches!(
            result,
            Err(ConfigError::InvalidValue { var: JWT_EXPIRATION_ENV, .. })
        ));

        let limit = MAX_TOKEN_TTL.as_millis().to_string();
        let at_limit = AppConfig::from_lookup(lookup(&[
            (JWT_SECRET_ENV, "s"),
            (JWT_EXPIRATION_ENV, limit.as_str()),
        ]));
        assert!(at_limit.is_ok());
    }

    #[test]
    fn debug_flag_parses_common_spellings() {
        let config = AppConfig::from_lookup(lookup(&[
            (JWT_SECRET_ENV, "s"),
            (DEBUG_ROUTES_ENV, "TRUE"),
            (LOG_FORMAT_ENV, "json"),
        ]))
        .unwrap();
        assert!(config.debug_routes);
        assert_eq!(config.log_format, LogFormat::Json);

        let bad = AppConfig::from_lookup(lookup(&[(JWT_SECRET_ENV, "s"), (DEBUG_ROUTES_ENV, "maybe")]));
        assert!(matches!(bad, Err(ConfigError::InvalidValue { .. })));
    }

    #[test]
    fn debug_output_redacts_secret() {
        let config = TokenConfig::new("do-not-print", DEFAULT_TOKEN_TTL);
        assert!(!format!("{config:?}").contains("do-not-print"));
    }
}
