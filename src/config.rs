// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Runtime Configuration
//!
//! Environment variable names, defaults, and the startup [`Config`]
//! loaded from the environment.
//!
//! ## Environment Variables
//!
//! | Variable | Description | Default |
//! |----------|-------------|---------|
//! | `HOST` | Server bind address | `0.0.0.0` |
//! | `PORT` | Server bind port | `8080` |
//! | `DATA_DIR` | Root directory for documents and uploads | `./data` |
//! | `TOKEN_SECRET` | HS256 signing secret for issued tokens | Required |
//! | `TOKEN_TTL_SECS` | Lifetime of issued tokens in seconds | `3600` |
//! | `LOG_FORMAT` | Log output format (`json` or `pretty`) | `pretty` |
//! | `RUST_LOG` | Log level filter | `info` |

use std::env;

/// Environment variable for the storage root directory.
pub const DATA_DIR_ENV: &str = "DATA_DIR";

/// Environment variable for the token signing secret.
pub const TOKEN_SECRET_ENV: &str = "TOKEN_SECRET";

/// Environment variable for the token lifetime override.
pub const TOKEN_TTL_ENV: &str = "TOKEN_TTL_SECS";

/// Storage root used when `DATA_DIR` is unset.
pub const DEFAULT_DATA_DIR: &str = "./data";

/// Token lifetime used when `TOKEN_TTL_SECS` is unset (one hour).
pub const DEFAULT_TOKEN_TTL_SECS: u64 = 3600;

/// Startup configuration resolved from the environment.
#[derive(Debug, Clone)]
pub struct Config {
    /// Bind address.
    pub host: String,
    /// Bind port.
    pub port: u16,
    /// Root directory for document and upload storage.
    pub data_dir: String,
    /// Signing secret for issued tokens. Injected, never defaulted.
    pub token_secret: String,
    /// Lifetime of issued tokens in seconds.
    pub token_ttl_secs: u64,
}

impl Config {
    /// Load configuration from the environment.
    ///
    /// Every value has a default except `TOKEN_SECRET`, which must be
    /// set to a non-empty value or startup is refused.
    pub fn from_env() -> Result<Self, String> {
        let token_secret =
            env::var(TOKEN_SECRET_ENV).map_err(|_| format!("{TOKEN_SECRET_ENV} must be set"))?;
        if token_secret.is_empty() {
            return Err(format!("{TOKEN_SECRET_ENV} must not be empty"));
        }

        let host = env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string());
        let port = env::var("PORT")
            .unwrap_or_else(|_| "8080".to_string())
            .parse()
            .unwrap_or(8080);
        let data_dir = env::var(DATA_DIR_ENV).unwrap_or_else(|_| DEFAULT_DATA_DIR.to_string());
        let token_ttl_secs = env::var(TOKEN_TTL_ENV)
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(DEFAULT_TOKEN_TTL_SECS);

        Ok(Self {
            host,
            port,
            data_dir,
            token_secret,
            token_ttl_secs,
        })
    }
}
