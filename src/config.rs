//! Server configuration read from the environment (and `.env`).

use std::env;
use std::fs;

use thiserror::Error;

use crate::voucher::VoucherSettings;

const DEFAULT_HOST: &str = "0.0.0.0";
const DEFAULT_PORT: u16 = 8080;
const DEFAULT_MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;
const DEFAULT_CORS_ORIGINS: [&str; 4] = [
    "http://localhost:5173",
    "http://localhost:3000",
    "http://localhost:8080",
    "http://127.0.0.1:8080",
];

#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("{name} must be a valid {expected}, got '{value}'")]
    Invalid {
        name: &'static str,
        expected: &'static str,
        value: String,
    },
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub max_upload_bytes: usize,
    pub cors_allowed_origins: Vec<String>,
    /// Server-wide defaults; each request may override them.
    pub voucher_defaults: VoucherSettings,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Build the configuration from an arbitrary variable source.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |name: &str| {
            lookup(name)
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
        };

        let port = match var("PORT") {
            Some(value) => value.parse().map_err(|_| ConfigError::Invalid {
                name: "PORT",
                expected: "port number",
                value,
            })?,
            None => DEFAULT_PORT,
        };

        let max_upload_bytes = match var("MAX_UPLOAD_BYTES") {
            Some(value) => match value.parse::<usize>() {
                Ok(bytes) if bytes > 0 => bytes,
                _ => {
                    return Err(ConfigError::Invalid {
                        name: "MAX_UPLOAD_BYTES",
                        expected: "positive byte count",
                        value,
                    })
                }
            },
            None => DEFAULT_MAX_UPLOAD_BYTES,
        };

        let cors_allowed_origins = match var("CORS_ALLOWED_ORIGINS") {
            Some(value) => value
                .split(',')
                .map(str::trim)
                .filter(|origin| !origin.is_empty())
                .map(str::to_string)
                .collect(),
            None => DEFAULT_CORS_ORIGINS.iter().map(|o| o.to_string()).collect(),
        };

        let logo = var("LOGO_PATH").and_then(|path| match fs::read(&path) {
            Ok(bytes) => {
                log::info!("Loaded voucher logo from {} ({} bytes)", path, bytes.len());
                Some(bytes)
            }
            Err(e) => {
                log::warn!("LOGO_PATH '{}' could not be read, vouchers will have no logo: {}", path, e);
                None
            }
        });

        let voucher_defaults = VoucherSettings {
            company_name: var("COMPANY_NAME").unwrap_or_default(),
            // `\n` in the variable separates address lines.
            company_address: var("COMPANY_ADDRESS")
                .map(|value| value.replace("\\n", "\n"))
                .unwrap_or_default(),
            approver_name: var("APPROVER_NAME").unwrap_or_default(),
            preparer_name: var("PREPARER_NAME").unwrap_or_default(),
            logo,
            ..Default::default()
        };

        Ok(Self {
            host: var("HOST").unwrap_or_else(|| DEFAULT_HOST.to_string()),
            port,
            max_upload_bytes,
            cors_allowed_origins,
            voucher_defaults,
        })
    }
}
