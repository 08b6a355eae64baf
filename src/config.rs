use std::env;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use thiserror::Error;

const DEFAULT_IDENTITY_API_URL: &str = "https://identitytoolkit.googleapis.com/v1";

#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("{0} must be set")]
    Missing(&'static str),

    #[error("{var} has an invalid value '{value}'")]
    Invalid { var: &'static str, value: String },
}

#[derive(Debug, Clone, PartialEq)]
pub struct IdentityConfig {
    pub api_url: String,
    pub api_key: String,
    /// Bearer token for account administration calls.
    pub service_token: Option<String>,
    pub timeout: Duration,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub database_url: String,
    pub db_pool_size: u32,
    pub host: String,
    pub port: u16,
    pub identity: IdentityConfig,
    pub blob_root: PathBuf,
    pub blob_public_url: String,
    pub page_size: i64,
}

impl Config {
    /// Read the configuration from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|var| env::var(var).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let var = |name: &'static str| lookup(name).filter(|v| !v.trim().is_empty());
        let required = |name: &'static str| var(name).ok_or(ConfigError::Missing(name));
        let or_default =
            |name: &'static str, default: &str| var(name).unwrap_or_else(|| default.to_string());

        let page_size: i64 = parse(&var, "PAGE_SIZE", 10)?;
        if page_size < 1 {
            return Err(ConfigError::Invalid {
                var: "PAGE_SIZE",
                value: page_size.to_string(),
            });
        }

        Ok(Self {
            database_url: required("DATABASE_URL")?,
            db_pool_size: parse(&var, "DB_POOL_SIZE", 10)?,
            host: or_default("HOST", "0.0.0.0"),
            port: parse(&var, "PORT", 8080)?,
            identity: IdentityConfig {
                api_url: or_default("IDENTITY_API_URL", DEFAULT_IDENTITY_API_URL),
                api_key: required("IDENTITY_API_KEY")?,
                service_token: var("IDENTITY_SERVICE_TOKEN"),
                timeout: Duration::from_secs(parse(&var, "IDENTITY_TIMEOUT_SECS", 10)?),
            },
            blob_root: PathBuf::from(or_default("BLOB_ROOT", "./uploads")),
            blob_public_url: or_default("BLOB_PUBLIC_URL", "http://localhost:8080/uploads"),
            page_size,
        })
    }
}

fn parse<T: FromStr>(
    var: &impl Fn(&'static str) -> Option<String>,
    name: &'static str,
    default: T,
) -> Result<T, ConfigError> {
    match var(name) {
        None => Ok(default),
        Some(value) => value.trim().parse().map_err(|_| ConfigError::Invalid { var: name, value }),
    }
}
