use std::env;
use std::time::Duration;

use thiserror::Error;

pub const DEFAULT_ALLOWED_ORIGINS: &str = "http://localhost:5173,http://localhost:4000";

#[derive(Error, Debug, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{name} must be a number, got '{value}'")]
    InvalidNumber { name: &'static str, value: String },

    #[error("{name} must be greater than zero, got '{value}'")]
    NotPositive { name: &'static str, value: String },

    #[error("{name} must be true or false, got '{value}'")]
    InvalidFlag { name: &'static str, value: String },
}

#[derive(Clone, Debug)]
pub struct Config {
    /// Postgres connection string. When unset the server keeps its data in
    /// memory for the lifetime of the process.
    pub database_url: Option<String>,
    pub server_host: String,
    pub server_port: u16,
    pub fetch_timeout: Duration,
    /// Permit item URLs that resolve to loopback or private addresses.
    pub allow_private_hosts: bool,
    pub allowed_origins: Vec<String>,
    pub is_production: bool,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let server_port = parse_number("SERVER_PORT", "8000")?;
        let fetch_timeout_secs: u64 = parse_number("FETCH_TIMEOUT_SECS", "5")?;
        if fetch_timeout_secs == 0 {
            return Err(ConfigError::NotPositive {
                name: "FETCH_TIMEOUT_SECS",
                value: fetch_timeout_secs.to_string(),
            });
        }

        Ok(Config {
            database_url: env::var("DATABASE_URL").ok().filter(|s| !s.is_empty()),
            server_host: env::var("SERVER_HOST").unwrap_or_else(|_| "127.0.0.1".to_string()),
            server_port,
            fetch_timeout: Duration::from_secs(fetch_timeout_secs),
            allow_private_hosts: parse_flag("ALLOW_PRIVATE_HOSTS")?,
            allowed_origins: env::var("ALLOWED_ORIGINS")
                .unwrap_or_else(|_| DEFAULT_ALLOWED_ORIGINS.to_string())
                .split(',')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_string)
                .collect(),
            is_production: env::var("APP_ENV").as_deref() == Ok("production"),
        })
    }

    pub fn server_addr(&self) -> String {
        format!("{}:{}", self.server_host, self.server_port)
    }
}

fn parse_number<T: std::str::FromStr>(name: &'static str, default: &str) -> Result<T, ConfigError> {
    let value = env::var(name).unwrap_or_else(|_| default.to_string());
    value
        .trim()
        .parse()
        .map_err(|_| ConfigError::InvalidNumber { name, value })
}

fn parse_flag(name: &'static str) -> Result<bool, ConfigError> {
    match env::var(name) {
        Err(_) => Ok(false),
        Ok(value) => match value.trim().to_ascii_lowercase().as_str() {
            "1" | "true" | "yes" => Ok(true),
            "" | "0" | "false" | "no" => Ok(false),
            _ => Err(ConfigError::InvalidFlag { name, value }),
        },
    }
}
