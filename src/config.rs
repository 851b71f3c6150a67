use std::env;
use std::path::PathBuf;
use std::str::FromStr;

use thiserror::Error;

pub const DEFAULT_PORT: u16 = 5000;
pub const DEFAULT_SESSION_TIMEOUT_SECS: u64 = 1800;
pub const DEFAULT_REPORT_PATH: &str = "reporte_pacientes.csv";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required environment variable {0}")]
    Missing(&'static str),
    #[error("invalid value for {0}: {1}")]
    Invalid(&'static str, String),
}

/// Process configuration, read from the environment after the caller has
/// loaded any `.env` file.
#[derive(Debug, Clone)]
pub struct Config {
    pub twilio_account_sid: String,
    pub twilio_auth_token: String,
    pub whatsapp_number: String,
    pub port: u16,
    pub session_timeout_secs: u64,
    pub report_path: PathBuf,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            twilio_account_sid: require("TWILIO_ACCOUNT_SID")?,
            twilio_auth_token: require("TWILIO_AUTH_TOKEN")?,
            whatsapp_number: require("WHATSAPP_NUMBER")?,
            port: parse_or("PORT", DEFAULT_PORT)?,
            session_timeout_secs: parse_or("SESSION_TIMEOUT_SECS", DEFAULT_SESSION_TIMEOUT_SECS)?,
            report_path: env::var("REPORT_PATH")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from(DEFAULT_REPORT_PATH)),
        })
    }
}

fn require(key: &'static str) -> Result<String, ConfigError> {
    env::var(key).map_err(|_| ConfigError::Missing(key))
}

fn parse_or<T: FromStr>(key: &'static str, default: T) -> Result<T, ConfigError> {
    match env::var(key) {
        Ok(raw) => raw.parse().map_err(|_| ConfigError::Invalid(key, raw)),
        Err(_) => Ok(default),
    }
}
