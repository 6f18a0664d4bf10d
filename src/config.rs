use crate::error::{Error, Result};
use crate::models::report::ReportSettings;
use chrono::FixedOffset;
use dotenvy::dotenv;
use std::env;
use std::sync::OnceLock;

#[derive(Debug, Clone)]
pub struct Config {
    pub server_address: String,
    pub database_url: String,
    pub jwt_secret: String,
    pub database_max_connections: u32,
    pub report_default_limit: u32,
    pub report_max_limit: u32,
    pub report_utc_offset_minutes: i32,
}

pub static CONFIG: OnceLock<Config> = OnceLock::new();

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenv().ok();

        let config = Self {
            server_address: get_env("SERVER_ADDRESS")?,
            database_url: get_env("DATABASE_URL")?,
            jwt_secret: get_env("JWT_SECRET")?,
            database_max_connections: get_env_parse_or("DATABASE_MAX_CONNECTIONS", 10)?,
            report_default_limit: get_env_parse_or("REPORT_DEFAULT_LIMIT", 20)?,
            report_max_limit: get_env_parse_or("REPORT_MAX_LIMIT", 100)?,
            report_utc_offset_minutes: get_env_parse_or("REPORT_UTC_OFFSET_MINUTES", 0)?,
        };
        config.report_settings()?;
        Ok(config)
    }

    /// Report knobs handed to the aggregation, which never reads globals.
    pub fn report_settings(&self) -> Result<ReportSettings> {
        let utc_offset = self
            .report_utc_offset_minutes
            .checked_mul(60)
            .and_then(FixedOffset::east_opt)
            .ok_or_else(|| {
                Error::Config(format!(
                    "Invalid value for REPORT_UTC_OFFSET_MINUTES: {}",
                    self.report_utc_offset_minutes
                ))
            })?;
        let max_limit = self.report_max_limit.max(1);
        Ok(ReportSettings {
            default_limit: self.report_default_limit.clamp(1, max_limit),
            max_limit,
            utc_offset,
        })
    }
}

fn get_env(name: &str) -> Result<String> {
    env::var(name).map_err(|_| Error::Config(format!("Missing environment variable: {}", name)))
}

fn get_env_parse_or<T>(name: &str, default: T) -> Result<T>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    match env::var(name) {
        Ok(raw) => raw
            .trim()
            .parse()
            .map_err(|e| Error::Config(format!("Invalid value for {}: {}", name, e))),
        Err(_) => Ok(default),
    }
}

pub fn init_config() -> Result<()> {
    let config = Config::from_env()?;
    CONFIG
        .set(config)
        .map_err(|_| Error::Config("Configuration has already been initialized".to_string()))?;
    Ok(())
}

pub fn get_config() -> &'static Config {
    CONFIG
        .get()
        .expect("Configuration has not been initialized")
}
