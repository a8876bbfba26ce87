use std::env::VarError;

use crate::app_config::{AppConfig, Environment, MapsSettings, NotionSettings};
use crate::metro::{MetroMembership, DEFAULT_METRO_PROVINCES};
use crate::ConfigError;

/// Load application configuration from environment variables.
///
/// Calls `dotenvy::dotenv().ok()` to load `.env` files before reading env vars.
///
/// # Errors
///
/// Returns `ConfigError` if required env vars are missing or values are invalid.
pub fn load_app_config() -> Result<AppConfig, ConfigError> {
    dotenvy::dotenv().ok();
    load_app_config_from_env()
}

/// Load application configuration from environment variables already in the process.
///
/// Unlike [`load_app_config`], this does NOT load `.env` files.
///
/// # Errors
///
/// Returns `ConfigError` if required env vars are missing or values are invalid.
pub fn load_app_config_from_env() -> Result<AppConfig, ConfigError> {
    build_app_config(|key| std::env::var(key))
}

/// Load only what the maps commands need: the maps key, the country
/// restriction and the HTTP timeout. Loads `.env` first.
///
/// # Errors
///
/// Returns `ConfigError` if `GOOGLE_MAPS_API_KEY` is missing or a value is invalid.
pub fn load_maps_settings() -> Result<MapsSettings, ConfigError> {
    dotenvy::dotenv().ok();
    build_maps_settings(&|key: &str| std::env::var(key))
}

/// Load only what the courier catalog commands need. Loads `.env` first.
///
/// # Errors
///
/// Returns `ConfigError` if a Notion variable is missing or a value is invalid.
pub fn load_notion_settings() -> Result<NotionSettings, ConfigError> {
    dotenvy::dotenv().ok();
    build_notion_settings(&|key: &str| std::env::var(key))
}

fn require<F>(lookup: &F, var: &str) -> Result<String, ConfigError>
where
    F: Fn(&str) -> Result<String, VarError>,
{
    lookup(var)
        .ok()
        .filter(|v| !v.trim().is_empty())
        .ok_or_else(|| ConfigError::MissingEnvVar(var.to_string()))
}

fn or_default<F>(lookup: &F, var: &str, default: &str) -> String
where
    F: Fn(&str) -> Result<String, VarError>,
{
    lookup(var).unwrap_or_else(|_| default.to_string())
}

fn parse_u64<F>(lookup: &F, var: &str, default: &str) -> Result<u64, ConfigError>
where
    F: Fn(&str) -> Result<String, VarError>,
{
    or_default(lookup, var, default)
        .parse::<u64>()
        .map_err(|e| ConfigError::InvalidEnvVar {
            var: var.to_string(),
            reason: e.to_string(),
        })
}

/// Like [`parse_u64`] but zero is rejected.
fn parse_positive_u64<F>(lookup: &F, var: &str, default: &str) -> Result<u64, ConfigError>
where
    F: Fn(&str) -> Result<String, VarError>,
{
    let value = parse_u64(lookup, var, default)?;
    if value == 0 {
        return Err(ConfigError::InvalidEnvVar {
            var: var.to_string(),
            reason: "must be at least 1".to_string(),
        });
    }
    Ok(value)
}

fn build_maps_settings<F>(lookup: &F) -> Result<MapsSettings, ConfigError>
where
    F: Fn(&str) -> Result<String, VarError>,
{
    let api_key = require(lookup, "GOOGLE_MAPS_API_KEY")?;

    let country_restriction = or_default(lookup, "SHIPMATES_COUNTRY", "ph")
        .trim()
        .to_lowercase();
    if country_restriction.len() != 2 || !country_restriction.chars().all(|c| c.is_ascii_alphabetic())
    {
        return Err(ConfigError::InvalidEnvVar {
            var: "SHIPMATES_COUNTRY".to_string(),
            reason: format!("expected a two-letter country code, got '{country_restriction}'"),
        });
    }

    Ok(MapsSettings {
        api_key,
        country_restriction,
        http_timeout_secs: parse_u64(lookup, "SHIPMATES_HTTP_TIMEOUT_SECS", "30")?,
    })
}

fn build_notion_settings<F>(lookup: &F) -> Result<NotionSettings, ConfigError>
where
    F: Fn(&str) -> Result<String, VarError>,
{
    let api_key = require(lookup, "NOTION_API_KEY")?;
    let database_id = require(lookup, "NOTION_DATABASE_ID")?;
    let metro = parse_metro(&or_default(
        lookup,
        "SHIPMATES_METRO_PROVINCES",
        &DEFAULT_METRO_PROVINCES.join(","),
    ))?;

    Ok(NotionSettings {
        api_key,
        database_id,
        metro,
        http_timeout_secs: parse_u64(lookup, "SHIPMATES_HTTP_TIMEOUT_SECS", "30")?,
    })
}

/// Build application configuration using the provided env-var lookup function.
///
/// Decoupled from the process environment so it can be tested with a plain
/// `HashMap` lookup.
fn build_app_config<F>(lookup: F) -> Result<AppConfig, ConfigError>
where
    F: Fn(&str) -> Result<String, VarError>,
{
    use std::net::SocketAddr;

    let maps = build_maps_settings(&lookup)?;
    let notion = build_notion_settings(&lookup)?;

    let env = parse_environment(&or_default(&lookup, "SHIPMATES_ENV", "development"))?;

    let bind_addr = or_default(&lookup, "SHIPMATES_BIND_ADDR", "0.0.0.0:3000")
        .parse::<SocketAddr>()
        .map_err(|e| ConfigError::InvalidEnvVar {
            var: "SHIPMATES_BIND_ADDR".to_string(),
            reason: e.to_string(),
        })?;
    let log_level = or_default(&lookup, "SHIPMATES_LOG_LEVEL", "info");

    let revalidate_secs = parse_positive_u64(&lookup, "SHIPMATES_REVALIDATE_SECS", "1")?;
    let session_ttl_secs = parse_positive_u64(&lookup, "SHIPMATES_SESSION_TTL_SECS", "1800")?;
    let rate_limit_per_minute = or_default(&lookup, "SHIPMATES_RATE_LIMIT_PER_MINUTE", "120")
        .parse::<usize>()
        .map_err(|e| ConfigError::InvalidEnvVar {
            var: "SHIPMATES_RATE_LIMIT_PER_MINUTE".to_string(),
            reason: e.to_string(),
        })?;

    Ok(AppConfig {
        env,
        bind_addr,
        log_level,
        google_maps_api_key: maps.api_key,
        notion_api_key: notion.api_key,
        notion_database_id: notion.database_id,
        country_restriction: maps.country_restriction,
        metro: notion.metro,
        revalidate_secs,
        session_ttl_secs,
        http_timeout_secs: maps.http_timeout_secs,
        rate_limit_per_minute,
    })
}

/// Parse a string into an `Environment` variant.
fn parse_environment(s: &str) -> Result<Environment, ConfigError> {
    match s {
        "development" => Ok(Environment::Development),
        "test" => Ok(Environment::Test),
        "production" => Ok(Environment::Production),
        other => Err(ConfigError::InvalidEnvVar {
            var: "SHIPMATES_ENV".to_string(),
            reason: format!("unknown environment '{other}'"),
        }),
    }
}

/// Parse a comma-separated list of metro province names.
fn parse_metro(raw: &str) -> Result<MetroMembership, ConfigError> {
    let metro = MetroMembership::from_names(raw.split(','));
    if metro.is_empty() {
        return Err(ConfigError::InvalidEnvVar {
            var: "SHIPMATES_METRO_PROVINCES".to_string(),
            reason: "at least one province name is required".to_string(),
        });
    }
    Ok(metro)
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
