use std::net::SocketAddr;

use crate::metro::MetroMembership;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Environment {
    Development,
    Test,
    Production,
}

impl std::fmt::Display for Environment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Environment::Development => write!(f, "development"),
            Environment::Test => write!(f, "test"),
            Environment::Production => write!(f, "production"),
        }
    }
}

#[derive(Clone)]
pub struct AppConfig {
    pub env: Environment,
    pub bind_addr: SocketAddr,
    pub log_level: String,
    pub google_maps_api_key: String,
    pub notion_api_key: String,
    pub notion_database_id: String,
    /// ISO 3166-1 alpha-2 code that autocomplete results are restricted to.
    pub country_restriction: String,
    pub metro: MetroMembership,
    pub revalidate_secs: u64,
    /// Idle time after which a quote session is dropped.
    pub session_ttl_secs: u64,
    pub http_timeout_secs: u64,
    pub rate_limit_per_minute: usize,
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("env", &self.env)
            .field("bind_addr", &self.bind_addr)
            .field("log_level", &self.log_level)
            .field("google_maps_api_key", &"[redacted]")
            .field("notion_api_key", &"[redacted]")
            .field("notion_database_id", &self.notion_database_id)
            .field("country_restriction", &self.country_restriction)
            .field("metro", &self.metro)
            .field("revalidate_secs", &self.revalidate_secs)
            .field("session_ttl_secs", &self.session_ttl_secs)
            .field("http_timeout_secs", &self.http_timeout_secs)
            .field("rate_limit_per_minute", &self.rate_limit_per_minute)
            .finish()
    }
}

/// The slice of configuration a maps-only command needs.
#[derive(Clone)]
pub struct MapsSettings {
    pub api_key: String,
    pub country_restriction: String,
    pub http_timeout_secs: u64,
}

impl std::fmt::Debug for MapsSettings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MapsSettings")
            .field("api_key", &"[redacted]")
            .field("country_restriction", &self.country_restriction)
            .field("http_timeout_secs", &self.http_timeout_secs)
            .finish()
    }
}

/// The slice of configuration a courier catalog command needs.
#[derive(Clone)]
pub struct NotionSettings {
    pub api_key: String,
    pub database_id: String,
    pub metro: MetroMembership,
    pub http_timeout_secs: u64,
}

impl std::fmt::Debug for NotionSettings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NotionSettings")
            .field("api_key", &"[redacted]")
            .field("database_id", &self.database_id)
            .field("metro", &self.metro)
            .field("http_timeout_secs", &self.http_timeout_secs)
            .finish()
    }
}
