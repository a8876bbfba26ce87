pub mod address;
pub mod app_config;
pub mod config;
pub mod couriers;
pub mod metro;

pub use address::{Address, AddressRole};
pub use app_config::{AppConfig, Environment, MapsSettings, NotionSettings};
pub use config::{
    load_app_config, load_app_config_from_env, load_maps_settings, load_notion_settings,
};
pub use couriers::{match_couriers, CourierQuote, CourierRecord, CourierSnapshot, PriceTier};
pub use metro::{normalize_province, MetroMembership};

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required environment variable: {0}")]
    MissingEnvVar(String),

    #[error("invalid value for {var}: {reason}")]
    InvalidEnvVar { var: String, reason: String },
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum CoreError {
    #[error("{role} address is incomplete: missing {}", missing.join(", "))]
    IncompleteAddress {
        role: AddressRole,
        missing: Vec<&'static str>,
    },
}
