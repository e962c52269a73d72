//! Application configuration loaded from environment variables.

use crate::errors::{GatewayError, Result};

#[derive(Debug, Clone)]
pub struct Config {
    /// Path to the SQLite event index
    pub database_url: String,
    /// Port for the REST API server
    pub api_port: u16,
    /// How often (in seconds) to poll the engine journal for new events
    pub poll_interval_secs: u64,
    /// Maximum number of journal entries indexed per poll
    pub events_per_page: u32,
    /// Principal of the engine: reward issuer and custody account
    pub contract_principal: String,
    /// Expose `POST /accounts/:principal/fund` for local testing
    pub enable_dev_faucet: bool,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build a config from an arbitrary key lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let var = |key: &str, default: &str| lookup(key).unwrap_or_else(|| default.to_string());

        let contract_principal = var("CONTRACT_PRINCIPAL", "charity-crowdfunding");
        if contract_principal.is_empty() {
            return Err(GatewayError::Config(
                "CONTRACT_PRINCIPAL must not be empty".to_string(),
            ));
        }

        Ok(Config {
            database_url: var("DATABASE_URL", "sqlite:./crowdfunding_events.db"),
            api_port: var("API_PORT", "3001")
                .parse()
                .map_err(|_| GatewayError::Config("Invalid API_PORT".to_string()))?,
            poll_interval_secs: var("POLL_INTERVAL_SECS", "2")
                .parse()
                .map_err(|_| GatewayError::Config("Invalid POLL_INTERVAL_SECS".to_string()))?,
            events_per_page: var("EVENTS_PER_PAGE", "100")
                .parse()
                .map_err(|_| GatewayError::Config("Invalid EVENTS_PER_PAGE".to_string()))?,
            contract_principal,
            enable_dev_faucet: parse_bool(&var("ENABLE_DEV_FAUCET", "false"))
                .ok_or_else(|| GatewayError::Config("Invalid ENABLE_DEV_FAUCET".to_string()))?,
        })
    }
}

fn parse_bool(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" | "" => Some(false),
        _ => None,
    }
}
