//! Harness configuration

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Receipt polling interval in milliseconds
    pub poll_interval_ms: u64,

    /// Ticks before a submitted operation finalizes
    pub confirm_delay_ticks: u32,

    /// Execution budget per top-level operation
    pub budget_capacity: u32,

    /// Budget units consumed per value send
    pub send_cost: u32,

    /// Credits for the simple two-recipient scenarios
    pub owner_credit: u128,
    pub victim_credit: u128,

    /// Attacker-first boundary scenario: attacker entitlement, victim
    /// credit, and the budget that stops the drain chain
    pub attacker_credit: u128,
    pub boundary_victim_credit: u128,
    pub attack_budget: u32,
}

impl Config {
    /// Load configuration from TOML file
    pub fn load() -> Result<Self> {
        let config_path =
            std::env::var("PULLPAY_CONFIG").unwrap_or_else(|_| "pullpay.toml".to_string());

        let config_str = std::fs::read_to_string(&config_path)
            .context(format!("Failed to read config file: {}", config_path))?;

        let config: Config = toml::from_str(&config_str).context("Failed to parse config TOML")?;

        Ok(config)
    }

    /// Built-in defaults matching the reference scenarios
    pub fn default_local() -> Self {
        Self {
            poll_interval_ms: 50,
            confirm_delay_ticks: 2,
            budget_capacity: 64,
            send_cost: 1,
            owner_credit: 1000,
            victim_credit: 2000,
            attacker_credit: 1,
            boundary_victim_credit: 200,
            attack_budget: 200,
        }
    }
}
