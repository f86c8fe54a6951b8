//! Pullpay scenario runner
//!
//! Drives the escrow model through the simulated node: submits the
//! reference credit/withdraw/attack scenarios, polls for their receipts,
//! and reports the drain and no-drain outcomes for both escrow variants.

use anyhow::Result;
use pullpay_harness::config::Config;
use pullpay_harness::scenario;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    log::info!("Starting pullpay scenario harness");

    // Load configuration
    let config = Config::load().unwrap_or_else(|_| {
        log::warn!("Failed to load config, using built-in defaults");
        Config::default_local()
    });

    log::info!(
        "confirm delay: {} ticks, poll interval: {} ms, attack budget: {} sends",
        config.confirm_delay_ticks,
        config.poll_interval_ms,
        config.attack_budget
    );

    scenario::run_all(&config).await?;

    log::info!("All scenarios passed");
    Ok(())
}
