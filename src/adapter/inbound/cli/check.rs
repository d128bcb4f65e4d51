//! `valuator check`: validate configuration and prepare the database.

use super::output;
use crate::error::Result;
use crate::infrastructure::bootstrap;
use crate::infrastructure::config::settings::Config;

/// Report the effective configuration and run migrations.
///
/// # Errors
/// Returns an error if the database cannot be opened or migrated.
pub fn execute(config: &Config) -> Result<()> {
    let params = config.valuation.params();

    output::section("Configuration Check");
    output::field("Database", &config.database);
    output::field("Log level", &config.logging.level);
    output::field("Leader value share", config.valuation.leader_value_share);
    output::field("Price scale", config.valuation.price_scale);
    output::field("Ask floor", config.valuation.ask_floor);
    output::field("Full liquidity", config.valuation.full_liquidity_volume);
    output::field("Singular tolerance", config.valuation.singular_tolerance);
    output::field("Workers", params.workers);
    output::field("Parallel threshold", params.parallel_threshold);
    output::field("Interval (s)", config.scheduler.interval_secs);
    output::success("Configuration is valid");

    bootstrap::open_store(config)?;
    output::success("Database migrated");
    Ok(())
}
