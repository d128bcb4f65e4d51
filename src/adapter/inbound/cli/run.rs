//! `valuator run`: periodic passes until Ctrl-C.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tracing::info;

use super::command::RunArgs;
use crate::error::{ConfigError, Result};
use crate::infrastructure::config::settings::Config;
use crate::infrastructure::{bootstrap, scheduler};
use crate::port::inbound::valuation::RecomputeValuations;

/// Run the scheduler until a shutdown signal arrives.
///
/// # Errors
/// Returns an error if the service cannot be built or the interval is zero.
pub async fn execute(config: &Config, args: &RunArgs) -> Result<()> {
    let interval_secs = args.interval_secs.unwrap_or(config.scheduler.interval_secs);
    if interval_secs == 0 {
        return Err(ConfigError::InvalidValue {
            field: "interval_secs",
            reason: "must be greater than 0".to_string(),
        }
        .into());
    }

    let service: Arc<dyn RecomputeValuations> = Arc::new(bootstrap::build_service(config)?);
    let (shutdown_tx, shutdown_rx) = watch::channel(false);

    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("Shutdown signal received");
        }
        let _ = shutdown_tx.send(true);
    });

    let summary =
        scheduler::run_periodic(service, Duration::from_secs(interval_secs), shutdown_rx).await?;
    info!(
        committed = summary.committed,
        failed = summary.failed,
        "valuator stopped"
    );
    Ok(())
}
