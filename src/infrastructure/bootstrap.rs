//! Composition root: turns a [`Config`] into a ready valuation service.

use std::sync::Arc;

use tracing::info;

use crate::adapter::outbound::solver::LuSolver;
use crate::adapter::outbound::sqlite::{create_pool, run_migrations, SqliteValuationStore};
use crate::application::valuation::{ValuationParams, ValuationService};
use crate::error::Result;
use crate::infrastructure::config::settings::Config;
use crate::port::outbound::notifier::{LogNotifier, NotifierRegistry};
use crate::port::outbound::solver::LinearSolver;

/// Build the notifier registry. Committed valuations and failures are
/// logged.
pub(crate) fn build_notifier_registry(_config: &Config) -> NotifierRegistry {
    let mut registry = NotifierRegistry::new();
    registry.register(Box::new(LogNotifier));
    registry
}

/// Build the LU solver with the pass's pivot tolerance.
pub(crate) fn build_solver(params: &ValuationParams) -> Arc<dyn LinearSolver> {
    Arc::new(LuSolver::new(params.singular_tolerance))
}

/// Open the database, run migrations and return the store.
///
/// # Errors
/// Returns an error if the pool cannot be created or migrations fail.
pub fn open_store(config: &Config) -> Result<SqliteValuationStore> {
    let pool = create_pool(&config.database)?;
    run_migrations(&pool)?;
    info!(database = %config.database, "Database ready");
    Ok(SqliteValuationStore::new(pool))
}

/// Wire the SQLite-backed valuation service.
///
/// # Errors
/// Returns an error if the store cannot be opened.
pub fn build_service(config: &Config) -> Result<ValuationService<SqliteValuationStore>> {
    let store = Arc::new(open_store(config)?);
    let params = config.valuation.params();
    info!(
        leader_value_share = params.leader_value_share,
        workers = params.workers,
        parallel_threshold = params.parallel_threshold,
        "Valuation service configured"
    );
    Ok(ValuationService::new(
        store,
        build_solver(&params),
        Arc::new(build_notifier_registry(config)),
        params,
    ))
}
