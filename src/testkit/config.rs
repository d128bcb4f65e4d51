//! Canonical test configurations.

use std::path::Path;

use crate::application::valuation::ValuationParams;
use crate::infrastructure::config::settings::Config;

/// Default configuration pointing at `database`.
pub fn config_with_database(database: &Path) -> Config {
    Config {
        database: database.to_string_lossy().into_owned(),
        ..Config::default()
    }
}

/// Pass parameters that force the parallel path for any component count
/// of two or more.
pub fn parallel_params(workers: usize) -> ValuationParams {
    ValuationParams {
        workers,
        parallel_threshold: 2,
        ..ValuationParams::default()
    }
}

/// Pass parameters that always solve on the calling thread.
pub fn sequential_params() -> ValuationParams {
    ValuationParams {
        workers: 1,
        ..ValuationParams::default()
    }
}
