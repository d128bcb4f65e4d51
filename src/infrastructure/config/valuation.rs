//! Valuation pass configuration.

use rust_decimal::Decimal;
use serde::Deserialize;

use crate::application::valuation::{ValuationParams, DEFAULT_PARALLEL_THRESHOLD};
use crate::domain::{money, valuation::PricingParams};
use crate::error::{ConfigError, Result};
use crate::port::outbound::solver::DEFAULT_SINGULAR_TOLERANCE;

/// `[valuation]` section.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ValuationConfig {
    /// Shares that represent the whole net worth of a leader.
    pub leader_value_share: Decimal,
    /// Divisor from net worth to instrument price.
    pub price_scale: Decimal,
    /// Lowest ask price, and the bid below which trading halts.
    pub ask_floor: Decimal,
    /// Volume offered while an instrument trades.
    pub full_liquidity_volume: Decimal,
    /// Relative pivot tolerance of the LU solver.
    pub singular_tolerance: f64,
    /// Component count from which solving fans out to threads.
    pub parallel_threshold: usize,
    /// Worker threads. Defaults to the number of CPUs.
    pub workers: Option<usize>,
}

impl Default for ValuationConfig {
    fn default() -> Self {
        let pricing = PricingParams::default();
        Self {
            leader_value_share: Decimal::from(100),
            price_scale: pricing.price_scale,
            ask_floor: pricing.ask_floor,
            full_liquidity_volume: pricing.full_liquidity_volume,
            singular_tolerance: DEFAULT_SINGULAR_TOLERANCE,
            parallel_threshold: DEFAULT_PARALLEL_THRESHOLD,
            workers: None,
        }
    }
}

impl ValuationConfig {
    #[allow(clippy::result_large_err)]
    pub(crate) fn validate(&self) -> Result<()> {
        if self.leader_value_share <= Decimal::ZERO {
            return Err(invalid("leader_value_share", "must be greater than 0"));
        }
        if self.price_scale <= Decimal::ZERO {
            return Err(invalid("price_scale", "must be greater than 0"));
        }
        if self.ask_floor < Decimal::ZERO {
            return Err(invalid("ask_floor", "must be 0 or greater"));
        }
        if self.full_liquidity_volume < Decimal::ZERO {
            return Err(invalid("full_liquidity_volume", "must be 0 or greater"));
        }
        if !self.singular_tolerance.is_finite()
            || self.singular_tolerance < 0.0
            || self.singular_tolerance >= 1.0
        {
            return Err(invalid("singular_tolerance", "must be in [0, 1)"));
        }
        if self.workers == Some(0) {
            return Err(invalid("workers", "must be greater than 0"));
        }
        Ok(())
    }

    /// Resolve into pass parameters.
    #[must_use]
    pub fn params(&self) -> ValuationParams {
        ValuationParams {
            leader_value_share: money::to_f64(self.leader_value_share),
            pricing: PricingParams {
                price_scale: self.price_scale,
                ask_floor: self.ask_floor,
                full_liquidity_volume: self.full_liquidity_volume,
            },
            singular_tolerance: self.singular_tolerance,
            parallel_threshold: self.parallel_threshold,
            workers: self.workers.unwrap_or_else(num_cpus::get),
        }
    }
}

fn invalid(field: &'static str, reason: &str) -> crate::error::Error {
    ConfigError::InvalidValue {
        field,
        reason: reason.to_string(),
    }
    .into()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn defaults_match_pricing_constants() {
        let params = ValuationConfig::default().params();
        assert_eq!(params.leader_value_share, 100.0);
        assert_eq!(params.pricing, PricingParams::default());
        assert!(params.workers >= 1);
    }

    #[test]
    fn explicit_workers_are_kept() {
        let config = ValuationConfig {
            workers: Some(3),
            ..ValuationConfig::default()
        };
        assert_eq!(config.params().workers, 3);
    }

    #[test]
    fn rejects_non_positive_leader_value_share() {
        let config = ValuationConfig {
            leader_value_share: dec!(0),
            ..ValuationConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn rejects_tolerance_outside_unit_interval() {
        for tolerance in [-1e-3, 1.0, f64::NAN] {
            let config = ValuationConfig {
                singular_tolerance: tolerance,
                ..ValuationConfig::default()
            };
            assert!(config.validate().is_err(), "accepted {tolerance}");
        }
    }
}
