//! Engine configuration and fatal setup errors.

use crate::bars::registry::SubscriptionKey;
use thiserror::Error;

/// Errors that mean the strategy cannot run at all. Raised once during
/// setup, never during tick processing.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("bar period must be positive, got {0} seconds")]
    ZeroBarPeriod(i64),

    #[error("instrument {symbol} has invalid tick size {tick_size}")]
    InvalidTickSize { symbol: String, tick_size: f64 },

    #[error("ring buffer capacity must be non-zero")]
    ZeroCapacity,

    #[error("duplicate subscription {0}")]
    DuplicateSubscription(SubscriptionKey),

    #[error("at least one bar series subscription is required")]
    NoSubscriptions,

    #[error("commission per unit must be finite and non-negative, got {0}")]
    InvalidCommission(f64),
}

/// Configuration for one engine instance.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Commission charged per unit of volume, per fill. A round trip pays
    /// it twice (entry and exit).
    pub commission_per_unit: f64,
}

impl EngineConfig {
    pub fn new(commission_per_unit: f64) -> Self {
        Self { commission_per_unit }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.commission_per_unit.is_finite() || self.commission_per_unit < 0.0 {
            return Err(ConfigError::InvalidCommission(self.commission_per_unit));
        }
        Ok(())
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self::new(0.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        assert!(EngineConfig::default().validate().is_ok());
    }

    #[test]
    fn negative_commission_rejected() {
        assert!(EngineConfig::new(-0.5).validate().is_err());
        assert!(EngineConfig::new(f64::NAN).validate().is_err());
    }
}
