use crate::config::ConfigError;
use serde::{Deserialize, Serialize};

/// Instrument metadata for tick size, lot size, etc.
///
/// Supplied by the host's symbol lookup; the engine only needs it for price
/// quantization (footprint levels) and volume normalization.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Instrument {
    pub symbol: String,
    pub tick_size: f64,
    pub lot_size: f64,
    pub currency: String,
}

impl Instrument {
    pub fn new(
        symbol: impl Into<String>,
        tick_size: f64,
        lot_size: f64,
        currency: impl Into<String>,
    ) -> Self {
        Self {
            symbol: symbol.into(),
            tick_size,
            lot_size,
            currency: currency.into(),
        }
    }

    /// Fatal setup check: a non-positive tick size makes price quantization
    /// meaningless.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.tick_size > 0.0) || !self.tick_size.is_finite() {
            return Err(ConfigError::InvalidTickSize {
                symbol: self.symbol.clone(),
                tick_size: self.tick_size,
            });
        }
        Ok(())
    }

    /// Round a price to the nearest tick.
    pub fn round_to_tick(&self, price: f64) -> f64 {
        (price / self.tick_size).round() * self.tick_size
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validate_rejects_bad_tick_size() {
        assert!(Instrument::new("EURUSD", 0.0, 1000.0, "USD").validate().is_err());
        assert!(Instrument::new("EURUSD", -0.1, 1000.0, "USD").validate().is_err());
        assert!(Instrument::new("EURUSD", f64::NAN, 1000.0, "USD").validate().is_err());
        assert!(Instrument::new("EURUSD", 0.0001, 1000.0, "USD").validate().is_ok());
    }

    #[test]
    fn round_to_tick_nearest() {
        let inst = Instrument::new("ES", 0.25, 1.0, "USD");
        assert_eq!(inst.round_to_tick(4500.10), 4500.00);
        assert_eq!(inst.round_to_tick(4500.15), 4500.25);
    }
}
