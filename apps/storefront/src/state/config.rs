//! # Configuration State
//!
//! Read-only view of `AppConfig` the commands need: the currency symbol
//! and the guest fee schedule.

use storefront_core::{CartAggregator, FeeSchedule, Money, Points};

use crate::config::AppConfig;

#[derive(Debug, Clone)]
pub struct ConfigState {
    /// Currency symbol (for display)
    pub currency_symbol: String,

    /// Fees for locally computed guest summaries
    pub fees: FeeSchedule,
}

impl ConfigState {
    pub fn from_config(config: &AppConfig) -> Self {
        ConfigState {
            currency_symbol: config.currency_symbol.clone(),
            fees: config.fee_schedule(),
        }
    }

    /// Aggregator producing cart views with this fee schedule.
    pub fn aggregator(&self) -> CartAggregator {
        CartAggregator::new(self.fees)
    }

    /// Formats an amount as a currency string.
    ///
    /// ## Example
    /// ```rust,ignore
    /// assert_eq!(config.format_currency(Money::from_minor(123450)), "₹1234.50");
    /// ```
    pub fn format_currency(&self, amount: Money) -> String {
        amount.format_with(&self.currency_symbol)
    }

    pub fn format_points(&self, points: Points) -> String {
        points.to_string()
    }
}

impl Default for ConfigState {
    fn default() -> Self {
        ConfigState {
            currency_symbol: "₹".to_string(),
            fees: FeeSchedule::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_currency() {
        let config = ConfigState::default();
        assert_eq!(config.format_currency(Money::from_minor(123450)), "₹1234.50");
        assert_eq!(config.format_currency(Money::zero()), "₹0.00");
    }

    #[test]
    fn test_format_currency_custom_symbol() {
        let config = ConfigState {
            currency_symbol: "Rs.".to_string(),
            ..Default::default()
        };
        assert_eq!(config.format_currency(Money::from_major(20)), "Rs.20.00");
    }
}
