use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::errors::{FinancingError, Result, checked};
use crate::schedule::DEFAULT_MAX_YEARS;

/// Market assumptions shared by the affordability and quote calculators.
///
/// Every field has a default, so a JSON document only needs to name the
/// values it overrides:
///
/// ```rust
/// use baufinanz::FinancingConfig;
/// use rust_decimal_macros::dec;
///
/// let config = FinancingConfig::from_json_str(r#"{ "interestRate": 0.035 }"#).unwrap();
/// assert_eq!(config.interest_rate, dec!(0.035));
/// assert_eq!(config.repayment_rate, dec!(0.01));
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct FinancingConfig {
    /// Yearly interest rate as a fraction.
    pub interest_rate: Decimal,
    /// Initial yearly repayment rate as a fraction.
    pub repayment_rate: Decimal,
    /// Purchase side costs (transfer tax, notary, broker) as a fraction of the price.
    pub additional_cost_rate: Decimal,
    /// Horizon handed to the amortization engine.
    pub max_years: u32,
}

impl Default for FinancingConfig {
    fn default() -> Self {
        Self {
            interest_rate: dec!(0.04),
            repayment_rate: dec!(0.01),
            additional_cost_rate: dec!(0.105),
            max_years: DEFAULT_MAX_YEARS,
        }
    }
}

impl FinancingConfig {
    /// Parses and validates a JSON configuration document.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Rejects a non-positive repayment rate, a negative side cost rate and a
    /// zero horizon.
    pub fn validate(&self) -> Result<()> {
        if self.repayment_rate <= Decimal::ZERO {
            return Err(FinancingError::NonAmortizingRates {
                interest: self.interest_rate,
                repayment: self.repayment_rate,
            });
        }
        if self.additional_cost_rate < Decimal::ZERO {
            return Err(FinancingError::InvalidConfig(format!(
                "additional cost rate must not be negative, got {}",
                self.additional_cost_rate
            )));
        }
        if self.max_years == 0 {
            return Err(FinancingError::InvalidConfig("max years must be at least 1".to_string()));
        }
        Ok(())
    }

    /// Combined yearly rate of interest and repayment.
    pub fn annuity_rate(&self) -> Result<Decimal> {
        checked(self.interest_rate.checked_add(self.repayment_rate), "annuity rate")
    }
}
