//! How expensive a property a monthly budget can carry.
//!
//! The monthly budget is treated as the full annuity of a loan at the
//! configured interest and repayment rates; available assets are added on top
//! and the purchase side costs are taken out of the sum.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::FinancingConfig;
use crate::errors::{FinancingError, Result, checked, finite_decimal};

/// Budget figures entered by the buyer.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AffordabilityInput {
    /// Monthly amount available for the mortgage rate.
    pub monthly_budget: Decimal,
    /// Equity available for the purchase.
    pub assets: Decimal,
}

impl AffordabilityInput {
    pub fn from_f64(monthly_budget: f64, assets: f64) -> Result<Self> {
        Ok(Self {
            monthly_budget: finite_decimal("monthly budget", monthly_budget)?,
            assets: finite_decimal("assets", assets)?,
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AffordabilityResult {
    /// Loan whose yearly annuity equals twelve monthly budgets.
    pub possible_loan: Decimal,
    /// Loan plus assets.
    pub total_affordable: Decimal,
    /// Highest purchase price whose side costs still fit into the total.
    pub max_property_price: Decimal,
}

/// Calculates the loan and property price a monthly budget supports.
///
/// # Errors
///
/// Returns [`FinancingError::NegativeAmount`] for a negative budget or negative
/// assets and [`FinancingError::NonAmortizingRates`] when interest plus
/// repayment is not positive. Amounts too large for a decimal give
/// [`FinancingError::Overflow`].
pub fn calculate_affordability(
    input: &AffordabilityInput,
    config: &FinancingConfig,
) -> Result<AffordabilityResult> {
    if input.monthly_budget < Decimal::ZERO {
        return Err(FinancingError::NegativeAmount {
            field: "monthly budget",
            value: input.monthly_budget,
        });
    }
    if input.assets < Decimal::ZERO {
        return Err(FinancingError::NegativeAmount {
            field: "assets",
            value: input.assets,
        });
    }

    let yearly_rate = config.annuity_rate()?;
    if yearly_rate <= Decimal::ZERO {
        return Err(FinancingError::NonAmortizingRates {
            interest: config.interest_rate,
            repayment: config.repayment_rate,
        });
    }

    let yearly_budget = checked(input.monthly_budget.checked_mul(dec!(12)), "yearly budget")?;
    let possible_loan = checked(yearly_budget.checked_div(yearly_rate), "possible loan")?;
    let total_affordable = checked(possible_loan.checked_add(input.assets), "total affordable")?;
    let cost_factor = checked(
        Decimal::ONE.checked_add(config.additional_cost_rate),
        "cost factor",
    )?;
    let max_property_price = checked(
        total_affordable.checked_div(cost_factor),
        "max property price",
    )?;

    debug!(%possible_loan, %max_property_price, "affordability calculated");

    Ok(AffordabilityResult {
        possible_loan,
        total_affordable,
        max_property_price,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[test]
    fn test_default_rates() {
        let input = AffordabilityInput {
            monthly_budget: dec!(1000),
            assets: dec!(50000),
        };

        let result = calculate_affordability(&input, &FinancingConfig::default()).unwrap();

        assert_eq!(result.possible_loan, dec!(240000));
        assert_eq!(result.total_affordable, dec!(290000));
        assert_eq!(result.max_property_price.round_dp(2), dec!(262443.44));
    }

    #[test]
    fn test_zero_budget_leaves_assets_only() {
        let input = AffordabilityInput {
            monthly_budget: dec!(0),
            assets: dec!(110500),
        };

        let result = calculate_affordability(&input, &FinancingConfig::default()).unwrap();

        assert_eq!(result.possible_loan, dec!(0));
        assert_eq!(result.max_property_price, dec!(100000));
    }

    #[rstest]
    #[case(dec!(-1), dec!(0), "monthly budget")]
    #[case(dec!(0), dec!(-1), "assets")]
    fn test_negative_amounts_rejected(
        #[case] monthly_budget: Decimal,
        #[case] assets: Decimal,
        #[case] expected_field: &str,
    ) {
        let input = AffordabilityInput {
            monthly_budget,
            assets,
        };

        let err = calculate_affordability(&input, &FinancingConfig::default()).unwrap_err();
        match err {
            FinancingError::NegativeAmount { field, .. } => assert_eq!(field, expected_field),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_non_positive_rate_rejected() {
        let config = FinancingConfig {
            interest_rate: dec!(-0.02),
            repayment_rate: dec!(0.01),
            ..FinancingConfig::default()
        };
        let input = AffordabilityInput {
            monthly_budget: dec!(1000),
            assets: dec!(0),
        };

        let err = calculate_affordability(&input, &config).unwrap_err();
        assert!(matches!(err, FinancingError::NonAmortizingRates { .. }));
    }

    #[test]
    fn test_huge_budget_overflows_instead_of_panicking() {
        let input = AffordabilityInput::from_f64(1e27, 0.0).unwrap();

        let err = calculate_affordability(&input, &FinancingConfig::default()).unwrap_err();
        assert!(matches!(err, FinancingError::Overflow { .. }));
    }

    #[test]
    fn test_huge_assets_overflow_in_sum() {
        let input = AffordabilityInput {
            monthly_budget: dec!(1000),
            assets: Decimal::MAX,
        };

        let err = calculate_affordability(&input, &FinancingConfig::default()).unwrap_err();
        assert!(matches!(err, FinancingError::Overflow { operation: "total affordable" }));
    }

    #[test]
    fn test_from_f64_rejects_non_finite() {
        let err = AffordabilityInput::from_f64(f64::NAN, 0.0).unwrap_err();
        assert!(matches!(err, FinancingError::NonFinite { field: "monthly budget" }));
        assert!(AffordabilityInput::from_f64(1200.0, 30000.0).is_ok());
    }
}
