//! Savings projections on the capital market.
//!
//! Contributions are invested at the start of each year and the whole
//! position then compounds at a fixed expected return.

use rust_decimal::{Decimal, MathematicalOps};
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::errors::{FinancingError, Result, checked};

/// Statutory retirement age in Germany.
pub const DEFAULT_RETIREMENT_AGE: u32 = 67;
/// Long-run equity market return.
pub const DEFAULT_RETURN_RATE: Decimal = dec!(0.08);

fn default_retirement_age() -> u32 {
    DEFAULT_RETIREMENT_AGE
}

fn default_return_rate() -> Decimal {
    DEFAULT_RETURN_RATE
}

/// Assumptions of the retirement projection.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectionConfig {
    #[serde(default = "default_retirement_age")]
    pub retirement_age: u32,
    #[serde(default = "default_return_rate")]
    pub return_rate: Decimal,
}

impl Default for ProjectionConfig {
    fn default() -> Self {
        Self {
            retirement_age: DEFAULT_RETIREMENT_AGE,
            return_rate: DEFAULT_RETURN_RATE,
        }
    }
}

/// Wealth at the end of one projected year.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WealthPoint {
    /// `Alter 31`, `Alter 32`, ...
    pub label: String,
    pub year: u32,
    pub wealth: Decimal,
}

/// Result of [`project_retirement`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RetirementProjection {
    pub years_to_retirement: u32,
    pub annual_contribution: Decimal,
    pub data_points: Vec<WealthPoint>,
    pub final_wealth: Decimal,
}

/// Projects saving `monthly_savings` every month from `age` until retirement.
///
/// At or past the retirement age there is nothing to project: the result has
/// zero years, no data points and zero final wealth.
///
/// # Errors
///
/// [`FinancingError::NotPositive`] for an age of zero,
/// [`FinancingError::NegativeAmount`] for negative savings and
/// [`FinancingError::Overflow`] when the wealth leaves the decimal range.
pub fn project_retirement(
    age: u32,
    monthly_savings: Decimal,
    config: &ProjectionConfig,
) -> Result<RetirementProjection> {
    if age == 0 {
        return Err(FinancingError::NotPositive { field: "age" });
    }
    if monthly_savings < Decimal::ZERO {
        return Err(FinancingError::NegativeAmount {
            field: "monthly savings",
            value: monthly_savings,
        });
    }

    let years_to_retirement = config.retirement_age.saturating_sub(age);
    let annual_contribution = checked(monthly_savings.checked_mul(dec!(12)), "contribution")?;
    let growth = Decimal::ONE + config.return_rate;

    let mut wealth = Decimal::ZERO;
    let mut data_points = Vec::new();
    for year in 1..=years_to_retirement {
        wealth = checked(
            wealth
                .checked_add(annual_contribution)
                .and_then(|invested| invested.checked_mul(growth)),
            "wealth",
        )?;
        data_points.push(WealthPoint {
            label: format!("Alter {}", age + year),
            year,
            wealth,
        });
    }

    debug!(age, years_to_retirement, %wealth, "retirement projected");

    Ok(RetirementProjection {
        years_to_retirement,
        annual_contribution,
        data_points,
        final_wealth: wealth,
    })
}

/// Year-end values of a fund position over `years`.
///
/// The first year invests `initial_investment` plus `yearly_investment`, every
/// later year `yearly_investment` alone.
pub fn simulate_market_investment(
    expected_return: Decimal,
    initial_investment: Decimal,
    yearly_investment: Decimal,
    years: u32,
) -> Result<Vec<Decimal>> {
    let growth = Decimal::ONE + expected_return;
    let mut value = Decimal::ZERO;
    let mut values = Vec::new();

    for year in 0..years {
        let invested = if year == 0 {
            checked(initial_investment.checked_add(yearly_investment), "investment")?
        } else {
            yearly_investment
        };
        value = checked(
            value
                .checked_add(invested)
                .and_then(|position| position.checked_mul(growth)),
            "market value",
        )?;
        values.push(value);
    }

    Ok(values)
}

/// A fund or ETF position with its return assumptions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CapitalMarketInvestment {
    pub ticker: String,
    pub allocation_target_pct: Decimal,
    pub expected_return_rate: Decimal,
    pub volatility: Decimal,
    pub dividend_yield: Decimal,
    /// Yearly running costs (TER) as a rate.
    pub fees_pct: Decimal,
}

impl CapitalMarketInvestment {
    /// Expected yearly return after fees.
    pub fn net_return_rate(&self) -> Decimal {
        self.expected_return_rate - self.fees_pct
    }

    /// Value of `initial_investment` after compounding at the net return,
    /// rounded to cents. Nothing to compound is returned unchanged.
    pub fn projected_value(&self, initial_investment: Decimal, years: u32) -> Result<Decimal> {
        if initial_investment <= Decimal::ZERO || years == 0 {
            return Ok(initial_investment);
        }
        let growth = checked(
            (Decimal::ONE + self.net_return_rate()).checked_powu(u64::from(years)),
            "projected value",
        )?;
        Ok(checked(initial_investment.checked_mul(growth), "projected value")?.round_dp(2))
    }

    /// One year of dividends on the position, rounded to cents.
    pub fn expected_dividend_income(&self, initial_investment: Decimal) -> Result<Decimal> {
        if initial_investment <= Decimal::ZERO {
            return Ok(Decimal::ZERO);
        }
        let dividends = initial_investment.checked_mul(self.dividend_yield.max(Decimal::ZERO));
        Ok(checked(dividends, "dividend income")?.round_dp(2))
    }
}
