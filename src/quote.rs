use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::FinancingConfig;
use crate::errors::{FinancingError, Result, checked};
use crate::schedule::compute_schedule;
use crate::summary::ScheduleSummary;

/// How a purchase relates to the buyer's own funds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FinancingStatus {
    /// The listed price is covered by the available assets.
    CashPurchase,
    /// A loan is needed to close the gap.
    MortgageRequired,
    /// Neither holds; the inputs need checking.
    Indeterminate,
}

impl FinancingStatus {
    /// Compares the listed price (without side costs) against the assets first,
    /// then falls back to whether any loan remains.
    pub fn assess(
        purchase_price: Decimal,
        available_assets: Decimal,
        loan_amount: Decimal,
    ) -> Self {
        if purchase_price <= available_assets {
            Self::CashPurchase
        } else if loan_amount > Decimal::ZERO {
            Self::MortgageRequired
        } else {
            Self::Indeterminate
        }
    }
}

/// A listed property and the buyer's own funds.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuoteRequest {
    /// Listed price without side costs.
    pub purchase_price: Decimal,
    /// Equity the buyer brings in.
    pub available_assets: Decimal,
}

/// Financing figures for one property.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FinancingQuote {
    pub purchase_price: Decimal,
    /// Side costs in whole euros.
    pub additional_costs: Decimal,
    /// Price plus side costs in whole euros.
    pub total_price: Decimal,
    /// Assets after clamping negatives to zero.
    pub available_assets: Decimal,
    /// Part of the unrounded total price not covered by the assets.
    pub loan_amount: Decimal,
    /// Monthly installment of the annuity, rounded to cents.
    pub monthly_rate: Decimal,
    pub status: FinancingStatus,
    /// Schedule aggregates with currency totals rounded to cents.
    pub summary: ScheduleSummary,
}

/// Works out the loan needed for a purchase and how it amortizes.
///
/// Negative assets and a negative side cost rate are treated as zero. A
/// purchase fully covered by the assets gets a zero loan, a zero monthly rate
/// and an empty summary.
///
/// # Errors
///
/// Returns [`FinancingError::NegativeAmount`] for a negative purchase price and
/// [`FinancingError::Overflow`] when the price or annuity leaves the decimal range.
///
/// Side costs and the total price are rounded to whole euros and the summary
/// totals to cents; the loan is derived from the unrounded total.
pub fn quote_property(request: &QuoteRequest, config: &FinancingConfig) -> Result<FinancingQuote> {
    if request.purchase_price < Decimal::ZERO {
        return Err(FinancingError::NegativeAmount {
            field: "purchase price",
            value: request.purchase_price,
        });
    }

    let available_assets = request.available_assets.max(Decimal::ZERO);
    let cost_rate = config.additional_cost_rate.max(Decimal::ZERO);
    let total_price = checked(
        request.purchase_price.checked_mul(Decimal::ONE + cost_rate),
        "total price",
    )?;
    let additional_costs = total_price - request.purchase_price;
    let loan_amount = (total_price - available_assets).max(Decimal::ZERO);

    let (monthly_rate, summary) = if loan_amount > Decimal::ZERO {
        let annuity = checked(loan_amount.checked_mul(config.annuity_rate()?), "annuity")?;
        let schedule = compute_schedule(
            loan_amount,
            config.interest_rate,
            config.repayment_rate,
            config.max_years,
        );
        let monthly_rate = if annuity > Decimal::ZERO {
            (annuity / dec!(12)).round_dp(2)
        } else {
            Decimal::ZERO
        };
        (monthly_rate, ScheduleSummary::from_schedule(&schedule).rounded_to_cents())
    } else {
        (Decimal::ZERO, ScheduleSummary::default())
    };

    let status = FinancingStatus::assess(request.purchase_price, available_assets, loan_amount);
    debug!(%loan_amount, %monthly_rate, ?status, years = summary.years, "property quoted");

    Ok(FinancingQuote {
        purchase_price: request.purchase_price,
        additional_costs: additional_costs.round_dp(0),
        total_price: total_price.round_dp(0),
        available_assets,
        loan_amount,
        monthly_rate,
        status,
        summary,
    })
}
