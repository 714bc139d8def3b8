//! `baufinanz` is a Rust library for calculating annuity mortgages as they are
//! offered for real estate purchases in Germany.
//!
//! A German mortgage is quoted as a fixed yearly interest rate plus an initial
//! repayment rate ("Tilgung"). Together they fix the yearly annuity, which stays
//! constant until the loan is repaid; only the split between interest and
//! principal changes from year to year.
//!
//! The crate provides:
//! - **Amortization schedules**: the year-by-year interest, principal and
//!   remaining balance of a loan ([`compute_schedule`]).
//! - **Summaries and chart series** derived from a schedule ([`ScheduleSummary`],
//!   [`ScheduleSeries`]).
//! - **Affordability**: the loan and property price a monthly budget supports
//!   ([`calculate_affordability`]).
//! - **Property quotes**: side costs, loan amount and monthly rate for a listed
//!   price ([`quote_property`]).
//! - **Buy-to-let**: a yearly cashflow, tax and equity simulation of a rented
//!   property financed with the same annuity engine ([`simulate_rental`]).
//! - **Owner-occupied purchases**: equity build-up and total cost of ownership
//!   ([`OwnerOccupiedInvestment`]).
//! - **Income tax** under the 2026 German tariff, including married splitting
//!   ([`calculate_tax`]).
//! - **Savings projections** up to retirement and for fund positions
//!   ([`project_retirement`]).
//!
//! ## Usage
//!
//! ```rust
//! use baufinanz::{calculate_financing, ScheduleInput};
//! use rust_decimal_macros::dec;
//!
//! fn main() {
//!     let input = ScheduleInput::new(dec!(300_000), dec!(0.04), dec!(0.01));
//!
//!     match calculate_financing(input) {
//!         Ok(result) => {
//!             println!("Yearly annuity:  {:.2}", result.annuity);
//!             println!("Monthly rate:    {:.2}", result.monthly_rate);
//!             println!("Repaid after:    {} years", result.summary.years);
//!             println!("Total interest:  {:.2}", result.summary.total_interest);
//!         }
//!         Err(e) => {
//!             eprintln!("Error calculating financing: {}", e);
//!         }
//!     }
//! }
//! ```
//!
//! All amounts are [`rust_decimal::Decimal`]; rates are fractions, so `0.04`
//! means 4 % per year.

pub mod affordability;
pub mod config;
pub mod errors;
pub mod owner;
pub mod projection;
pub mod quote;
pub mod rental;
pub mod schedule;
pub mod series;
pub mod summary;
pub mod tax;

use anyhow::{Context, ensure};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use tracing::info;

pub use affordability::{AffordabilityInput, AffordabilityResult, calculate_affordability};
pub use config::FinancingConfig;
pub use errors::FinancingError;
pub use owner::OwnerOccupiedInvestment;
pub use projection::{
    CapitalMarketInvestment, ProjectionConfig, RetirementProjection, project_retirement,
    simulate_market_investment,
};
pub use quote::{FinancingQuote, FinancingStatus, QuoteRequest, quote_property};
pub use rental::{
    RentalInvestment, RentalSimulation, RentalSimulationParams, estimate_rent, rent_for_year,
    simulate_rental,
};
pub use schedule::{
    AmortizationStep, DEFAULT_MAX_YEARS, ScheduleEntry, ScheduleInput, amortization_step,
    annuity_for_term, compute_schedule, compute_schedule_f64,
};
pub use series::ScheduleSeries;
pub use summary::{ScheduleSummary, summarize};
pub use tax::{FilingStatus, TaxRates, TaxRequest, TaxResult, calculate_tax, income_tax};

/// Everything a financing details view needs for one loan.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FinancingResult {
    /// The parameters the schedule was computed from.
    pub input: ScheduleInput,
    /// The fixed yearly payment.
    pub annuity: Decimal,
    /// The annuity split into twelve monthly installments, rounded to cents.
    pub monthly_rate: Decimal,
    pub schedule: Vec<ScheduleEntry>,
    pub summary: ScheduleSummary,
    pub series: ScheduleSeries,
}

/// Calculates the schedule, its summary and chart series for a loan.
///
/// This is the main entry point of the library. Unlike [`compute_schedule`],
/// which signals an unschedulable loan with an empty vector, this function
/// reports that case as an error so applications can surface it directly.
///
/// # Errors
///
/// Returns an error if the principal is not positive, if the annuity
/// overflows, or if the rates never amortize the loan.
pub fn calculate_financing(input: ScheduleInput) -> Result<FinancingResult, anyhow::Error> {
    ensure!(
        input.principal > Decimal::ZERO,
        "Principal must be positive, got {}.",
        input.principal
    );
    let annuity = input
        .annuity()
        .context("Annuity exceeds the representable range.")?;

    let schedule = input.schedule();
    ensure!(
        !schedule.is_empty(),
        "Interest rate {} with repayment rate {} never amortizes the loan.",
        input.annual_interest_rate,
        input.annual_repayment_rate
    );

    let summary = ScheduleSummary::from_schedule(&schedule);
    let series = ScheduleSeries::from_schedule(&schedule);
    info!(
        principal = %input.principal,
        years = summary.years,
        fully_repaid = summary.fully_repaid,
        "financing calculated"
    );

    Ok(FinancingResult {
        input,
        annuity,
        monthly_rate: (annuity / dec!(12)).round_dp(2),
        schedule,
        summary,
        series,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_calculate_financing_happy_path() {
        let input = ScheduleInput::new(dec!(300000), dec!(0.04), dec!(0.01));

        let result = calculate_financing(input).unwrap();

        assert_eq!(result.annuity, dec!(15000));
        assert_eq!(result.monthly_rate, dec!(1250));
        assert_eq!(result.schedule.len(), 42);
        assert_eq!(result.summary.years, 42);
        assert_eq!(result.series.len(), 42);
        assert!(result.summary.fully_repaid);
    }

    #[test]
    fn test_zero_principal_error() {
        let input = ScheduleInput::new(dec!(0), dec!(0.04), dec!(0.01));
        let result = calculate_financing(input);
        assert!(result.is_err());
    }

    #[test]
    fn test_non_amortizing_error() {
        let input = ScheduleInput::new(dec!(100000), dec!(0.04), dec!(0));
        let err = calculate_financing(input).unwrap_err();
        assert!(err.to_string().contains("never amortizes"));
    }

    #[test]
    fn test_horizon_reached_is_not_an_error() {
        let input = ScheduleInput::new(dec!(100000), dec!(0.03), dec!(0.005)).with_max_years(10);

        let result = calculate_financing(input).unwrap();

        assert_eq!(result.schedule.len(), 10);
        assert!(!result.summary.fully_repaid);
    }
}
