//! Year-by-year annuity amortization.
//!
//! A German annuity mortgage is quoted as an interest rate plus an initial
//! repayment rate ("Tilgung"). Both are applied to the original principal once
//! to fix the yearly annuity; afterwards the interest share shrinks and the
//! principal share grows until the loan is repaid.

use rust_decimal::{Decimal, MathematicalOps};
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::errors::finite_decimal;

/// Longest horizon computed when the caller does not pass one.
pub const DEFAULT_MAX_YEARS: u32 = 100;

/// Balances below one cent are treated as repaid.
const BALANCE_TOLERANCE: Decimal = dec!(0.01);

/// Loan parameters for a single schedule calculation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScheduleInput {
    /// The loan amount.
    pub principal: Decimal,
    /// Fixed yearly interest rate as a fraction (0.04 for 4%).
    pub annual_interest_rate: Decimal,
    /// Initial yearly repayment rate as a fraction (0.01 for 1%).
    pub annual_repayment_rate: Decimal,
    /// Upper bound on the number of schedule entries.
    #[serde(default = "default_max_years")]
    pub max_years: u32,
}

fn default_max_years() -> u32 {
    DEFAULT_MAX_YEARS
}

impl ScheduleInput {
    /// Creates an input with the default horizon of [`DEFAULT_MAX_YEARS`].
    pub fn new(
        principal: Decimal,
        annual_interest_rate: Decimal,
        annual_repayment_rate: Decimal,
    ) -> Self {
        Self {
            principal,
            annual_interest_rate,
            annual_repayment_rate,
            max_years: DEFAULT_MAX_YEARS,
        }
    }

    /// Replaces the horizon.
    pub fn with_max_years(mut self, max_years: u32) -> Self {
        self.max_years = max_years;
        self
    }

    /// Builds an input from raw form values.
    ///
    /// Returns `None` when any value is NaN, infinite or too large for a
    /// decimal, which callers treat the same as "no schedule".
    pub fn from_f64(
        principal: f64,
        annual_interest_rate: f64,
        annual_repayment_rate: f64,
        max_years: u32,
    ) -> Option<Self> {
        Some(Self {
            principal: finite_decimal("principal", principal).ok()?,
            annual_interest_rate: finite_decimal("interest rate", annual_interest_rate).ok()?,
            annual_repayment_rate: finite_decimal("repayment rate", annual_repayment_rate).ok()?,
            max_years,
        })
    }

    /// The fixed yearly payment: `principal * (interest + repayment)`.
    ///
    /// `None` if the product overflows the decimal range.
    pub fn annuity(&self) -> Option<Decimal> {
        self.annual_interest_rate
            .checked_add(self.annual_repayment_rate)
            .and_then(|rate| self.principal.checked_mul(rate))
    }

    /// Computes the schedule for these parameters. See [`compute_schedule`].
    pub fn schedule(&self) -> Vec<ScheduleEntry> {
        compute_schedule(
            self.principal,
            self.annual_interest_rate,
            self.annual_repayment_rate,
            self.max_years,
        )
    }
}

/// One year of the amortization schedule.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScheduleEntry {
    /// 1-based year index.
    pub year: u32,
    /// Interest share of this year's payment.
    pub interest_paid: Decimal,
    /// Principal share of this year's payment.
    pub principal_paid: Decimal,
    /// Outstanding balance after this year's payment.
    pub remaining_principal: Decimal,
    /// Total paid this year; equals the annuity except in the payoff year.
    pub payment: Decimal,
}

/// Calculates the yearly amortization schedule of a fixed-annuity loan.
///
/// The annuity is fixed from the initial principal and both rates and never
/// recomputed. In the payoff year only the outstanding balance is repaid, so
/// the last payment is usually smaller than the annuity.
///
/// An empty vector means the loan cannot be scheduled: the principal is
/// negative, the repayment rate does not reduce the balance in year one, the
/// horizon is zero, or the arithmetic overflows. A non-empty schedule whose
/// last entry still has a balance means the loan is not repaid within
/// `max_years`.
///
/// # Arguments
///
/// * `principal` - The loan amount.
/// * `annual_interest_rate` - Yearly interest rate as a fraction.
/// * `annual_repayment_rate` - Initial yearly repayment rate as a fraction.
/// * `max_years` - Maximum number of entries to produce.
pub fn compute_schedule(
    principal: Decimal,
    annual_interest_rate: Decimal,
    annual_repayment_rate: Decimal,
    max_years: u32,
) -> Vec<ScheduleEntry> {
    if principal < Decimal::ZERO {
        debug!(%principal, "negative principal, no schedule");
        return Vec::new();
    }
    if max_years == 0 {
        debug!("zero horizon, no schedule");
        return Vec::new();
    }

    let input = ScheduleInput {
        principal,
        annual_interest_rate,
        annual_repayment_rate,
        max_years,
    };
    let interest_only = principal.checked_mul(annual_interest_rate);
    let (Some(annuity), Some(interest_only)) = (input.annuity(), interest_only) else {
        warn!(%principal, "annuity overflows the decimal range");
        return Vec::new();
    };
    if annuity <= interest_only {
        debug!(
            %annuity,
            %interest_only,
            "annuity does not exceed interest-only payment, loan never amortizes"
        );
        return Vec::new();
    }

    match amortize(principal, annual_interest_rate, annuity, max_years) {
        Some(schedule) => {
            if let Some(last) = schedule.last() {
                if !last.remaining_principal.is_zero() {
                    debug!(
                        max_years,
                        remaining = %last.remaining_principal,
                        "loan not repaid within horizon"
                    );
                }
            }
            schedule
        }
        None => {
            warn!(%principal, %annuity, "arithmetic overflow while amortizing");
            Vec::new()
        }
    }
}

/// One year of interest and repayment on an outstanding balance.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AmortizationStep {
    pub interest_paid: Decimal,
    pub principal_paid: Decimal,
    pub payment: Decimal,
    pub remaining_principal: Decimal,
}

/// Applies one year of a fixed annuity to `balance`.
///
/// Interest accrues on the opening balance and the rest of the annuity repays
/// principal. When the annuity exceeds what is owed only the remainder is
/// paid, and a residue below one cent is written off. A zero balance gives a
/// zero step. `None` on decimal overflow.
pub fn amortization_step(
    balance: Decimal,
    annual_interest_rate: Decimal,
    annuity: Decimal,
) -> Option<AmortizationStep> {
    let interest_paid = balance.checked_mul(annual_interest_rate)?;
    let mut principal_paid = annuity.checked_sub(interest_paid)?;
    let mut payment = annuity;

    // payoff year: settle the remainder only
    if principal_paid > balance {
        principal_paid = balance;
        payment = interest_paid.checked_add(principal_paid)?;
    }

    let mut remaining_principal = balance.checked_sub(principal_paid)?;
    if remaining_principal.abs() < BALANCE_TOLERANCE {
        remaining_principal = Decimal::ZERO;
    }

    Some(AmortizationStep {
        interest_paid,
        principal_paid,
        payment,
        remaining_principal,
    })
}

/// Fixed yearly annuity that repays `principal` in exactly `years` years.
///
/// `principal * r * (1 + r)^n / ((1 + r)^n - 1)`, or `principal / n` without
/// interest. `None` for a zero term or on decimal overflow.
pub fn annuity_for_term(
    principal: Decimal,
    annual_interest_rate: Decimal,
    years: u32,
) -> Option<Decimal> {
    if years == 0 {
        return None;
    }
    if annual_interest_rate.is_zero() {
        return principal.checked_div(Decimal::from(years));
    }

    let compound = (Decimal::ONE + annual_interest_rate).checked_powu(u64::from(years))?;
    principal
        .checked_mul(annual_interest_rate)?
        .checked_mul(compound)?
        .checked_div(compound - Decimal::ONE)
}

fn amortize(
    principal: Decimal,
    annual_interest_rate: Decimal,
    annuity: Decimal,
    max_years: u32,
) -> Option<Vec<ScheduleEntry>> {
    let mut schedule = Vec::new();
    let mut balance = principal;
    let mut year = 1;

    while balance > Decimal::ZERO && year <= max_years {
        let step = amortization_step(balance, annual_interest_rate, annuity)?;
        balance = step.remaining_principal;

        schedule.push(ScheduleEntry {
            year,
            interest_paid: step.interest_paid,
            principal_paid: step.principal_paid,
            remaining_principal: balance,
            payment: step.payment,
        });

        if balance <= Decimal::ZERO {
            break;
        }
        year += 1;
    }

    Some(schedule)
}

/// Float entry point for form-driven callers.
///
/// Non-finite inputs produce an empty schedule, the same outcome as any
/// other input that cannot be financed.
pub fn compute_schedule_f64(
    principal: f64,
    annual_interest_rate: f64,
    annual_repayment_rate: f64,
    max_years: u32,
) -> Vec<ScheduleEntry> {
    let input = ScheduleInput::from_f64(
        principal,
        annual_interest_rate,
        annual_repayment_rate,
        max_years,
    );
    match input {
        Some(input) => input.schedule(),
        None => {
            debug!("non-finite schedule input, no schedule");
            Vec::new()
        }
    }
}
