//! Buy-to-let cashflow simulation.
//!
//! Each simulated year compounds the property value, applies one year of the
//! annuity through [`amortization_step`], derives the indexed rent and books
//! linear depreciation. Operating cashflow is rent minus management costs and
//! the full annuity; income tax is levied on rent minus management costs,
//! interest and depreciation, never on a loss.

use rust_decimal::{Decimal, MathematicalOps};
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::config::FinancingConfig;
use crate::errors::{FinancingError, Result, checked};
use crate::schedule::{amortization_step, annuity_for_term};

/// Share of the purchase price financed by default.
pub const DEFAULT_LOAN_TO_VALUE: Decimal = dec!(0.8);
/// Share of the purchase price that can be depreciated (the building, not the land).
pub const DEFAULT_DEPRECIATION_SHARE: Decimal = dec!(0.8);
/// Linear depreciation for residential buildings (§ 7 Abs. 4 EStG).
pub const DEFAULT_DEPRECIATION_RATE: Decimal = dec!(0.02);
/// First calendar year of a default simulation.
pub const DEFAULT_START_YEAR: i32 = 2025;

fn add(a: Decimal, b: Decimal, operation: &'static str) -> Result<Decimal> {
    checked(a.checked_add(b), operation)
}

fn sub(a: Decimal, b: Decimal, operation: &'static str) -> Result<Decimal> {
    checked(a.checked_sub(b), operation)
}

fn mul(a: Decimal, b: Decimal, operation: &'static str) -> Result<Decimal> {
    checked(a.checked_mul(b), operation)
}

/// The purchased property and its tax depreciation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PropertyParams {
    pub purchase_price: Decimal,
    /// Side costs as a share of the price.
    pub transaction_cost_factor: Decimal,
    /// Yearly appreciation of the property value.
    pub value_growth_rate: Decimal,
    pub depreciation_basis: Decimal,
    pub depreciation_rate: Decimal,
}

/// An annuity loan financing the purchase.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoanParams {
    pub principal: Decimal,
    pub interest_rate: Decimal,
    /// Term the annuity is sized for when none is given.
    pub years: u32,
    /// Fixed yearly annuity; derived from the term when absent or not positive.
    #[serde(default)]
    pub annuity: Option<Decimal>,
}

impl LoanParams {
    /// The yearly annuity this loan is serviced with.
    ///
    /// # Errors
    ///
    /// [`FinancingError::NotPositive`] for a zero term without an explicit
    /// annuity and [`FinancingError::Overflow`] when the annuity leaves the
    /// decimal range.
    pub fn annuity(&self) -> Result<Decimal> {
        if let Some(annuity) = self.annuity.filter(|annuity| *annuity > Decimal::ZERO) {
            return Ok(annuity);
        }
        if self.years == 0 {
            return Err(FinancingError::NotPositive { field: "loan years" });
        }
        checked(
            annuity_for_term(self.principal, self.interest_rate, self.years),
            "loan annuity",
        )
    }
}

/// Rent charged to the tenant and costs borne by the landlord.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RentParams {
    pub net_cold_rent_month: Decimal,
    /// Service charges passed on to the tenant.
    pub operating_costs_month: Decimal,
    /// Non-allocable costs borne by the landlord.
    pub mgmt_costs_annual: Decimal,
    /// Step increase of an index rent.
    pub rent_increase_rate: Decimal,
    /// Years between two increases; zero counts as one.
    pub rent_increase_interval_years: u32,
}

impl Default for RentParams {
    fn default() -> Self {
        Self {
            net_cold_rent_month: dec!(1400),
            operating_costs_month: dec!(220),
            mgmt_costs_annual: dec!(1200),
            rent_increase_rate: dec!(0.03),
            rent_increase_interval_years: 3,
        }
    }
}

/// Rent due in one simulated year.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct YearlyRent {
    pub net_cold_rent_month: Decimal,
    pub warm_rent_month: Decimal,
    pub warm_rent_year: Decimal,
}

/// Indexed rent for the zero-based `year_index`.
///
/// The base rent rises by `rent_increase_rate` once every
/// `rent_increase_interval_years`; operating costs are not indexed.
pub fn rent_for_year(params: &RentParams, year_index: u32) -> Result<YearlyRent> {
    let increases = year_index / params.rent_increase_interval_years.max(1);
    let factor = checked(
        (Decimal::ONE + params.rent_increase_rate).checked_powu(u64::from(increases)),
        "rent increase",
    )?;

    let net_cold_rent_month = mul(params.net_cold_rent_month, factor, "net cold rent")?;
    let warm_rent_month = add(net_cold_rent_month, params.operating_costs_month, "warm rent")?;
    let warm_rent_year = mul(warm_rent_month, dec!(12), "warm rent")?;

    Ok(YearlyRent {
        net_cold_rent_month,
        warm_rent_month,
        warm_rent_year,
    })
}

/// Inputs of [`simulate_rental`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RentalSimulationParams {
    pub start_year: i32,
    pub n_years: u32,
    pub property: PropertyParams,
    pub loan: LoanParams,
    pub rent: RentParams,
    /// Personal income tax rate on the rental surplus; negatives count as zero.
    pub tax_rate: Decimal,
}

impl RentalSimulationParams {
    /// Standard buy-to-let case for `purchase_price`.
    ///
    /// 80 % of the price is financed over 30 years at the configured interest
    /// rate, 80 % is depreciated at 2 %, side costs follow the configured rate
    /// and the default rent applies. Twenty years are simulated, untaxed.
    pub fn for_purchase(purchase_price: Decimal, config: &FinancingConfig) -> Self {
        Self {
            start_year: DEFAULT_START_YEAR,
            n_years: 20,
            property: PropertyParams {
                purchase_price,
                transaction_cost_factor: config.additional_cost_rate,
                value_growth_rate: dec!(0.02),
                depreciation_basis: purchase_price * DEFAULT_DEPRECIATION_SHARE,
                depreciation_rate: DEFAULT_DEPRECIATION_RATE,
            },
            loan: LoanParams {
                principal: purchase_price * DEFAULT_LOAN_TO_VALUE,
                interest_rate: config.interest_rate,
                years: 30,
                annuity: None,
            },
            rent: RentParams::default(),
            tax_rate: Decimal::ZERO,
        }
    }
}

impl Default for RentalSimulationParams {
    fn default() -> Self {
        Self::for_purchase(dec!(400000), &FinancingConfig::default())
    }
}

/// One simulated year, rounded to cents.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RentalYear {
    pub year: i32,
    pub property_value_start: Decimal,
    pub property_value_end: Decimal,
    pub equity_start: Decimal,
    pub equity_end: Decimal,
    pub loan_rest_start: Decimal,
    pub loan_rest_end: Decimal,
    pub annuity_annual: Decimal,
    pub interest_paid: Decimal,
    pub principal_paid: Decimal,
    pub net_cold_rent_month: Decimal,
    pub warm_rent_month: Decimal,
    pub warm_rent_year: Decimal,
    pub mgmt_costs_annual: Decimal,
    pub depreciation_annual: Decimal,
    pub depreciation_cum: Decimal,
    pub taxable_income: Decimal,
    pub taxes: Decimal,
    pub cashflow_operating: Decimal,
    pub cashflow_after_tax: Decimal,
}

impl RentalYear {
    fn rounded_to_cents(self) -> Self {
        let cents = |value: Decimal| value.round_dp(2);
        Self {
            year: self.year,
            property_value_start: cents(self.property_value_start),
            property_value_end: cents(self.property_value_end),
            equity_start: cents(self.equity_start),
            equity_end: cents(self.equity_end),
            loan_rest_start: cents(self.loan_rest_start),
            loan_rest_end: cents(self.loan_rest_end),
            annuity_annual: cents(self.annuity_annual),
            interest_paid: cents(self.interest_paid),
            principal_paid: cents(self.principal_paid),
            net_cold_rent_month: cents(self.net_cold_rent_month),
            warm_rent_month: cents(self.warm_rent_month),
            warm_rent_year: cents(self.warm_rent_year),
            mgmt_costs_annual: cents(self.mgmt_costs_annual),
            depreciation_annual: cents(self.depreciation_annual),
            depreciation_cum: cents(self.depreciation_cum),
            taxable_income: cents(self.taxable_income),
            taxes: cents(self.taxes),
            cashflow_operating: cents(self.cashflow_operating),
            cashflow_after_tax: cents(self.cashflow_after_tax),
        }
    }
}

/// First-year figures, final position and totals over the horizon.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RentalSummary {
    pub cashflow_year1: Decimal,
    pub cashflow_after_tax_year1: Decimal,
    pub warm_rent_year1: Decimal,
    pub taxes_year1: Decimal,
    pub equity_final: Decimal,
    pub property_value_final: Decimal,
    pub loan_rest_final: Decimal,
    pub total_taxes: Decimal,
    pub total_operating_cashflow: Decimal,
    pub total_cashflow_after_tax: Decimal,
}

impl RentalSummary {
    fn from_years(years: &[RentalYear]) -> Result<Self> {
        let (Some(first), Some(last)) = (years.first(), years.last()) else {
            return Ok(Self::default());
        };

        let mut summary = Self {
            cashflow_year1: first.cashflow_operating,
            cashflow_after_tax_year1: first.cashflow_after_tax,
            warm_rent_year1: first.warm_rent_year,
            taxes_year1: first.taxes,
            equity_final: last.equity_end,
            property_value_final: last.property_value_end,
            loan_rest_final: last.loan_rest_end,
            ..Self::default()
        };
        for year in years {
            summary.total_taxes = add(summary.total_taxes, year.taxes, "total taxes")?;
            summary.total_operating_cashflow = add(
                summary.total_operating_cashflow,
                year.cashflow_operating,
                "total cashflow",
            )?;
            summary.total_cashflow_after_tax = add(
                summary.total_cashflow_after_tax,
                year.cashflow_after_tax,
                "total cashflow",
            )?;
        }
        Ok(summary)
    }
}

/// Result of [`simulate_rental`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RentalSimulation {
    pub records: Vec<RentalYear>,
    /// Taken over the unrounded years.
    pub summary: RentalSummary,
    /// Purchase price plus side costs, rounded to cents.
    pub total_investment_cost: Decimal,
}

/// Runs the buy-to-let simulation for `params.n_years` years.
///
/// # Errors
///
/// [`FinancingError::NegativeAmount`] for a negative price or principal,
/// [`FinancingError::NotPositive`] when the annuity has to be derived from a
/// zero term, and [`FinancingError::Overflow`] when a figure leaves the
/// decimal range.
pub fn simulate_rental(params: &RentalSimulationParams) -> Result<RentalSimulation> {
    let property = &params.property;
    let loan = &params.loan;
    if property.purchase_price < Decimal::ZERO {
        return Err(FinancingError::NegativeAmount {
            field: "purchase price",
            value: property.purchase_price,
        });
    }
    if loan.principal < Decimal::ZERO {
        return Err(FinancingError::NegativeAmount {
            field: "loan principal",
            value: loan.principal,
        });
    }

    let annuity = loan.annuity()?;
    let tax_rate = params.tax_rate.max(Decimal::ZERO);
    let depreciation_annual = mul(
        property.depreciation_basis,
        property.depreciation_rate,
        "depreciation",
    )?;

    let mut value = property.purchase_price;
    let mut loan_rest = loan.principal;
    let mut depreciation_cum = Decimal::ZERO;
    let mut years = Vec::new();

    for index in 0..params.n_years {
        let growth = mul(value, property.value_growth_rate, "property value")?;
        let value_end = add(value, growth, "property value")?;
        let equity_start = sub(value, loan_rest, "equity")?;

        let step = checked(
            amortization_step(loan_rest, loan.interest_rate, annuity),
            "loan amortization",
        )?;
        let rent = rent_for_year(&params.rent, index)?;
        let mgmt = params.rent.mgmt_costs_annual;

        let rent_after_mgmt = sub(rent.warm_rent_year, mgmt, "cashflow")?;
        let after_interest = sub(rent_after_mgmt, step.interest_paid, "cashflow")?;
        let cashflow_operating = sub(after_interest, step.principal_paid, "cashflow")?;

        depreciation_cum = add(depreciation_cum, depreciation_annual, "depreciation")?;
        let taxable_income = sub(after_interest, depreciation_annual, "taxable income")?;
        let taxes = mul(taxable_income.max(Decimal::ZERO), tax_rate, "taxes")?;
        let cashflow_after_tax = sub(cashflow_operating, taxes, "cashflow")?;

        years.push(RentalYear {
            year: params.start_year.saturating_add_unsigned(index),
            property_value_start: value,
            property_value_end: value_end,
            equity_start,
            equity_end: sub(value_end, step.remaining_principal, "equity")?,
            loan_rest_start: loan_rest,
            loan_rest_end: step.remaining_principal,
            annuity_annual: annuity,
            interest_paid: step.interest_paid,
            principal_paid: step.principal_paid,
            net_cold_rent_month: rent.net_cold_rent_month,
            warm_rent_month: rent.warm_rent_month,
            warm_rent_year: rent.warm_rent_year,
            mgmt_costs_annual: mgmt,
            depreciation_annual,
            depreciation_cum,
            taxable_income,
            taxes,
            cashflow_operating,
            cashflow_after_tax,
        });

        value = value_end;
        loan_rest = step.remaining_principal;
    }

    let summary = RentalSummary::from_years(&years)?;
    let total_investment_cost = mul(
        property.purchase_price,
        Decimal::ONE + property.transaction_cost_factor,
        "total investment cost",
    )?
    .round_dp(2);

    info!(
        years = years.len(),
        %annuity,
        total_after_tax = %summary.total_cashflow_after_tax,
        "rental simulation finished"
    );

    Ok(RentalSimulation {
        records: years.into_iter().map(RentalYear::rounded_to_cents).collect(),
        summary,
        total_investment_cost,
    })
}

/// A buy-to-let purchase with vacancy and a maintenance reserve on top of the
/// plain simulation inputs.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RentalInvestment {
    pub property: PropertyParams,
    pub loan: LoanParams,
    pub rent: RentParams,
    pub holding_years: u32,
    /// Share of the year the unit stands empty, clamped to `0..=1`.
    #[serde(default)]
    pub vacancy_rate: Decimal,
    /// Yearly reserve as a share of the purchase price, added to management costs.
    #[serde(default)]
    pub maintenance_reserve_pct: Decimal,
    #[serde(default)]
    pub tax_rate: Decimal,
}

impl RentalInvestment {
    fn adjusted_rent(&self) -> Result<RentParams> {
        let occupancy = (Decimal::ONE - self.vacancy_rate).clamp(Decimal::ZERO, Decimal::ONE);
        let reserve = mul(
            self.property.purchase_price,
            self.maintenance_reserve_pct,
            "maintenance reserve",
        )?;

        Ok(RentParams {
            net_cold_rent_month: mul(self.rent.net_cold_rent_month, occupancy, "net cold rent")?,
            mgmt_costs_annual: add(self.rent.mgmt_costs_annual, reserve, "management costs")?,
            ..self.rent
        })
    }

    /// Simulation inputs with vacancy and maintenance folded into the rent.
    pub fn to_simulation_params(&self, start_year: i32) -> Result<RentalSimulationParams> {
        Ok(RentalSimulationParams {
            start_year,
            n_years: self.holding_years,
            property: self.property,
            loan: self.loan,
            rent: self.adjusted_rent()?,
            tax_rate: self.tax_rate,
        })
    }

    /// Runs [`simulate_rental`] on the adjusted inputs.
    pub fn run_simulation(&self, start_year: i32) -> Result<RentalSimulation> {
        simulate_rental(&self.to_simulation_params(start_year)?)
    }
}

/// Monthly cold rent estimated from living space.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RentEstimate {
    /// Rounded to cents; zero when no estimate is possible.
    pub monthly_rent: Decimal,
    pub rent_per_sqm: Decimal,
}

/// Estimates the monthly rent of `living_space_sqm`.
///
/// A known `rent_per_sqm` wins over the `fallback_rent_per_sqm` (usually a
/// local average). Without a positive rate or space the rent is zero and the
/// known rate, if any, is passed through.
pub fn estimate_rent(
    living_space_sqm: Decimal,
    rent_per_sqm: Option<Decimal>,
    fallback_rent_per_sqm: Decimal,
) -> Result<RentEstimate> {
    let rate = rent_per_sqm.unwrap_or(fallback_rent_per_sqm);
    if rate <= Decimal::ZERO || living_space_sqm <= Decimal::ZERO {
        debug!(%living_space_sqm, %rate, "no rent estimate possible");
        return Ok(RentEstimate {
            monthly_rent: Decimal::ZERO,
            rent_per_sqm: rent_per_sqm.unwrap_or(Decimal::ZERO),
        });
    }

    Ok(RentEstimate {
        monthly_rent: mul(rate, living_space_sqm, "estimated rent")?.round_dp(2),
        rent_per_sqm: rate,
    })
}
