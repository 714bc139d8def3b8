//! Owner-occupied purchase: equity build-up and cost of ownership.

use rust_decimal::{Decimal, MathematicalOps};
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::errors::{Result, checked};
use crate::rental::{LoanParams, PropertyParams};
use crate::schedule::amortization_step;

fn default_holding_years() -> u32 {
    30
}

/// A self-used property financed with an annuity loan.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OwnerOccupiedInvestment {
    pub property: PropertyParams,
    pub loan: LoanParams,
    /// Rent per month the owner no longer pays.
    #[serde(default)]
    pub imputed_rent_savings: Decimal,
    /// Yearly maintenance as a share of the purchase price.
    #[serde(default)]
    pub maintenance_reserve_pct: Decimal,
    /// Return the equity would have earned elsewhere.
    #[serde(default)]
    pub opportunity_cost_rate: Decimal,
    #[serde(default = "default_holding_years")]
    pub holding_years: u32,
}

/// Loan position after a number of years.
#[derive(Debug, Clone, Copy, PartialEq)]
struct MortgageProjection {
    remaining_balance: Decimal,
    interest_paid: Decimal,
}

impl OwnerOccupiedInvestment {
    fn mortgage_projection(&self, years: u32) -> Result<MortgageProjection> {
        let annuity = self.loan.annuity()?;
        let mut balance = self.loan.principal;
        let mut interest_paid = Decimal::ZERO;

        for _ in 0..years {
            let step = checked(
                amortization_step(balance, self.loan.interest_rate, annuity),
                "loan amortization",
            )?;
            interest_paid = checked(interest_paid.checked_add(step.interest_paid), "interest")?;
            balance = step.remaining_principal;
            if balance <= Decimal::ZERO {
                balance = Decimal::ZERO;
                break;
            }
        }

        Ok(MortgageProjection {
            remaining_balance: balance,
            interest_paid,
        })
    }

    /// Appreciated property value minus the open loan after `years`
    /// (the holding period when `None`).
    pub fn projected_equity(&self, years: Option<u32>) -> Result<Decimal> {
        let years = years.unwrap_or(self.holding_years);
        let growth = checked(
            (Decimal::ONE + self.property.value_growth_rate).checked_powu(u64::from(years)),
            "property value",
        )?;
        let value = checked(self.property.purchase_price.checked_mul(growth), "property value")?;
        let projection = self.mortgage_projection(years)?;

        checked(value.checked_sub(projection.remaining_balance), "equity")
    }

    /// Side costs, maintenance, interest and the forgone return on the equity
    /// put in, net of the rent saved over `years`.
    pub fn total_cost_of_ownership(&self, years: Option<u32>) -> Result<Decimal> {
        let years = years.unwrap_or(self.holding_years);
        let price = self.property.purchase_price;
        let span = Decimal::from(years);
        let projection = self.mortgage_projection(years)?;

        let transaction_costs = checked(
            price.checked_mul(self.property.transaction_cost_factor),
            "transaction costs",
        )?;
        let maintenance = checked(
            price
                .checked_mul(self.maintenance_reserve_pct)
                .and_then(|yearly| yearly.checked_mul(span)),
            "maintenance",
        )?;
        let imputed_savings = checked(
            self.imputed_rent_savings
                .checked_mul(dec!(12))
                .and_then(|yearly| yearly.checked_mul(span)),
            "imputed rent",
        )?;

        let equity_contribution = checked(
            price
                .checked_add(transaction_costs)
                .and_then(|total| total.checked_sub(self.loan.principal)),
            "equity contribution",
        )?
        .max(Decimal::ZERO);
        let opportunity_cost = checked(
            (Decimal::ONE + self.opportunity_cost_rate)
                .checked_powu(u64::from(years))
                .and_then(|growth| equity_contribution.checked_mul(growth - Decimal::ONE)),
            "opportunity cost",
        )?;

        checked(
            transaction_costs
                .checked_add(maintenance)
                .and_then(|sum| sum.checked_add(projection.interest_paid))
                .and_then(|sum| sum.checked_add(opportunity_cost))
                .and_then(|sum| sum.checked_sub(imputed_savings)),
            "cost of ownership",
        )
    }
}
