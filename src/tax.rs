//! German income tax for 2026 (§ 32a EStG).
//!
//! The basic tariff has five zones on the taxable income ("zvE"), which is
//! truncated to whole euros first:
//!
//! | zvE | tax |
//! |---|---|
//! | up to 12 348 | 0 |
//! | 12 349 – 17 799 | `(914.51 y + 1 400) y`, `y = (zvE - 12 348) / 10 000` |
//! | 17 800 – 69 878 | `(173.10 z + 2 397) z + 1 034.87`, `z = (zvE - 17 799) / 10 000` |
//! | 69 879 – 277 825 | `0.42 zvE - 11 135.63` |
//! | from 277 826 | `0.45 zvE - 19 470.38` |
//!
//! Married couples are taxed by splitting: the tariff is applied to half the
//! joint income and the result doubled.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::errors::{FinancingError, Result, checked};

const BASIC_ALLOWANCE: Decimal = dec!(12348);
const ZONE_TWO_END: Decimal = dec!(17799);
const ZONE_THREE_END: Decimal = dec!(69878);
const ZONE_FOUR_END: Decimal = dec!(277825);
const ZONE_WIDTH: Decimal = dec!(10000);

/// Default spacing of [`tax_curve`] points.
pub const DEFAULT_CURVE_STEP: Decimal = dec!(1000);
/// A curve always reaches at least this income.
pub const MIN_CURVE_INCOME: Decimal = dec!(300000);
const MAX_CURVE_POINTS: usize = 10_000;

/// Income tax under the basic tariff. Negative incomes owe nothing.
pub fn income_tax(zve: Decimal) -> Decimal {
    let x = zve.trunc();

    if x <= BASIC_ALLOWANCE {
        Decimal::ZERO
    } else if x <= ZONE_TWO_END {
        let y = (x - BASIC_ALLOWANCE) / ZONE_WIDTH;
        (dec!(914.51) * y + dec!(1400)) * y
    } else if x <= ZONE_THREE_END {
        let z = (x - ZONE_TWO_END) / ZONE_WIDTH;
        (dec!(173.1) * z + dec!(2397)) * z + dec!(1034.87)
    } else if x <= ZONE_FOUR_END {
        dec!(0.42) * x - dec!(11135.63)
    } else {
        dec!(0.45) * x - dec!(19470.38)
    }
}

/// Marginal tax rate in percent: the derivative of [`income_tax`].
pub fn marginal_rate(zve: Decimal) -> Decimal {
    let x = zve.trunc();

    if x <= BASIC_ALLOWANCE {
        Decimal::ZERO
    } else if x <= ZONE_TWO_END {
        let y = (x - BASIC_ALLOWANCE) / ZONE_WIDTH;
        (dec!(2) * dec!(914.51) * y + dec!(1400)) / dec!(100)
    } else if x <= ZONE_THREE_END {
        let z = (x - ZONE_TWO_END) / ZONE_WIDTH;
        (dec!(2) * dec!(173.1) * z + dec!(2397)) / dec!(100)
    } else if x <= ZONE_FOUR_END {
        dec!(42)
    } else {
        dec!(45)
    }
}

/// Income tax for a married couple under the splitting tariff.
///
/// # Errors
///
/// Returns [`FinancingError::Overflow`] if the joint income leaves the
/// decimal range.
pub fn income_tax_married(zve: Decimal, partner_zve: Decimal) -> Result<Decimal> {
    let joint = checked(zve.checked_add(partner_zve), "joint income")?;
    Ok(dec!(2) * income_tax(joint / dec!(2)))
}

/// Tax owed together with the average and marginal rate, both in percent.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaxRates {
    pub income_tax: Decimal,
    pub average_rate: Decimal,
    pub marginal_rate: Decimal,
}

/// Rates for a single filer. The average rate is taken on the truncated income.
pub fn tax_rates_single(zve: Decimal) -> TaxRates {
    let x = zve.trunc();
    let tax = income_tax(zve);
    let average_rate = if x > Decimal::ZERO {
        tax / x * dec!(100)
    } else {
        Decimal::ZERO
    };

    TaxRates {
        income_tax: tax,
        average_rate,
        marginal_rate: marginal_rate(x),
    }
}

/// Rates for a married couple. The marginal rate is that of half the joint income.
pub fn tax_rates_married(zve: Decimal, partner_zve: Decimal) -> Result<TaxRates> {
    let joint = checked(zve.checked_add(partner_zve), "joint income")?;
    if joint <= Decimal::ZERO {
        return Ok(TaxRates::default());
    }

    let tax = income_tax_married(zve, partner_zve)?;
    Ok(TaxRates {
        income_tax: tax,
        average_rate: tax / joint * dec!(100),
        marginal_rate: marginal_rate(joint / dec!(2)),
    })
}

/// Whether the single or the splitting tariff applies.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FilingStatus {
    #[default]
    Single,
    Married,
}

/// Taxable incomes entered on the tax calculator.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TaxRequest {
    pub zve: Decimal,
    /// Only used for [`FilingStatus::Married`].
    pub partner_zve: Decimal,
    pub filing_status: FilingStatus,
}

/// One point of the tax curve, rounded to cents.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TaxCurvePoint {
    pub zve: Decimal,
    pub est: Decimal,
    pub avg_rate: Decimal,
    pub marginal_rate: Decimal,
}

/// Tax figures and curve as shown on the tax calculator page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaxResult {
    /// Income the rates refer to (joint income when married).
    pub zve: Decimal,
    pub est: Decimal,
    pub avg_rate: Decimal,
    pub marginal_rate: Decimal,
    pub filing_status: FilingStatus,
    /// Zero unless married.
    pub partner_zve: Decimal,
    pub curve: Vec<TaxCurvePoint>,
}

fn rates_for(status: FilingStatus, income: Decimal) -> Result<TaxRates> {
    match status {
        FilingStatus::Single => Ok(tax_rates_single(income)),
        FilingStatus::Married => tax_rates_married(income, Decimal::ZERO),
    }
}

fn curve_point(status: FilingStatus, income: Decimal) -> Result<TaxCurvePoint> {
    let rates = rates_for(status, income)?;
    Ok(TaxCurvePoint {
        zve: income.round_dp(2),
        est: rates.income_tax.round_dp(2),
        avg_rate: rates.average_rate.round_dp(2),
        marginal_rate: rates.marginal_rate.round_dp(2),
    })
}

/// Tax, average and marginal rate from zero up to `max_income` in `step` increments.
///
/// The curve always reaches [`MIN_CURVE_INCOME`] and always ends exactly at
/// the upper bound. For [`FilingStatus::Married`] each income is the joint
/// income of a single earner couple.
///
/// # Errors
///
/// [`FinancingError::InvalidConfig`] for a non-positive step or a curve of more
/// than 10 000 points.
pub fn tax_curve(
    status: FilingStatus,
    max_income: Decimal,
    step: Decimal,
) -> Result<Vec<TaxCurvePoint>> {
    if step <= Decimal::ZERO {
        return Err(FinancingError::InvalidConfig(format!(
            "tax curve step must be positive, got {step}"
        )));
    }
    let upper = max_income.max(MIN_CURVE_INCOME);
    let needed = checked(upper.checked_div(step), "tax curve length")?;
    if needed >= Decimal::from(MAX_CURVE_POINTS) {
        return Err(FinancingError::InvalidConfig(format!(
            "tax curve up to {upper} in steps of {step} exceeds {MAX_CURVE_POINTS} points"
        )));
    }

    let mut points = Vec::new();
    let mut income = Decimal::ZERO;
    while income <= upper {
        points.push(curve_point(status, income)?);
        income += step;
    }
    if !(upper % step).is_zero() {
        points.push(curve_point(status, upper)?);
    }

    Ok(points)
}

/// Evaluates a [`TaxRequest`] the way the tax calculator page presents it.
///
/// Negative incomes are treated as zero.
pub fn calculate_tax(request: &TaxRequest) -> Result<TaxResult> {
    let zve = request.zve.max(Decimal::ZERO);
    let partner_zve = request.partner_zve.max(Decimal::ZERO);

    let (rates, total_zve, partner_zve) = match request.filing_status {
        FilingStatus::Married => (
            tax_rates_married(zve, partner_zve)?,
            checked(zve.checked_add(partner_zve), "joint income")?,
            partner_zve,
        ),
        FilingStatus::Single => (tax_rates_single(zve), zve, Decimal::ZERO),
    };

    let curve = tax_curve(request.filing_status, total_zve, DEFAULT_CURVE_STEP)?;
    debug!(%total_zve, est = %rates.income_tax, status = ?request.filing_status, "tax calculated");

    Ok(TaxResult {
        zve: total_zve,
        est: rates.income_tax.round_dp(2),
        avg_rate: rates.average_rate.round_dp(2),
        marginal_rate: rates.marginal_rate.round_dp(2),
        filing_status: request.filing_status,
        partner_zve,
        curve,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    fn assert_close(actual: Decimal, expected: Decimal) {
        let tolerance = dec!(0.000001) * expected.abs().max(Decimal::ONE);
        assert!(
            (actual - expected).abs() <= tolerance,
            "expected {expected}, got {actual}"
        );
    }

    #[rstest]
    #[case(dec!(0), dec!(0))]
    #[case(dec!(12348), dec!(0))]
    #[case(dec!(12349), dec!(0.1400091451))]
    #[case(dec!(17799), dec!(1034.8720234851))]
    #[case(dec!(69878), dec!(18213.062999171))]
    #[case(dec!(277825), dec!(105550.87))]
    fn test_income_tax_zone_boundaries(#[case] zve: Decimal, #[case] expected: Decimal) {
        assert_close(income_tax(zve), expected);
    }

    #[test]
    fn test_top_zone_and_truncation() {
        assert_eq!(income_tax(dec!(300000)), dec!(115529.62));
        assert_eq!(income_tax(dec!(12348.99)), Decimal::ZERO);
        assert_eq!(income_tax(dec!(-5000)), Decimal::ZERO);
    }

    #[rstest]
    #[case(dec!(12348), dec!(0), dec!(0), dec!(0))]
    #[case(dec!(12349), dec!(0.1400091451), dec!(0.0011337690914244069), dec!(14.00182902))]
    #[case(dec!(17799), dec!(1034.8720234851), dec!(5.814214413647396), dec!(23.96998802))]
    fn test_rates_single_at_boundaries(
        #[case] income: Decimal,
        #[case] expected_tax: Decimal,
        #[case] expected_average: Decimal,
        #[case] expected_marginal: Decimal,
    ) {
        let rates = tax_rates_single(income);

        assert_close(rates.income_tax, expected_tax);
        assert_close(rates.average_rate, expected_average);
        assert_close(rates.marginal_rate, expected_marginal);
    }

    #[rstest]
    #[case(dec!(12348), dec!(12348), dec!(0))]
    #[case(dec!(17799), dec!(17799), dec!(2069.7440469702))]
    #[case(dec!(69878), dec!(69878), dec!(36426.125998342))]
    #[case(dec!(277825), dec!(277825), dec!(211101.74))]
    fn test_married_zone_boundaries(
        #[case] zve: Decimal,
        #[case] partner_zve: Decimal,
        #[case] expected: Decimal,
    ) {
        assert_close(income_tax_married(zve, partner_zve).unwrap(), expected);
    }

    #[rstest]
    #[case(dec!(17799), dec!(17799), dec!(23.96998802))]
    #[case(dec!(69878), dec!(69878), dec!(41.9997498))]
    #[case(dec!(277825), dec!(277825), dec!(42))]
    fn test_married_rates_use_splitting(
        #[case] zve: Decimal,
        #[case] partner_zve: Decimal,
        #[case] expected_marginal: Decimal,
    ) {
        let rates = tax_rates_married(zve, partner_zve).unwrap();
        let joint = zve + partner_zve;

        assert_eq!(rates.income_tax, income_tax_married(zve, partner_zve).unwrap());
        assert_close(rates.average_rate, rates.income_tax / joint * dec!(100));
        assert_close(rates.marginal_rate, expected_marginal);
    }

    #[test]
    fn test_married_without_income() {
        assert_eq!(tax_rates_married(dec!(0), dec!(0)).unwrap(), TaxRates::default());
    }

    #[test]
    fn test_splitting_never_costs_more() {
        let single = income_tax(dec!(100000));
        let married = income_tax_married(dec!(100000), dec!(0)).unwrap();
        assert!(married < single);
    }

    #[test]
    fn test_joint_income_overflow() {
        let err = income_tax_married(Decimal::MAX, Decimal::MAX).unwrap_err();
        assert!(matches!(err, FinancingError::Overflow { operation: "joint income" }));
    }

    #[test]
    fn test_curve_reaches_minimum_income() {
        let curve = tax_curve(FilingStatus::Single, dec!(50000), DEFAULT_CURVE_STEP).unwrap();

        assert_eq!(curve.len(), 301);
        assert_eq!(curve[0].est, Decimal::ZERO);
        assert_eq!(curve.last().unwrap().zve, dec!(300000));
        assert_eq!(curve.last().unwrap().marginal_rate, dec!(45));
    }

    #[test]
    fn test_curve_includes_uneven_upper_bound() {
        let curve = tax_curve(FilingStatus::Single, dec!(300500), DEFAULT_CURVE_STEP).unwrap();

        assert_eq!(curve.len(), 302);
        assert_eq!(curve[300].zve, dec!(300000));
        assert_eq!(curve[301].zve, dec!(300500));
    }

    #[test]
    fn test_curve_rejects_bad_steps() {
        let err = tax_curve(FilingStatus::Single, dec!(0), dec!(0)).unwrap_err();
        assert!(matches!(err, FinancingError::InvalidConfig(_)));

        let err = tax_curve(FilingStatus::Single, dec!(1000000000), dec!(1)).unwrap_err();
        assert!(matches!(err, FinancingError::InvalidConfig(_)));
    }

    #[test]
    fn test_calculate_tax_married() {
        let request = TaxRequest {
            zve: dec!(69878),
            partner_zve: dec!(69878),
            filing_status: FilingStatus::Married,
        };

        let result = calculate_tax(&request).unwrap();

        assert_eq!(result.zve, dec!(139756));
        assert_eq!(result.est, dec!(36426.13));
        assert_eq!(result.marginal_rate, dec!(42.00));
        assert_eq!(result.partner_zve, dec!(69878));
        assert_eq!(result.curve.len(), 301);
    }

    #[test]
    fn test_calculate_tax_single_ignores_partner() {
        let request = TaxRequest {
            zve: dec!(-100),
            partner_zve: dec!(50000),
            filing_status: FilingStatus::Single,
        };

        let result = calculate_tax(&request).unwrap();

        assert_eq!(result.zve, Decimal::ZERO);
        assert_eq!(result.est, Decimal::ZERO);
        assert_eq!(result.partner_zve, Decimal::ZERO);
    }

    #[test]
    fn test_request_deserializes_with_defaults() {
        let request: TaxRequest =
            serde_json::from_str(r#"{"zve": 40000, "filing_status": "married"}"#).unwrap();
        assert_eq!(request.filing_status, FilingStatus::Married);
        assert_eq!(request.partner_zve, Decimal::ZERO);
    }
}
