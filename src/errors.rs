use rust_decimal::Decimal;
use thiserror::Error;

/// Errors returned by the calculators built around the amortization engine.
///
/// The engine itself never fails: an input that cannot be financed yields an
/// empty schedule. These variants cover the secondary validation done by the
/// affordability, quote and configuration layers.
#[derive(Debug, Error)]
pub enum FinancingError {
    /// A currency amount that must be zero or positive was negative.
    #[error("{field} must not be negative, got {value}")]
    NegativeAmount { field: &'static str, value: Decimal },

    /// A float coming from a form field was NaN, infinite or out of decimal range.
    #[error("{field} must be a finite number")]
    NonFinite { field: &'static str },

    /// The rate pair never pays down any principal.
    #[error("interest rate {interest} with repayment rate {repayment} never amortizes the loan")]
    NonAmortizingRates { interest: Decimal, repayment: Decimal },

    /// A count or age that has to be at least one was zero.
    #[error("{field} must be positive")]
    NotPositive { field: &'static str },

    /// An intermediate amount left the representable decimal range.
    #[error("{operation} overflows the decimal range")]
    Overflow { operation: &'static str },

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("failed to parse configuration: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, FinancingError>;

/// Turns the result of a `checked_*` decimal operation into a [`Result`].
pub(crate) fn checked<T>(value: Option<T>, operation: &'static str) -> Result<T> {
    value.ok_or(FinancingError::Overflow { operation })
}

/// Converts a form value into a decimal, rejecting NaN and infinities.
pub(crate) fn finite_decimal(field: &'static str, value: f64) -> Result<Decimal> {
    use rust_decimal::prelude::FromPrimitive;

    if !value.is_finite() {
        return Err(FinancingError::NonFinite { field });
    }
    Decimal::from_f64(value).ok_or(FinancingError::NonFinite { field })
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_finite_decimal_accepts_regular_values() {
        assert_eq!(finite_decimal("assets", 1500.0).unwrap(), dec!(1500));
    }

    #[test]
    fn test_finite_decimal_rejects_nan_and_infinity() {
        for value in [f64::NAN, f64::INFINITY, f64::NEG_INFINITY] {
            let err = finite_decimal("assets", value).unwrap_err();
            assert!(matches!(err, FinancingError::NonFinite { field: "assets" }));
        }
    }

    #[test]
    fn test_checked_maps_none_to_overflow() {
        assert_eq!(checked(Some(dec!(2)), "sum").unwrap(), dec!(2));
        let err = checked(Decimal::MAX.checked_mul(dec!(2)), "loan amount").unwrap_err();
        assert_eq!(err.to_string(), "loan amount overflows the decimal range");
    }

    #[test]
    fn test_error_messages() {
        let err = FinancingError::NegativeAmount {
            field: "monthly budget",
            value: dec!(-5),
        };
        assert_eq!(err.to_string(), "monthly budget must not be negative, got -5");
    }
}
