use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::schedule::ScheduleEntry;

/// Aggregate figures over an amortization schedule.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScheduleSummary {
    /// Number of scheduled years.
    pub years: u32,
    /// Sum of all interest shares.
    pub total_interest: Decimal,
    /// Sum of all principal shares.
    pub total_principal: Decimal,
    /// Sum of all payments.
    pub total_paid: Decimal,
    /// Payment of the last scheduled year.
    pub final_payment: Decimal,
    /// Balance left after the last scheduled year.
    pub remaining_principal: Decimal,
    /// Whether the schedule ends with a zero balance.
    pub fully_repaid: bool,
}

impl ScheduleSummary {
    /// Aggregates a schedule; an empty schedule gives the zeroed default.
    pub fn from_schedule(schedule: &[ScheduleEntry]) -> Self {
        let Some(last) = schedule.last() else {
            return Self::default();
        };

        let (total_interest, total_principal, total_paid) = schedule.iter().fold(
            (Decimal::ZERO, Decimal::ZERO, Decimal::ZERO),
            |(interest, principal, paid), entry| {
                (
                    interest + entry.interest_paid,
                    principal + entry.principal_paid,
                    paid + entry.payment,
                )
            },
        );

        Self {
            years: last.year,
            total_interest,
            total_principal,
            total_paid,
            final_payment: last.payment,
            remaining_principal: last.remaining_principal,
            fully_repaid: last.remaining_principal.is_zero(),
        }
    }

    /// Rounds every currency figure to cents for display.
    pub fn rounded_to_cents(&self) -> Self {
        Self {
            total_interest: self.total_interest.round_dp(2),
            total_principal: self.total_principal.round_dp(2),
            total_paid: self.total_paid.round_dp(2),
            final_payment: self.final_payment.round_dp(2),
            remaining_principal: self.remaining_principal.round_dp(2),
            ..self.clone()
        }
    }
}

/// Shorthand for [`ScheduleSummary::from_schedule`].
pub fn summarize(schedule: &[ScheduleEntry]) -> ScheduleSummary {
    ScheduleSummary::from_schedule(schedule)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schedule::compute_schedule;
    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;

    #[test]
    fn test_empty_schedule_summary() {
        assert_eq!(summarize(&[]), ScheduleSummary::default());
        assert!(!summarize(&[]).fully_repaid);
    }

    #[test]
    fn test_totals_match_schedule() {
        let schedule = compute_schedule(dec!(1000), dec!(0), dec!(0.25), 100);
        let summary = summarize(&schedule);

        assert_eq!(
            summary,
            ScheduleSummary {
                years: 4,
                total_interest: dec!(0),
                total_principal: dec!(1000),
                total_paid: dec!(1000),
                final_payment: dec!(250),
                remaining_principal: dec!(0),
                fully_repaid: true,
            }
        );
    }

    #[test]
    fn test_standard_mortgage_summary() {
        let schedule = compute_schedule(dec!(300000), dec!(0.04), dec!(0.01), 100);
        let summary = summarize(&schedule);

        assert_eq!(summary.years, 42);
        assert!(summary.fully_repaid);
        assert_eq!(summary.total_paid, summary.total_interest + summary.total_principal);
        assert!((summary.total_principal - dec!(300000)).abs() < dec!(0.01));
        assert!(summary.total_interest > dec!(300000));
    }

    #[test]
    fn test_rounded_to_cents() {
        let summary = ScheduleSummary {
            years: 3,
            total_interest: dec!(10.005),
            total_principal: dec!(99.994),
            total_paid: dec!(110.0001),
            final_payment: dec!(5.129),
            remaining_principal: dec!(0),
            fully_repaid: true,
        };

        let rounded = summary.rounded_to_cents();

        assert_eq!(rounded.total_interest, dec!(10.00));
        assert_eq!(rounded.total_principal, dec!(99.99));
        assert_eq!(rounded.total_paid, dec!(110.00));
        assert_eq!(rounded.final_payment, dec!(5.13));
        assert_eq!(rounded.years, 3);
        assert!(rounded.fully_repaid);
    }

    #[test]
    fn test_cut_off_schedule_is_not_repaid() {
        let schedule = compute_schedule(dec!(100000), dec!(0.03), dec!(0.005), 10);
        let summary = summarize(&schedule);

        assert_eq!(summary.years, 10);
        assert!(!summary.fully_repaid);
        assert_eq!(summary.remaining_principal, schedule[9].remaining_principal);
        assert_eq!(summary.total_paid, dec!(35000));
    }
}
