use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

use crate::schedule::ScheduleEntry;

/// Per-year values of a schedule, rounded to whole currency units, laid out
/// as parallel columns for a stacked bar chart (interest and principal) with a
/// balance line on top.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ScheduleSeries {
    /// `Jahr 1`, `Jahr 2`, ...
    pub labels: Vec<String>,
    /// Interest share per year.
    pub interest: Vec<Decimal>,
    /// Principal share per year.
    pub principal: Vec<Decimal>,
    /// Balance after each year.
    pub remaining: Vec<Decimal>,
}

impl ScheduleSeries {
    /// Projects a schedule into chart columns; empty in, empty out.
    pub fn from_schedule(schedule: &[ScheduleEntry]) -> Self {
        let mut series = Self::default();
        for entry in schedule {
            series.labels.push(format!("Jahr {}", entry.year));
            series.interest.push(whole_units(entry.interest_paid));
            series.principal.push(whole_units(entry.principal_paid));
            series.remaining.push(whole_units(entry.remaining_principal));
        }
        series
    }

    /// Number of years in the series.
    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }
}

fn whole_units(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schedule::compute_schedule;
    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;

    #[test]
    fn test_empty_schedule_gives_empty_series() {
        let series = ScheduleSeries::from_schedule(&[]);
        assert!(series.is_empty());
        assert_eq!(series.len(), 0);
    }

    #[test]
    fn test_series_rounds_each_column() {
        let schedule = vec![ScheduleEntry {
            year: 1,
            interest_paid: dec!(120.5),
            principal_paid: dec!(79.49),
            remaining_principal: dec!(920.51),
            payment: dec!(199.99),
        }];

        let series = ScheduleSeries::from_schedule(&schedule);

        assert_eq!(series.labels, vec!["Jahr 1".to_string()]);
        assert_eq!(series.interest, vec![dec!(121)]);
        assert_eq!(series.principal, vec![dec!(79)]);
        assert_eq!(series.remaining, vec![dec!(921)]);
    }

    #[test]
    fn test_series_follows_schedule_length() {
        let schedule = compute_schedule(dec!(300000), dec!(0.04), dec!(0.01), 100);
        let series = ScheduleSeries::from_schedule(&schedule);

        assert_eq!(series.len(), schedule.len());
        assert_eq!(series.labels.last().unwrap(), "Jahr 42");
        assert_eq!(series.interest[0], dec!(12000));
        assert_eq!(*series.remaining.last().unwrap(), dec!(0));
    }
}
