// Lease remainder calculation

use chrono::NaiveDate;
use std::fmt;

/// Whole-day counts derived from the lease start / end dates and the visit ("as of") date.
///
/// Values are not clamped: an as-of date before the lease start gives a negative `elapsed_days`
/// and a `remaining_days` larger than `total_days`; one after the lease end gives a negative
/// `remaining_days`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LeaseRemainder {
    pub total_days: i64,
    pub elapsed_days: i64,
    pub remaining_days: i64,
}

impl LeaseRemainder {
    pub fn calculate(start: NaiveDate, end: NaiveDate, as_of: NaiveDate) -> Self {
        let total_days = (end - start).num_days();
        let elapsed_days = (as_of - start).num_days();
        Self {
            total_days,
            elapsed_days,
            remaining_days: total_days - elapsed_days,
        }
    }

    /// Parse the three date inputs and calculate. `None` if any of them is blank or not a
    /// `YYYY-MM-DD` date.
    pub fn from_inputs(start: &str, end: &str, as_of: &str) -> Option<Self> {
        let start = parse_date(start)?;
        let end = parse_date(end)?;
        let as_of = parse_date(as_of)?;
        Some(Self::calculate(start, end, as_of))
    }

    pub fn lines(&self) -> [(&'static str, i64); 3] {
        [
            ("Total Lease Days", self.total_days),
            ("Elapsed Days", self.elapsed_days),
            ("Adjusted Remaining Days", self.remaining_days),
        ]
    }
}

impl fmt::Display for LeaseRemainder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = self
            .lines()
            .iter()
            .map(|(label, value)| format!("{}: {}", label, value))
            .collect();
        write!(f, "{}", parts.join(" | "))
    }
}

pub fn parse_date(input: &str) -> Option<NaiveDate> {
    let s = input.trim();
    if s.is_empty() {
        return None;
    }
    NaiveDate::parse_from_str(s, "%Y-%m-%d").ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(offset: i64) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, 1).unwrap() + chrono::Duration::days(offset)
    }

    #[test]
    fn as_of_inside_the_lease() {
        let r = LeaseRemainder::calculate(day(0), day(10), day(4));
        assert_eq!(
            r,
            LeaseRemainder {
                total_days: 10,
                elapsed_days: 4,
                remaining_days: 6,
            }
        );
    }

    #[test]
    fn as_of_before_start_is_not_clamped() {
        let r = LeaseRemainder::calculate(day(0), day(10), day(-2));
        assert_eq!(r.total_days, 10);
        assert_eq!(r.elapsed_days, -2);
        assert_eq!(r.remaining_days, 12);
        assert!(r.remaining_days > r.total_days);
    }

    #[test]
    fn as_of_after_end_goes_negative() {
        let r = LeaseRemainder::calculate(day(0), day(10), day(13));
        assert_eq!(r.remaining_days, -3);
    }

    #[test]
    fn spans_leap_day() {
        let r = LeaseRemainder::from_inputs("2024-02-28", "2024-03-01", "2024-02-29").unwrap();
        assert_eq!(r.total_days, 2);
        assert_eq!(r.elapsed_days, 1);
        assert_eq!(r.remaining_days, 1);
    }

    #[test]
    fn blank_or_malformed_inputs_yield_nothing() {
        assert!(LeaseRemainder::from_inputs("", "2024-03-01", "2024-02-29").is_none());
        assert!(LeaseRemainder::from_inputs("2024-01-01", "03/01/2024", "2024-02-29").is_none());
        assert!(LeaseRemainder::from_inputs("2024-01-01", "2024-03-01", " ").is_none());
    }

    #[test]
    fn display_lists_all_three_values() {
        let r = LeaseRemainder::calculate(day(0), day(10), day(4));
        assert_eq!(
            r.to_string(),
            "Total Lease Days: 10 | Elapsed Days: 4 | Adjusted Remaining Days: 6"
        );
    }
}
