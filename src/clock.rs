//! Calendar gate: where "today" comes from, and whole-day arithmetic.

use chrono::{NaiveDate, Utc};

pub trait Clock: Send + Sync {
    fn today(&self) -> NaiveDate;
}

/// Wall clock, UTC calendar date.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn today(&self) -> NaiveDate {
        Utc::now().date_naive()
    }
}

/// A clock pinned to one date.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub NaiveDate);

impl Clock for FixedClock {
    fn today(&self) -> NaiveDate {
        self.0
    }
}

/// Signed number of calendar days from `from` to `to`. Negative when `to` is
/// in the past.
pub fn days_between(from: NaiveDate, to: NaiveDate) -> i64 {
    (to - from).num_days()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    #[test]
    fn test_days_between() {
        assert_eq!(days_between(d(2025, 1, 1), d(2025, 1, 8)), 7);
        assert_eq!(days_between(d(2025, 1, 8), d(2025, 1, 1)), -7);
        assert_eq!(days_between(d(2025, 1, 1), d(2025, 1, 1)), 0);
        // crosses a month and a leap day
        assert_eq!(days_between(d(2024, 2, 28), d(2024, 3, 1)), 2);
    }

    #[test]
    fn test_fixed_clock() {
        let clock = FixedClock(d(2025, 6, 30));
        assert_eq!(clock.today(), d(2025, 6, 30));
    }
}
