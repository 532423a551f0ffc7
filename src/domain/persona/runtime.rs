//! Compile-time clock context: display time and fiscal year.

use chrono::{DateTime, Datelike, FixedOffset};
use std::fmt;

use crate::domain::foundation::Timestamp;

/// First month (0-based) of the fiscal year: April.
pub const FISCAL_YEAR_START_MONTH0: u32 = 3;

/// A fiscal year running April to March, labelled `2025-26`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct FiscalYear {
    start_year: i32,
}

impl FiscalYear {
    /// The fiscal year containing `date`.
    pub fn for_date(date: &impl Datelike) -> Self {
        let start_year = if date.month0() >= FISCAL_YEAR_START_MONTH0 {
            date.year()
        } else {
            date.year() - 1
        };
        Self { start_year }
    }

    pub fn start_year(&self) -> i32 {
        self.start_year
    }
}

impl fmt::Display for FiscalYear {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}-{:02}",
            self.start_year,
            (self.start_year + 1).rem_euclid(100)
        )
    }
}

/// Wall-clock snapshot taken when an instruction document is compiled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RuntimeContext {
    now: DateTime<FixedOffset>,
}

impl RuntimeContext {
    /// Freezes the clock at `now`.
    pub fn at(now: DateTime<FixedOffset>) -> Self {
        Self { now }
    }

    /// Reads the system clock, expressed at the given UTC offset.
    pub fn capture(utc_offset_minutes: i32) -> Self {
        Self::at(Timestamp::now().at_offset(utc_offset_minutes))
    }

    pub fn now(&self) -> &DateTime<FixedOffset> {
        &self.now
    }

    /// Locale-style display string, e.g. `4/1/2025, 9:05:00 AM`.
    pub fn display_time(&self) -> String {
        self.now.format("%-m/%-d/%Y, %-I:%M:%S %p").to_string()
    }

    pub fn fiscal_year(&self) -> FiscalYear {
        FiscalYear::for_date(&self.now)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use proptest::prelude::*;

    fn ctx(s: &str) -> RuntimeContext {
        RuntimeContext::at(DateTime::parse_from_rfc3339(s).unwrap())
    }

    #[test]
    fn march_belongs_to_previous_fiscal_year() {
        let runtime = ctx("2025-03-15T10:00:00+05:30");
        assert_eq!(runtime.fiscal_year().to_string(), "2024-25");
    }

    #[test]
    fn april_starts_a_new_fiscal_year() {
        let runtime = ctx("2025-04-01T00:00:00+05:30");
        assert_eq!(runtime.fiscal_year().to_string(), "2025-26");
    }

    #[test]
    fn century_rollover_is_zero_padded() {
        let runtime = ctx("2099-06-01T00:00:00+00:00");
        assert_eq!(runtime.fiscal_year().to_string(), "2099-00");

        let runtime = ctx("2009-01-10T00:00:00+00:00");
        assert_eq!(runtime.fiscal_year().to_string(), "2008-09");
    }

    #[test]
    fn display_time_is_locale_style() {
        let runtime = ctx("2025-04-01T09:05:00+05:30");
        assert_eq!(runtime.display_time(), "4/1/2025, 9:05:00 AM");

        let runtime = ctx("2025-12-31T23:59:59+05:30");
        assert_eq!(runtime.display_time(), "12/31/2025, 11:59:59 PM");
    }

    #[test]
    fn fiscal_year_uses_local_wall_clock() {
        // 2025-03-31 20:00 UTC is already April 1st in IST.
        let utc = ctx("2025-03-31T20:00:00+00:00");
        assert_eq!(utc.fiscal_year().to_string(), "2024-25");

        let ist = RuntimeContext::at(utc.now().with_timezone(&FixedOffset::east_opt(330 * 60).unwrap()));
        assert_eq!(ist.fiscal_year().to_string(), "2025-26");
    }

    proptest! {
        #[test]
        fn fiscal_year_label_matches_month_threshold(year in 1990i32..2200, month0 in 0u32..12, day in 1u32..=28) {
            let date = NaiveDate::from_ymd_opt(year, month0 + 1, day).unwrap();
            let label = FiscalYear::for_date(&date).to_string();
            let expected = if month0 >= 3 {
                format!("{}-{:02}", year, (year + 1) % 100)
            } else {
                format!("{}-{:02}", year - 1, year % 100)
            };
            prop_assert_eq!(label, expected);
        }
    }
}
