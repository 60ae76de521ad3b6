//! Holiday accrual calculator.
//!
//! Turns absence applications into usable-day counts. A day is usable when it
//! is not a weekend and not a Swedish bank holiday; it additionally counts
//! against the current allowance when it lies in the April-anchored fiscal
//! window containing `today`.

use chrono::NaiveDate;
use opsdash_core::AppResult;
use serde::{Deserialize, Serialize};

use crate::absence::{AbsenceKind, AbsencePeriod, AbsenceStatus, DateRange};
use crate::calendar::SwedishHolidayCalendar;
use crate::fiscal::{FiscalWindow, FiscalYearDefinition, calculate_next_reset_date};

/// Yearly holiday allowance of one employee.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HolidayAllowance {
    /// Days granted per fiscal year.
    pub days_per_year: u32,
    /// Days carried over from earlier years.
    pub saved_days: u32,
}

impl HolidayAllowance {
    /// Returns the total number of days available before any usage.
    #[must_use]
    pub fn total(&self) -> u32 {
        self.days_per_year.saturating_add(self.saved_days)
    }
}

/// Day counts for one absence application.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PeriodUsage {
    /// Remote identifier of the application.
    pub absence_id: Option<String>,
    /// Inclusive period of absence.
    pub range: DateRange,
    /// Processing status.
    pub status: AbsenceStatus,
    /// Working days in the whole period.
    pub days: u32,
    /// Working days that fall in the active fiscal window.
    pub days_in_fiscal_year: u32,
}

/// Holiday balance for the active fiscal year.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HolidaySummary {
    /// Active April to March window.
    pub fiscal_year: FiscalWindow,
    /// Per-application usage, in the order received.
    pub periods: Vec<PeriodUsage>,
    /// Working days across all counted applications.
    pub used_days: u32,
    /// Working days inside the active fiscal window.
    pub used_in_fiscal_year: u32,
    /// Total allowance for the year.
    pub allowance: u32,
    /// Allowance minus days used in the window. Negative when overdrawn.
    pub available: i64,
    /// Date the allowance resets.
    pub next_reset_date: NaiveDate,
}

/// Counts working days in `range`, optionally clipped to `window`.
#[must_use]
pub fn count_working_days(
    range: &DateRange,
    calendar: &SwedishHolidayCalendar,
    window: Option<&FiscalWindow>,
) -> u32 {
    let count = range
        .days()
        .filter(|day| window.is_none_or(|window| window.contains(*day)))
        .filter(|day| calendar.is_working_day(*day))
        .count();

    u32::try_from(count).unwrap_or(u32::MAX)
}

/// Builds the holiday summary for the fiscal year containing `today`.
///
/// Only holiday applications that consume allowance are counted; rejected
/// applications and other absence kinds are skipped.
pub fn summarize_holidays(
    periods: &[AbsencePeriod],
    allowance: HolidayAllowance,
    today: NaiveDate,
    calendar: &SwedishHolidayCalendar,
) -> AppResult<HolidaySummary> {
    let fiscal_year = FiscalYearDefinition::AprilToMarch.window_containing(today)?;
    let next_reset_date = calculate_next_reset_date(today)?;

    let usages: Vec<PeriodUsage> = periods
        .iter()
        .filter(|period| period.kind == AbsenceKind::Holiday)
        .filter(|period| period.status.consumes_allowance())
        .map(|period| PeriodUsage {
            absence_id: period.id.clone(),
            range: period.range,
            status: period.status,
            days: count_working_days(&period.range, calendar, None),
            days_in_fiscal_year: count_working_days(&period.range, calendar, Some(&fiscal_year)),
        })
        .collect();

    let used_days = usages.iter().map(|usage| usage.days).sum::<u32>();
    let used_in_fiscal_year = usages
        .iter()
        .map(|usage| usage.days_in_fiscal_year)
        .sum::<u32>();
    let total = allowance.total();

    Ok(HolidaySummary {
        fiscal_year,
        periods: usages,
        used_days,
        used_in_fiscal_year,
        allowance: total,
        available: i64::from(total) - i64::from(used_in_fiscal_year),
        next_reset_date,
    })
}

#[cfg(test)]
mod tests {
    use chrono::{Datelike, Days, NaiveDate, Weekday};
    use proptest::prelude::*;

    use super::{HolidayAllowance, count_working_days, summarize_holidays};
    use crate::absence::{AbsenceKind, AbsencePeriod, AbsenceStatus, DateRange};
    use crate::calendar::SwedishHolidayCalendar;

    fn date(year: i32, month: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(year, month, day).unwrap_or_default()
    }

    fn range(from: NaiveDate, to: NaiveDate) -> DateRange {
        match DateRange::new(from, to) {
            Ok(range) => range,
            Err(error) => panic!("invalid test range: {error}"),
        }
    }

    fn holiday(from: NaiveDate, to: NaiveDate, status: AbsenceStatus) -> AbsencePeriod {
        AbsencePeriod {
            id: Some(format!("abs-{from}")),
            range: range(from, to),
            status,
            kind: AbsenceKind::Holiday,
            comment: None,
        }
    }

    #[test]
    fn plain_weekdays_count_as_inclusive_days() {
        let calendar = SwedishHolidayCalendar::default();
        // Monday 2024-09-09 to Friday 2024-09-13.
        let days = count_working_days(&range(date(2024, 9, 9), date(2024, 9, 13)), &calendar, None);
        assert_eq!(days, 5);
    }

    #[test]
    fn weekend_days_are_excluded() {
        let calendar = SwedishHolidayCalendar::default();
        // Thursday 2024-09-12 to Tuesday 2024-09-17 spans one weekend.
        let days = count_working_days(&range(date(2024, 9, 12), date(2024, 9, 17)), &calendar, None);
        assert_eq!(days, 4);
    }

    #[test]
    fn bank_holidays_are_excluded() {
        let calendar = SwedishHolidayCalendar::default();
        // 2024-12-23 to 2024-12-27: Christmas Eve, Day and Boxing Day are holidays.
        let days = count_working_days(&range(date(2024, 12, 23), date(2024, 12, 27)), &calendar, None);
        assert_eq!(days, 2);
    }

    #[test]
    fn summary_splits_usage_at_fiscal_boundary() {
        let calendar = SwedishHolidayCalendar::default();
        // Monday 2025-03-24 to Friday 2025-04-04: six days before April, four after.
        let periods = vec![holiday(date(2025, 3, 24), date(2025, 4, 4), AbsenceStatus::Audited)];
        let allowance = HolidayAllowance {
            days_per_year: 25,
            saved_days: 3,
        };

        let summary = summarize_holidays(&periods, allowance, date(2025, 6, 1), &calendar);
        let Ok(summary) = summary else {
            panic!("summary should build");
        };

        assert_eq!(summary.used_days, 10);
        assert_eq!(summary.used_in_fiscal_year, 4);
        assert_eq!(summary.allowance, 28);
        assert_eq!(summary.available, 24);
        assert_eq!(summary.next_reset_date, date(2026, 4, 1));
    }

    #[test]
    fn rejected_and_sick_leave_are_not_counted() {
        let calendar = SwedishHolidayCalendar::default();
        let mut sick = holiday(date(2025, 9, 1), date(2025, 9, 5), AbsenceStatus::Audited);
        sick.kind = AbsenceKind::SickLeave;
        let periods = vec![
            holiday(date(2025, 8, 4), date(2025, 8, 8), AbsenceStatus::Rejected),
            sick,
            holiday(date(2025, 8, 11), date(2025, 8, 12), AbsenceStatus::AppliedFor),
        ];

        let summary = summarize_holidays(
            &periods,
            HolidayAllowance {
                days_per_year: 1,
                saved_days: 0,
            },
            date(2025, 10, 1),
            &calendar,
        );
        let Ok(summary) = summary else {
            panic!("summary should build");
        };

        assert_eq!(summary.periods.len(), 1);
        assert_eq!(summary.used_in_fiscal_year, 2);
        assert_eq!(summary.available, -1);
    }

    proptest! {
        #[test]
        fn weekday_only_ranges_count_every_day(week in 0_u64..40, start_offset in 0_u64..5, length in 0_u64..5) {
            let calendar = SwedishHolidayCalendar::default();
            // Weeks starting Monday 2026-08-03 contain no bank holidays until late October.
            let monday = date(2026, 8, 3) + Days::new(week.min(11) * 7);
            let from = monday + Days::new(start_offset);
            let to = from + Days::new(length.min(4 - start_offset.min(4)));
            prop_assume!(to.weekday() != Weekday::Sat && to.weekday() != Weekday::Sun);
            let span = range(from, to);
            prop_assert_eq!(count_working_days(&span, &calendar, None), span.calendar_days());
        }
    }
}
