//! Swedish bank-holiday calendar.
//!
//! Holidays are precomputed for a bounded range of calendar years. Dates
//! outside that range are treated as ordinary days, so callers that need
//! later years must build a calendar covering them.

use std::collections::BTreeMap;
use std::ops::RangeInclusive;

use chrono::{Datelike, Days, NaiveDate, Weekday};
use serde::Serialize;

/// First calendar year covered by [`SwedishHolidayCalendar::default`].
pub const DEFAULT_FIRST_YEAR: i32 = 2024;

/// Last calendar year covered by [`SwedishHolidayCalendar::default`].
pub const DEFAULT_LAST_YEAR: i32 = 2030;

/// One Swedish bank holiday.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct BankHoliday {
    /// Calendar date of the holiday.
    pub date: NaiveDate,
    /// Swedish name of the holiday.
    pub name: &'static str,
}

/// Precomputed set of fixed and Easter-relative Swedish bank holidays.
#[derive(Debug, Clone)]
pub struct SwedishHolidayCalendar {
    years: RangeInclusive<i32>,
    holidays: BTreeMap<NaiveDate, &'static str>,
}

impl SwedishHolidayCalendar {
    /// Builds a calendar for the inclusive range of calendar years.
    #[must_use]
    pub fn new(years: RangeInclusive<i32>) -> Self {
        let mut holidays = BTreeMap::new();
        for year in years.clone() {
            for holiday in holidays_for_year(year) {
                holidays.insert(holiday.date, holiday.name);
            }
        }

        Self { years, holidays }
    }

    /// Returns the inclusive range of covered calendar years.
    #[must_use]
    pub fn years(&self) -> &RangeInclusive<i32> {
        &self.years
    }

    /// Returns whether the calendar has holidays computed for the year.
    #[must_use]
    pub fn covers(&self, year: i32) -> bool {
        self.years.contains(&year)
    }

    /// Returns whether the date is a bank holiday.
    #[must_use]
    pub fn is_bank_holiday(&self, date: NaiveDate) -> bool {
        self.holidays.contains_key(&date)
    }

    /// Returns the holiday name when the date is a bank holiday.
    #[must_use]
    pub fn holiday_name(&self, date: NaiveDate) -> Option<&'static str> {
        self.holidays.get(&date).copied()
    }

    /// Returns whether the date is neither a weekend day nor a bank holiday.
    #[must_use]
    pub fn is_working_day(&self, date: NaiveDate) -> bool {
        !is_weekend(date) && !self.is_bank_holiday(date)
    }

    /// Lists the holidays of one calendar year in date order.
    #[must_use]
    pub fn holidays_in_year(&self, year: i32) -> Vec<BankHoliday> {
        let (Some(start), Some(end)) = (
            NaiveDate::from_ymd_opt(year, 1, 1),
            NaiveDate::from_ymd_opt(year, 12, 31),
        ) else {
            return Vec::new();
        };

        self.holidays
            .range(start..=end)
            .map(|(date, name)| BankHoliday {
                date: *date,
                name: *name,
            })
            .collect()
    }
}

impl Default for SwedishHolidayCalendar {
    fn default() -> Self {
        Self::new(DEFAULT_FIRST_YEAR..=DEFAULT_LAST_YEAR)
    }
}

/// Returns whether the date falls on a Saturday or Sunday.
#[must_use]
pub fn is_weekend(date: NaiveDate) -> bool {
    matches!(date.weekday(), Weekday::Sat | Weekday::Sun)
}

/// Computes Easter Sunday with the anonymous Gregorian algorithm.
#[must_use]
pub fn easter_sunday(year: i32) -> Option<NaiveDate> {
    let a = year % 19;
    let b = year / 100;
    let c = year % 100;
    let d = b / 4;
    let e = b % 4;
    let f = (b + 8) / 25;
    let g = (b - f + 1) / 3;
    let h = (19 * a + b - d - g + 15) % 30;
    let i = c / 4;
    let k = c % 4;
    let l = (32 + 2 * e + 2 * i - h - k) % 7;
    let m = (a + 11 * h + 22 * l) / 451;
    let month = (h + l - 7 * m + 114) / 31;
    let day = (h + l - 7 * m + 114) % 31 + 1;

    NaiveDate::from_ymd_opt(year, u32::try_from(month).ok()?, u32::try_from(day).ok()?)
}

fn holidays_for_year(year: i32) -> Vec<BankHoliday> {
    let fixed: [(u32, u32, &'static str); 8] = [
        (1, 1, "Nyårsdagen"),
        (1, 6, "Trettondedag jul"),
        (5, 1, "Första maj"),
        (6, 6, "Sveriges nationaldag"),
        (12, 24, "Julafton"),
        (12, 25, "Juldagen"),
        (12, 26, "Annandag jul"),
        (12, 31, "Nyårsafton"),
    ];

    let mut holidays: Vec<BankHoliday> = fixed
        .iter()
        .filter_map(|(month, day, name)| {
            NaiveDate::from_ymd_opt(year, *month, *day).map(|date| BankHoliday { date, name: *name })
        })
        .collect();

    if let Some(easter) = easter_sunday(year) {
        let movable: [(i64, &'static str); 5] = [
            (-2, "Långfredagen"),
            (0, "Påskdagen"),
            (1, "Annandag påsk"),
            (39, "Kristi himmelsfärdsdag"),
            (49, "Pingstdagen"),
        ];
        holidays.extend(movable.iter().filter_map(|(offset, name)| {
            shift_days(easter, *offset).map(|date| BankHoliday { date, name: *name })
        }));
    }

    // Midsummer Eve is the Friday between 19 and 25 June; Midsummer Day follows it.
    if let Some(midsummer_eve) = first_weekday_on_or_after(year, 6, 19, Weekday::Fri) {
        holidays.push(BankHoliday {
            date: midsummer_eve,
            name: "Midsommarafton",
        });
        if let Some(midsummer_day) = midsummer_eve.succ_opt() {
            holidays.push(BankHoliday {
                date: midsummer_day,
                name: "Midsommardagen",
            });
        }
    }

    if let Some(all_saints) = first_weekday_on_or_after(year, 10, 31, Weekday::Sat) {
        holidays.push(BankHoliday {
            date: all_saints,
            name: "Alla helgons dag",
        });
    }

    holidays.sort_by_key(|holiday| holiday.date);
    holidays
}

fn shift_days(date: NaiveDate, offset: i64) -> Option<NaiveDate> {
    let magnitude = Days::new(offset.unsigned_abs());
    if offset >= 0 {
        date.checked_add_days(magnitude)
    } else {
        date.checked_sub_days(magnitude)
    }
}

fn first_weekday_on_or_after(year: i32, month: u32, day: u32, weekday: Weekday) -> Option<NaiveDate> {
    let start = NaiveDate::from_ymd_opt(year, month, day)?;
    start.iter_days().take(7).find(|date| date.weekday() == weekday)
}
