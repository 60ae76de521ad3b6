//! Fiscal-year windows.
//!
//! Two definitions are in use: holiday accrual resets on 1 April while
//! occupancy reporting follows a February to January year. They are kept as
//! separate variants and never mixed.

use chrono::{Datelike, NaiveDate};
use opsdash_core::{AppError, AppResult};
use serde::Serialize;

/// Fiscal-year definition selected by the calling module.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FiscalYearDefinition {
    /// 1 April to 31 March, used for holiday accrual.
    AprilToMarch,
    /// 1 February to 31 January, used for occupancy reporting.
    FebruaryToJanuary,
}

impl FiscalYearDefinition {
    /// Returns the stable transport name.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::AprilToMarch => "april_to_march",
            Self::FebruaryToJanuary => "february_to_january",
        }
    }

    /// Returns the calendar month the fiscal year starts in.
    #[must_use]
    pub fn start_month(self) -> u32 {
        match self {
            Self::AprilToMarch => 4,
            Self::FebruaryToJanuary => 2,
        }
    }

    /// Returns the calendar year in which the window containing `date` starts.
    #[must_use]
    pub fn start_year_for(self, date: NaiveDate) -> i32 {
        if date.month() < self.start_month() {
            date.year() - 1
        } else {
            date.year()
        }
    }

    /// Returns the fiscal window starting in the given calendar year.
    pub fn window_starting(self, start_year: i32) -> AppResult<FiscalWindow> {
        let start = first_of_month(start_year, self.start_month())?;
        let next_start = first_of_month(start_year + 1, self.start_month())?;
        let end = next_start.pred_opt().ok_or_else(|| {
            AppError::Internal(format!("fiscal year {start_year} has no end date"))
        })?;

        Ok(FiscalWindow {
            definition: self,
            start,
            end,
        })
    }

    /// Returns the fiscal window that contains `date`.
    pub fn window_containing(self, date: NaiveDate) -> AppResult<FiscalWindow> {
        self.window_starting(self.start_year_for(date))
    }
}

/// Inclusive date window of one fiscal year.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct FiscalWindow {
    definition: FiscalYearDefinition,
    start: NaiveDate,
    end: NaiveDate,
}

impl FiscalWindow {
    /// Returns the definition the window was built from.
    #[must_use]
    pub fn definition(&self) -> FiscalYearDefinition {
        self.definition
    }

    /// Returns the first day of the window.
    #[must_use]
    pub fn start(&self) -> NaiveDate {
        self.start
    }

    /// Returns the last day of the window.
    #[must_use]
    pub fn end(&self) -> NaiveDate {
        self.end
    }

    /// Returns whether the date lies inside the window.
    #[must_use]
    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start <= date && date <= self.end
    }
}

/// Returns the next holiday reset date: 1 April after `date`.
///
/// A date on or after 1 April of year Y resets on 1 April of Y+1, any earlier
/// date resets on 1 April of Y.
pub fn calculate_next_reset_date(date: NaiveDate) -> AppResult<NaiveDate> {
    let start_month = FiscalYearDefinition::AprilToMarch.start_month();
    let reset_year = if date.month() >= start_month {
        date.year() + 1
    } else {
        date.year()
    };

    first_of_month(reset_year, start_month)
}

fn first_of_month(year: i32, month: u32) -> AppResult<NaiveDate> {
    NaiveDate::from_ymd_opt(year, month, 1)
        .ok_or_else(|| AppError::Validation(format!("invalid fiscal date {year}-{month:02}-01")))
}
