//! Occupancy rate aggregation over CRM historical-hours records.

use chrono::{Datelike, NaiveDate};
use opsdash_core::AppResult;
use serde::{Deserialize, Serialize};

use crate::fiscal::{FiscalWindow, FiscalYearDefinition};

/// Billable and available hours booked for one consultant on one date.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HistoricalHours {
    /// Date the hours belong to.
    pub date: NaiveDate,
    /// Hours billed to customers.
    pub billable_hours: f64,
    /// Hours the consultant was available for billable work.
    pub available_hours: f64,
}

/// Aggregated hours for one calendar month.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct MonthlyOccupancy {
    /// Calendar year.
    pub year: i32,
    /// Calendar month, 1-12.
    pub month: u32,
    /// Sum of billable hours.
    pub billable_hours: f64,
    /// Sum of available hours.
    pub available_hours: f64,
    /// Billable over available hours; `None` when nothing was available.
    pub rate: Option<f64>,
}

/// Occupancy for the February to January fiscal year containing a date.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OccupancyReport {
    /// Reporting window.
    pub fiscal_year: FiscalWindow,
    /// One entry per month from the window start up to and including today's month.
    pub months: Vec<MonthlyOccupancy>,
    /// Billable hours year to date.
    pub billable_hours: f64,
    /// Available hours year to date.
    pub available_hours: f64,
    /// Year-to-date rate; `None` when nothing was available.
    pub year_to_date_rate: Option<f64>,
}

/// Computes the occupancy rate, treating zero available hours as undefined.
#[must_use]
pub fn occupancy_rate(billable_hours: f64, available_hours: f64) -> Option<f64> {
    (available_hours > 0.0).then(|| billable_hours / available_hours)
}

/// Aggregates records into a report for the fiscal year containing `today`.
///
/// Records outside the window or after `today` are ignored.
pub fn occupancy_report(records: &[HistoricalHours], today: NaiveDate) -> AppResult<OccupancyReport> {
    let fiscal_year = FiscalYearDefinition::FebruaryToJanuary.window_containing(today)?;

    let mut months: Vec<MonthlyOccupancy> = Vec::with_capacity(12);
    let mut cursor = fiscal_year.start();
    while cursor <= today {
        months.push(MonthlyOccupancy {
            year: cursor.year(),
            month: cursor.month(),
            billable_hours: 0.0,
            available_hours: 0.0,
            rate: None,
        });
        let Some(next) = cursor.checked_add_months(chrono::Months::new(1)) else {
            break;
        };
        cursor = next;
    }

    for record in records
        .iter()
        .filter(|record| fiscal_year.contains(record.date) && record.date <= today)
    {
        if let Some(month) = months
            .iter_mut()
            .find(|month| month.year == record.date.year() && month.month == record.date.month())
        {
            month.billable_hours += record.billable_hours;
            month.available_hours += record.available_hours;
        }
    }

    for month in &mut months {
        month.rate = occupancy_rate(month.billable_hours, month.available_hours);
    }

    let billable_hours = months.iter().map(|month| month.billable_hours).sum::<f64>();
    let available_hours = months.iter().map(|month| month.available_hours).sum::<f64>();

    Ok(OccupancyReport {
        fiscal_year,
        months,
        billable_hours,
        available_hours,
        year_to_date_rate: occupancy_rate(billable_hours, available_hours),
    })
}
