use chrono::NaiveDate;
use opsdash_core::{AppError, AppResult};
use serde::{Deserialize, Serialize};

use crate::user::EmploymentNumber;

/// One row of hours booked on a project activity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimeReportRow {
    /// Project code in the HR system.
    pub project_code: String,
    /// Optional activity code under the project.
    pub activity_code: Option<String>,
    /// Reported hours.
    pub hours: f64,
    /// Optional row comment.
    pub comment: Option<String>,
}

/// Time report of one employee for one date.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimeReport {
    /// Employee the report belongs to.
    pub employment_number: EmploymentNumber,
    /// Reported date.
    pub date: NaiveDate,
    /// Reported rows.
    pub rows: Vec<TimeReportRow>,
    /// Whether the report has been submitted for attestation.
    pub submitted: bool,
}

impl TimeReport {
    /// Returns the sum of hours across all rows.
    #[must_use]
    pub fn total_hours(&self) -> f64 {
        self.rows.iter().map(|row| row.hours).sum()
    }

    /// Validates row hours and the daily total.
    pub fn validate(&self) -> AppResult<()> {
        for row in &self.rows {
            if row.project_code.trim().is_empty() {
                return Err(AppError::Validation(
                    "time report rows require a project code".to_owned(),
                ));
            }
            if !row.hours.is_finite() || row.hours < 0.0 {
                return Err(AppError::Validation(format!(
                    "time report row '{}' has invalid hours {}",
                    row.project_code, row.hours
                )));
            }
        }

        if self.total_hours() > 24.0 {
            return Err(AppError::Validation(format!(
                "time report for {} exceeds 24 hours",
                self.date
            )));
        }

        Ok(())
    }
}
