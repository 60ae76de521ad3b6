use async_trait::async_trait;
use chrono::NaiveDate;
use opsdash_core::AppResult;
use opsdash_domain::{AbsencePeriod, DateRange, EmploymentNumber, TimeReport};

/// Port for the HR and time-reporting system.
#[async_trait]
pub trait HrSystem: Send + Sync {
    /// Lists absence applications overlapping a date window.
    async fn list_absences(
        &self,
        employment_number: &EmploymentNumber,
        window: DateRange,
    ) -> AppResult<Vec<AbsencePeriod>>;

    /// Creates an absence application and returns the stored record.
    async fn create_absence(
        &self,
        employment_number: &EmploymentNumber,
        absence: &AbsencePeriod,
    ) -> AppResult<AbsencePeriod>;

    /// Updates an existing absence application.
    async fn update_absence(
        &self,
        employment_number: &EmploymentNumber,
        absence_id: &str,
        absence: &AbsencePeriod,
    ) -> AppResult<AbsencePeriod>;

    /// Deletes an absence application.
    async fn delete_absence(
        &self,
        employment_number: &EmploymentNumber,
        absence_id: &str,
    ) -> AppResult<()>;

    /// Fetches the time report for one date. Dates without rows return an empty report.
    async fn get_time_report(
        &self,
        employment_number: &EmploymentNumber,
        date: NaiveDate,
    ) -> AppResult<TimeReport>;

    /// Saves a time report and returns the stored state.
    async fn save_time_report(&self, report: &TimeReport) -> AppResult<TimeReport>;
}
