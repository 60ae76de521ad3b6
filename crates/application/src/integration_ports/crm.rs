use async_trait::async_trait;
use chrono::NaiveDate;
use opsdash_core::AppResult;
use opsdash_domain::{
    Assignment, CrmApiName, EmailAddress, FiscalWindow, HistoricalHours, Opportunity, TimecardRow,
};
use serde_json::{Map, Value};

/// Field values for a CRM record write, keyed by field API name.
pub type CrmRecordFields = Map<String, Value>;

/// Port for the CRM system.
#[async_trait]
pub trait CrmGateway: Send + Sync {
    /// Lists assignments of the consultant with the given email.
    async fn assignments_for_consultant(&self, email: &EmailAddress)
    -> AppResult<Vec<Assignment>>;

    /// Lists opportunities that are not closed.
    async fn open_opportunities(&self) -> AppResult<Vec<Opportunity>>;

    /// Full-text search over opportunities.
    async fn search_opportunities(&self, term: &str) -> AppResult<Vec<Opportunity>>;

    /// Lists timecard rows of a consultant for the week starting at `week_start`.
    async fn timecards_for_week(
        &self,
        email: &EmailAddress,
        week_start: NaiveDate,
    ) -> AppResult<Vec<TimecardRow>>;

    /// Lists historical billable and available hours inside a fiscal window.
    async fn historical_hours(
        &self,
        email: &EmailAddress,
        window: &FiscalWindow,
    ) -> AppResult<Vec<HistoricalHours>>;

    /// Creates a record and returns its id.
    async fn create_record(&self, object: &CrmApiName, fields: CrmRecordFields)
    -> AppResult<String>;

    /// Updates fields on an existing record.
    async fn update_record(
        &self,
        object: &CrmApiName,
        record_id: &str,
        fields: CrmRecordFields,
    ) -> AppResult<()>;

    /// Deletes a record.
    async fn delete_record(&self, object: &CrmApiName, record_id: &str) -> AppResult<()>;
}
