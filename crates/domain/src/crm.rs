//! Read projections of CRM records.

use chrono::NaiveDate;
use opsdash_core::{AppError, AppResult};
use serde::{Deserialize, Serialize};

/// Validated CRM object or field API name, e.g. `Opportunity` or `Close_Date__c`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CrmApiName(String);

impl CrmApiName {
    /// Creates an API name, accepting ASCII letters, digits and underscores
    /// and requiring a leading letter.
    pub fn new(value: impl Into<String>) -> AppResult<Self> {
        let value = value.into();
        let mut characters = value.chars();
        let starts_with_letter = characters
            .next()
            .is_some_and(|character| character.is_ascii_alphabetic());
        let rest_is_valid =
            characters.all(|character| character.is_ascii_alphanumeric() || character == '_');

        if !starts_with_letter || !rest_is_valid || value.len() > 80 {
            return Err(AppError::Validation(format!(
                "'{value}' is not a valid CRM API name"
            )));
        }

        Ok(Self(value))
    }

    /// Returns the API name.
    #[must_use]
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl std::fmt::Display for CrmApiName {
    fn fmt(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        formatter.write_str(self.0.as_str())
    }
}

/// Consultant assignment to a customer project.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Assignment {
    /// CRM record id.
    pub id: String,
    /// Assignment name.
    pub name: String,
    /// Project name.
    pub project_name: Option<String>,
    /// Customer account name.
    pub account_name: Option<String>,
    /// First day of the assignment.
    pub start_date: Option<NaiveDate>,
    /// Last day of the assignment.
    pub end_date: Option<NaiveDate>,
    /// Share of full time, 0-100.
    pub allocation_percent: Option<f64>,
    /// CRM status label.
    pub status: Option<String>,
}

/// Sales opportunity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Opportunity {
    /// CRM record id.
    pub id: String,
    /// Opportunity name.
    pub name: String,
    /// Customer account name.
    pub account_name: Option<String>,
    /// Sales stage label.
    pub stage: String,
    /// Expected amount.
    pub amount: Option<f64>,
    /// Win probability in percent.
    pub probability: Option<f64>,
    /// Expected close date.
    pub close_date: Option<NaiveDate>,
    /// Owner display name.
    pub owner_name: Option<String>,
}

/// One timecard row for a week.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimecardRow {
    /// CRM record id.
    pub id: String,
    /// Project the hours are booked on.
    pub project_name: Option<String>,
    /// Monday of the reported week.
    pub week_start: NaiveDate,
    /// Total hours for the week.
    pub total_hours: f64,
    /// Whether the hours are billable.
    pub billable: bool,
    /// CRM status label.
    pub status: Option<String>,
}
