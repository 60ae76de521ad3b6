use opsdash_domain::{Assignment, MonthlyOccupancy, OccupancyReport, Opportunity, TimecardRow};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use super::common::FiscalWindowResponse;

/// Project assignment of the signed-in consultant.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/assignment-response.ts"
)]
pub struct AssignmentResponse {
    pub id: String,
    pub name: String,
    pub project_name: Option<String>,
    pub account_name: Option<String>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    pub allocation_percent: Option<f64>,
    pub status: Option<String>,
}

impl From<Assignment> for AssignmentResponse {
    fn from(value: Assignment) -> Self {
        Self {
            id: value.id,
            name: value.name,
            project_name: value.project_name,
            account_name: value.account_name,
            start_date: value.start_date.map(|date| date.to_string()),
            end_date: value.end_date.map(|date| date.to_string()),
            allocation_percent: value.allocation_percent,
            status: value.status,
        }
    }
}

/// Sales opportunity.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/opportunity-response.ts"
)]
pub struct OpportunityResponse {
    pub id: String,
    pub name: String,
    pub account_name: Option<String>,
    pub stage: String,
    pub amount: Option<f64>,
    pub probability: Option<f64>,
    pub close_date: Option<String>,
    pub owner_name: Option<String>,
}

impl From<Opportunity> for OpportunityResponse {
    fn from(value: Opportunity) -> Self {
        Self {
            id: value.id,
            name: value.name,
            account_name: value.account_name,
            stage: value.stage,
            amount: value.amount,
            probability: value.probability,
            close_date: value.close_date.map(|date| date.to_string()),
            owner_name: value.owner_name,
        }
    }
}

/// Timecard row for one week.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/timecard-response.ts"
)]
pub struct TimecardResponse {
    pub id: String,
    pub project_name: Option<String>,
    pub week_start: String,
    pub total_hours: f64,
    pub billable: bool,
    pub status: Option<String>,
}

impl From<TimecardRow> for TimecardResponse {
    fn from(value: TimecardRow) -> Self {
        Self {
            id: value.id,
            project_name: value.project_name,
            week_start: value.week_start.to_string(),
            total_hours: value.total_hours,
            billable: value.billable,
            status: value.status,
        }
    }
}

/// Billable share of available hours for one calendar month.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/monthly-occupancy-response.ts"
)]
pub struct MonthlyOccupancyResponse {
    pub year: i32,
    pub month: u32,
    pub billable_hours: f64,
    pub available_hours: f64,
    pub rate: Option<f64>,
}

impl From<MonthlyOccupancy> for MonthlyOccupancyResponse {
    fn from(value: MonthlyOccupancy) -> Self {
        Self {
            year: value.year,
            month: value.month,
            billable_hours: value.billable_hours,
            available_hours: value.available_hours,
            rate: value.rate,
        }
    }
}

/// Occupancy for the current February to January fiscal year.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/occupancy-response.ts"
)]
pub struct OccupancyResponse {
    pub fiscal_year: FiscalWindowResponse,
    pub months: Vec<MonthlyOccupancyResponse>,
    pub billable_hours: f64,
    pub available_hours: f64,
    pub year_to_date_rate: Option<f64>,
}

impl From<OccupancyReport> for OccupancyResponse {
    fn from(value: OccupancyReport) -> Self {
        Self {
            fiscal_year: FiscalWindowResponse::from(value.fiscal_year),
            months: value
                .months
                .into_iter()
                .map(MonthlyOccupancyResponse::from)
                .collect(),
            billable_hours: value.billable_hours,
            available_hours: value.available_hours,
            year_to_date_rate: value.year_to_date_rate,
        }
    }
}

/// Id of a newly created CRM record.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/created-record-response.ts"
)]
pub struct CreatedRecordResponse {
    pub id: String,
}

/// Optional free-text filter for opportunity listings.
#[derive(Debug, Deserialize)]
pub struct OpportunityQuery {
    pub search: Option<String>,
}

/// Week selector for timecard listings.
#[derive(Debug, Deserialize)]
pub struct TimecardQuery {
    pub week_start: String,
}
