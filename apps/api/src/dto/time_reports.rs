use opsdash_domain::{TimeReport, TimeReportRow};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

/// One row of booked hours.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/time-report-row-dto.ts"
)]
pub struct TimeReportRowDto {
    pub project_code: String,
    #[serde(default)]
    pub activity_code: Option<String>,
    pub hours: f64,
    #[serde(default)]
    pub comment: Option<String>,
}

impl From<TimeReportRow> for TimeReportRowDto {
    fn from(value: TimeReportRow) -> Self {
        Self {
            project_code: value.project_code,
            activity_code: value.activity_code,
            hours: value.hours,
            comment: value.comment,
        }
    }
}

impl From<TimeReportRowDto> for TimeReportRow {
    fn from(value: TimeReportRowDto) -> Self {
        Self {
            project_code: value.project_code.trim().to_owned(),
            activity_code: value.activity_code,
            hours: value.hours,
            comment: value.comment,
        }
    }
}

/// Time report for one date.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/time-report-response.ts"
)]
pub struct TimeReportResponse {
    pub employment_number: String,
    pub date: String,
    pub rows: Vec<TimeReportRowDto>,
    pub submitted: bool,
    pub total_hours: f64,
}

impl From<TimeReport> for TimeReportResponse {
    fn from(value: TimeReport) -> Self {
        let total_hours = value.total_hours();

        Self {
            employment_number: value.employment_number.as_str().to_owned(),
            date: value.date.to_string(),
            rows: value.rows.into_iter().map(TimeReportRowDto::from).collect(),
            submitted: value.submitted,
            total_hours,
        }
    }
}

/// Incoming payload for saving a time report.
#[derive(Debug, Deserialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/save-time-report-request.ts"
)]
pub struct SaveTimeReportRequest {
    pub rows: Vec<TimeReportRowDto>,
    #[serde(default)]
    pub submit: bool,
}
