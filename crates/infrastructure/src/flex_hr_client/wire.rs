use chrono::NaiveDate;
use opsdash_core::{AppError, AppResult};
use opsdash_domain::{
    AbsenceKind, AbsencePeriod, AbsenceStatus, DateRange, EmploymentNumber, TimeReport,
    TimeReportRow,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Flex absence type code for holiday (semester).
pub(super) const HOLIDAY_TYPE_CODE: &str = "SEM";
/// Flex absence type code for sick leave.
pub(super) const SICK_LEAVE_TYPE_CODE: &str = "SJK";
/// Flex absence type code used for every other absence.
pub(super) const OTHER_TYPE_CODE: &str = "OVR";

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub(super) struct FlexAbsenceApplication {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub(super) id: Option<String>,
    pub(super) from_date: NaiveDate,
    pub(super) to_date: NaiveDate,
    #[serde(default)]
    pub(super) status: i32,
    pub(super) absence_type_code: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub(super) comment: Option<String>,
}

impl FlexAbsenceApplication {
    pub(super) fn from_domain(absence: &AbsencePeriod) -> Self {
        Self {
            id: absence.id.clone(),
            from_date: absence.range.from(),
            to_date: absence.range.to(),
            status: status_code(absence.status),
            absence_type_code: type_code(absence.kind).to_owned(),
            comment: absence.comment.clone(),
        }
    }

    pub(super) fn to_json(&self) -> AppResult<Value> {
        serde_json::to_value(self).map_err(|error| {
            AppError::Internal(format!("failed to encode flex absence application: {error}"))
        })
    }

    pub(super) fn into_domain(self) -> AppResult<AbsencePeriod> {
        Ok(AbsencePeriod {
            id: self.id,
            range: DateRange::new(self.from_date, self.to_date)?,
            status: status_from_code(self.status)?,
            kind: kind_from_code(&self.absence_type_code),
            comment: self.comment.filter(|comment| !comment.trim().is_empty()),
        })
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub(super) struct FlexTimeReportRow {
    pub(super) project_code: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub(super) activity_code: Option<String>,
    pub(super) hours: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub(super) comment: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub(super) struct FlexTimeReport {
    #[serde(default)]
    pub(super) rows: Vec<FlexTimeReportRow>,
    #[serde(default)]
    pub(super) is_submitted: bool,
}

impl FlexTimeReport {
    pub(super) fn from_domain(report: &TimeReport) -> Self {
        Self {
            rows: report
                .rows
                .iter()
                .map(|row| FlexTimeReportRow {
                    project_code: row.project_code.clone(),
                    activity_code: row.activity_code.clone(),
                    hours: row.hours,
                    comment: row.comment.clone(),
                })
                .collect(),
            is_submitted: report.submitted,
        }
    }

    pub(super) fn to_json(&self) -> AppResult<Value> {
        serde_json::to_value(self).map_err(|error| {
            AppError::Internal(format!("failed to encode flex time report: {error}"))
        })
    }

    pub(super) fn into_domain(self, employment_number: EmploymentNumber, date: NaiveDate) -> TimeReport {
        TimeReport {
            employment_number,
            date,
            rows: self
                .rows
                .into_iter()
                .map(|row| TimeReportRow {
                    project_code: row.project_code,
                    activity_code: row.activity_code,
                    hours: row.hours,
                    comment: row.comment,
                })
                .collect(),
            submitted: self.is_submitted,
        }
    }
}

/// Flex numeric status codes: 0 registered, 1 applied for, 2 audited, 3 rejected.
pub(super) fn status_code(status: AbsenceStatus) -> i32 {
    match status {
        AbsenceStatus::Registered => 0,
        AbsenceStatus::AppliedFor => 1,
        AbsenceStatus::Audited => 2,
        AbsenceStatus::Rejected => 3,
    }
}

pub(super) fn status_from_code(code: i32) -> AppResult<AbsenceStatus> {
    match code {
        0 => Ok(AbsenceStatus::Registered),
        1 => Ok(AbsenceStatus::AppliedFor),
        2 => Ok(AbsenceStatus::Audited),
        3 => Ok(AbsenceStatus::Rejected),
        other => Err(AppError::Upstream(format!(
            "flex returned unknown absence status code {other}"
        ))),
    }
}

pub(super) fn type_code(kind: AbsenceKind) -> &'static str {
    match kind {
        AbsenceKind::Holiday => HOLIDAY_TYPE_CODE,
        AbsenceKind::SickLeave => SICK_LEAVE_TYPE_CODE,
        AbsenceKind::Other => OTHER_TYPE_CODE,
    }
}

pub(super) fn kind_from_code(code: &str) -> AbsenceKind {
    match code.trim().to_ascii_uppercase().as_str() {
        HOLIDAY_TYPE_CODE => AbsenceKind::Holiday,
        SICK_LEAVE_TYPE_CODE => AbsenceKind::SickLeave,
        _ => AbsenceKind::Other,
    }
}
