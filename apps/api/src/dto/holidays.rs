use opsdash_application::AbsenceInput;
use opsdash_core::{AppError, AppResult};
use opsdash_domain::{AbsenceKind, AbsencePeriod, BankHoliday, HolidaySummary, PeriodUsage};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use super::common::{FiscalWindowResponse, parse_date_range};

/// Holiday balance for the current fiscal year.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/holiday-summary-response.ts"
)]
pub struct HolidaySummaryResponse {
    pub fiscal_year: FiscalWindowResponse,
    pub periods: Vec<PeriodUsageResponse>,
    pub used_days: u32,
    pub used_in_fiscal_year: u32,
    pub allowance: u32,
    #[ts(type = "number")]
    pub available: i64,
    pub next_reset_date: String,
}

impl From<HolidaySummary> for HolidaySummaryResponse {
    fn from(value: HolidaySummary) -> Self {
        Self {
            fiscal_year: FiscalWindowResponse::from(value.fiscal_year),
            periods: value
                .periods
                .into_iter()
                .map(PeriodUsageResponse::from)
                .collect(),
            used_days: value.used_days,
            used_in_fiscal_year: value.used_in_fiscal_year,
            allowance: value.allowance,
            available: value.available,
            next_reset_date: value.next_reset_date.to_string(),
        }
    }
}

/// Working days one absence consumes.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/period-usage-response.ts"
)]
pub struct PeriodUsageResponse {
    pub absence_id: Option<String>,
    pub from: String,
    pub to: String,
    pub status: String,
    pub days: u32,
    pub days_in_fiscal_year: u32,
}

impl From<PeriodUsage> for PeriodUsageResponse {
    fn from(value: PeriodUsage) -> Self {
        Self {
            absence_id: value.absence_id,
            from: value.range.from().to_string(),
            to: value.range.to().to_string(),
            status: value.status.as_str().to_owned(),
            days: value.days,
            days_in_fiscal_year: value.days_in_fiscal_year,
        }
    }
}

/// One Swedish bank holiday.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/bank-holiday-response.ts"
)]
pub struct BankHolidayResponse {
    pub date: String,
    pub name: String,
}

impl From<BankHoliday> for BankHolidayResponse {
    fn from(value: BankHoliday) -> Self {
        Self {
            date: value.date.to_string(),
            name: value.name.to_owned(),
        }
    }
}

/// Absence application stored in the HR system.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/absence-response.ts"
)]
pub struct AbsenceResponse {
    pub id: Option<String>,
    pub from: String,
    pub to: String,
    pub status: String,
    pub kind: String,
    pub comment: Option<String>,
}

impl From<AbsencePeriod> for AbsenceResponse {
    fn from(value: AbsencePeriod) -> Self {
        Self {
            id: value.id,
            from: value.range.from().to_string(),
            to: value.range.to().to_string(),
            status: value.status.as_str().to_owned(),
            kind: value.kind.as_str().to_owned(),
            comment: value.comment,
        }
    }
}

/// Incoming payload for absence applications and changes.
#[derive(Debug, Deserialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/absence-request.ts"
)]
pub struct AbsenceRequest {
    pub from: String,
    pub to: String,
    #[serde(default)]
    pub kind: Option<String>,
    #[serde(default)]
    pub comment: Option<String>,
}

impl TryFrom<AbsenceRequest> for AbsenceInput {
    type Error = AppError;

    fn try_from(value: AbsenceRequest) -> AppResult<Self> {
        let kind = value
            .kind
            .as_deref()
            .map(str::parse::<AbsenceKind>)
            .transpose()?
            .unwrap_or(AbsenceKind::Holiday);

        Ok(Self {
            range: parse_date_range(&value.from, &value.to)?,
            kind,
            comment: value
                .comment
                .map(|comment| comment.trim().to_owned())
                .filter(|comment| !comment.is_empty()),
        })
    }
}

/// Optional window for absence listings.
#[derive(Debug, Deserialize)]
pub struct AbsenceListQuery {
    pub from: Option<String>,
    pub to: Option<String>,
}

#[cfg(test)]
mod tests {
    use opsdash_application::AbsenceInput;
    use opsdash_domain::AbsenceKind;

    use super::AbsenceRequest;

    #[test]
    fn absence_kind_defaults_to_holiday() {
        let request = AbsenceRequest {
            from: "2025-07-07".to_owned(),
            to: "2025-07-18".to_owned(),
            kind: None,
            comment: Some("  ".to_owned()),
        };

        let Ok(input) = AbsenceInput::try_from(request) else {
            panic!("request should convert");
        };
        assert_eq!(input.kind, AbsenceKind::Holiday);
        assert_eq!(input.comment, None);
    }

    #[test]
    fn unknown_absence_kind_is_rejected() {
        let request = AbsenceRequest {
            from: "2025-07-07".to_owned(),
            to: "2025-07-18".to_owned(),
            kind: Some("sabbatical".to_owned()),
            comment: None,
        };

        assert!(AbsenceInput::try_from(request).is_err());
    }
}
