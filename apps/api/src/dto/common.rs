use std::collections::BTreeSet;

use chrono::NaiveDate;
use opsdash_core::{AppError, AppResult};
use opsdash_domain::{DateRange, FiscalWindow, User};
use serde::Serialize;
use ts_rs::TS;

/// Health response payload.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/health-response.ts"
)]
pub struct HealthResponse {
    pub status: &'static str,
}

/// API representation of the signed-in user and their effective permissions.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/me-response.ts"
)]
pub struct MeResponse {
    pub user_id: String,
    pub display_name: String,
    pub email: String,
    pub employment_number: Option<String>,
    pub permissions: Vec<String>,
}

impl MeResponse {
    #[must_use]
    pub fn new(user: &User, permissions: BTreeSet<String>) -> Self {
        Self {
            user_id: user.id.to_string(),
            display_name: user.display_name.as_str().to_owned(),
            email: user.email.as_str().to_owned(),
            employment_number: user
                .employment_number
                .as_ref()
                .map(|number| number.as_str().to_owned()),
            permissions: permissions.into_iter().collect(),
        }
    }
}

/// Inclusive fiscal-year window.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/fiscal-window-response.ts"
)]
pub struct FiscalWindowResponse {
    pub definition: String,
    pub start: String,
    pub end: String,
}

impl From<FiscalWindow> for FiscalWindowResponse {
    fn from(value: FiscalWindow) -> Self {
        Self {
            definition: value.definition().as_str().to_owned(),
            start: value.start().to_string(),
            end: value.end().to_string(),
        }
    }
}

/// Parses an ISO `YYYY-MM-DD` date from a request field.
pub fn parse_date(field: &str, value: &str) -> AppResult<NaiveDate> {
    NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d")
        .map_err(|_| AppError::Validation(format!("{field} must be a YYYY-MM-DD date")))
}

/// Parses an inclusive date range from two request fields.
pub fn parse_date_range(from: &str, to: &str) -> AppResult<DateRange> {
    DateRange::new(parse_date("from", from)?, parse_date("to", to)?)
}
