use axum::Json;
use axum::extract::{Extension, Path, Query, State};
use axum::http::StatusCode;
use opsdash_application::AbsenceInput;
use opsdash_core::UserIdentity;
use opsdash_domain::{DateRange, FiscalYearDefinition};

use crate::dto::{
    AbsenceListQuery, AbsenceRequest, AbsenceResponse, BankHolidayResponse,
    HolidaySummaryResponse, parse_date,
};
use crate::error::ApiResult;
use crate::state::AppState;

use super::today;

pub async fn holiday_summary_handler(
    State(state): State<AppState>,
    Extension(user): Extension<UserIdentity>,
) -> ApiResult<Json<HolidaySummaryResponse>> {
    let summary = state
        .holiday_service
        .holiday_summary(&user, today())
        .await?;

    Ok(Json(HolidaySummaryResponse::from(summary)))
}

pub async fn bank_holidays_handler(
    State(state): State<AppState>,
    Path(year): Path<i32>,
) -> ApiResult<Json<Vec<BankHolidayResponse>>> {
    let holidays = state
        .holiday_service
        .bank_holidays(year)?
        .into_iter()
        .map(BankHolidayResponse::from)
        .collect();

    Ok(Json(holidays))
}

/// Lists absences in the requested window, defaulting to the current holiday year.
pub async fn list_absences_handler(
    State(state): State<AppState>,
    Extension(user): Extension<UserIdentity>,
    Query(query): Query<AbsenceListQuery>,
) -> ApiResult<Json<Vec<AbsenceResponse>>> {
    let current_year = FiscalYearDefinition::AprilToMarch.window_containing(today())?;
    let from = query
        .from
        .as_deref()
        .map(|value| parse_date("from", value))
        .transpose()?
        .unwrap_or(current_year.start());
    let to = query
        .to
        .as_deref()
        .map(|value| parse_date("to", value))
        .transpose()?
        .unwrap_or(current_year.end());

    let absences = state
        .holiday_service
        .list_absences(&user, DateRange::new(from, to)?)
        .await?
        .into_iter()
        .map(AbsenceResponse::from)
        .collect();

    Ok(Json(absences))
}

pub async fn apply_for_absence_handler(
    State(state): State<AppState>,
    Extension(user): Extension<UserIdentity>,
    Json(payload): Json<AbsenceRequest>,
) -> ApiResult<(StatusCode, Json<AbsenceResponse>)> {
    let absence = state
        .holiday_service
        .apply_for_absence(&user, AbsenceInput::try_from(payload)?)
        .await?;

    Ok((StatusCode::CREATED, Json(AbsenceResponse::from(absence))))
}

pub async fn update_absence_handler(
    State(state): State<AppState>,
    Extension(user): Extension<UserIdentity>,
    Path(absence_id): Path<String>,
    Json(payload): Json<AbsenceRequest>,
) -> ApiResult<Json<AbsenceResponse>> {
    let absence = state
        .holiday_service
        .update_absence(&user, &absence_id, AbsenceInput::try_from(payload)?)
        .await?;

    Ok(Json(AbsenceResponse::from(absence)))
}

pub async fn delete_absence_handler(
    State(state): State<AppState>,
    Extension(user): Extension<UserIdentity>,
    Path(absence_id): Path<String>,
) -> ApiResult<StatusCode> {
    state
        .holiday_service
        .delete_absence(&user, &absence_id)
        .await?;

    Ok(StatusCode::NO_CONTENT)
}
