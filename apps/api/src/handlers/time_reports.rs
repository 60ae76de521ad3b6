use axum::Json;
use axum::extract::{Extension, Path, State};
use opsdash_core::UserIdentity;
use opsdash_domain::TimeReportRow;

use crate::dto::{SaveTimeReportRequest, TimeReportResponse, parse_date};
use crate::error::ApiResult;
use crate::state::AppState;

pub async fn get_time_report_handler(
    State(state): State<AppState>,
    Extension(user): Extension<UserIdentity>,
    Path(date): Path<String>,
) -> ApiResult<Json<TimeReportResponse>> {
    let report = state
        .time_report_service
        .get_time_report(&user, parse_date("date", &date)?)
        .await?;

    Ok(Json(TimeReportResponse::from(report)))
}

pub async fn save_time_report_handler(
    State(state): State<AppState>,
    Extension(user): Extension<UserIdentity>,
    Path(date): Path<String>,
    Json(payload): Json<SaveTimeReportRequest>,
) -> ApiResult<Json<TimeReportResponse>> {
    let rows = payload.rows.into_iter().map(TimeReportRow::from).collect();
    let report = state
        .time_report_service
        .save_time_report(&user, parse_date("date", &date)?, rows, payload.submit)
        .await?;

    Ok(Json(TimeReportResponse::from(report)))
}
