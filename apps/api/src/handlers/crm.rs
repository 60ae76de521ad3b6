use axum::Json;
use axum::extract::{Extension, Path, Query, State};
use axum::http::StatusCode;
use opsdash_application::CrmRecordFields;
use opsdash_core::UserIdentity;

use crate::dto::{
    AssignmentResponse, CreatedRecordResponse, OccupancyResponse, OpportunityQuery,
    OpportunityResponse, TimecardQuery, TimecardResponse, parse_date,
};
use crate::error::ApiResult;
use crate::state::AppState;

use super::today;

pub async fn my_assignments_handler(
    State(state): State<AppState>,
    Extension(user): Extension<UserIdentity>,
) -> ApiResult<Json<Vec<AssignmentResponse>>> {
    let assignments = state
        .crm_service
        .my_assignments(&user)
        .await?
        .into_iter()
        .map(AssignmentResponse::from)
        .collect();

    Ok(Json(assignments))
}

/// Lists open opportunities, or runs a full-text search when `search` is set.
pub async fn opportunities_handler(
    State(state): State<AppState>,
    Extension(user): Extension<UserIdentity>,
    Query(query): Query<OpportunityQuery>,
) -> ApiResult<Json<Vec<OpportunityResponse>>> {
    let opportunities = match query.search.as_deref() {
        Some(term) => state.crm_service.search_opportunities(&user, term).await?,
        None => state.crm_service.open_opportunities(&user).await?,
    };

    Ok(Json(
        opportunities
            .into_iter()
            .map(OpportunityResponse::from)
            .collect(),
    ))
}

pub async fn timecards_handler(
    State(state): State<AppState>,
    Extension(user): Extension<UserIdentity>,
    Query(query): Query<TimecardQuery>,
) -> ApiResult<Json<Vec<TimecardResponse>>> {
    let week_start = parse_date("week_start", &query.week_start)?;
    let timecards = state
        .crm_service
        .timecards_for_week(&user, week_start)
        .await?
        .into_iter()
        .map(TimecardResponse::from)
        .collect();

    Ok(Json(timecards))
}

pub async fn occupancy_handler(
    State(state): State<AppState>,
    Extension(user): Extension<UserIdentity>,
) -> ApiResult<Json<OccupancyResponse>> {
    let report = state.crm_service.occupancy(&user, today()).await?;

    Ok(Json(OccupancyResponse::from(report)))
}

pub async fn create_record_handler(
    State(state): State<AppState>,
    Extension(user): Extension<UserIdentity>,
    Path(object): Path<String>,
    Json(fields): Json<CrmRecordFields>,
) -> ApiResult<(StatusCode, Json<CreatedRecordResponse>)> {
    let id = state
        .crm_service
        .create_record(&user, &object, fields)
        .await?;

    Ok((StatusCode::CREATED, Json(CreatedRecordResponse { id })))
}

pub async fn update_record_handler(
    State(state): State<AppState>,
    Extension(user): Extension<UserIdentity>,
    Path((object, record_id)): Path<(String, String)>,
    Json(fields): Json<CrmRecordFields>,
) -> ApiResult<StatusCode> {
    state
        .crm_service
        .update_record(&user, &object, &record_id, fields)
        .await?;

    Ok(StatusCode::NO_CONTENT)
}

pub async fn delete_record_handler(
    State(state): State<AppState>,
    Extension(user): Extension<UserIdentity>,
    Path((object, record_id)): Path<(String, String)>,
) -> ApiResult<StatusCode> {
    state
        .crm_service
        .delete_record(&user, &object, &record_id)
        .await?;

    Ok(StatusCode::NO_CONTENT)
}
