use axum::Json;
use axum::extract::{Extension, State};
use axum::http::{HeaderMap, StatusCode};
use opsdash_core::{AppError, AppResult, UserIdentity};
use tower_sessions::Session;
use tracing::info;

use crate::dto::MeResponse;
use crate::error::ApiResult;
use crate::state::AppState;

use super::SESSION_USER_KEY;

/// Signs the caller in with the email asserted by the SSO proxy.
pub async fn establish_session_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
    session: Session,
) -> ApiResult<Json<MeResponse>> {
    let email = asserted_email(&headers, &state.auth_proxy_header)?;
    let identity = state.access_service.resolve_sign_in(email).await?;

    session
        .cycle_id()
        .await
        .map_err(|error| AppError::Internal(format!("failed to cycle session id: {error}")))?;

    session
        .insert(SESSION_USER_KEY, &identity)
        .await
        .map_err(|error| {
            AppError::Internal(format!("failed to persist session identity: {error}"))
        })?;

    info!(user_id = %identity.user_id(), "session established");

    me_response(&state, &identity).await.map(Json)
}

pub async fn logout_handler(session: Session) -> ApiResult<StatusCode> {
    session
        .delete()
        .await
        .map_err(|error| AppError::Internal(format!("failed to delete session: {error}")))?;

    Ok(StatusCode::NO_CONTENT)
}

pub async fn me_handler(
    State(state): State<AppState>,
    Extension(user): Extension<UserIdentity>,
) -> ApiResult<Json<MeResponse>> {
    me_response(&state, &user).await.map(Json)
}

async fn me_response(state: &AppState, identity: &UserIdentity) -> ApiResult<MeResponse> {
    let user = state.access_service.current_user(identity).await?;
    let permissions = state.access_service.effective_permissions(user.id).await?;

    Ok(MeResponse::new(&user, permissions))
}

fn asserted_email<'a>(headers: &'a HeaderMap, header_name: &str) -> AppResult<&'a str> {
    headers
        .get(header_name)
        .and_then(|value| value.to_str().ok())
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .ok_or_else(|| {
            AppError::Unauthorized(format!("missing identity header '{header_name}'"))
        })
}
