use super::*;

pub async fn list_users_handler(
    State(state): State<AppState>,
    Extension(user): Extension<UserIdentity>,
) -> ApiResult<Json<Vec<UserResponse>>> {
    let users = state
        .rbac_admin_service
        .list_users(&user)
        .await?
        .into_iter()
        .map(UserResponse::from)
        .collect();

    Ok(Json(users))
}

pub async fn get_user_handler(
    State(state): State<AppState>,
    Extension(user): Extension<UserIdentity>,
    Path(user_id): Path<Uuid>,
) -> ApiResult<Json<UserResponse>> {
    let found = state
        .rbac_admin_service
        .get_user(&user, UserId::from_uuid(user_id))
        .await?;

    Ok(Json(UserResponse::from(found)))
}

pub async fn create_user_handler(
    State(state): State<AppState>,
    Extension(user): Extension<UserIdentity>,
    Json(payload): Json<CreateUserRequest>,
) -> ApiResult<(StatusCode, Json<UserResponse>)> {
    let created = state
        .rbac_admin_service
        .create_user(&user, CreateUserInput::try_from(payload)?)
        .await?;

    Ok((StatusCode::CREATED, Json(UserResponse::from(created))))
}

pub async fn update_user_handler(
    State(state): State<AppState>,
    Extension(user): Extension<UserIdentity>,
    Path(user_id): Path<Uuid>,
    Json(payload): Json<UpdateUserRequest>,
) -> ApiResult<Json<UserResponse>> {
    let updated = state
        .rbac_admin_service
        .update_user(
            &user,
            UserId::from_uuid(user_id),
            UpdateUserInput::try_from(payload)?,
        )
        .await?;

    Ok(Json(UserResponse::from(updated)))
}

pub async fn delete_user_handler(
    State(state): State<AppState>,
    Extension(user): Extension<UserIdentity>,
    Path(user_id): Path<Uuid>,
) -> ApiResult<StatusCode> {
    state
        .rbac_admin_service
        .delete_user(&user, UserId::from_uuid(user_id))
        .await?;

    Ok(StatusCode::NO_CONTENT)
}

pub async fn change_user_profile_handler(
    State(state): State<AppState>,
    Extension(user): Extension<UserIdentity>,
    Path(user_id): Path<Uuid>,
    Json(payload): Json<ChangeProfileRequest>,
) -> ApiResult<StatusCode> {
    state
        .rbac_admin_service
        .change_user_profile(&user, UserId::from_uuid(user_id), payload.profile_id()?)
        .await?;

    Ok(StatusCode::NO_CONTENT)
}

pub async fn update_holiday_allowance_handler(
    State(state): State<AppState>,
    Extension(user): Extension<UserIdentity>,
    Path(user_id): Path<Uuid>,
    Json(payload): Json<HolidayAllowanceRequest>,
) -> ApiResult<StatusCode> {
    state
        .rbac_admin_service
        .update_holiday_allowance(
            &user,
            UserId::from_uuid(user_id),
            HolidayAllowance::from(payload),
        )
        .await?;

    Ok(StatusCode::NO_CONTENT)
}

pub async fn connect_user_permission_set_handler(
    State(state): State<AppState>,
    Extension(user): Extension<UserIdentity>,
    Path((user_id, permission_set_id)): Path<(Uuid, Uuid)>,
) -> ApiResult<StatusCode> {
    state
        .rbac_admin_service
        .connect_permission_set(
            &user,
            UserId::from_uuid(user_id),
            PermissionSetId::from_uuid(permission_set_id),
        )
        .await?;

    Ok(StatusCode::NO_CONTENT)
}

pub async fn disconnect_user_permission_set_handler(
    State(state): State<AppState>,
    Extension(user): Extension<UserIdentity>,
    Path((user_id, permission_set_id)): Path<(Uuid, Uuid)>,
) -> ApiResult<StatusCode> {
    state
        .rbac_admin_service
        .disconnect_permission_set(
            &user,
            UserId::from_uuid(user_id),
            PermissionSetId::from_uuid(permission_set_id),
        )
        .await?;

    Ok(StatusCode::NO_CONTENT)
}
