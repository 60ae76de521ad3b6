use super::*;

pub async fn list_profiles_handler(
    State(state): State<AppState>,
    Extension(user): Extension<UserIdentity>,
) -> ApiResult<Json<Vec<ProfileResponse>>> {
    let profiles = state
        .rbac_admin_service
        .list_profiles(&user)
        .await?
        .into_iter()
        .map(ProfileResponse::from)
        .collect();

    Ok(Json(profiles))
}

pub async fn get_profile_handler(
    State(state): State<AppState>,
    Extension(user): Extension<UserIdentity>,
    Path(profile_id): Path<Uuid>,
) -> ApiResult<Json<ProfileResponse>> {
    let profile = state
        .rbac_admin_service
        .get_profile(&user, ProfileId::from_uuid(profile_id))
        .await?;

    Ok(Json(ProfileResponse::from(profile)))
}

pub async fn create_profile_handler(
    State(state): State<AppState>,
    Extension(user): Extension<UserIdentity>,
    Json(payload): Json<SaveProfileRequest>,
) -> ApiResult<(StatusCode, Json<ProfileResponse>)> {
    let profile = state
        .rbac_admin_service
        .create_profile(&user, SaveProfileInput::try_from(payload)?)
        .await?;

    Ok((StatusCode::CREATED, Json(ProfileResponse::from(profile))))
}

pub async fn update_profile_handler(
    State(state): State<AppState>,
    Extension(user): Extension<UserIdentity>,
    Path(profile_id): Path<Uuid>,
    Json(payload): Json<SaveProfileRequest>,
) -> ApiResult<Json<ProfileResponse>> {
    let profile = state
        .rbac_admin_service
        .update_profile(
            &user,
            ProfileId::from_uuid(profile_id),
            SaveProfileInput::try_from(payload)?,
        )
        .await?;

    Ok(Json(ProfileResponse::from(profile)))
}

pub async fn delete_profile_handler(
    State(state): State<AppState>,
    Extension(user): Extension<UserIdentity>,
    Path(profile_id): Path<Uuid>,
) -> ApiResult<StatusCode> {
    state
        .rbac_admin_service
        .delete_profile(&user, ProfileId::from_uuid(profile_id))
        .await?;

    Ok(StatusCode::NO_CONTENT)
}

pub async fn list_permission_sets_handler(
    State(state): State<AppState>,
    Extension(user): Extension<UserIdentity>,
) -> ApiResult<Json<Vec<PermissionSetResponse>>> {
    let permission_sets = state
        .rbac_admin_service
        .list_permission_sets(&user)
        .await?
        .into_iter()
        .map(PermissionSetResponse::from)
        .collect();

    Ok(Json(permission_sets))
}

pub async fn get_permission_set_handler(
    State(state): State<AppState>,
    Extension(user): Extension<UserIdentity>,
    Path(permission_set_id): Path<Uuid>,
) -> ApiResult<Json<PermissionSetResponse>> {
    let permission_set = state
        .rbac_admin_service
        .get_permission_set(&user, PermissionSetId::from_uuid(permission_set_id))
        .await?;

    Ok(Json(PermissionSetResponse::from(permission_set)))
}

pub async fn create_permission_set_handler(
    State(state): State<AppState>,
    Extension(user): Extension<UserIdentity>,
    Json(payload): Json<SaveDescribedRequest>,
) -> ApiResult<(StatusCode, Json<PermissionSetResponse>)> {
    let permission_set = state
        .rbac_admin_service
        .create_permission_set(&user, SavePermissionSetInput::try_from(payload)?)
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(PermissionSetResponse::from(permission_set)),
    ))
}

pub async fn update_permission_set_handler(
    State(state): State<AppState>,
    Extension(user): Extension<UserIdentity>,
    Path(permission_set_id): Path<Uuid>,
    Json(payload): Json<SaveDescribedRequest>,
) -> ApiResult<Json<PermissionSetResponse>> {
    let permission_set = state
        .rbac_admin_service
        .update_permission_set(
            &user,
            PermissionSetId::from_uuid(permission_set_id),
            SavePermissionSetInput::try_from(payload)?,
        )
        .await?;

    Ok(Json(PermissionSetResponse::from(permission_set)))
}

pub async fn delete_permission_set_handler(
    State(state): State<AppState>,
    Extension(user): Extension<UserIdentity>,
    Path(permission_set_id): Path<Uuid>,
) -> ApiResult<StatusCode> {
    state
        .rbac_admin_service
        .delete_permission_set(&user, PermissionSetId::from_uuid(permission_set_id))
        .await?;

    Ok(StatusCode::NO_CONTENT)
}

pub async fn list_system_permissions_handler(
    State(state): State<AppState>,
    Extension(user): Extension<UserIdentity>,
) -> ApiResult<Json<Vec<SystemPermissionResponse>>> {
    let permissions = state
        .rbac_admin_service
        .list_system_permissions(&user)
        .await?
        .into_iter()
        .map(SystemPermissionResponse::from)
        .collect();

    Ok(Json(permissions))
}

pub async fn create_system_permission_handler(
    State(state): State<AppState>,
    Extension(user): Extension<UserIdentity>,
    Json(payload): Json<SaveDescribedRequest>,
) -> ApiResult<(StatusCode, Json<SystemPermissionResponse>)> {
    let permission = state
        .rbac_admin_service
        .create_system_permission(&user, SaveSystemPermissionInput::try_from(payload)?)
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(SystemPermissionResponse::from(permission)),
    ))
}

pub async fn delete_system_permission_handler(
    State(state): State<AppState>,
    Extension(user): Extension<UserIdentity>,
    Path(permission_id): Path<Uuid>,
) -> ApiResult<StatusCode> {
    state
        .rbac_admin_service
        .delete_system_permission(&user, SystemPermissionId::from_uuid(permission_id))
        .await?;

    Ok(StatusCode::NO_CONTENT)
}

pub async fn connect_profile_permission_handler(
    State(state): State<AppState>,
    Extension(user): Extension<UserIdentity>,
    Path((profile_id, permission_id)): Path<(Uuid, Uuid)>,
) -> ApiResult<StatusCode> {
    let bundle = PermissionBundle::Profile(ProfileId::from_uuid(profile_id));
    state
        .rbac_admin_service
        .connect_system_permission(&user, bundle, SystemPermissionId::from_uuid(permission_id))
        .await?;

    Ok(StatusCode::NO_CONTENT)
}

pub async fn disconnect_profile_permission_handler(
    State(state): State<AppState>,
    Extension(user): Extension<UserIdentity>,
    Path((profile_id, permission_id)): Path<(Uuid, Uuid)>,
) -> ApiResult<StatusCode> {
    let bundle = PermissionBundle::Profile(ProfileId::from_uuid(profile_id));
    state
        .rbac_admin_service
        .disconnect_system_permission(&user, bundle, SystemPermissionId::from_uuid(permission_id))
        .await?;

    Ok(StatusCode::NO_CONTENT)
}

pub async fn connect_permission_set_permission_handler(
    State(state): State<AppState>,
    Extension(user): Extension<UserIdentity>,
    Path((permission_set_id, permission_id)): Path<(Uuid, Uuid)>,
) -> ApiResult<StatusCode> {
    let bundle = PermissionBundle::PermissionSet(PermissionSetId::from_uuid(permission_set_id));
    state
        .rbac_admin_service
        .connect_system_permission(&user, bundle, SystemPermissionId::from_uuid(permission_id))
        .await?;

    Ok(StatusCode::NO_CONTENT)
}

pub async fn disconnect_permission_set_permission_handler(
    State(state): State<AppState>,
    Extension(user): Extension<UserIdentity>,
    Path((permission_set_id, permission_id)): Path<(Uuid, Uuid)>,
) -> ApiResult<StatusCode> {
    let bundle = PermissionBundle::PermissionSet(PermissionSetId::from_uuid(permission_set_id));
    state
        .rbac_admin_service
        .disconnect_system_permission(&user, bundle, SystemPermissionId::from_uuid(permission_id))
        .await?;

    Ok(StatusCode::NO_CONTENT)
}
