use axum::Json;
use axum::extract::{Extension, Path, State};
use axum::http::StatusCode;
use opsdash_application::{
    CreateUserInput, PermissionBundle, SavePermissionSetInput, SaveProfileInput,
    SaveSystemPermissionInput, UpdateUserInput,
};
use opsdash_core::UserIdentity;
use opsdash_domain::{HolidayAllowance, PermissionSetId, ProfileId, SystemPermissionId, UserId};
use uuid::Uuid;

use crate::dto::{
    ChangeProfileRequest, CreateUserRequest, HolidayAllowanceRequest, PermissionSetResponse,
    ProfileResponse, SaveDescribedRequest, SaveProfileRequest, SystemPermissionResponse,
    UpdateUserRequest, UserResponse,
};
use crate::error::ApiResult;
use crate::state::AppState;

mod bundles;
mod users;

pub use bundles::{
    connect_permission_set_permission_handler, connect_profile_permission_handler,
    create_permission_set_handler, create_profile_handler, create_system_permission_handler,
    delete_permission_set_handler, delete_profile_handler, delete_system_permission_handler,
    disconnect_permission_set_permission_handler, disconnect_profile_permission_handler,
    get_permission_set_handler, get_profile_handler, list_permission_sets_handler,
    list_profiles_handler, list_system_permissions_handler, update_permission_set_handler,
    update_profile_handler,
};
pub use users::{
    change_user_profile_handler, connect_user_permission_set_handler, create_user_handler,
    delete_user_handler, disconnect_user_permission_set_handler, get_user_handler,
    list_users_handler, update_holiday_allowance_handler, update_user_handler,
};
