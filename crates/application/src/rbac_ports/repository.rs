use async_trait::async_trait;
use opsdash_core::AppResult;
use opsdash_domain::{
    EmailAddress, HolidayAllowance, PermissionSet, PermissionSetId, Profile, ProfileId,
    SystemPermission, SystemPermissionId, User, UserId,
};

use super::inputs::{
    CreateUserInput, PermissionBundle, SavePermissionSetInput, SaveProfileInput,
    SaveSystemPermissionInput, UpdateUserInput,
};

/// Repository port for users, profiles, permission sets and system permissions.
///
/// Connect operations are idempotent and disconnecting a missing link is a
/// no-op. Updates and deletes of missing rows return `AppError::NotFound`.
#[async_trait]
pub trait RbacRepository: Send + Sync {
    /// Finds one user by id.
    async fn find_user(&self, user_id: UserId) -> AppResult<Option<User>>;

    /// Finds one user by sign-in email.
    async fn find_user_by_email(&self, email: &EmailAddress) -> AppResult<Option<User>>;

    /// Lists all users ordered by display name.
    async fn list_users(&self) -> AppResult<Vec<User>>;

    /// Creates a user.
    async fn create_user(&self, input: CreateUserInput) -> AppResult<User>;

    /// Updates user details.
    async fn update_user(&self, user_id: UserId, input: UpdateUserInput) -> AppResult<User>;

    /// Deletes a user and their permission set links.
    async fn delete_user(&self, user_id: UserId) -> AppResult<()>;

    /// Replaces the profile assigned to a user.
    async fn set_user_profile(&self, user_id: UserId, profile_id: ProfileId) -> AppResult<()>;

    /// Replaces the holiday allowance of a user.
    async fn set_holiday_allowance(
        &self,
        user_id: UserId,
        allowance: HolidayAllowance,
    ) -> AppResult<()>;

    /// Links a permission set to a user.
    async fn connect_permission_set_to_user(
        &self,
        user_id: UserId,
        permission_set_id: PermissionSetId,
    ) -> AppResult<()>;

    /// Unlinks a permission set from a user.
    async fn disconnect_permission_set_from_user(
        &self,
        user_id: UserId,
        permission_set_id: PermissionSetId,
    ) -> AppResult<()>;

    /// Lists permission sets linked to a user, including their permissions.
    async fn list_permission_sets_for_user(&self, user_id: UserId)
    -> AppResult<Vec<PermissionSet>>;

    /// Finds one profile with its permissions.
    async fn find_profile(&self, profile_id: ProfileId) -> AppResult<Option<Profile>>;

    /// Lists all profiles with their permissions.
    async fn list_profiles(&self) -> AppResult<Vec<Profile>>;

    /// Creates a profile without permissions.
    async fn create_profile(&self, input: SaveProfileInput) -> AppResult<Profile>;

    /// Renames a profile.
    async fn update_profile(
        &self,
        profile_id: ProfileId,
        input: SaveProfileInput,
    ) -> AppResult<Profile>;

    /// Deletes a profile.
    async fn delete_profile(&self, profile_id: ProfileId) -> AppResult<()>;

    /// Counts users currently assigned to a profile.
    async fn count_users_with_profile(&self, profile_id: ProfileId) -> AppResult<u64>;

    /// Finds one permission set with its permissions.
    async fn find_permission_set(
        &self,
        permission_set_id: PermissionSetId,
    ) -> AppResult<Option<PermissionSet>>;

    /// Lists all permission sets with their permissions.
    async fn list_permission_sets(&self) -> AppResult<Vec<PermissionSet>>;

    /// Creates a permission set without permissions.
    async fn create_permission_set(
        &self,
        input: SavePermissionSetInput,
    ) -> AppResult<PermissionSet>;

    /// Updates permission set details.
    async fn update_permission_set(
        &self,
        permission_set_id: PermissionSetId,
        input: SavePermissionSetInput,
    ) -> AppResult<PermissionSet>;

    /// Deletes a permission set and its user links.
    async fn delete_permission_set(&self, permission_set_id: PermissionSetId) -> AppResult<()>;

    /// Lists all system permissions ordered by name.
    async fn list_system_permissions(&self) -> AppResult<Vec<SystemPermission>>;

    /// Creates a system permission. Duplicate names return `AppError::Conflict`.
    async fn create_system_permission(
        &self,
        input: SaveSystemPermissionInput,
    ) -> AppResult<SystemPermission>;

    /// Deletes a system permission and its bundle links.
    async fn delete_system_permission(&self, permission_id: SystemPermissionId) -> AppResult<()>;

    /// Links a system permission to a profile or permission set.
    async fn connect_system_permission(
        &self,
        bundle: PermissionBundle,
        permission_id: SystemPermissionId,
    ) -> AppResult<()>;

    /// Unlinks a system permission from a profile or permission set.
    async fn disconnect_system_permission(
        &self,
        bundle: PermissionBundle,
        permission_id: SystemPermissionId,
    ) -> AppResult<()>;
}
