use opsdash_core::{AppError, AppResult, UserIdentity};
use opsdash_domain::{
    PermissionSet, PermissionSetId, Profile, ProfileId, SystemPermission, SystemPermissionId,
};

use crate::{
    PermissionBundle, SavePermissionSetInput, SaveProfileInput, SaveSystemPermissionInput,
};

use super::RbacAdminService;

impl RbacAdminService {
    /// Lists all profiles.
    pub async fn list_profiles(&self, actor: &UserIdentity) -> AppResult<Vec<Profile>> {
        self.require_manage(actor).await?;
        self.repository.list_profiles().await
    }

    /// Returns one profile.
    pub async fn get_profile(
        &self,
        actor: &UserIdentity,
        profile_id: ProfileId,
    ) -> AppResult<Profile> {
        self.require_manage(actor).await?;
        self.repository
            .find_profile(profile_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("profile '{profile_id}' does not exist")))
    }

    /// Creates a profile.
    pub async fn create_profile(
        &self,
        actor: &UserIdentity,
        input: SaveProfileInput,
    ) -> AppResult<Profile> {
        self.require_manage(actor).await?;
        self.repository.create_profile(input).await
    }

    /// Renames a profile.
    pub async fn update_profile(
        &self,
        actor: &UserIdentity,
        profile_id: ProfileId,
        input: SaveProfileInput,
    ) -> AppResult<Profile> {
        self.require_manage(actor).await?;
        self.repository.update_profile(profile_id, input).await
    }

    /// Deletes a profile that no user is assigned to.
    pub async fn delete_profile(&self, actor: &UserIdentity, profile_id: ProfileId) -> AppResult<()> {
        self.require_manage(actor).await?;

        let assigned = self.repository.count_users_with_profile(profile_id).await?;
        if assigned > 0 {
            return Err(AppError::Conflict(format!(
                "profile '{profile_id}' is still assigned to {assigned} user(s)"
            )));
        }

        self.repository.delete_profile(profile_id).await
    }

    /// Lists all permission sets.
    pub async fn list_permission_sets(&self, actor: &UserIdentity) -> AppResult<Vec<PermissionSet>> {
        self.require_manage(actor).await?;
        self.repository.list_permission_sets().await
    }

    /// Returns one permission set.
    pub async fn get_permission_set(
        &self,
        actor: &UserIdentity,
        permission_set_id: PermissionSetId,
    ) -> AppResult<PermissionSet> {
        self.require_manage(actor).await?;
        self.repository
            .find_permission_set(permission_set_id)
            .await?
            .ok_or_else(|| {
                AppError::NotFound(format!(
                    "permission set '{permission_set_id}' does not exist"
                ))
            })
    }

    /// Creates a permission set.
    pub async fn create_permission_set(
        &self,
        actor: &UserIdentity,
        input: SavePermissionSetInput,
    ) -> AppResult<PermissionSet> {
        self.require_manage(actor).await?;
        self.repository.create_permission_set(input).await
    }

    /// Updates a permission set.
    pub async fn update_permission_set(
        &self,
        actor: &UserIdentity,
        permission_set_id: PermissionSetId,
        input: SavePermissionSetInput,
    ) -> AppResult<PermissionSet> {
        self.require_manage(actor).await?;
        self.repository
            .update_permission_set(permission_set_id, input)
            .await
    }

    /// Deletes a permission set and removes it from every user.
    pub async fn delete_permission_set(
        &self,
        actor: &UserIdentity,
        permission_set_id: PermissionSetId,
    ) -> AppResult<()> {
        self.require_manage(actor).await?;
        self.repository.delete_permission_set(permission_set_id).await
    }

    /// Lists all system permissions.
    pub async fn list_system_permissions(
        &self,
        actor: &UserIdentity,
    ) -> AppResult<Vec<SystemPermission>> {
        self.require_manage(actor).await?;
        self.repository.list_system_permissions().await
    }

    /// Creates a system permission.
    pub async fn create_system_permission(
        &self,
        actor: &UserIdentity,
        input: SaveSystemPermissionInput,
    ) -> AppResult<SystemPermission> {
        self.require_manage(actor).await?;
        self.repository.create_system_permission(input).await
    }

    /// Deletes a system permission and every grant of it.
    pub async fn delete_system_permission(
        &self,
        actor: &UserIdentity,
        permission_id: SystemPermissionId,
    ) -> AppResult<()> {
        self.require_manage(actor).await?;
        self.repository.delete_system_permission(permission_id).await
    }

    /// Grants a system permission through a profile or permission set.
    pub async fn connect_system_permission(
        &self,
        actor: &UserIdentity,
        bundle: PermissionBundle,
        permission_id: SystemPermissionId,
    ) -> AppResult<()> {
        self.require_manage(actor).await?;
        self.repository
            .connect_system_permission(bundle, permission_id)
            .await?;
        tracing::info!(?bundle, permission_id = %permission_id, actor = actor.email(), "system permission connected");
        Ok(())
    }

    /// Revokes a system permission from a profile or permission set.
    pub async fn disconnect_system_permission(
        &self,
        actor: &UserIdentity,
        bundle: PermissionBundle,
        permission_id: SystemPermissionId,
    ) -> AppResult<()> {
        self.require_manage(actor).await?;
        self.repository
            .disconnect_system_permission(bundle, permission_id)
            .await?;
        tracing::info!(?bundle, permission_id = %permission_id, actor = actor.email(), "system permission disconnected");
        Ok(())
    }
}
