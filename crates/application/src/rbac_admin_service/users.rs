use opsdash_core::{AppError, AppResult, UserIdentity};
use opsdash_domain::{HolidayAllowance, PermissionSetId, ProfileId, User, UserId};

use crate::{CreateUserInput, UpdateUserInput};

use super::RbacAdminService;

impl RbacAdminService {
    /// Lists all users.
    pub async fn list_users(&self, actor: &UserIdentity) -> AppResult<Vec<User>> {
        self.require_manage(actor).await?;
        self.repository.list_users().await
    }

    /// Returns one user.
    pub async fn get_user(&self, actor: &UserIdentity, user_id: UserId) -> AppResult<User> {
        self.require_manage(actor).await?;
        self.repository
            .find_user(user_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("user '{user_id}' does not exist")))
    }

    /// Creates a user with an existing profile.
    pub async fn create_user(
        &self,
        actor: &UserIdentity,
        input: CreateUserInput,
    ) -> AppResult<User> {
        self.require_manage(actor).await?;
        self.ensure_profile_exists(input.profile_id).await?;

        let user = self.repository.create_user(input).await?;
        tracing::info!(user_id = %user.id, actor = actor.email(), "user created");
        Ok(user)
    }

    /// Updates user details.
    pub async fn update_user(
        &self,
        actor: &UserIdentity,
        user_id: UserId,
        input: UpdateUserInput,
    ) -> AppResult<User> {
        self.require_manage(actor).await?;
        self.repository.update_user(user_id, input).await
    }

    /// Deletes a user. Actors cannot delete themselves.
    pub async fn delete_user(&self, actor: &UserIdentity, user_id: UserId) -> AppResult<()> {
        self.require_manage(actor).await?;
        if user_id.as_uuid() == actor.user_id() {
            return Err(AppError::Conflict(
                "users cannot delete their own account".to_owned(),
            ));
        }

        self.repository.delete_user(user_id).await?;
        tracing::info!(user_id = %user_id, actor = actor.email(), "user deleted");
        Ok(())
    }

    /// Moves a user to another profile.
    pub async fn change_user_profile(
        &self,
        actor: &UserIdentity,
        user_id: UserId,
        profile_id: ProfileId,
    ) -> AppResult<()> {
        self.require_manage(actor).await?;
        self.ensure_profile_exists(profile_id).await?;
        self.repository.set_user_profile(user_id, profile_id).await
    }

    /// Replaces a user's holiday allowance.
    pub async fn update_holiday_allowance(
        &self,
        actor: &UserIdentity,
        user_id: UserId,
        allowance: HolidayAllowance,
    ) -> AppResult<()> {
        self.require_manage(actor).await?;
        self.repository
            .set_holiday_allowance(user_id, allowance)
            .await
    }

    /// Gives a user an additional permission set. Connecting twice is a no-op.
    pub async fn connect_permission_set(
        &self,
        actor: &UserIdentity,
        user_id: UserId,
        permission_set_id: PermissionSetId,
    ) -> AppResult<()> {
        self.require_manage(actor).await?;
        if self
            .repository
            .find_permission_set(permission_set_id)
            .await?
            .is_none()
        {
            return Err(AppError::NotFound(format!(
                "permission set '{permission_set_id}' does not exist"
            )));
        }

        self.repository
            .connect_permission_set_to_user(user_id, permission_set_id)
            .await
    }

    /// Removes a permission set from a user. Missing links are ignored.
    pub async fn disconnect_permission_set(
        &self,
        actor: &UserIdentity,
        user_id: UserId,
        permission_set_id: PermissionSetId,
    ) -> AppResult<()> {
        self.require_manage(actor).await?;
        self.repository
            .disconnect_permission_set_from_user(user_id, permission_set_id)
            .await
    }

    pub(super) async fn ensure_profile_exists(&self, profile_id: ProfileId) -> AppResult<()> {
        match self.repository.find_profile(profile_id).await? {
            Some(_) => Ok(()),
            None => Err(AppError::NotFound(format!(
                "profile '{profile_id}' does not exist"
            ))),
        }
    }
}
