//! Effective permission resolution and capability checks.

use std::collections::BTreeSet;
use std::sync::Arc;

use opsdash_core::{AppError, AppResult, UserIdentity};
use opsdash_domain::{Capability, EmailAddress, User, UserId, effective_permission_names};

use crate::RbacRepository;

/// Application service resolving what a user may do.
#[derive(Clone)]
pub struct AccessService {
    repository: Arc<dyn RbacRepository>,
}

impl AccessService {
    /// Creates a new access service.
    #[must_use]
    pub fn new(repository: Arc<dyn RbacRepository>) -> Self {
        Self { repository }
    }

    /// Returns the stored user record behind an authenticated identity.
    pub async fn current_user(&self, actor: &UserIdentity) -> AppResult<User> {
        let user_id = UserId::from_uuid(actor.user_id());
        self.repository
            .find_user(user_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("user '{user_id}' does not exist")))
    }

    /// Returns the union of permission names granted by the user's profile
    /// and all of their permission sets.
    pub async fn effective_permissions(&self, user_id: UserId) -> AppResult<BTreeSet<String>> {
        let user = self
            .repository
            .find_user(user_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("user '{user_id}' does not exist")))?;

        self.permissions_for(&user).await
    }

    /// Returns whether the actor holds the capability.
    pub async fn has_capability(
        &self,
        actor: &UserIdentity,
        capability: Capability,
    ) -> AppResult<bool> {
        let user = self.current_user(actor).await?;
        let permissions = self.permissions_for(&user).await?;
        Ok(permissions.contains(capability.as_str()))
    }

    /// Ensures the actor holds the capability and returns their user record.
    pub async fn require_capability(
        &self,
        actor: &UserIdentity,
        capability: Capability,
    ) -> AppResult<User> {
        let user = self.current_user(actor).await?;
        let permissions = self.permissions_for(&user).await?;

        if !permissions.contains(capability.as_str()) {
            tracing::debug!(
                user_id = %user.id,
                capability = capability.as_str(),
                "capability check denied"
            );
            return Err(AppError::Forbidden(format!(
                "user '{}' is missing permission '{}'",
                user.email.as_str(),
                capability.as_str()
            )));
        }

        Ok(user)
    }

    /// Resolves the identity for a sign-in email asserted by the SSO proxy.
    pub async fn resolve_sign_in(&self, email: &str) -> AppResult<UserIdentity> {
        let email = EmailAddress::new(email)?;
        let user = self
            .repository
            .find_user_by_email(&email)
            .await?
            .ok_or_else(|| {
                AppError::Unauthorized(format!("no dashboard user for '{}'", email.as_str()))
            })?;

        Ok(UserIdentity::new(
            user.id.as_uuid(),
            user.display_name.as_str(),
            user.email.as_str(),
        ))
    }

    async fn permissions_for(&self, user: &User) -> AppResult<BTreeSet<String>> {
        let profile = self
            .repository
            .find_profile(user.profile_id)
            .await?
            .ok_or_else(|| {
                AppError::Internal(format!(
                    "user '{}' references missing profile '{}'",
                    user.id, user.profile_id
                ))
            })?;
        let permission_sets = self.repository.list_permission_sets_for_user(user.id).await?;

        Ok(effective_permission_names(&profile, &permission_sets))
    }
}
