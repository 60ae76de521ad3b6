//! Administration of users, profiles, permission sets and system permissions.
//!
//! Every operation requires the `rbac.manage` capability.

use std::sync::Arc;

use opsdash_core::{AppResult, UserIdentity};
use opsdash_domain::Capability;

use crate::{AccessService, RbacRepository};

mod bundles;
mod users;

/// Application service for RBAC administration.
#[derive(Clone)]
pub struct RbacAdminService {
    access_service: AccessService,
    repository: Arc<dyn RbacRepository>,
}

impl RbacAdminService {
    /// Creates a new RBAC administration service.
    #[must_use]
    pub fn new(access_service: AccessService, repository: Arc<dyn RbacRepository>) -> Self {
        Self {
            access_service,
            repository,
        }
    }

    async fn require_manage(&self, actor: &UserIdentity) -> AppResult<()> {
        self.access_service
            .require_capability(actor, Capability::RbacManage)
            .await
            .map(|_| ())
    }
}

#[cfg(test)]
mod tests;
