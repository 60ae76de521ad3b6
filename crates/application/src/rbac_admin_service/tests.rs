use std::sync::Arc;

use opsdash_core::AppError;
use opsdash_domain::{HolidayAllowance, PermissionSetId, ProfileId};

use super::RbacAdminService;
use crate::test_support::{FakeRbacRepository, email, identity_for, name};
use crate::{
    AccessService, CreateUserInput, PermissionBundle, SavePermissionSetInput, SaveProfileInput,
    SaveSystemPermissionInput,
};

fn service(repository: Arc<FakeRbacRepository>) -> RbacAdminService {
    RbacAdminService::new(AccessService::new(repository.clone()), repository)
}

#[tokio::test]
async fn operations_require_rbac_manage() {
    let repository = Arc::new(FakeRbacRepository::default());
    let actor = repository.seed_user(&["dashboard.view"], &[]).await;
    let service = service(repository);

    let result = service.list_users(&identity_for(&actor)).await;
    assert!(matches!(result, Err(AppError::Forbidden(_))));
}

#[tokio::test]
async fn create_user_requires_existing_profile() {
    let repository = Arc::new(FakeRbacRepository::default());
    let actor = repository.seed_user(&["rbac.manage"], &[]).await;
    let service = service(repository);

    let result = service
        .create_user(
            &identity_for(&actor),
            CreateUserInput {
                display_name: name("Erik Lund"),
                email: email("erik.lund@example.se"),
                employment_number: None,
                profile_id: ProfileId::new(),
                holiday_allowance: HolidayAllowance::default(),
            },
        )
        .await;
    assert!(matches!(result, Err(AppError::NotFound(_))));
}

#[tokio::test]
async fn delete_profile_in_use_is_conflict() {
    let repository = Arc::new(FakeRbacRepository::default());
    let actor = repository.seed_user(&["rbac.manage"], &[]).await;
    let service = service(repository);

    let result = service
        .delete_profile(&identity_for(&actor), actor.profile_id)
        .await;
    assert!(matches!(result, Err(AppError::Conflict(_))));
}

#[tokio::test]
async fn unused_profile_can_be_deleted() {
    let repository = Arc::new(FakeRbacRepository::default());
    let actor = repository.seed_user(&["rbac.manage"], &[]).await;
    let identity = identity_for(&actor);
    let service = service(repository);

    let Ok(profile) = service
        .create_profile(
            &identity,
            SaveProfileInput {
                name: name("Sales"),
            },
        )
        .await
    else {
        panic!("profile should be created");
    };

    assert!(service.delete_profile(&identity, profile.id).await.is_ok());
}

#[tokio::test]
async fn connecting_permission_twice_grants_once() {
    let repository = Arc::new(FakeRbacRepository::default());
    let actor = repository.seed_user(&["rbac.manage"], &[]).await;
    let identity = identity_for(&actor);
    let service = service(repository);

    let Ok(permission) = service
        .create_system_permission(
            &identity,
            SaveSystemPermissionInput {
                name: name("crm.write"),
                description: None,
            },
        )
        .await
    else {
        panic!("permission should be created");
    };
    let bundle = PermissionBundle::Profile(actor.profile_id);

    for _ in 0..2 {
        let result = service
            .connect_system_permission(&identity, bundle, permission.id)
            .await;
        assert!(result.is_ok());
    }

    let Ok(profile) = service.get_profile(&identity, actor.profile_id).await else {
        panic!("profile should exist");
    };
    let grants = profile
        .permissions
        .iter()
        .filter(|granted| granted.id == permission.id)
        .count();
    assert_eq!(grants, 1);
}

#[tokio::test]
async fn disconnecting_missing_link_is_a_no_op() {
    let repository = Arc::new(FakeRbacRepository::default());
    let actor = repository.seed_user(&["rbac.manage"], &[]).await;
    let service = service(repository);

    let result = service
        .disconnect_permission_set(&identity_for(&actor), actor.id, PermissionSetId::new())
        .await;
    assert!(result.is_ok());
}

#[tokio::test]
async fn connect_unknown_permission_set_is_not_found() {
    let repository = Arc::new(FakeRbacRepository::default());
    let actor = repository.seed_user(&["rbac.manage"], &[]).await;
    let service = service(repository);

    let result = service
        .connect_permission_set(&identity_for(&actor), actor.id, PermissionSetId::new())
        .await;
    assert!(matches!(result, Err(AppError::NotFound(_))));
}

#[tokio::test]
async fn permission_set_grants_flow_into_effective_permissions() {
    let repository = Arc::new(FakeRbacRepository::default());
    let actor = repository.seed_user(&["rbac.manage"], &[]).await;
    let identity = identity_for(&actor);
    let access_service = AccessService::new(repository.clone());
    let service = service(repository);

    let Ok(set) = service
        .create_permission_set(
            &identity,
            SavePermissionSetInput {
                name: name("Occupancy"),
                description: Some("Reporting".to_owned()),
            },
        )
        .await
    else {
        panic!("permission set should be created");
    };
    let Ok(permission) = service
        .create_system_permission(
            &identity,
            SaveSystemPermissionInput {
                name: name("occupancy.view"),
                description: None,
            },
        )
        .await
    else {
        panic!("permission should be created");
    };

    assert!(
        service
            .connect_system_permission(&identity, PermissionBundle::PermissionSet(set.id), permission.id)
            .await
            .is_ok()
    );
    assert!(
        service
            .connect_permission_set(&identity, actor.id, set.id)
            .await
            .is_ok()
    );

    let permissions = access_service.effective_permissions(actor.id).await;
    assert!(
        permissions
            .map(|names| names.contains("occupancy.view"))
            .unwrap_or(false)
    );
}

#[tokio::test]
async fn change_user_profile_moves_user() {
    let repository = Arc::new(FakeRbacRepository::default());
    let actor = repository.seed_user(&["rbac.manage"], &[]).await;
    let identity = identity_for(&actor);
    let service = service(repository.clone());

    let Ok(profile) = service
        .create_profile(
            &identity,
            SaveProfileInput {
                name: name("Manager"),
            },
        )
        .await
    else {
        panic!("profile should be created");
    };

    let result = service
        .change_user_profile(&identity, actor.id, profile.id)
        .await;
    assert!(result.is_ok());
    assert_eq!(repository.profile_of(actor.id).await, Some(profile.id));
}

#[tokio::test]
async fn actors_cannot_delete_themselves() {
    let repository = Arc::new(FakeRbacRepository::default());
    let actor = repository.seed_user(&["rbac.manage"], &[]).await;
    let service = service(repository);

    let result = service.delete_user(&identity_for(&actor), actor.id).await;
    assert!(matches!(result, Err(AppError::Conflict(_))));
}
