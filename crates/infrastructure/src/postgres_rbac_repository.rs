//! PostgreSQL-backed repository for users, profiles, permission sets and
//! system permissions.

use async_trait::async_trait;
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

use opsdash_application::{
    CreateUserInput, PermissionBundle, RbacRepository, SavePermissionSetInput, SaveProfileInput,
    SaveSystemPermissionInput, UpdateUserInput,
};
use opsdash_core::{AppError, AppResult, NonEmptyString};
use opsdash_domain::{
    EmailAddress, EmploymentNumber, HolidayAllowance, PermissionSet, PermissionSetId, Profile,
    ProfileId, SystemPermission, SystemPermissionId, User, UserId,
};

mod bundles;
mod system_permissions;
mod users;

/// PostgreSQL implementation of the RBAC repository port.
#[derive(Clone)]
pub struct PostgresRbacRepository {
    pool: PgPool,
}

impl PostgresRbacRepository {
    /// Creates a repository with the provided connection pool.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

const USER_SELECT: &str = r#"
    SELECT
        users.id,
        users.display_name,
        users.email,
        users.employment_number,
        users.profile_id,
        users.holiday_days_per_year,
        users.saved_holiday_days,
        ARRAY(
            SELECT links.permission_set_id
            FROM user_permission_sets AS links
            WHERE links.user_id = users.id
            ORDER BY links.created_at, links.permission_set_id
        ) AS permission_set_ids
    FROM users
"#;

#[derive(Debug, FromRow)]
struct UserRow {
    id: Uuid,
    display_name: String,
    email: String,
    employment_number: Option<String>,
    profile_id: Uuid,
    holiday_days_per_year: i32,
    saved_holiday_days: i32,
    permission_set_ids: Vec<Uuid>,
}

impl TryFrom<UserRow> for User {
    type Error = AppError;

    fn try_from(row: UserRow) -> Result<Self, Self::Error> {
        let days_per_year = u32::try_from(row.holiday_days_per_year).map_err(|_| {
            AppError::Internal(format!(
                "user '{}' has negative holiday days per year",
                row.id
            ))
        })?;
        let saved_days = u32::try_from(row.saved_holiday_days).map_err(|_| {
            AppError::Internal(format!("user '{}' has negative saved holiday days", row.id))
        })?;

        Ok(Self {
            id: UserId::from_uuid(row.id),
            display_name: NonEmptyString::new(row.display_name)?,
            email: EmailAddress::new(row.email)?,
            employment_number: row.employment_number.map(EmploymentNumber::new).transpose()?,
            profile_id: ProfileId::from_uuid(row.profile_id),
            permission_set_ids: row
                .permission_set_ids
                .into_iter()
                .map(PermissionSetId::from_uuid)
                .collect(),
            holiday_allowance: HolidayAllowance {
                days_per_year,
                saved_days,
            },
        })
    }
}

#[derive(Debug, FromRow)]
struct SystemPermissionRow {
    id: Uuid,
    name: String,
    description: Option<String>,
}

impl TryFrom<SystemPermissionRow> for SystemPermission {
    type Error = AppError;

    fn try_from(row: SystemPermissionRow) -> Result<Self, Self::Error> {
        Ok(Self {
            id: SystemPermissionId::from_uuid(row.id),
            name: NonEmptyString::new(row.name)?,
            description: row.description,
        })
    }
}

/// One bundle joined with at most one of its granted permissions.
#[derive(Debug, FromRow)]
struct BundleGrantRow {
    bundle_id: Uuid,
    bundle_name: String,
    bundle_description: Option<String>,
    permission_id: Option<Uuid>,
    permission_name: Option<String>,
    permission_description: Option<String>,
}

/// Bundle with its grants, before conversion to a profile or permission set.
struct BundleAggregate {
    id: Uuid,
    name: NonEmptyString,
    description: Option<String>,
    permissions: Vec<SystemPermission>,
}

/// Folds rows ordered by bundle into one aggregate per bundle.
fn aggregate_bundles(rows: Vec<BundleGrantRow>) -> AppResult<Vec<BundleAggregate>> {
    let mut bundles: Vec<BundleAggregate> = Vec::new();

    for row in rows {
        if bundles.last().is_none_or(|bundle| bundle.id != row.bundle_id) {
            bundles.push(BundleAggregate {
                id: row.bundle_id,
                name: NonEmptyString::new(row.bundle_name)?,
                description: row.bundle_description,
                permissions: Vec::new(),
            });
        }

        if let (Some(permission_id), Some(permission_name)) = (row.permission_id, row.permission_name)
            && let Some(bundle) = bundles.last_mut()
        {
            bundle.permissions.push(SystemPermission {
                id: SystemPermissionId::from_uuid(permission_id),
                name: NonEmptyString::new(permission_name)?,
                description: row.permission_description,
            });
        }
    }

    Ok(bundles)
}

enum Violation {
    Unique,
    ForeignKey,
}

fn violation(error: &sqlx::Error) -> Option<Violation> {
    let sqlx::Error::Database(database_error) = error else {
        return None;
    };

    match database_error.code().as_deref() {
        Some("23505") => Some(Violation::Unique),
        Some("23503") => Some(Violation::ForeignKey),
        _ => None,
    }
}

fn internal(operation: &str, error: sqlx::Error) -> AppError {
    AppError::Internal(format!("failed to {operation}: {error}"))
}

#[async_trait]
impl RbacRepository for PostgresRbacRepository {
    async fn find_user(&self, user_id: UserId) -> AppResult<Option<User>> {
        self.find_user_impl(user_id).await
    }

    async fn find_user_by_email(&self, email: &EmailAddress) -> AppResult<Option<User>> {
        self.find_user_by_email_impl(email).await
    }

    async fn list_users(&self) -> AppResult<Vec<User>> {
        self.list_users_impl().await
    }

    async fn create_user(&self, input: CreateUserInput) -> AppResult<User> {
        self.create_user_impl(input).await
    }

    async fn update_user(&self, user_id: UserId, input: UpdateUserInput) -> AppResult<User> {
        self.update_user_impl(user_id, input).await
    }

    async fn delete_user(&self, user_id: UserId) -> AppResult<()> {
        self.delete_user_impl(user_id).await
    }

    async fn set_user_profile(&self, user_id: UserId, profile_id: ProfileId) -> AppResult<()> {
        self.set_user_profile_impl(user_id, profile_id).await
    }

    async fn set_holiday_allowance(
        &self,
        user_id: UserId,
        allowance: HolidayAllowance,
    ) -> AppResult<()> {
        self.set_holiday_allowance_impl(user_id, allowance).await
    }

    async fn connect_permission_set_to_user(
        &self,
        user_id: UserId,
        permission_set_id: PermissionSetId,
    ) -> AppResult<()> {
        self.connect_permission_set_to_user_impl(user_id, permission_set_id)
            .await
    }

    async fn disconnect_permission_set_from_user(
        &self,
        user_id: UserId,
        permission_set_id: PermissionSetId,
    ) -> AppResult<()> {
        self.disconnect_permission_set_from_user_impl(user_id, permission_set_id)
            .await
    }

    async fn list_permission_sets_for_user(
        &self,
        user_id: UserId,
    ) -> AppResult<Vec<PermissionSet>> {
        self.fetch_permission_sets(None, Some(user_id)).await
    }

    async fn find_profile(&self, profile_id: ProfileId) -> AppResult<Option<Profile>> {
        Ok(self.fetch_profiles(Some(profile_id)).await?.into_iter().next())
    }

    async fn list_profiles(&self) -> AppResult<Vec<Profile>> {
        self.fetch_profiles(None).await
    }

    async fn create_profile(&self, input: SaveProfileInput) -> AppResult<Profile> {
        self.create_profile_impl(input).await
    }

    async fn update_profile(
        &self,
        profile_id: ProfileId,
        input: SaveProfileInput,
    ) -> AppResult<Profile> {
        self.update_profile_impl(profile_id, input).await
    }

    async fn delete_profile(&self, profile_id: ProfileId) -> AppResult<()> {
        self.delete_profile_impl(profile_id).await
    }

    async fn count_users_with_profile(&self, profile_id: ProfileId) -> AppResult<u64> {
        self.count_users_with_profile_impl(profile_id).await
    }

    async fn find_permission_set(
        &self,
        permission_set_id: PermissionSetId,
    ) -> AppResult<Option<PermissionSet>> {
        Ok(self
            .fetch_permission_sets(Some(permission_set_id), None)
            .await?
            .into_iter()
            .next())
    }

    async fn list_permission_sets(&self) -> AppResult<Vec<PermissionSet>> {
        self.fetch_permission_sets(None, None).await
    }

    async fn create_permission_set(
        &self,
        input: SavePermissionSetInput,
    ) -> AppResult<PermissionSet> {
        self.create_permission_set_impl(input).await
    }

    async fn update_permission_set(
        &self,
        permission_set_id: PermissionSetId,
        input: SavePermissionSetInput,
    ) -> AppResult<PermissionSet> {
        self.update_permission_set_impl(permission_set_id, input)
            .await
    }

    async fn delete_permission_set(&self, permission_set_id: PermissionSetId) -> AppResult<()> {
        self.delete_permission_set_impl(permission_set_id).await
    }

    async fn list_system_permissions(&self) -> AppResult<Vec<SystemPermission>> {
        self.list_system_permissions_impl().await
    }

    async fn create_system_permission(
        &self,
        input: SaveSystemPermissionInput,
    ) -> AppResult<SystemPermission> {
        self.create_system_permission_impl(input).await
    }

    async fn delete_system_permission(&self, permission_id: SystemPermissionId) -> AppResult<()> {
        self.delete_system_permission_impl(permission_id).await
    }

    async fn connect_system_permission(
        &self,
        bundle: PermissionBundle,
        permission_id: SystemPermissionId,
    ) -> AppResult<()> {
        self.connect_system_permission_impl(bundle, permission_id)
            .await
    }

    async fn disconnect_system_permission(
        &self,
        bundle: PermissionBundle,
        permission_id: SystemPermissionId,
    ) -> AppResult<()> {
        self.disconnect_system_permission_impl(bundle, permission_id)
            .await
    }
}
