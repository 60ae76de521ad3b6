use super::*;

impl PostgresRbacRepository {
    pub(super) async fn fetch_profiles(&self, profile_id: Option<ProfileId>) -> AppResult<Vec<Profile>> {
        let rows = sqlx::query_as::<_, BundleGrantRow>(
            r#"
            SELECT
                profiles.id AS bundle_id,
                profiles.name AS bundle_name,
                NULL::TEXT AS bundle_description,
                permissions.id AS permission_id,
                permissions.name AS permission_name,
                permissions.description AS permission_description
            FROM profiles
            LEFT JOIN profile_system_permissions AS grants
                ON grants.profile_id = profiles.id
            LEFT JOIN system_permissions AS permissions
                ON permissions.id = grants.system_permission_id
            WHERE ($1::UUID IS NULL OR profiles.id = $1)
            ORDER BY profiles.name, profiles.id, permissions.name
            "#,
        )
        .bind(profile_id.map(|id| id.as_uuid()))
        .fetch_all(&self.pool)
        .await
        .map_err(|error| internal("list profiles", error))?;

        Ok(aggregate_bundles(rows)?
            .into_iter()
            .map(|bundle| Profile {
                id: ProfileId::from_uuid(bundle.id),
                name: bundle.name,
                permissions: bundle.permissions,
            })
            .collect())
    }

    pub(super) async fn fetch_permission_sets(
        &self,
        permission_set_id: Option<PermissionSetId>,
        user_id: Option<UserId>,
    ) -> AppResult<Vec<PermissionSet>> {
        let rows = sqlx::query_as::<_, BundleGrantRow>(
            r#"
            SELECT
                sets.id AS bundle_id,
                sets.name AS bundle_name,
                sets.description AS bundle_description,
                permissions.id AS permission_id,
                permissions.name AS permission_name,
                permissions.description AS permission_description
            FROM permission_sets AS sets
            LEFT JOIN permission_set_system_permissions AS grants
                ON grants.permission_set_id = sets.id
            LEFT JOIN system_permissions AS permissions
                ON permissions.id = grants.system_permission_id
            WHERE ($1::UUID IS NULL OR sets.id = $1)
                AND (
                    $2::UUID IS NULL
                    OR EXISTS (
                        SELECT 1
                        FROM user_permission_sets AS links
                        WHERE links.permission_set_id = sets.id
                            AND links.user_id = $2
                    )
                )
            ORDER BY sets.name, sets.id, permissions.name
            "#,
        )
        .bind(permission_set_id.map(|id| id.as_uuid()))
        .bind(user_id.map(|id| id.as_uuid()))
        .fetch_all(&self.pool)
        .await
        .map_err(|error| internal("list permission sets", error))?;

        Ok(aggregate_bundles(rows)?
            .into_iter()
            .map(|bundle| PermissionSet {
                id: PermissionSetId::from_uuid(bundle.id),
                name: bundle.name,
                description: bundle.description,
                permissions: bundle.permissions,
            })
            .collect())
    }

    pub(super) async fn create_profile_impl(&self, input: SaveProfileInput) -> AppResult<Profile> {
        let profile_id = ProfileId::new();
        sqlx::query("INSERT INTO profiles (id, name) VALUES ($1, $2)")
            .bind(profile_id.as_uuid())
            .bind(input.name.as_str())
            .execute(&self.pool)
            .await
            .map_err(|error| match violation(&error) {
                Some(Violation::Unique) => {
                    AppError::Conflict(format!("profile '{}' already exists", input.name))
                }
                _ => internal("create profile", error),
            })?;

        Ok(Profile {
            id: profile_id,
            name: input.name,
            permissions: Vec::new(),
        })
    }

    pub(super) async fn update_profile_impl(
        &self,
        profile_id: ProfileId,
        input: SaveProfileInput,
    ) -> AppResult<Profile> {
        let result = sqlx::query(
            r#"
            UPDATE profiles
            SET name = $2, updated_at = now()
            WHERE id = $1
            "#,
        )
        .bind(profile_id.as_uuid())
        .bind(input.name.as_str())
        .execute(&self.pool)
        .await
        .map_err(|error| match violation(&error) {
            Some(Violation::Unique) => {
                AppError::Conflict(format!("profile '{}' already exists", input.name))
            }
            _ => internal("update profile", error),
        })?;

        if result.rows_affected() == 0 {
            return Err(profile_not_found(profile_id));
        }

        self.fetch_profiles(Some(profile_id))
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| profile_not_found(profile_id))
    }

    pub(super) async fn delete_profile_impl(&self, profile_id: ProfileId) -> AppResult<()> {
        let result = sqlx::query("DELETE FROM profiles WHERE id = $1")
            .bind(profile_id.as_uuid())
            .execute(&self.pool)
            .await
            .map_err(|error| match violation(&error) {
                Some(Violation::ForeignKey) => AppError::Conflict(format!(
                    "profile '{profile_id}' is still assigned to users"
                )),
                _ => internal("delete profile", error),
            })?;

        if result.rows_affected() == 0 {
            return Err(profile_not_found(profile_id));
        }

        Ok(())
    }

    pub(super) async fn count_users_with_profile_impl(
        &self,
        profile_id: ProfileId,
    ) -> AppResult<u64> {
        let count = sqlx::query_scalar::<_, i64>(
            r#"
            SELECT COUNT(*)
            FROM users
            WHERE profile_id = $1
            "#,
        )
        .bind(profile_id.as_uuid())
        .fetch_one(&self.pool)
        .await
        .map_err(|error| internal("count users with profile", error))?;

        u64::try_from(count)
            .map_err(|error| AppError::Internal(format!("invalid user count {count}: {error}")))
    }

    pub(super) async fn create_permission_set_impl(
        &self,
        input: SavePermissionSetInput,
    ) -> AppResult<PermissionSet> {
        let permission_set_id = PermissionSetId::new();
        sqlx::query(
            r#"
            INSERT INTO permission_sets (id, name, description)
            VALUES ($1, $2, $3)
            "#,
        )
        .bind(permission_set_id.as_uuid())
        .bind(input.name.as_str())
        .bind(input.description.as_deref())
        .execute(&self.pool)
        .await
        .map_err(|error| match violation(&error) {
            Some(Violation::Unique) => {
                AppError::Conflict(format!("permission set '{}' already exists", input.name))
            }
            _ => internal("create permission set", error),
        })?;

        Ok(PermissionSet {
            id: permission_set_id,
            name: input.name,
            description: input.description,
            permissions: Vec::new(),
        })
    }

    pub(super) async fn update_permission_set_impl(
        &self,
        permission_set_id: PermissionSetId,
        input: SavePermissionSetInput,
    ) -> AppResult<PermissionSet> {
        let result = sqlx::query(
            r#"
            UPDATE permission_sets
            SET name = $2, description = $3, updated_at = now()
            WHERE id = $1
            "#,
        )
        .bind(permission_set_id.as_uuid())
        .bind(input.name.as_str())
        .bind(input.description.as_deref())
        .execute(&self.pool)
        .await
        .map_err(|error| match violation(&error) {
            Some(Violation::Unique) => {
                AppError::Conflict(format!("permission set '{}' already exists", input.name))
            }
            _ => internal("update permission set", error),
        })?;

        if result.rows_affected() == 0 {
            return Err(permission_set_not_found(permission_set_id));
        }

        self.fetch_permission_sets(Some(permission_set_id), None)
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| permission_set_not_found(permission_set_id))
    }

    pub(super) async fn delete_permission_set_impl(
        &self,
        permission_set_id: PermissionSetId,
    ) -> AppResult<()> {
        let result = sqlx::query("DELETE FROM permission_sets WHERE id = $1")
            .bind(permission_set_id.as_uuid())
            .execute(&self.pool)
            .await
            .map_err(|error| internal("delete permission set", error))?;

        if result.rows_affected() == 0 {
            return Err(permission_set_not_found(permission_set_id));
        }

        Ok(())
    }
}

fn profile_not_found(profile_id: ProfileId) -> AppError {
    AppError::NotFound(format!("profile '{profile_id}' does not exist"))
}

fn permission_set_not_found(permission_set_id: PermissionSetId) -> AppError {
    AppError::NotFound(format!("permission set '{permission_set_id}' does not exist"))
}
