use super::*;

impl PostgresRbacRepository {
    pub(super) async fn list_system_permissions_impl(&self) -> AppResult<Vec<SystemPermission>> {
        let rows = sqlx::query_as::<_, SystemPermissionRow>(
            r#"
            SELECT id, name, description
            FROM system_permissions
            ORDER BY name
            "#,
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|error| internal("list system permissions", error))?;

        rows.into_iter().map(SystemPermission::try_from).collect()
    }

    pub(super) async fn create_system_permission_impl(
        &self,
        input: SaveSystemPermissionInput,
    ) -> AppResult<SystemPermission> {
        let permission_id = SystemPermissionId::new();
        sqlx::query(
            r#"
            INSERT INTO system_permissions (id, name, description)
            VALUES ($1, $2, $3)
            "#,
        )
        .bind(permission_id.as_uuid())
        .bind(input.name.as_str())
        .bind(input.description.as_deref())
        .execute(&self.pool)
        .await
        .map_err(|error| match violation(&error) {
            Some(Violation::Unique) => {
                AppError::Conflict(format!("system permission '{}' already exists", input.name))
            }
            _ => internal("create system permission", error),
        })?;

        Ok(SystemPermission {
            id: permission_id,
            name: input.name,
            description: input.description,
        })
    }

    pub(super) async fn delete_system_permission_impl(
        &self,
        permission_id: SystemPermissionId,
    ) -> AppResult<()> {
        let result = sqlx::query("DELETE FROM system_permissions WHERE id = $1")
            .bind(permission_id.as_uuid())
            .execute(&self.pool)
            .await
            .map_err(|error| internal("delete system permission", error))?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!(
                "system permission '{permission_id}' does not exist"
            )));
        }

        Ok(())
    }

    pub(super) async fn connect_system_permission_impl(
        &self,
        bundle: PermissionBundle,
        permission_id: SystemPermissionId,
    ) -> AppResult<()> {
        let (sql, bundle_id) = match bundle {
            PermissionBundle::Profile(profile_id) => (
                r#"
                INSERT INTO profile_system_permissions (profile_id, system_permission_id)
                VALUES ($1, $2)
                ON CONFLICT DO NOTHING
                "#,
                profile_id.as_uuid(),
            ),
            PermissionBundle::PermissionSet(permission_set_id) => (
                r#"
                INSERT INTO permission_set_system_permissions (permission_set_id, system_permission_id)
                VALUES ($1, $2)
                ON CONFLICT DO NOTHING
                "#,
                permission_set_id.as_uuid(),
            ),
        };

        sqlx::query(sql)
            .bind(bundle_id)
            .bind(permission_id.as_uuid())
            .execute(&self.pool)
            .await
            .map_err(|error| match violation(&error) {
                Some(Violation::ForeignKey) => AppError::NotFound(format!(
                    "permission bundle '{bundle_id}' or system permission '{permission_id}' does not exist"
                )),
                _ => internal("connect system permission", error),
            })?;

        Ok(())
    }

    pub(super) async fn disconnect_system_permission_impl(
        &self,
        bundle: PermissionBundle,
        permission_id: SystemPermissionId,
    ) -> AppResult<()> {
        let (sql, bundle_id) = match bundle {
            PermissionBundle::Profile(profile_id) => (
                r#"
                DELETE FROM profile_system_permissions
                WHERE profile_id = $1 AND system_permission_id = $2
                "#,
                profile_id.as_uuid(),
            ),
            PermissionBundle::PermissionSet(permission_set_id) => (
                r#"
                DELETE FROM permission_set_system_permissions
                WHERE permission_set_id = $1 AND system_permission_id = $2
                "#,
                permission_set_id.as_uuid(),
            ),
        };

        sqlx::query(sql)
            .bind(bundle_id)
            .bind(permission_id.as_uuid())
            .execute(&self.pool)
            .await
            .map_err(|error| internal("disconnect system permission", error))?;

        Ok(())
    }
}
