use super::*;

impl PostgresRbacRepository {
    pub(super) async fn find_user_impl(&self, user_id: UserId) -> AppResult<Option<User>> {
        let sql = format!("{USER_SELECT} WHERE users.id = $1");
        let row = sqlx::query_as::<_, UserRow>(&sql)
            .bind(user_id.as_uuid())
            .fetch_optional(&self.pool)
            .await
            .map_err(|error| internal("find user", error))?;

        row.map(User::try_from).transpose()
    }

    pub(super) async fn find_user_by_email_impl(
        &self,
        email: &EmailAddress,
    ) -> AppResult<Option<User>> {
        let sql = format!("{USER_SELECT} WHERE users.email = $1");
        let row = sqlx::query_as::<_, UserRow>(&sql)
            .bind(email.as_str())
            .fetch_optional(&self.pool)
            .await
            .map_err(|error| internal("find user by email", error))?;

        row.map(User::try_from).transpose()
    }

    pub(super) async fn list_users_impl(&self) -> AppResult<Vec<User>> {
        let sql = format!("{USER_SELECT} ORDER BY users.display_name, users.email");
        let rows = sqlx::query_as::<_, UserRow>(&sql)
            .fetch_all(&self.pool)
            .await
            .map_err(|error| internal("list users", error))?;

        rows.into_iter().map(User::try_from).collect()
    }

    pub(super) async fn create_user_impl(&self, input: CreateUserInput) -> AppResult<User> {
        let user_id = UserId::new();
        let days_per_year = stored_days(input.holiday_allowance.days_per_year)?;
        let saved_days = stored_days(input.holiday_allowance.saved_days)?;

        sqlx::query(
            r#"
            INSERT INTO users (
                id,
                display_name,
                email,
                employment_number,
                profile_id,
                holiday_days_per_year,
                saved_holiday_days
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            "#,
        )
        .bind(user_id.as_uuid())
        .bind(input.display_name.as_str())
        .bind(input.email.as_str())
        .bind(input.employment_number.as_ref().map(EmploymentNumber::as_str))
        .bind(input.profile_id.as_uuid())
        .bind(days_per_year)
        .bind(saved_days)
        .execute(&self.pool)
        .await
        .map_err(|error| match violation(&error) {
            Some(Violation::Unique) => AppError::Conflict(format!(
                "a user with email '{}' or the same employment number already exists",
                input.email.as_str()
            )),
            Some(Violation::ForeignKey) => {
                AppError::NotFound(format!("profile '{}' does not exist", input.profile_id))
            }
            None => internal("create user", error),
        })?;

        self.find_user_impl(user_id).await?.ok_or_else(|| {
            AppError::Internal(format!("created user '{user_id}' could not be read back"))
        })
    }

    pub(super) async fn update_user_impl(
        &self,
        user_id: UserId,
        input: UpdateUserInput,
    ) -> AppResult<User> {
        let result = sqlx::query(
            r#"
            UPDATE users
            SET display_name = $2, email = $3, employment_number = $4, updated_at = now()
            WHERE id = $1
            "#,
        )
        .bind(user_id.as_uuid())
        .bind(input.display_name.as_str())
        .bind(input.email.as_str())
        .bind(input.employment_number.as_ref().map(EmploymentNumber::as_str))
        .execute(&self.pool)
        .await
        .map_err(|error| match violation(&error) {
            Some(Violation::Unique) => AppError::Conflict(format!(
                "another user already uses email '{}' or the same employment number",
                input.email.as_str()
            )),
            _ => internal("update user", error),
        })?;

        if result.rows_affected() == 0 {
            return Err(user_not_found(user_id));
        }

        self.find_user_impl(user_id)
            .await?
            .ok_or_else(|| user_not_found(user_id))
    }

    pub(super) async fn delete_user_impl(&self, user_id: UserId) -> AppResult<()> {
        let result = sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(user_id.as_uuid())
            .execute(&self.pool)
            .await
            .map_err(|error| internal("delete user", error))?;

        if result.rows_affected() == 0 {
            return Err(user_not_found(user_id));
        }

        Ok(())
    }

    pub(super) async fn set_user_profile_impl(
        &self,
        user_id: UserId,
        profile_id: ProfileId,
    ) -> AppResult<()> {
        let result = sqlx::query(
            r#"
            UPDATE users
            SET profile_id = $2, updated_at = now()
            WHERE id = $1
            "#,
        )
        .bind(user_id.as_uuid())
        .bind(profile_id.as_uuid())
        .execute(&self.pool)
        .await
        .map_err(|error| match violation(&error) {
            Some(Violation::ForeignKey) => {
                AppError::NotFound(format!("profile '{profile_id}' does not exist"))
            }
            _ => internal("set user profile", error),
        })?;

        if result.rows_affected() == 0 {
            return Err(user_not_found(user_id));
        }

        Ok(())
    }

    pub(super) async fn set_holiday_allowance_impl(
        &self,
        user_id: UserId,
        allowance: HolidayAllowance,
    ) -> AppResult<()> {
        let result = sqlx::query(
            r#"
            UPDATE users
            SET holiday_days_per_year = $2, saved_holiday_days = $3, updated_at = now()
            WHERE id = $1
            "#,
        )
        .bind(user_id.as_uuid())
        .bind(stored_days(allowance.days_per_year)?)
        .bind(stored_days(allowance.saved_days)?)
        .execute(&self.pool)
        .await
        .map_err(|error| internal("set holiday allowance", error))?;

        if result.rows_affected() == 0 {
            return Err(user_not_found(user_id));
        }

        Ok(())
    }

    pub(super) async fn connect_permission_set_to_user_impl(
        &self,
        user_id: UserId,
        permission_set_id: PermissionSetId,
    ) -> AppResult<()> {
        sqlx::query(
            r#"
            INSERT INTO user_permission_sets (user_id, permission_set_id)
            VALUES ($1, $2)
            ON CONFLICT (user_id, permission_set_id) DO NOTHING
            "#,
        )
        .bind(user_id.as_uuid())
        .bind(permission_set_id.as_uuid())
        .execute(&self.pool)
        .await
        .map_err(|error| match violation(&error) {
            Some(Violation::ForeignKey) => AppError::NotFound(format!(
                "user '{user_id}' or permission set '{permission_set_id}' does not exist"
            )),
            _ => internal("connect permission set to user", error),
        })?;

        Ok(())
    }

    pub(super) async fn disconnect_permission_set_from_user_impl(
        &self,
        user_id: UserId,
        permission_set_id: PermissionSetId,
    ) -> AppResult<()> {
        sqlx::query(
            r#"
            DELETE FROM user_permission_sets
            WHERE user_id = $1 AND permission_set_id = $2
            "#,
        )
        .bind(user_id.as_uuid())
        .bind(permission_set_id.as_uuid())
        .execute(&self.pool)
        .await
        .map_err(|error| internal("disconnect permission set from user", error))?;

        Ok(())
    }
}

fn stored_days(days: u32) -> AppResult<i32> {
    i32::try_from(days)
        .map_err(|_| AppError::Validation(format!("holiday day count {days} is too large")))
}

fn user_not_found(user_id: UserId) -> AppError {
    AppError::NotFound(format!("user '{user_id}' does not exist"))
}
