use opsdash_application::{
    CreateUserInput, SavePermissionSetInput, SaveProfileInput, SaveSystemPermissionInput,
    UpdateUserInput,
};
use opsdash_core::{AppError, AppResult, NonEmptyString};
use opsdash_domain::{
    EmailAddress, EmploymentNumber, HolidayAllowance, PermissionSet, Profile, ProfileId,
    SystemPermission, User,
};
use serde::{Deserialize, Serialize};
use ts_rs::TS;
use uuid::Uuid;

/// Holiday days granted per year when a new user does not specify any.
const DEFAULT_HOLIDAY_DAYS_PER_YEAR: u32 = 25;

/// API representation of a dashboard user.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/user-response.ts"
)]
pub struct UserResponse {
    pub id: String,
    pub display_name: String,
    pub email: String,
    pub employment_number: Option<String>,
    pub profile_id: String,
    pub permission_set_ids: Vec<String>,
    pub holiday_days_per_year: u32,
    pub saved_holiday_days: u32,
}

impl From<User> for UserResponse {
    fn from(value: User) -> Self {
        Self {
            id: value.id.to_string(),
            display_name: value.display_name.as_str().to_owned(),
            email: value.email.as_str().to_owned(),
            employment_number: value
                .employment_number
                .map(|number| number.as_str().to_owned()),
            profile_id: value.profile_id.to_string(),
            permission_set_ids: value
                .permission_set_ids
                .iter()
                .map(ToString::to_string)
                .collect(),
            holiday_days_per_year: value.holiday_allowance.days_per_year,
            saved_holiday_days: value.holiday_allowance.saved_days,
        }
    }
}

/// Incoming payload for user creation.
#[derive(Debug, Deserialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/create-user-request.ts"
)]
pub struct CreateUserRequest {
    pub display_name: String,
    pub email: String,
    #[serde(default)]
    pub employment_number: Option<String>,
    pub profile_id: String,
    #[serde(default)]
    pub holiday_days_per_year: Option<u32>,
    #[serde(default)]
    pub saved_holiday_days: Option<u32>,
}

impl TryFrom<CreateUserRequest> for CreateUserInput {
    type Error = AppError;

    fn try_from(value: CreateUserRequest) -> AppResult<Self> {
        Ok(Self {
            display_name: NonEmptyString::new(value.display_name)?,
            email: EmailAddress::new(value.email)?,
            employment_number: employment_number(value.employment_number)?,
            profile_id: ProfileId::from_uuid(parse_uuid("profile_id", &value.profile_id)?),
            holiday_allowance: HolidayAllowance {
                days_per_year: value
                    .holiday_days_per_year
                    .unwrap_or(DEFAULT_HOLIDAY_DAYS_PER_YEAR),
                saved_days: value.saved_holiday_days.unwrap_or_default(),
            },
        })
    }
}

/// Incoming payload for user detail updates.
#[derive(Debug, Deserialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/update-user-request.ts"
)]
pub struct UpdateUserRequest {
    pub display_name: String,
    pub email: String,
    #[serde(default)]
    pub employment_number: Option<String>,
}

impl TryFrom<UpdateUserRequest> for UpdateUserInput {
    type Error = AppError;

    fn try_from(value: UpdateUserRequest) -> AppResult<Self> {
        Ok(Self {
            display_name: NonEmptyString::new(value.display_name)?,
            email: EmailAddress::new(value.email)?,
            employment_number: employment_number(value.employment_number)?,
        })
    }
}

/// Incoming payload for moving a user to another profile.
#[derive(Debug, Deserialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/change-profile-request.ts"
)]
pub struct ChangeProfileRequest {
    pub profile_id: String,
}

impl ChangeProfileRequest {
    pub fn profile_id(&self) -> AppResult<ProfileId> {
        parse_uuid("profile_id", &self.profile_id).map(ProfileId::from_uuid)
    }
}

/// Incoming payload for holiday allowance updates.
#[derive(Debug, Deserialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/holiday-allowance-request.ts"
)]
pub struct HolidayAllowanceRequest {
    pub days_per_year: u32,
    #[serde(default)]
    pub saved_days: u32,
}

impl From<HolidayAllowanceRequest> for HolidayAllowance {
    fn from(value: HolidayAllowanceRequest) -> Self {
        Self {
            days_per_year: value.days_per_year,
            saved_days: value.saved_days,
        }
    }
}

/// API representation of a system permission.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/system-permission-response.ts"
)]
pub struct SystemPermissionResponse {
    pub id: String,
    pub name: String,
    pub description: Option<String>,
}

impl From<SystemPermission> for SystemPermissionResponse {
    fn from(value: SystemPermission) -> Self {
        Self {
            id: value.id.to_string(),
            name: value.name.as_str().to_owned(),
            description: value.description,
        }
    }
}

/// API representation of a profile.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/profile-response.ts"
)]
pub struct ProfileResponse {
    pub id: String,
    pub name: String,
    pub permissions: Vec<SystemPermissionResponse>,
}

impl From<Profile> for ProfileResponse {
    fn from(value: Profile) -> Self {
        Self {
            id: value.id.to_string(),
            name: value.name.as_str().to_owned(),
            permissions: value
                .permissions
                .into_iter()
                .map(SystemPermissionResponse::from)
                .collect(),
        }
    }
}

/// API representation of a permission set.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/permission-set-response.ts"
)]
pub struct PermissionSetResponse {
    pub id: String,
    pub name: String,
    pub description: Option<String>,
    pub permissions: Vec<SystemPermissionResponse>,
}

impl From<PermissionSet> for PermissionSetResponse {
    fn from(value: PermissionSet) -> Self {
        Self {
            id: value.id.to_string(),
            name: value.name.as_str().to_owned(),
            description: value.description,
            permissions: value
                .permissions
                .into_iter()
                .map(SystemPermissionResponse::from)
                .collect(),
        }
    }
}

/// Incoming payload for profile create and rename.
#[derive(Debug, Deserialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/save-profile-request.ts"
)]
pub struct SaveProfileRequest {
    pub name: String,
}

impl TryFrom<SaveProfileRequest> for SaveProfileInput {
    type Error = AppError;

    fn try_from(value: SaveProfileRequest) -> AppResult<Self> {
        Ok(Self {
            name: NonEmptyString::new(value.name)?,
        })
    }
}

/// Incoming payload for named bundles with an optional description.
#[derive(Debug, Deserialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/save-described-request.ts"
)]
pub struct SaveDescribedRequest {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
}

impl SaveDescribedRequest {
    fn into_parts(self) -> AppResult<(NonEmptyString, Option<String>)> {
        let description = self
            .description
            .map(|description| description.trim().to_owned())
            .filter(|description| !description.is_empty());

        Ok((NonEmptyString::new(self.name)?, description))
    }
}

impl TryFrom<SaveDescribedRequest> for SavePermissionSetInput {
    type Error = AppError;

    fn try_from(value: SaveDescribedRequest) -> AppResult<Self> {
        let (name, description) = value.into_parts()?;
        Ok(Self { name, description })
    }
}

impl TryFrom<SaveDescribedRequest> for SaveSystemPermissionInput {
    type Error = AppError;

    fn try_from(value: SaveDescribedRequest) -> AppResult<Self> {
        let (name, description) = value.into_parts()?;
        Ok(Self { name, description })
    }
}

fn employment_number(value: Option<String>) -> AppResult<Option<EmploymentNumber>> {
    value
        .filter(|number| !number.trim().is_empty())
        .map(EmploymentNumber::new)
        .transpose()
}

fn parse_uuid(field: &str, value: &str) -> AppResult<Uuid> {
    Uuid::parse_str(value.trim())
        .map_err(|error| AppError::Validation(format!("invalid {field}: {error}")))
}
