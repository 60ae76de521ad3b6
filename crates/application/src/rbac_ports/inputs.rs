use opsdash_core::NonEmptyString;
use opsdash_domain::{
    EmailAddress, EmploymentNumber, HolidayAllowance, PermissionSetId, ProfileId,
};

/// Input payload for user creation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateUserInput {
    /// Display name.
    pub display_name: NonEmptyString,
    /// Sign-in email address.
    pub email: EmailAddress,
    /// Optional HR employment number.
    pub employment_number: Option<EmploymentNumber>,
    /// Profile assigned at creation.
    pub profile_id: ProfileId,
    /// Initial holiday allowance.
    pub holiday_allowance: HolidayAllowance,
}

/// Input payload for user detail updates.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpdateUserInput {
    /// Display name.
    pub display_name: NonEmptyString,
    /// Sign-in email address.
    pub email: EmailAddress,
    /// Optional HR employment number.
    pub employment_number: Option<EmploymentNumber>,
}

/// Input payload for profile create and rename.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SaveProfileInput {
    /// Unique profile name.
    pub name: NonEmptyString,
}

/// Input payload for permission set create and update.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SavePermissionSetInput {
    /// Unique permission set name.
    pub name: NonEmptyString,
    /// Optional description.
    pub description: Option<String>,
}

/// Input payload for system permission creation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SaveSystemPermissionInput {
    /// Unique permission name.
    pub name: NonEmptyString,
    /// Optional description.
    pub description: Option<String>,
}

/// Bundle a system permission can be connected to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PermissionBundle {
    /// A user profile.
    Profile(ProfileId),
    /// An additional permission set.
    PermissionSet(PermissionSetId),
}
