//! User domain types and validation rules.

use opsdash_core::{AppError, AppResult, NonEmptyString};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::holiday::HolidayAllowance;
use crate::security::{PermissionSetId, ProfileId};

/// Unique identifier for a user record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct UserId(Uuid);

impl UserId {
    /// Creates a new random user identifier.
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Creates a user identifier from an existing UUID value.
    #[must_use]
    pub fn from_uuid(value: Uuid) -> Self {
        Self(value)
    }

    /// Returns the underlying UUID value.
    #[must_use]
    pub fn as_uuid(&self) -> Uuid {
        self.0
    }
}

impl Default for UserId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for UserId {
    fn fmt(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(formatter, "{}", self.0)
    }
}

/// Validated, lower-cased email address.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EmailAddress(String);

impl EmailAddress {
    /// Creates a validated email address.
    ///
    /// The local part and domain must be non-empty and the domain must
    /// contain a dot.
    pub fn new(value: impl Into<String>) -> AppResult<Self> {
        let normalized = value.into().trim().to_lowercase();

        let Some((local, domain)) = normalized.split_once('@') else {
            return Err(AppError::Validation(format!(
                "email address '{normalized}' must contain '@'"
            )));
        };

        if local.is_empty() || domain.is_empty() || !domain.contains('.') || domain.contains('@')
        {
            return Err(AppError::Validation(format!(
                "email address '{normalized}' is malformed"
            )));
        }

        Ok(Self(normalized))
    }

    /// Returns the validated email string.
    #[must_use]
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl From<EmailAddress> for String {
    fn from(value: EmailAddress) -> Self {
        value.0
    }
}

/// Employment number used as the key in the HR system.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EmploymentNumber(NonEmptyString);

impl EmploymentNumber {
    /// Creates a validated employment number.
    pub fn new(value: impl Into<String>) -> AppResult<Self> {
        let value = NonEmptyString::new(value)?;
        if !value.as_str().chars().all(|character| character.is_ascii_alphanumeric()) {
            return Err(AppError::Validation(format!(
                "employment number '{value}' must be alphanumeric"
            )));
        }

        Ok(Self(value))
    }

    /// Returns the employment number as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

/// Dashboard user and their access and allowance configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    /// Stable identifier.
    pub id: UserId,
    /// Name shown in the UI and notifications.
    pub display_name: NonEmptyString,
    /// Sign-in email address.
    pub email: EmailAddress,
    /// Employment number in the HR system, if the user is employed.
    pub employment_number: Option<EmploymentNumber>,
    /// The single profile assigned to the user.
    pub profile_id: ProfileId,
    /// Additional permission sets.
    pub permission_set_ids: Vec<PermissionSetId>,
    /// Holiday allowance used by the accrual calculator.
    pub holiday_allowance: HolidayAllowance,
}

impl User {
    /// Returns the employment number or fails when the user has none.
    pub fn require_employment_number(&self) -> AppResult<&EmploymentNumber> {
        self.employment_number.as_ref().ok_or_else(|| {
            AppError::Validation(format!(
                "user '{}' has no employment number configured",
                self.email.as_str()
            ))
        })
    }
}
