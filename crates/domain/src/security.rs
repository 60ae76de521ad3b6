use std::collections::BTreeSet;
use std::str::FromStr;

use opsdash_core::{AppError, NonEmptyString};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

macro_rules! uuid_identifier {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        pub struct $name(Uuid);

        impl $name {
            /// Creates a random identifier.
            #[must_use]
            pub fn new() -> Self {
                Self(Uuid::new_v4())
            }

            /// Creates an identifier from an existing UUID value.
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

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(formatter, "{}", self.0)
            }
        }
    };
}

uuid_identifier!(
    /// Unique identifier for a profile.
    ProfileId
);
uuid_identifier!(
    /// Unique identifier for a permission set.
    PermissionSetId
);
uuid_identifier!(
    /// Unique identifier for a system permission.
    SystemPermissionId
);

/// Capabilities checked by application services.
///
/// Each capability is granted through a system permission with the same name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Capability {
    /// Allows reading the personal dashboard.
    DashboardView,
    /// Allows editing and submitting time reports.
    TimeReportWrite,
    /// Allows applying for and changing absences.
    AbsenceWrite,
    /// Allows reading CRM assignments, opportunities and timecards.
    CrmRead,
    /// Allows writing CRM records.
    CrmWrite,
    /// Allows reading occupancy reports.
    OccupancyView,
    /// Allows managing users, profiles and permission sets.
    RbacManage,
}

impl Capability {
    /// Returns the system permission name granting this capability.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::DashboardView => "dashboard.view",
            Self::TimeReportWrite => "time_report.write",
            Self::AbsenceWrite => "absence.write",
            Self::CrmRead => "crm.read",
            Self::CrmWrite => "crm.write",
            Self::OccupancyView => "occupancy.view",
            Self::RbacManage => "rbac.manage",
        }
    }

    /// Returns all known capabilities.
    #[must_use]
    pub fn all() -> &'static [Self] {
        const ALL: &[Capability] = &[
            Capability::DashboardView,
            Capability::TimeReportWrite,
            Capability::AbsenceWrite,
            Capability::CrmRead,
            Capability::CrmWrite,
            Capability::OccupancyView,
            Capability::RbacManage,
        ];

        ALL
    }
}

impl FromStr for Capability {
    type Err = AppError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Self::all()
            .iter()
            .find(|capability| capability.as_str() == value)
            .copied()
            .ok_or_else(|| AppError::Validation(format!("unknown capability '{value}'")))
    }
}

/// Atomic named capability flag stored in the database.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SystemPermission {
    /// Stable identifier.
    pub id: SystemPermissionId,
    /// Unique permission name.
    pub name: NonEmptyString,
    /// Optional description shown in administration views.
    pub description: Option<String>,
}

/// Default permission bundle; every user has exactly one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Profile {
    /// Stable identifier.
    pub id: ProfileId,
    /// Unique profile name.
    pub name: NonEmptyString,
    /// Granted system permissions.
    pub permissions: Vec<SystemPermission>,
}

/// Additional user-assignable permission bundle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PermissionSet {
    /// Stable identifier.
    pub id: PermissionSetId,
    /// Unique permission set name.
    pub name: NonEmptyString,
    /// Optional description shown in administration views.
    pub description: Option<String>,
    /// Granted system permissions.
    pub permissions: Vec<SystemPermission>,
}

/// Returns the union of permission names granted by a profile and permission sets.
///
/// Grants are purely additive; a permission set never removes a profile grant.
#[must_use]
pub fn effective_permission_names(
    profile: &Profile,
    permission_sets: &[PermissionSet],
) -> BTreeSet<String> {
    profile
        .permissions
        .iter()
        .chain(permission_sets.iter().flat_map(|set| set.permissions.iter()))
        .map(|permission| permission.name.as_str().to_owned())
        .collect()
}
