use std::str::FromStr;

use chrono::NaiveDate;
use opsdash_core::{AppError, AppResult};
use serde::{Deserialize, Serialize};

/// Inclusive calendar date range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateRange {
    from: NaiveDate,
    to: NaiveDate,
}

impl DateRange {
    /// Creates a range, rejecting ranges that end before they start.
    pub fn new(from: NaiveDate, to: NaiveDate) -> AppResult<Self> {
        if to < from {
            return Err(AppError::Validation(format!(
                "date range ends ({to}) before it starts ({from})"
            )));
        }

        Ok(Self { from, to })
    }

    /// Returns the first day of the range.
    #[must_use]
    pub fn from(&self) -> NaiveDate {
        self.from
    }

    /// Returns the last day of the range.
    #[must_use]
    pub fn to(&self) -> NaiveDate {
        self.to
    }

    /// Iterates every day in the range, both ends included.
    pub fn days(&self) -> impl Iterator<Item = NaiveDate> + '_ {
        self.from.iter_days().take_while(|day| *day <= self.to)
    }

    /// Returns the number of calendar days in the range.
    #[must_use]
    pub fn calendar_days(&self) -> u32 {
        u32::try_from((self.to - self.from).num_days() + 1).unwrap_or(u32::MAX)
    }

    /// Returns whether the two ranges share at least one day.
    #[must_use]
    pub fn overlaps(&self, other: &Self) -> bool {
        self.from <= other.to && other.from <= self.to
    }
}

/// Processing status of an absence application.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AbsenceStatus {
    /// Saved but not yet sent for approval.
    Registered,
    /// Sent to the manager for approval.
    AppliedFor,
    /// Approved and locked by payroll.
    Audited,
    /// Declined by the manager.
    Rejected,
}

impl AbsenceStatus {
    /// Returns a stable transport value for this status.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Registered => "registered",
            Self::AppliedFor => "applied_for",
            Self::Audited => "audited",
            Self::Rejected => "rejected",
        }
    }

    /// Returns whether days in this status are deducted from the allowance.
    #[must_use]
    pub fn consumes_allowance(&self) -> bool {
        !matches!(self, Self::Rejected)
    }
}

impl FromStr for AbsenceStatus {
    type Err = AppError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "registered" => Ok(Self::Registered),
            "applied_for" => Ok(Self::AppliedFor),
            "audited" => Ok(Self::Audited),
            "rejected" => Ok(Self::Rejected),
            _ => Err(AppError::Validation(format!(
                "unknown absence status '{value}'"
            ))),
        }
    }
}

/// Kind of absence recorded in the HR system.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AbsenceKind {
    /// Paid holiday drawn from the yearly allowance.
    Holiday,
    /// Sick leave.
    SickLeave,
    /// Any other absence type configured in the HR system.
    Other,
}

impl AbsenceKind {
    /// Returns a stable transport value for this kind.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Holiday => "holiday",
            Self::SickLeave => "sick_leave",
            Self::Other => "other",
        }
    }
}

impl FromStr for AbsenceKind {
    type Err = AppError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "holiday" => Ok(Self::Holiday),
            "sick_leave" => Ok(Self::SickLeave),
            "other" => Ok(Self::Other),
            _ => Err(AppError::Validation(format!("unknown absence kind '{value}'"))),
        }
    }
}

/// Absence application as stored in the HR system.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AbsencePeriod {
    /// Remote identifier, absent before the application is created.
    pub id: Option<String>,
    /// Inclusive period of absence.
    pub range: DateRange,
    /// Processing status.
    pub status: AbsenceStatus,
    /// Absence type.
    pub kind: AbsenceKind,
    /// Optional free-text comment.
    pub comment: Option<String>,
}

const MAX_ABSENCE_ID_LENGTH: usize = 64;

/// Validates a remote absence application id.
///
/// Ids are placed in HR system URL paths, so only ASCII letters, digits,
/// `-` and `_` are accepted.
pub fn validate_absence_id(absence_id: &str) -> AppResult<&str> {
    let absence_id = absence_id.trim();
    if absence_id.is_empty() {
        return Err(AppError::Validation("absence id must not be empty".to_owned()));
    }

    let valid = absence_id.len() <= MAX_ABSENCE_ID_LENGTH
        && absence_id
            .chars()
            .all(|character| character.is_ascii_alphanumeric() || matches!(character, '-' | '_'));
    if !valid {
        return Err(AppError::Validation(format!(
            "'{absence_id}' is not a valid absence id"
        )));
    }

    Ok(absence_id)
}
