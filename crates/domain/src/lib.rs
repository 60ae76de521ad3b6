//! Domain entities and invariants.

#![forbid(unsafe_code)]

mod absence;
mod calendar;
mod crm;
mod fiscal;
mod holiday;
mod occupancy;
mod security;
mod time_report;
mod user;

pub use absence::{AbsenceKind, AbsencePeriod, AbsenceStatus, DateRange, validate_absence_id};
pub use calendar::{
    BankHoliday, DEFAULT_FIRST_YEAR, DEFAULT_LAST_YEAR, SwedishHolidayCalendar, easter_sunday,
    is_weekend,
};
pub use crm::{Assignment, CrmApiName, Opportunity, TimecardRow};
pub use fiscal::{FiscalWindow, FiscalYearDefinition, calculate_next_reset_date};
pub use holiday::{
    HolidayAllowance, HolidaySummary, PeriodUsage, count_working_days, summarize_holidays,
};
pub use occupancy::{
    HistoricalHours, MonthlyOccupancy, OccupancyReport, occupancy_rate, occupancy_report,
};
pub use security::{
    Capability, PermissionSet, PermissionSetId, Profile, ProfileId, SystemPermission,
    SystemPermissionId, effective_permission_names,
};
pub use time_report::{TimeReport, TimeReportRow};
pub use user::{EmailAddress, EmploymentNumber, User, UserId};
