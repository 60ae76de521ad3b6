//! Application services and ports.

#![forbid(unsafe_code)]

mod access_service;
mod crm_service;
mod holiday_service;
mod integration_ports;
mod rbac_admin_service;
mod rbac_ports;
mod read_cache;
mod time_report_service;

#[cfg(test)]
mod test_support;

pub use access_service::AccessService;
pub use crm_service::CrmService;
pub use holiday_service::{AbsenceInput, HolidayService};
pub use integration_ports::{CrmGateway, CrmRecordFields, HrSystem, Notifier};
pub use rbac_admin_service::RbacAdminService;
pub use rbac_ports::{
    CreateUserInput, PermissionBundle, RbacRepository, SavePermissionSetInput, SaveProfileInput,
    SaveSystemPermissionInput, UpdateUserInput,
};
pub use read_cache::{CachePolicy, ReadCache, cached_read};
pub use time_report_service::TimeReportService;
