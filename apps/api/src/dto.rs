mod common;
mod crm;
mod holidays;
mod rbac;
mod time_reports;

pub use common::{HealthResponse, MeResponse, parse_date};
pub use crm::{
    AssignmentResponse, CreatedRecordResponse, OccupancyResponse, OpportunityQuery,
    OpportunityResponse, TimecardQuery, TimecardResponse,
};
pub use holidays::{
    AbsenceListQuery, AbsenceRequest, AbsenceResponse, BankHolidayResponse,
    HolidaySummaryResponse,
};
pub use rbac::{
    ChangeProfileRequest, CreateUserRequest, HolidayAllowanceRequest, PermissionSetResponse,
    ProfileResponse, SaveDescribedRequest, SaveProfileRequest, SystemPermissionResponse,
    UpdateUserRequest, UserResponse,
};
pub use time_reports::{SaveTimeReportRequest, TimeReportResponse};
