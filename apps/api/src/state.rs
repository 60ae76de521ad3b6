use opsdash_application::{
    AccessService, CrmService, HolidayService, RbacAdminService, TimeReportService,
};

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub access_service: AccessService,
    pub rbac_admin_service: RbacAdminService,
    pub holiday_service: HolidayService,
    pub time_report_service: TimeReportService,
    pub crm_service: CrmService,
    pub frontend_url: String,
    pub auth_proxy_header: String,
}
