//! In-memory ports and router helpers for handler tests.

use std::sync::Arc;

use async_trait::async_trait;
use axum::Router;
use axum::body::{Body, to_bytes};
use axum::http::{Request, StatusCode};
use chrono::NaiveDate;
use opsdash_application::{
    AccessService, CachePolicy, CreateUserInput, CrmGateway, CrmRecordFields, CrmService,
    HolidayService, HrSystem, Notifier, PermissionBundle, RbacAdminService, RbacRepository,
    SavePermissionSetInput, SaveProfileInput, SaveSystemPermissionInput, TimeReportService,
    UpdateUserInput,
};
use opsdash_core::{AppError, AppResult, NonEmptyString, UserIdentity};
use opsdash_domain::{
    AbsencePeriod, Assignment, CrmApiName, DateRange, EmailAddress, EmploymentNumber,
    FiscalWindow, HistoricalHours, HolidayAllowance, Opportunity, PermissionSet, PermissionSetId,
    Profile, ProfileId, SwedishHolidayCalendar, SystemPermission, SystemPermissionId, TimeReport,
    TimecardRow, User, UserId,
};
use serde_json::Value;
use tokio::sync::Mutex;
use tower::ServiceExt;
use tower_sessions::{MemoryStore, SessionManagerLayer};

use crate::api_router::build_router;
use crate::state::AppState;

pub const FRONTEND_URL: &str = "http://localhost:3000";
pub const PROXY_HEADER: &str = "x-forwarded-email";
pub const SIGNED_IN_EMAIL: &str = "anna.berg@example.se";

fn name(value: &str) -> NonEmptyString {
    NonEmptyString::new(value).unwrap_or_else(|_| panic!("invalid test name"))
}

pub fn date(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).unwrap_or_else(|| panic!("invalid test date"))
}

fn unsupported<T>(operation: &str) -> AppResult<T> {
    Err(AppError::Internal(format!(
        "{operation} is not available in handler tests"
    )))
}

/// Read-side RBAC store holding one signed-in user.
pub struct FakeRbacRepository {
    user: User,
    profile: Profile,
}

impl FakeRbacRepository {
    fn with_permissions(permissions: &[&str]) -> Self {
        let profile = Profile {
            id: ProfileId::new(),
            name: name("Consultant"),
            permissions: permissions
                .iter()
                .map(|permission| SystemPermission {
                    id: SystemPermissionId::new(),
                    name: name(permission),
                    description: None,
                })
                .collect(),
        };
        let user = User {
            id: UserId::new(),
            display_name: name("Anna Berg"),
            email: EmailAddress::new(SIGNED_IN_EMAIL)
                .unwrap_or_else(|_| panic!("invalid test email")),
            employment_number: Some(
                EmploymentNumber::new("1042")
                    .unwrap_or_else(|_| panic!("invalid test employment number")),
            ),
            profile_id: profile.id,
            permission_set_ids: Vec::new(),
            holiday_allowance: HolidayAllowance {
                days_per_year: 25,
                saved_days: 0,
            },
        };

        Self { user, profile }
    }
}

#[async_trait]
impl RbacRepository for FakeRbacRepository {
    async fn find_user(&self, user_id: UserId) -> AppResult<Option<User>> {
        Ok((self.user.id == user_id).then(|| self.user.clone()))
    }

    async fn find_user_by_email(&self, email: &EmailAddress) -> AppResult<Option<User>> {
        Ok((self.user.email == *email).then(|| self.user.clone()))
    }

    async fn list_users(&self) -> AppResult<Vec<User>> {
        Ok(vec![self.user.clone()])
    }

    async fn create_user(&self, _input: CreateUserInput) -> AppResult<User> {
        unsupported("create_user")
    }

    async fn update_user(&self, _user_id: UserId, _input: UpdateUserInput) -> AppResult<User> {
        unsupported("update_user")
    }

    async fn delete_user(&self, _user_id: UserId) -> AppResult<()> {
        unsupported("delete_user")
    }

    async fn set_user_profile(&self, _user_id: UserId, _profile_id: ProfileId) -> AppResult<()> {
        unsupported("set_user_profile")
    }

    async fn set_holiday_allowance(
        &self,
        _user_id: UserId,
        _allowance: HolidayAllowance,
    ) -> AppResult<()> {
        unsupported("set_holiday_allowance")
    }

    async fn connect_permission_set_to_user(
        &self,
        _user_id: UserId,
        _permission_set_id: PermissionSetId,
    ) -> AppResult<()> {
        unsupported("connect_permission_set_to_user")
    }

    async fn disconnect_permission_set_from_user(
        &self,
        _user_id: UserId,
        _permission_set_id: PermissionSetId,
    ) -> AppResult<()> {
        unsupported("disconnect_permission_set_from_user")
    }

    async fn list_permission_sets_for_user(
        &self,
        _user_id: UserId,
    ) -> AppResult<Vec<PermissionSet>> {
        Ok(Vec::new())
    }

    async fn find_profile(&self, profile_id: ProfileId) -> AppResult<Option<Profile>> {
        Ok((self.profile.id == profile_id).then(|| self.profile.clone()))
    }

    async fn list_profiles(&self) -> AppResult<Vec<Profile>> {
        Ok(vec![self.profile.clone()])
    }

    async fn create_profile(&self, _input: SaveProfileInput) -> AppResult<Profile> {
        unsupported("create_profile")
    }

    async fn update_profile(
        &self,
        _profile_id: ProfileId,
        _input: SaveProfileInput,
    ) -> AppResult<Profile> {
        unsupported("update_profile")
    }

    async fn delete_profile(&self, _profile_id: ProfileId) -> AppResult<()> {
        unsupported("delete_profile")
    }

    async fn count_users_with_profile(&self, profile_id: ProfileId) -> AppResult<u64> {
        Ok(u64::from(self.profile.id == profile_id))
    }

    async fn find_permission_set(
        &self,
        _permission_set_id: PermissionSetId,
    ) -> AppResult<Option<PermissionSet>> {
        Ok(None)
    }

    async fn list_permission_sets(&self) -> AppResult<Vec<PermissionSet>> {
        Ok(Vec::new())
    }

    async fn create_permission_set(
        &self,
        _input: SavePermissionSetInput,
    ) -> AppResult<PermissionSet> {
        unsupported("create_permission_set")
    }

    async fn update_permission_set(
        &self,
        _permission_set_id: PermissionSetId,
        _input: SavePermissionSetInput,
    ) -> AppResult<PermissionSet> {
        unsupported("update_permission_set")
    }

    async fn delete_permission_set(&self, _permission_set_id: PermissionSetId) -> AppResult<()> {
        unsupported("delete_permission_set")
    }

    async fn list_system_permissions(&self) -> AppResult<Vec<SystemPermission>> {
        Ok(self.profile.permissions.clone())
    }

    async fn create_system_permission(
        &self,
        _input: SaveSystemPermissionInput,
    ) -> AppResult<SystemPermission> {
        unsupported("create_system_permission")
    }

    async fn delete_system_permission(
        &self,
        _permission_id: SystemPermissionId,
    ) -> AppResult<()> {
        unsupported("delete_system_permission")
    }

    async fn connect_system_permission(
        &self,
        _bundle: PermissionBundle,
        _permission_id: SystemPermissionId,
    ) -> AppResult<()> {
        unsupported("connect_system_permission")
    }

    async fn disconnect_system_permission(
        &self,
        _bundle: PermissionBundle,
        _permission_id: SystemPermissionId,
    ) -> AppResult<()> {
        unsupported("disconnect_system_permission")
    }
}

#[derive(Default)]
pub struct FakeHrSystem {
    pub absences: Mutex<Vec<AbsencePeriod>>,
    pub saved_reports: Mutex<Vec<TimeReport>>,
}

#[async_trait]
impl HrSystem for FakeHrSystem {
    async fn list_absences(
        &self,
        _employment_number: &EmploymentNumber,
        window: DateRange,
    ) -> AppResult<Vec<AbsencePeriod>> {
        Ok(self
            .absences
            .lock()
            .await
            .iter()
            .filter(|absence| absence.range.overlaps(&window))
            .cloned()
            .collect())
    }

    async fn create_absence(
        &self,
        _employment_number: &EmploymentNumber,
        absence: &AbsencePeriod,
    ) -> AppResult<AbsencePeriod> {
        let mut absences = self.absences.lock().await;
        let mut created = absence.clone();
        created.id = Some(format!("A{}", absences.len() + 1));
        absences.push(created.clone());
        Ok(created)
    }

    async fn update_absence(
        &self,
        _employment_number: &EmploymentNumber,
        absence_id: &str,
        absence: &AbsencePeriod,
    ) -> AppResult<AbsencePeriod> {
        let mut absences = self.absences.lock().await;
        let existing = absences
            .iter_mut()
            .find(|existing| existing.id.as_deref() == Some(absence_id))
            .ok_or_else(|| AppError::NotFound(format!("absence '{absence_id}'")))?;
        *existing = AbsencePeriod {
            id: Some(absence_id.to_owned()),
            ..absence.clone()
        };
        Ok(existing.clone())
    }

    async fn delete_absence(
        &self,
        _employment_number: &EmploymentNumber,
        absence_id: &str,
    ) -> AppResult<()> {
        let mut absences = self.absences.lock().await;
        let before = absences.len();
        absences.retain(|absence| absence.id.as_deref() != Some(absence_id));
        if absences.len() == before {
            return Err(AppError::NotFound(format!("absence '{absence_id}'")));
        }
        Ok(())
    }

    async fn get_time_report(
        &self,
        employment_number: &EmploymentNumber,
        date: NaiveDate,
    ) -> AppResult<TimeReport> {
        let saved = self
            .saved_reports
            .lock()
            .await
            .iter()
            .rev()
            .find(|report| report.date == date)
            .cloned();

        Ok(saved.unwrap_or_else(|| TimeReport {
            employment_number: employment_number.clone(),
            date,
            rows: Vec::new(),
            submitted: false,
        }))
    }

    async fn save_time_report(&self, report: &TimeReport) -> AppResult<TimeReport> {
        self.saved_reports.lock().await.push(report.clone());
        Ok(report.clone())
    }
}

#[derive(Default)]
pub struct FakeCrmGateway {
    pub opportunities: Vec<Opportunity>,
    pub writes: Mutex<Vec<String>>,
}

#[async_trait]
impl CrmGateway for FakeCrmGateway {
    async fn assignments_for_consultant(
        &self,
        _email: &EmailAddress,
    ) -> AppResult<Vec<Assignment>> {
        Ok(Vec::new())
    }

    async fn open_opportunities(&self) -> AppResult<Vec<Opportunity>> {
        Ok(self.opportunities.clone())
    }

    async fn search_opportunities(&self, term: &str) -> AppResult<Vec<Opportunity>> {
        Ok(self
            .opportunities
            .iter()
            .filter(|opportunity| opportunity.name.contains(term))
            .cloned()
            .collect())
    }

    async fn timecards_for_week(
        &self,
        _email: &EmailAddress,
        week_start: NaiveDate,
    ) -> AppResult<Vec<TimecardRow>> {
        Ok(vec![TimecardRow {
            id: "a0T000000000001".to_owned(),
            project_name: Some("Migration".to_owned()),
            week_start,
            total_hours: 32.5,
            billable: true,
            status: Some("Submitted".to_owned()),
        }])
    }

    async fn historical_hours(
        &self,
        _email: &EmailAddress,
        _window: &FiscalWindow,
    ) -> AppResult<Vec<HistoricalHours>> {
        Ok(Vec::new())
    }

    async fn create_record(
        &self,
        object: &CrmApiName,
        _fields: CrmRecordFields,
    ) -> AppResult<String> {
        self.writes.lock().await.push(format!("create:{object}"));
        Ok("001000000000001AAA".to_owned())
    }

    async fn update_record(
        &self,
        object: &CrmApiName,
        record_id: &str,
        _fields: CrmRecordFields,
    ) -> AppResult<()> {
        self.writes
            .lock()
            .await
            .push(format!("update:{object}:{record_id}"));
        Ok(())
    }

    async fn delete_record(&self, object: &CrmApiName, record_id: &str) -> AppResult<()> {
        self.writes
            .lock()
            .await
            .push(format!("delete:{object}:{record_id}"));
        Ok(())
    }
}

#[derive(Default)]
pub struct FakeNotifier {
    pub messages: Mutex<Vec<String>>,
}

#[async_trait]
impl Notifier for FakeNotifier {
    async fn notify(&self, text: &str) -> AppResult<()> {
        self.messages.lock().await.push(text.to_owned());
        Ok(())
    }
}

/// Application state wired to in-memory ports, plus handles to inspect them.
pub struct TestApp {
    pub state: AppState,
    pub actor: UserIdentity,
    pub hr_system: Arc<FakeHrSystem>,
    pub crm_gateway: Arc<FakeCrmGateway>,
    pub notifier: Arc<FakeNotifier>,
}

pub fn test_app(permissions: &[&str]) -> TestApp {
    test_app_with_crm(permissions, FakeCrmGateway::default())
}

pub fn test_app_with_crm(permissions: &[&str], crm_gateway: FakeCrmGateway) -> TestApp {
    let repository = Arc::new(FakeRbacRepository::with_permissions(permissions));
    let actor = UserIdentity::new(
        repository.user.id.as_uuid(),
        repository.user.display_name.as_str(),
        repository.user.email.as_str(),
    );
    let hr_system = Arc::new(FakeHrSystem::default());
    let crm_gateway = Arc::new(crm_gateway);
    let notifier = Arc::new(FakeNotifier::default());

    let access_service = AccessService::new(repository.clone());
    let state = AppState {
        access_service: access_service.clone(),
        rbac_admin_service: RbacAdminService::new(access_service.clone(), repository),
        holiday_service: HolidayService::new(
            access_service.clone(),
            hr_system.clone(),
            CachePolicy::disabled(),
            Arc::new(SwedishHolidayCalendar::default()),
        ),
        time_report_service: TimeReportService::new(
            access_service.clone(),
            hr_system.clone(),
            notifier.clone(),
        ),
        crm_service: CrmService::new(
            access_service,
            crm_gateway.clone(),
            CachePolicy::disabled(),
        ),
        frontend_url: FRONTEND_URL.to_owned(),
        auth_proxy_header: PROXY_HEADER.to_owned(),
    };

    TestApp {
        state,
        actor,
        hr_system,
        crm_gateway,
        notifier,
    }
}

/// Full router with an in-memory session store.
pub fn test_router(state: AppState) -> Router {
    let session_layer = SessionManagerLayer::new(MemoryStore::default()).with_secure(false);
    build_router(state, FRONTEND_URL, session_layer)
        .unwrap_or_else(|error| panic!("router should build: {error}"))
}

/// Sends one request and returns the status, `set-cookie` value and JSON body.
pub async fn send(router: &Router, request: Request<Body>) -> (StatusCode, Option<String>, Value) {
    let response = router
        .clone()
        .oneshot(request)
        .await
        .unwrap_or_else(|error| panic!("router is infallible: {error}"));

    let status = response.status();
    let cookie = response
        .headers()
        .get("set-cookie")
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.split(';').next())
        .map(str::to_owned);
    let bytes = to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap_or_else(|error| panic!("response body should be readable: {error}"));
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or(Value::Null)
    };

    (status, cookie, body)
}

/// Signs in through the proxy header and returns the session cookie.
pub async fn sign_in(router: &Router) -> String {
    let request = Request::post("/auth/session")
        .header(PROXY_HEADER, SIGNED_IN_EMAIL)
        .header("origin", FRONTEND_URL)
        .body(Body::empty())
        .unwrap_or_else(|error| panic!("request should build: {error}"));

    let (status, cookie, _) = send(router, request).await;
    assert_eq!(status, StatusCode::OK);
    cookie.unwrap_or_else(|| panic!("sign-in should set a session cookie"))
}
