//! In-memory port fakes shared by service tests.

use std::collections::{BTreeSet, HashMap};
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use chrono::NaiveDate;
use opsdash_core::{AppError, AppResult, NonEmptyString, UserIdentity};
use opsdash_domain::{
    AbsencePeriod, Assignment, CrmApiName, DateRange, EmailAddress, EmploymentNumber,
    FiscalWindow, HistoricalHours, HolidayAllowance, Opportunity, PermissionSet, PermissionSetId,
    Profile, ProfileId, SystemPermission, SystemPermissionId, TimeReport, TimecardRow, User,
    UserId,
};
use serde_json::Value;
use tokio::sync::Mutex;

use crate::{
    CreateUserInput, CrmGateway, CrmRecordFields, HrSystem, Notifier, PermissionBundle,
    RbacRepository, ReadCache, SavePermissionSetInput, SaveProfileInput,
    SaveSystemPermissionInput, UpdateUserInput,
};

pub fn name(value: &str) -> NonEmptyString {
    NonEmptyString::new(value).unwrap_or_else(|_| panic!("invalid test name '{value}'"))
}

pub fn email(value: &str) -> EmailAddress {
    EmailAddress::new(value).unwrap_or_else(|_| panic!("invalid test email '{value}'"))
}

pub fn employment_number(value: &str) -> EmploymentNumber {
    EmploymentNumber::new(value).unwrap_or_else(|_| panic!("invalid employment number"))
}

pub fn date(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).unwrap_or_default()
}

pub fn permission(value: &str) -> SystemPermission {
    SystemPermission {
        id: SystemPermissionId::new(),
        name: name(value),
        description: None,
    }
}

pub fn identity_for(user: &User) -> UserIdentity {
    UserIdentity::new(
        user.id.as_uuid(),
        user.display_name.as_str(),
        user.email.as_str(),
    )
}

#[derive(Default)]
struct RbacState {
    users: HashMap<UserId, User>,
    profiles: HashMap<ProfileId, Profile>,
    permission_sets: HashMap<PermissionSetId, PermissionSet>,
    system_permissions: HashMap<SystemPermissionId, SystemPermission>,
}

#[derive(Default)]
pub struct FakeRbacRepository {
    state: Mutex<RbacState>,
}

impl FakeRbacRepository {
    /// Seeds a user whose profile grants `profile_permissions` and who holds
    /// one permission set granting `set_permissions`.
    pub async fn seed_user(&self, profile_permissions: &[&str], set_permissions: &[&str]) -> User {
        let mut state = self.state.lock().await;

        let mut by_name = |value: &str| -> SystemPermission {
            if let Some(existing) = state
                .system_permissions
                .values()
                .find(|permission| permission.name.as_str() == value)
            {
                return existing.clone();
            }
            let created = permission(value);
            state
                .system_permissions
                .insert(created.id, created.clone());
            created
        };

        let profile_grants: Vec<SystemPermission> =
            profile_permissions.iter().map(|value| by_name(*value)).collect();
        let set_grants: Vec<SystemPermission> =
            set_permissions.iter().map(|value| by_name(*value)).collect();

        let profile = Profile {
            id: ProfileId::new(),
            name: name("Consultant"),
            permissions: profile_grants,
        };
        let permission_set = PermissionSet {
            id: PermissionSetId::new(),
            name: name("Extra"),
            description: None,
            permissions: set_grants,
        };
        let user = User {
            id: UserId::new(),
            display_name: name("Anna Berg"),
            email: email("anna.berg@example.se"),
            employment_number: Some(employment_number("1042")),
            profile_id: profile.id,
            permission_set_ids: vec![permission_set.id],
            holiday_allowance: HolidayAllowance {
                days_per_year: 25,
                saved_days: 3,
            },
        };

        state.profiles.insert(profile.id, profile);
        state.permission_sets.insert(permission_set.id, permission_set);
        state.users.insert(user.id, user.clone());

        user
    }

    pub async fn profile_of(&self, user_id: UserId) -> Option<ProfileId> {
        self.state
            .lock()
            .await
            .users
            .get(&user_id)
            .map(|user| user.profile_id)
    }
}

fn bundle_permissions<'a>(
    state: &'a mut RbacState,
    bundle: PermissionBundle,
) -> AppResult<&'a mut Vec<SystemPermission>> {
    match bundle {
        PermissionBundle::Profile(profile_id) => state
            .profiles
            .get_mut(&profile_id)
            .map(|profile| &mut profile.permissions)
            .ok_or_else(|| AppError::NotFound(format!("profile '{profile_id}'"))),
        PermissionBundle::PermissionSet(permission_set_id) => state
            .permission_sets
            .get_mut(&permission_set_id)
            .map(|set| &mut set.permissions)
            .ok_or_else(|| AppError::NotFound(format!("permission set '{permission_set_id}'"))),
    }
}

#[async_trait]
impl RbacRepository for FakeRbacRepository {
    async fn find_user(&self, user_id: UserId) -> AppResult<Option<User>> {
        Ok(self.state.lock().await.users.get(&user_id).cloned())
    }

    async fn find_user_by_email(&self, email: &EmailAddress) -> AppResult<Option<User>> {
        Ok(self
            .state
            .lock()
            .await
            .users
            .values()
            .find(|user| &user.email == email)
            .cloned())
    }

    async fn list_users(&self) -> AppResult<Vec<User>> {
        let mut users: Vec<User> = self.state.lock().await.users.values().cloned().collect();
        users.sort_by(|left, right| left.display_name.cmp(&right.display_name));
        Ok(users)
    }

    async fn create_user(&self, input: CreateUserInput) -> AppResult<User> {
        let mut state = self.state.lock().await;
        if state.users.values().any(|user| user.email == input.email) {
            return Err(AppError::Conflict(format!(
                "user '{}' already exists",
                input.email.as_str()
            )));
        }
        let user = User {
            id: UserId::new(),
            display_name: input.display_name,
            email: input.email,
            employment_number: input.employment_number,
            profile_id: input.profile_id,
            permission_set_ids: Vec::new(),
            holiday_allowance: input.holiday_allowance,
        };
        state.users.insert(user.id, user.clone());
        Ok(user)
    }

    async fn update_user(&self, user_id: UserId, input: UpdateUserInput) -> AppResult<User> {
        let mut state = self.state.lock().await;
        let user = state
            .users
            .get_mut(&user_id)
            .ok_or_else(|| AppError::NotFound(format!("user '{user_id}'")))?;
        user.display_name = input.display_name;
        user.email = input.email;
        user.employment_number = input.employment_number;
        Ok(user.clone())
    }

    async fn delete_user(&self, user_id: UserId) -> AppResult<()> {
        self.state
            .lock()
            .await
            .users
            .remove(&user_id)
            .map(|_| ())
            .ok_or_else(|| AppError::NotFound(format!("user '{user_id}'")))
    }

    async fn set_user_profile(&self, user_id: UserId, profile_id: ProfileId) -> AppResult<()> {
        let mut state = self.state.lock().await;
        let user = state
            .users
            .get_mut(&user_id)
            .ok_or_else(|| AppError::NotFound(format!("user '{user_id}'")))?;
        user.profile_id = profile_id;
        Ok(())
    }

    async fn set_holiday_allowance(
        &self,
        user_id: UserId,
        allowance: HolidayAllowance,
    ) -> AppResult<()> {
        let mut state = self.state.lock().await;
        let user = state
            .users
            .get_mut(&user_id)
            .ok_or_else(|| AppError::NotFound(format!("user '{user_id}'")))?;
        user.holiday_allowance = allowance;
        Ok(())
    }

    async fn connect_permission_set_to_user(
        &self,
        user_id: UserId,
        permission_set_id: PermissionSetId,
    ) -> AppResult<()> {
        let mut state = self.state.lock().await;
        let user = state
            .users
            .get_mut(&user_id)
            .ok_or_else(|| AppError::NotFound(format!("user '{user_id}'")))?;
        if !user.permission_set_ids.contains(&permission_set_id) {
            user.permission_set_ids.push(permission_set_id);
        }
        Ok(())
    }

    async fn disconnect_permission_set_from_user(
        &self,
        user_id: UserId,
        permission_set_id: PermissionSetId,
    ) -> AppResult<()> {
        let mut state = self.state.lock().await;
        if let Some(user) = state.users.get_mut(&user_id) {
            user.permission_set_ids.retain(|id| *id != permission_set_id);
        }
        Ok(())
    }

    async fn list_permission_sets_for_user(
        &self,
        user_id: UserId,
    ) -> AppResult<Vec<PermissionSet>> {
        let state = self.state.lock().await;
        let Some(user) = state.users.get(&user_id) else {
            return Ok(Vec::new());
        };
        Ok(user
            .permission_set_ids
            .iter()
            .filter_map(|id| state.permission_sets.get(id).cloned())
            .collect())
    }

    async fn find_profile(&self, profile_id: ProfileId) -> AppResult<Option<Profile>> {
        Ok(self.state.lock().await.profiles.get(&profile_id).cloned())
    }

    async fn list_profiles(&self) -> AppResult<Vec<Profile>> {
        Ok(self.state.lock().await.profiles.values().cloned().collect())
    }

    async fn create_profile(&self, input: SaveProfileInput) -> AppResult<Profile> {
        let profile = Profile {
            id: ProfileId::new(),
            name: input.name,
            permissions: Vec::new(),
        };
        self.state
            .lock()
            .await
            .profiles
            .insert(profile.id, profile.clone());
        Ok(profile)
    }

    async fn update_profile(
        &self,
        profile_id: ProfileId,
        input: SaveProfileInput,
    ) -> AppResult<Profile> {
        let mut state = self.state.lock().await;
        let profile = state
            .profiles
            .get_mut(&profile_id)
            .ok_or_else(|| AppError::NotFound(format!("profile '{profile_id}'")))?;
        profile.name = input.name;
        Ok(profile.clone())
    }

    async fn delete_profile(&self, profile_id: ProfileId) -> AppResult<()> {
        self.state
            .lock()
            .await
            .profiles
            .remove(&profile_id)
            .map(|_| ())
            .ok_or_else(|| AppError::NotFound(format!("profile '{profile_id}'")))
    }

    async fn count_users_with_profile(&self, profile_id: ProfileId) -> AppResult<u64> {
        let count = self
            .state
            .lock()
            .await
            .users
            .values()
            .filter(|user| user.profile_id == profile_id)
            .count();
        Ok(u64::try_from(count).unwrap_or(u64::MAX))
    }

    async fn find_permission_set(
        &self,
        permission_set_id: PermissionSetId,
    ) -> AppResult<Option<PermissionSet>> {
        Ok(self
            .state
            .lock()
            .await
            .permission_sets
            .get(&permission_set_id)
            .cloned())
    }

    async fn list_permission_sets(&self) -> AppResult<Vec<PermissionSet>> {
        Ok(self
            .state
            .lock()
            .await
            .permission_sets
            .values()
            .cloned()
            .collect())
    }

    async fn create_permission_set(
        &self,
        input: SavePermissionSetInput,
    ) -> AppResult<PermissionSet> {
        let permission_set = PermissionSet {
            id: PermissionSetId::new(),
            name: input.name,
            description: input.description,
            permissions: Vec::new(),
        };
        self.state
            .lock()
            .await
            .permission_sets
            .insert(permission_set.id, permission_set.clone());
        Ok(permission_set)
    }

    async fn update_permission_set(
        &self,
        permission_set_id: PermissionSetId,
        input: SavePermissionSetInput,
    ) -> AppResult<PermissionSet> {
        let mut state = self.state.lock().await;
        let permission_set = state
            .permission_sets
            .get_mut(&permission_set_id)
            .ok_or_else(|| AppError::NotFound(format!("permission set '{permission_set_id}'")))?;
        permission_set.name = input.name;
        permission_set.description = input.description;
        Ok(permission_set.clone())
    }

    async fn delete_permission_set(&self, permission_set_id: PermissionSetId) -> AppResult<()> {
        let mut state = self.state.lock().await;
        state
            .permission_sets
            .remove(&permission_set_id)
            .ok_or_else(|| AppError::NotFound(format!("permission set '{permission_set_id}'")))?;
        for user in state.users.values_mut() {
            user.permission_set_ids.retain(|id| *id != permission_set_id);
        }
        Ok(())
    }

    async fn list_system_permissions(&self) -> AppResult<Vec<SystemPermission>> {
        let mut permissions: Vec<SystemPermission> = self
            .state
            .lock()
            .await
            .system_permissions
            .values()
            .cloned()
            .collect();
        permissions.sort_by(|left, right| left.name.cmp(&right.name));
        Ok(permissions)
    }

    async fn create_system_permission(
        &self,
        input: SaveSystemPermissionInput,
    ) -> AppResult<SystemPermission> {
        let mut state = self.state.lock().await;
        if state
            .system_permissions
            .values()
            .any(|permission| permission.name == input.name)
        {
            return Err(AppError::Conflict(format!(
                "system permission '{}' already exists",
                input.name
            )));
        }
        let permission = SystemPermission {
            id: SystemPermissionId::new(),
            name: input.name,
            description: input.description,
        };
        state
            .system_permissions
            .insert(permission.id, permission.clone());
        Ok(permission)
    }

    async fn delete_system_permission(&self, permission_id: SystemPermissionId) -> AppResult<()> {
        let mut state = self.state.lock().await;
        state
            .system_permissions
            .remove(&permission_id)
            .ok_or_else(|| AppError::NotFound(format!("system permission '{permission_id}'")))?;
        for profile in state.profiles.values_mut() {
            profile.permissions.retain(|permission| permission.id != permission_id);
        }
        for set in state.permission_sets.values_mut() {
            set.permissions.retain(|permission| permission.id != permission_id);
        }
        Ok(())
    }

    async fn connect_system_permission(
        &self,
        bundle: PermissionBundle,
        permission_id: SystemPermissionId,
    ) -> AppResult<()> {
        let mut state = self.state.lock().await;
        let permission = state
            .system_permissions
            .get(&permission_id)
            .cloned()
            .ok_or_else(|| AppError::NotFound(format!("system permission '{permission_id}'")))?;
        let permissions = bundle_permissions(&mut state, bundle)?;
        if !permissions.iter().any(|existing| existing.id == permission_id) {
            permissions.push(permission);
        }
        Ok(())
    }

    async fn disconnect_system_permission(
        &self,
        bundle: PermissionBundle,
        permission_id: SystemPermissionId,
    ) -> AppResult<()> {
        let mut state = self.state.lock().await;
        let permissions = bundle_permissions(&mut state, bundle)?;
        permissions.retain(|existing| existing.id != permission_id);
        Ok(())
    }
}

#[derive(Default)]
pub struct FakeHrSystem {
    pub absences: Mutex<Vec<AbsencePeriod>>,
    pub saved_reports: Mutex<Vec<TimeReport>>,
    pub list_calls: AtomicUsize,
}

impl FakeHrSystem {
    pub fn list_call_count(&self) -> usize {
        self.list_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl HrSystem for FakeHrSystem {
    async fn list_absences(
        &self,
        _employment_number: &EmploymentNumber,
        window: DateRange,
    ) -> AppResult<Vec<AbsencePeriod>> {
        self.list_calls.fetch_add(1, Ordering::SeqCst);
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
        created.id = Some(format!("abs-{}", absences.len() + 1));
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
        self.absences
            .lock()
            .await
            .retain(|absence| absence.id.as_deref() != Some(absence_id));
        Ok(())
    }

    async fn get_time_report(
        &self,
        employment_number: &EmploymentNumber,
        date: NaiveDate,
    ) -> AppResult<TimeReport> {
        let stored = self
            .saved_reports
            .lock()
            .await
            .iter()
            .rev()
            .find(|report| &report.employment_number == employment_number && report.date == date)
            .cloned();
        Ok(stored.unwrap_or_else(|| TimeReport {
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
    pub historical_hours: Vec<HistoricalHours>,
    pub opportunity_calls: AtomicUsize,
    pub writes: Mutex<Vec<String>>,
}

#[async_trait]
impl CrmGateway for FakeCrmGateway {
    async fn assignments_for_consultant(
        &self,
        email: &EmailAddress,
    ) -> AppResult<Vec<Assignment>> {
        Ok(vec![Assignment {
            id: "a0X1".to_owned(),
            name: format!("Assignment for {}", email.as_str()),
            project_name: Some("Migration".to_owned()),
            account_name: Some("Acme".to_owned()),
            start_date: None,
            end_date: None,
            allocation_percent: Some(100.0),
            status: Some("Active".to_owned()),
        }])
    }

    async fn open_opportunities(&self) -> AppResult<Vec<Opportunity>> {
        self.opportunity_calls.fetch_add(1, Ordering::SeqCst);
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
        _week_start: NaiveDate,
    ) -> AppResult<Vec<TimecardRow>> {
        Ok(Vec::new())
    }

    async fn historical_hours(
        &self,
        _email: &EmailAddress,
        window: &FiscalWindow,
    ) -> AppResult<Vec<HistoricalHours>> {
        Ok(self
            .historical_hours
            .iter()
            .filter(|record| window.contains(record.date))
            .copied()
            .collect())
    }

    async fn create_record(
        &self,
        object: &CrmApiName,
        _fields: CrmRecordFields,
    ) -> AppResult<String> {
        self.writes.lock().await.push(format!("create:{object}"));
        Ok("001NEW".to_owned())
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
    pub fail: bool,
}

#[async_trait]
impl Notifier for FakeNotifier {
    async fn notify(&self, text: &str) -> AppResult<()> {
        if self.fail {
            return Err(AppError::Network("webhook unreachable".to_owned()));
        }
        self.messages.lock().await.push(text.to_owned());
        Ok(())
    }
}

#[derive(Default)]
pub struct FakeReadCache {
    pub(crate) entries: Mutex<HashMap<String, (BTreeSet<String>, Value)>>,
    pub fail_invalidation: bool,
}

impl FakeReadCache {
    pub async fn is_empty(&self) -> bool {
        self.entries.lock().await.is_empty()
    }
}

#[async_trait]
impl ReadCache for FakeReadCache {
    async fn get(&self, key: &str) -> AppResult<Option<Value>> {
        Ok(self
            .entries
            .lock()
            .await
            .get(key)
            .map(|(_, value)| value.clone()))
    }

    async fn set(
        &self,
        key: &str,
        tags: &[String],
        value: Value,
        _ttl_seconds: u32,
    ) -> AppResult<()> {
        self.entries.lock().await.insert(
            key.to_owned(),
            (tags.iter().cloned().collect(), value),
        );
        Ok(())
    }

    async fn invalidate_tag(&self, tag: &str) -> AppResult<()> {
        if self.fail_invalidation {
            return Err(AppError::Internal("cache unavailable".to_owned()));
        }
        self.entries
            .lock()
            .await
            .retain(|_, (tags, _)| !tags.contains(tag));
        Ok(())
    }
}
