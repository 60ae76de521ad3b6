//! Holiday balance and absence application workflows.

use std::sync::Arc;

use chrono::{Datelike, NaiveDate};
use opsdash_core::{AppError, AppResult, UserIdentity};
use opsdash_domain::{
    AbsenceKind, AbsencePeriod, AbsenceStatus, BankHoliday, Capability, DateRange,
    EmploymentNumber, FiscalYearDefinition, HolidaySummary, SwedishHolidayCalendar,
    summarize_holidays, validate_absence_id,
};

use crate::{AccessService, CachePolicy, HrSystem};

/// Input for applying for or changing an absence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AbsenceInput {
    /// Inclusive absence period.
    pub range: DateRange,
    /// Absence type.
    pub kind: AbsenceKind,
    /// Optional comment for the approver.
    pub comment: Option<String>,
}

/// Application service for holiday summaries and absence applications.
#[derive(Clone)]
pub struct HolidayService {
    access_service: AccessService,
    hr_system: Arc<dyn HrSystem>,
    cache: CachePolicy,
    calendar: Arc<SwedishHolidayCalendar>,
}

impl HolidayService {
    /// Creates a new holiday service.
    #[must_use]
    pub fn new(
        access_service: AccessService,
        hr_system: Arc<dyn HrSystem>,
        cache: CachePolicy,
        calendar: Arc<SwedishHolidayCalendar>,
    ) -> Self {
        Self {
            access_service,
            hr_system,
            cache,
            calendar,
        }
    }

    /// Computes the actor's holiday balance for the fiscal year containing `today`.
    ///
    /// Applications from the previous fiscal year are fetched as well so that
    /// periods crossing 1 April are counted in full.
    pub async fn holiday_summary(
        &self,
        actor: &UserIdentity,
        today: NaiveDate,
    ) -> AppResult<HolidaySummary> {
        let user = self
            .access_service
            .require_capability(actor, Capability::DashboardView)
            .await?;
        let employment_number = user.require_employment_number()?;

        let current = FiscalYearDefinition::AprilToMarch.window_containing(today)?;
        let previous =
            FiscalYearDefinition::AprilToMarch.window_starting(current.start().year() - 1)?;
        let window = DateRange::new(previous.start(), current.end())?;

        let periods = self.read_absences(employment_number, window).await?;
        let summary = summarize_holidays(&periods, user.holiday_allowance, today, &self.calendar)?;

        tracing::debug!(
            employment_number = employment_number.as_str(),
            used_in_fiscal_year = summary.used_in_fiscal_year,
            available = summary.available,
            "holiday summary computed"
        );

        Ok(summary)
    }

    /// Lists the actor's absence applications overlapping `window`.
    pub async fn list_absences(
        &self,
        actor: &UserIdentity,
        window: DateRange,
    ) -> AppResult<Vec<AbsencePeriod>> {
        let user = self
            .access_service
            .require_capability(actor, Capability::DashboardView)
            .await?;
        let employment_number = user.require_employment_number()?;

        self.read_absences(employment_number, window).await
    }

    /// Applies for a new absence.
    pub async fn apply_for_absence(
        &self,
        actor: &UserIdentity,
        input: AbsenceInput,
    ) -> AppResult<AbsencePeriod> {
        let user = self
            .access_service
            .require_capability(actor, Capability::AbsenceWrite)
            .await?;
        let employment_number = user.require_employment_number()?;

        let absence = AbsencePeriod {
            id: None,
            range: input.range,
            status: AbsenceStatus::AppliedFor,
            kind: input.kind,
            comment: input.comment,
        };
        let created = self
            .hr_system
            .create_absence(employment_number, &absence)
            .await?;
        self.invalidate_absences(employment_number).await;

        tracing::info!(
            employment_number = employment_number.as_str(),
            from = %created.range.from(),
            to = %created.range.to(),
            "absence applied for"
        );

        Ok(created)
    }

    /// Changes an existing absence application.
    pub async fn update_absence(
        &self,
        actor: &UserIdentity,
        absence_id: &str,
        input: AbsenceInput,
    ) -> AppResult<AbsencePeriod> {
        let user = self
            .access_service
            .require_capability(actor, Capability::AbsenceWrite)
            .await?;
        let employment_number = user.require_employment_number()?;
        let absence_id = validate_absence_id(absence_id)?;

        let absence = AbsencePeriod {
            id: Some(absence_id.to_owned()),
            range: input.range,
            status: AbsenceStatus::AppliedFor,
            kind: input.kind,
            comment: input.comment,
        };
        let updated = self
            .hr_system
            .update_absence(employment_number, absence_id, &absence)
            .await?;
        self.invalidate_absences(employment_number).await;

        Ok(updated)
    }

    /// Withdraws an absence application.
    pub async fn delete_absence(&self, actor: &UserIdentity, absence_id: &str) -> AppResult<()> {
        let user = self
            .access_service
            .require_capability(actor, Capability::AbsenceWrite)
            .await?;
        let employment_number = user.require_employment_number()?;
        let absence_id = validate_absence_id(absence_id)?;

        self.hr_system
            .delete_absence(employment_number, absence_id)
            .await?;
        self.invalidate_absences(employment_number).await;

        Ok(())
    }

    /// Lists Swedish bank holidays for one calendar year.
    pub fn bank_holidays(&self, year: i32) -> AppResult<Vec<BankHoliday>> {
        if !self.calendar.covers(year) {
            return Err(AppError::Validation(format!(
                "bank holidays are only available for years {}-{}",
                self.calendar.years().start(),
                self.calendar.years().end()
            )));
        }

        Ok(self.calendar.holidays_in_year(year))
    }

    async fn read_absences(
        &self,
        employment_number: &EmploymentNumber,
        window: DateRange,
    ) -> AppResult<Vec<AbsencePeriod>> {
        let key = format!(
            "{}:{}:{}",
            absences_tag(employment_number),
            window.from(),
            window.to()
        );
        let tags = [absences_tag(employment_number)];

        self.cache
            .read(&key, &tags, || {
                self.hr_system.list_absences(employment_number, window)
            })
            .await
    }

    async fn invalidate_absences(&self, employment_number: &EmploymentNumber) {
        self.cache.invalidate(&absences_tag(employment_number)).await;
    }
}

fn absences_tag(employment_number: &EmploymentNumber) -> String {
    format!("absences:{}", employment_number.as_str())
}
