use std::sync::Arc;

use chrono::NaiveDate;
use opsdash_core::{AppResult, UserIdentity};
use opsdash_domain::{Capability, TimeReport, TimeReportRow, User};

use crate::{AccessService, HrSystem, Notifier};

/// Application service for daily time reports.
#[derive(Clone)]
pub struct TimeReportService {
    access_service: AccessService,
    hr_system: Arc<dyn HrSystem>,
    notifier: Arc<dyn Notifier>,
}

impl TimeReportService {
    /// Creates a new time report service.
    #[must_use]
    pub fn new(
        access_service: AccessService,
        hr_system: Arc<dyn HrSystem>,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        Self {
            access_service,
            hr_system,
            notifier,
        }
    }

    /// Returns the actor's time report for one date.
    pub async fn get_time_report(
        &self,
        actor: &UserIdentity,
        date: NaiveDate,
    ) -> AppResult<TimeReport> {
        let user = self
            .access_service
            .require_capability(actor, Capability::DashboardView)
            .await?;
        let employment_number = user.require_employment_number()?;

        self.hr_system.get_time_report(employment_number, date).await
    }

    /// Saves the actor's time report and announces submissions.
    ///
    /// A failed announcement is logged and does not fail the save.
    pub async fn save_time_report(
        &self,
        actor: &UserIdentity,
        date: NaiveDate,
        rows: Vec<TimeReportRow>,
        submit: bool,
    ) -> AppResult<TimeReport> {
        let user = self
            .access_service
            .require_capability(actor, Capability::TimeReportWrite)
            .await?;
        let employment_number = user.require_employment_number()?;

        let report = TimeReport {
            employment_number: employment_number.clone(),
            date,
            rows,
            submitted: submit,
        };
        report.validate()?;

        let saved = self.hr_system.save_time_report(&report).await?;

        if saved.submitted {
            self.announce_submission(&user, &saved).await;
        }

        Ok(saved)
    }

    async fn announce_submission(&self, user: &User, report: &TimeReport) {
        let text = format!(
            "{} submitted the time report for {} ({} h)",
            user.display_name,
            report.date,
            report.total_hours()
        );

        if let Err(error) = self.notifier.notify(&text).await {
            tracing::warn!(
                user_id = %user.id,
                date = %report.date,
                error = %error,
                "failed to announce submitted time report"
            );
        }
    }
}
