//! Flex HRM adapter for absences and time reports.

use async_trait::async_trait;
use chrono::NaiveDate;
use opsdash_application::HrSystem;
use opsdash_core::{AppError, AppResult};
use opsdash_domain::{
    AbsencePeriod, DateRange, EmploymentNumber, TimeReport, validate_absence_id,
};

use crate::http_callout_client::{CalloutClient, CalloutConfig, CalloutError, CalloutRequest};

mod wire;

use wire::{FlexAbsenceApplication, FlexTimeReport};

/// Connection settings for one Flex HRM instance.
#[derive(Debug, Clone)]
pub struct FlexSettings {
    /// Flex API root, e.g. `https://api.flexhrm.com`.
    pub base_url: String,
    /// Customer instance name.
    pub instance: String,
    /// Company number inside the instance.
    pub company_number: String,
    /// API user name.
    pub username: String,
    /// API password.
    pub password: String,
    /// Request timeout.
    pub timeout: std::time::Duration,
}

/// HTTP implementation of the [`HrSystem`] port.
#[derive(Debug, Clone)]
pub struct FlexHrClient {
    callout: CalloutClient,
    instance: String,
    company_number: String,
}

impl FlexHrClient {
    /// Creates a Flex client using Basic authentication.
    pub fn new(http_client: reqwest::Client, settings: FlexSettings) -> AppResult<Self> {
        let config = CalloutConfig::new(&settings.base_url)?
            .with_basic_auth(settings.username, settings.password)
            .with_header("Accept", "application/json")
            .with_timeout(settings.timeout);

        Ok(Self {
            callout: CalloutClient::new(http_client, config),
            instance: settings.instance,
            company_number: settings.company_number,
        })
    }

    fn employee_path(&self, employment_number: &EmploymentNumber) -> String {
        format!(
            "/{}/api/v1/companies/{}/employees/{}",
            self.instance,
            self.company_number,
            employment_number.as_str()
        )
    }

    fn absences_path(&self, employment_number: &EmploymentNumber) -> String {
        format!("{}/absenceapplications", self.employee_path(employment_number))
    }

    fn absence_path(
        &self,
        employment_number: &EmploymentNumber,
        absence_id: &str,
    ) -> AppResult<String> {
        let absence_id = validate_absence_id(absence_id)?;
        Ok(format!("{}/{absence_id}", self.absences_path(employment_number)))
    }

    fn time_report_path(&self, employment_number: &EmploymentNumber, date: NaiveDate) -> String {
        format!(
            "{}/timereports/{}",
            self.employee_path(employment_number),
            date.format("%Y-%m-%d")
        )
    }
}

#[async_trait]
impl HrSystem for FlexHrClient {
    async fn list_absences(
        &self,
        employment_number: &EmploymentNumber,
        window: DateRange,
    ) -> AppResult<Vec<AbsencePeriod>> {
        let request = CalloutRequest::get(self.absences_path(employment_number))
            .param("fromDate", window.from().to_string())
            .param("toDate", window.to().to_string());

        let response = self.callout.send(request).await?;
        if response.payload().is_none() {
            return Ok(Vec::new());
        }

        let applications: Vec<FlexAbsenceApplication> = response.json()?;
        applications
            .into_iter()
            .map(FlexAbsenceApplication::into_domain)
            .collect()
    }

    async fn create_absence(
        &self,
        employment_number: &EmploymentNumber,
        absence: &AbsencePeriod,
    ) -> AppResult<AbsencePeriod> {
        let body = FlexAbsenceApplication::from_domain(absence).to_json()?;
        let created: FlexAbsenceApplication = self
            .callout
            .send_json(CalloutRequest::post(self.absences_path(employment_number)).json(body))
            .await?;

        tracing::info!(
            employment_number = employment_number.as_str(),
            absence_id = %created.id.as_deref().unwrap_or_default(),
            "flex absence application created"
        );
        created.into_domain()
    }

    async fn update_absence(
        &self,
        employment_number: &EmploymentNumber,
        absence_id: &str,
        absence: &AbsencePeriod,
    ) -> AppResult<AbsencePeriod> {
        let body = FlexAbsenceApplication::from_domain(absence).to_json()?;
        let path = self.absence_path(employment_number, absence_id)?;
        let response = self.callout.send(CalloutRequest::put(path).json(body)).await?;

        if response.payload().is_none() {
            return Ok(AbsencePeriod {
                id: Some(absence_id.to_owned()),
                ..absence.clone()
            });
        }

        response.json::<FlexAbsenceApplication>()?.into_domain()
    }

    async fn delete_absence(
        &self,
        employment_number: &EmploymentNumber,
        absence_id: &str,
    ) -> AppResult<()> {
        let path = self.absence_path(employment_number, absence_id)?;
        match self.callout.send(CalloutRequest::delete(path)).await {
            Ok(_) => Ok(()),
            Err(CalloutError::Api { status: 404, .. }) => Err(AppError::NotFound(format!(
                "absence application '{absence_id}' does not exist"
            ))),
            Err(error) => Err(error.into()),
        }
    }

    async fn get_time_report(
        &self,
        employment_number: &EmploymentNumber,
        date: NaiveDate,
    ) -> AppResult<TimeReport> {
        let empty = TimeReport {
            employment_number: employment_number.clone(),
            date,
            rows: Vec::new(),
            submitted: false,
        };

        let request = CalloutRequest::get(self.time_report_path(employment_number, date));
        let response = match self.callout.send(request).await {
            Ok(response) => response,
            Err(CalloutError::Api { status: 404, .. }) => return Ok(empty),
            Err(error) => return Err(error.into()),
        };

        if response.payload().is_none() {
            return Ok(empty);
        }

        let report: FlexTimeReport = response.json()?;
        Ok(report.into_domain(employment_number.clone(), date))
    }

    async fn save_time_report(&self, report: &TimeReport) -> AppResult<TimeReport> {
        let body = FlexTimeReport::from_domain(report).to_json()?;
        let path = self.time_report_path(&report.employment_number, report.date);
        let response = self.callout.send(CalloutRequest::put(path).json(body)).await?;

        if response.payload().is_none() {
            return Ok(report.clone());
        }

        let saved: FlexTimeReport = response.json()?;
        Ok(saved.into_domain(report.employment_number.clone(), report.date))
    }
}
