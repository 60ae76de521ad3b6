//! Salesforce adapter for assignments, opportunities, timecards and hours.
//!
//! The OAuth session is created lazily behind an async mutex, so concurrent
//! first requests share one login. An expired session is dropped and the
//! failed request is retried exactly once with a fresh login.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::NaiveDate;
use opsdash_application::{CrmGateway, CrmRecordFields};
use opsdash_core::{AppError, AppResult};
use opsdash_domain::{
    Assignment, CrmApiName, EmailAddress, FiscalWindow, HistoricalHours, Opportunity, TimecardRow,
};
use serde::de::DeserializeOwned;
use serde_json::Value;
use tokio::sync::Mutex;

use crate::http_callout_client::{
    CalloutClient, CalloutConfig, CalloutError, CalloutRequest, CalloutResponse,
};

mod soql;
mod wire;

pub use soql::{SoqlStatement, SoqlValue, escape_literal, escape_sosl_term};

use wire::{
    AssignmentRecord, HistoricalHoursRecord, OpportunityRecord, QueryPage, SaveResult,
    SearchResponse, TimecardRecord, TokenResponse,
};

/// API version used when none is configured.
pub const DEFAULT_SALESFORCE_API_VERSION: &str = "61.0";

const OPPORTUNITY_FIELDS: &str =
    "Id, Name, Account.Name, StageName, Amount, Probability, CloseDate, Owner.Name";

/// Connection settings for one Salesforce org.
#[derive(Debug, Clone)]
pub struct SalesforceSettings {
    /// Login host, e.g. `https://login.salesforce.com`.
    pub login_url: String,
    /// Connected app consumer key.
    pub client_id: String,
    /// Connected app consumer secret.
    pub client_secret: String,
    /// REST API version without the `v` prefix, e.g. `61.0`.
    pub api_version: String,
    /// Request timeout.
    pub timeout: Duration,
}

/// Access token and the org instance it is valid for.
#[derive(Clone)]
pub struct SalesforceSession {
    access_token: String,
    instance_url: String,
}

impl SalesforceSession {
    /// Returns the org instance URL.
    #[must_use]
    pub fn instance_url(&self) -> &str {
        self.instance_url.as_str()
    }

    fn url(&self, path: &str) -> String {
        if path.starts_with("http://") || path.starts_with("https://") {
            return path.to_owned();
        }

        format!("{}{}", self.instance_url.trim_end_matches('/'), path)
    }

    fn authorize(&self, request: CalloutRequest) -> CalloutRequest {
        request.header("Authorization", format!("Bearer {}", self.access_token))
    }
}

impl std::fmt::Debug for SalesforceSession {
    fn fmt(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        formatter
            .debug_struct("SalesforceSession")
            .field("access_token", &"<redacted>")
            .field("instance_url", &self.instance_url)
            .finish()
    }
}

/// HTTP implementation of the [`CrmGateway`] port.
#[derive(Debug)]
pub struct SalesforceClient {
    callout: CalloutClient,
    client_id: String,
    client_secret: String,
    api_version: String,
    session: Mutex<Option<Arc<SalesforceSession>>>,
}

impl SalesforceClient {
    /// Creates a client. No login happens until the first request.
    pub fn new(http_client: reqwest::Client, settings: SalesforceSettings) -> AppResult<Self> {
        let config = CalloutConfig::new(&settings.login_url)?
            .with_header("Accept", "application/json")
            .with_timeout(settings.timeout);

        let api_version = settings.api_version.trim().trim_start_matches('v').to_owned();
        if api_version.is_empty() {
            return Err(AppError::Validation(
                "salesforce api version must not be empty".to_owned(),
            ));
        }

        Ok(Self {
            callout: CalloutClient::new(http_client, config),
            client_id: settings.client_id,
            client_secret: settings.client_secret,
            api_version,
            session: Mutex::new(None),
        })
    }

    /// Returns the current session, logging in when there is none.
    ///
    /// The lock is held across the login so concurrent callers wait for the
    /// same session instead of logging in themselves.
    pub async fn session(&self) -> AppResult<Arc<SalesforceSession>> {
        Ok(self.acquire_session().await?)
    }

    /// Runs a SOQL query and follows `nextRecordsUrl` until all pages are read.
    pub async fn query<R>(&self, statement: &SoqlStatement) -> AppResult<Vec<R>>
    where
        R: DeserializeOwned + Send,
    {
        let soql = statement.render()?;
        let query_path = format!("{}/query", self.data_path());

        let mut page: QueryPage<R> = self
            .send_authorized(|session| {
                CalloutRequest::get(session.url(&query_path)).param("q", soql.as_str())
            })
            .await?
            .json()?;

        let mut records = Vec::new();
        loop {
            records.append(&mut page.records);
            match page.next_records_url.take() {
                Some(next) if !page.done => {
                    tracing::debug!(next = %next, fetched = records.len(), "fetching next salesforce page");
                    page = self
                        .send_authorized(|session| CalloutRequest::get(session.url(&next)))
                        .await?
                        .json()?;
                }
                _ => break,
            }
        }

        Ok(records)
    }

    /// Runs a SOSL search and returns the matching records.
    pub async fn search<R>(&self, sosl: &str) -> AppResult<Vec<R>>
    where
        R: DeserializeOwned + Send,
    {
        let search_path = format!("{}/search", self.data_path());
        let response: SearchResponse<R> = self
            .send_authorized(|session| CalloutRequest::get(session.url(&search_path)).param("q", sosl))
            .await?
            .json()?;

        Ok(response.search_records)
    }

    fn data_path(&self) -> String {
        format!("/services/data/v{}", self.api_version)
    }

    fn sobject_path(&self, object: &CrmApiName) -> String {
        format!("{}/sobjects/{}", self.data_path(), object.as_str())
    }

    async fn acquire_session(&self) -> Result<Arc<SalesforceSession>, CalloutError> {
        let mut guard = self.session.lock().await;
        if let Some(session) = guard.as_ref() {
            return Ok(Arc::clone(session));
        }

        let session = Arc::new(self.login().await?);
        *guard = Some(Arc::clone(&session));
        Ok(session)
    }

    async fn login(&self) -> Result<SalesforceSession, CalloutError> {
        let request = CalloutRequest::post("/services/oauth2/token").form([
            ("grant_type", "client_credentials"),
            ("client_id", self.client_id.as_str()),
            ("client_secret", self.client_secret.as_str()),
        ]);

        let token: TokenResponse = self
            .callout
            .send_json(request)
            .await
            .map_err(with_oauth_description)
            .inspect_err(|error| {
                tracing::warn!(error = %error, "salesforce login failed");
            })?;

        tracing::info!(instance_url = %token.instance_url, "salesforce session established");
        Ok(SalesforceSession {
            access_token: token.access_token,
            instance_url: token.instance_url,
        })
    }

    /// Drops the cached session unless another caller already replaced it.
    async fn invalidate(&self, stale: &Arc<SalesforceSession>) {
        let mut guard = self.session.lock().await;
        if guard
            .as_ref()
            .is_some_and(|current| Arc::ptr_eq(current, stale))
        {
            *guard = None;
        }
    }

    async fn send_authorized<F>(&self, build: F) -> Result<CalloutResponse, CalloutError>
    where
        F: Fn(&SalesforceSession) -> CalloutRequest + Send + Sync,
    {
        let session = self.acquire_session().await?;
        match self.callout.send(session.authorize(build(&session))).await {
            Err(error) if is_session_expired(&error) => {
                tracing::info!(error = %error, "salesforce session expired, logging in again");
                self.invalidate(&session).await;

                let session = self.acquire_session().await?;
                self.callout.send(session.authorize(build(&session))).await
            }
            result => result,
        }
    }
}

fn is_session_expired(error: &CalloutError) -> bool {
    error.status() == Some(401) || error.code() == Some("INVALID_SESSION_ID")
}

#[async_trait]
impl CrmGateway for SalesforceClient {
    async fn assignments_for_consultant(
        &self,
        email: &EmailAddress,
    ) -> AppResult<Vec<Assignment>> {
        let statement = SoqlStatement::new(
            "SELECT Id, Name, Project__r.Name, Account__r.Name, Start_Date__c, End_Date__c, \
             Allocation__c, Status__c FROM Assignment__c \
             WHERE Consultant_Email__c = :email ORDER BY Start_Date__c DESC",
        )
        .bind("email", email.as_str());

        let records: Vec<AssignmentRecord> = self.query(&statement).await?;
        Ok(records.into_iter().map(Assignment::from).collect())
    }

    async fn open_opportunities(&self) -> AppResult<Vec<Opportunity>> {
        let statement = SoqlStatement::new(format!(
            "SELECT {OPPORTUNITY_FIELDS} FROM Opportunity WHERE IsClosed = false ORDER BY CloseDate"
        ));

        let records: Vec<OpportunityRecord> = self.query(&statement).await?;
        Ok(records.into_iter().map(Opportunity::from).collect())
    }

    async fn search_opportunities(&self, term: &str) -> AppResult<Vec<Opportunity>> {
        let sosl = format!(
            "FIND {{{}}} IN NAME FIELDS RETURNING Opportunity({OPPORTUNITY_FIELDS} ORDER BY CloseDate) LIMIT 50",
            escape_sosl_term(term.trim())
        );

        let records: Vec<OpportunityRecord> = self.search(&sosl).await?;
        Ok(records.into_iter().map(Opportunity::from).collect())
    }

    async fn timecards_for_week(
        &self,
        email: &EmailAddress,
        week_start: NaiveDate,
    ) -> AppResult<Vec<TimecardRow>> {
        let statement = SoqlStatement::new(
            "SELECT Id, Project__r.Name, Week_Start__c, Total_Hours__c, Billable__c, Status__c \
             FROM Timecard__c \
             WHERE Consultant_Email__c = :email AND Week_Start__c = :week_start",
        )
        .bind("email", email.as_str())
        .bind("week_start", week_start);

        let records: Vec<TimecardRecord> = self.query(&statement).await?;
        Ok(records.into_iter().map(TimecardRow::from).collect())
    }

    async fn historical_hours(
        &self,
        email: &EmailAddress,
        window: &FiscalWindow,
    ) -> AppResult<Vec<HistoricalHours>> {
        let statement = SoqlStatement::new(
            "SELECT Date__c, Billable_Hours__c, Available_Hours__c FROM Historical_Hours__c \
             WHERE Consultant_Email__c = :email AND Date__c >= :from AND Date__c <= :to \
             ORDER BY Date__c",
        )
        .bind("email", email.as_str())
        .bind("from", window.start())
        .bind("to", window.end());

        let records: Vec<HistoricalHoursRecord> = self.query(&statement).await?;
        Ok(records.into_iter().map(HistoricalHours::from).collect())
    }

    async fn create_record(
        &self,
        object: &CrmApiName,
        fields: CrmRecordFields,
    ) -> AppResult<String> {
        let path = self.sobject_path(object);
        let body = Value::Object(fields);
        let result: SaveResult = self
            .send_authorized(|session| CalloutRequest::post(session.url(&path)).json(body.clone()))
            .await?
            .json()?;

        if !result.success {
            return Err(AppError::Upstream(format!(
                "salesforce rejected the new {object} record: {}",
                Value::Array(result.errors)
            )));
        }

        tracing::info!(object = %object, record_id = %result.id, "salesforce record created");
        Ok(result.id)
    }

    async fn update_record(
        &self,
        object: &CrmApiName,
        record_id: &str,
        fields: CrmRecordFields,
    ) -> AppResult<()> {
        let path = format!("{}/{record_id}", self.sobject_path(object));
        let body = Value::Object(fields);
        self.send_authorized(|session| CalloutRequest::patch(session.url(&path)).json(body.clone()))
            .await
            .map_err(|error| not_found_for(error, object, record_id))?;

        tracing::info!(object = %object, record_id, "salesforce record updated");
        Ok(())
    }

    async fn delete_record(&self, object: &CrmApiName, record_id: &str) -> AppResult<()> {
        let path = format!("{}/{record_id}", self.sobject_path(object));
        self.send_authorized(|session| CalloutRequest::delete(session.url(&path)))
            .await
            .map_err(|error| not_found_for(error, object, record_id))?;

        tracing::info!(object = %object, record_id, "salesforce record deleted");
        Ok(())
    }
}

fn not_found_for(error: CalloutError, object: &CrmApiName, record_id: &str) -> AppError {
    match error {
        CalloutError::Api { status: 404, .. } => {
            AppError::NotFound(format!("{object} record '{record_id}' does not exist"))
        }
        other => other.into(),
    }
}

/// Appends the OAuth `error_description` to a failed token exchange.
fn with_oauth_description(error: CalloutError) -> CalloutError {
    match error {
        CalloutError::Api {
            status,
            code,
            message,
            payload,
        } => {
            let description = payload
                .as_ref()
                .and_then(|body| body.get("error_description"))
                .and_then(Value::as_str)
                .map(str::trim)
                .filter(|description| !description.is_empty() && *description != message);
            let message = match description {
                Some(description) => format!("{message}: {description}"),
                None => message,
            };

            CalloutError::Api {
                status,
                code,
                message,
                payload,
            }
        }
        other => other,
    }
}
