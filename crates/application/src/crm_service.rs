//! CRM reads, writes and occupancy reporting.

use std::sync::Arc;

use chrono::{Datelike, NaiveDate, Weekday};
use opsdash_core::{AppError, AppResult, UserIdentity};
use opsdash_domain::{
    Assignment, Capability, CrmApiName, FiscalYearDefinition, HistoricalHours, OccupancyReport,
    Opportunity, TimecardRow, occupancy_report,
};

use crate::{AccessService, CachePolicy, CrmGateway, CrmRecordFields};

const ASSIGNMENTS_TAG: &str = "crm:assignments";
const OPPORTUNITIES_TAG: &str = "crm:opportunities";
const TIMECARDS_TAG: &str = "crm:timecards";

/// Application service for CRM views.
#[derive(Clone)]
pub struct CrmService {
    access_service: AccessService,
    gateway: Arc<dyn CrmGateway>,
    cache: CachePolicy,
}

impl CrmService {
    /// Creates a new CRM service.
    #[must_use]
    pub fn new(
        access_service: AccessService,
        gateway: Arc<dyn CrmGateway>,
        cache: CachePolicy,
    ) -> Self {
        Self {
            access_service,
            gateway,
            cache,
        }
    }

    /// Lists the actor's own assignments.
    pub async fn my_assignments(&self, actor: &UserIdentity) -> AppResult<Vec<Assignment>> {
        let user = self
            .access_service
            .require_capability(actor, Capability::CrmRead)
            .await?;

        let key = format!("{ASSIGNMENTS_TAG}:{}", user.email.as_str());
        self.cache
            .read(&key, &[ASSIGNMENTS_TAG.to_owned()], || {
                self.gateway.assignments_for_consultant(&user.email)
            })
            .await
    }

    /// Lists opportunities that are still open.
    pub async fn open_opportunities(&self, actor: &UserIdentity) -> AppResult<Vec<Opportunity>> {
        self.access_service
            .require_capability(actor, Capability::CrmRead)
            .await?;

        let key = format!("{OPPORTUNITIES_TAG}:open");
        self.cache
            .read(&key, &[OPPORTUNITIES_TAG.to_owned()], || {
                self.gateway.open_opportunities()
            })
            .await
    }

    /// Searches opportunities by free text.
    pub async fn search_opportunities(
        &self,
        actor: &UserIdentity,
        term: &str,
    ) -> AppResult<Vec<Opportunity>> {
        self.access_service
            .require_capability(actor, Capability::CrmRead)
            .await?;

        let term = term.trim();
        if term.chars().count() < 2 {
            return Err(AppError::Validation(
                "search term must contain at least two characters".to_owned(),
            ));
        }

        let key = format!("{OPPORTUNITIES_TAG}:search:{}", term.to_lowercase());
        self.cache
            .read(&key, &[OPPORTUNITIES_TAG.to_owned()], || {
                self.gateway.search_opportunities(term)
            })
            .await
    }

    /// Lists the actor's timecards for the week starting on `week_start`.
    pub async fn timecards_for_week(
        &self,
        actor: &UserIdentity,
        week_start: NaiveDate,
    ) -> AppResult<Vec<TimecardRow>> {
        let user = self
            .access_service
            .require_capability(actor, Capability::CrmRead)
            .await?;

        if week_start.weekday() != Weekday::Mon {
            return Err(AppError::Validation(format!(
                "week start {week_start} is not a Monday"
            )));
        }

        let key = format!("{TIMECARDS_TAG}:{}:{week_start}", user.email.as_str());
        self.cache
            .read(&key, &[TIMECARDS_TAG.to_owned()], || {
                self.gateway.timecards_for_week(&user.email, week_start)
            })
            .await
    }

    /// Creates a CRM record and returns its id.
    pub async fn create_record(
        &self,
        actor: &UserIdentity,
        object: &str,
        fields: CrmRecordFields,
    ) -> AppResult<String> {
        self.access_service
            .require_capability(actor, Capability::CrmWrite)
            .await?;
        let object = CrmApiName::new(object)?;
        require_fields(&fields)?;

        let record_id = self.gateway.create_record(&object, fields).await?;
        self.cache.invalidate(object_tag(&object)).await;

        tracing::info!(object = %object, record_id = %record_id, actor = actor.email(), "crm record created");
        Ok(record_id)
    }

    /// Updates fields on a CRM record.
    pub async fn update_record(
        &self,
        actor: &UserIdentity,
        object: &str,
        record_id: &str,
        fields: CrmRecordFields,
    ) -> AppResult<()> {
        self.access_service
            .require_capability(actor, Capability::CrmWrite)
            .await?;
        let object = CrmApiName::new(object)?;
        let record_id = require_record_id(record_id)?;
        require_fields(&fields)?;

        self.gateway.update_record(&object, record_id, fields).await?;
        self.cache.invalidate(object_tag(&object)).await;

        Ok(())
    }

    /// Deletes a CRM record.
    pub async fn delete_record(
        &self,
        actor: &UserIdentity,
        object: &str,
        record_id: &str,
    ) -> AppResult<()> {
        self.access_service
            .require_capability(actor, Capability::CrmWrite)
            .await?;
        let object = CrmApiName::new(object)?;
        let record_id = require_record_id(record_id)?;

        self.gateway.delete_record(&object, record_id).await?;
        self.cache.invalidate(object_tag(&object)).await;

        tracing::info!(object = %object, record_id, actor = actor.email(), "crm record deleted");
        Ok(())
    }

    /// Computes the actor's occupancy for the February to January fiscal year
    /// containing `today`.
    pub async fn occupancy(
        &self,
        actor: &UserIdentity,
        today: NaiveDate,
    ) -> AppResult<OccupancyReport> {
        let user = self
            .access_service
            .require_capability(actor, Capability::OccupancyView)
            .await?;
        let window = FiscalYearDefinition::FebruaryToJanuary.window_containing(today)?;

        let key = format!(
            "{TIMECARDS_TAG}:historical:{}:{}",
            user.email.as_str(),
            window.start()
        );
        let records: Vec<HistoricalHours> = self
            .cache
            .read(&key, &[TIMECARDS_TAG.to_owned()], || {
                self.gateway.historical_hours(&user.email, &window)
            })
            .await?;

        occupancy_report(&records, today)
    }
}

/// Maps a CRM object to the cache tag its reads are stored under.
fn object_tag(object: &CrmApiName) -> &'static str {
    let name = object.as_str().to_ascii_lowercase();
    if name.starts_with("opportunit") {
        OPPORTUNITIES_TAG
    } else if name.contains("timecard") || name.contains("historical") {
        TIMECARDS_TAG
    } else {
        ASSIGNMENTS_TAG
    }
}

fn require_record_id(record_id: &str) -> AppResult<&str> {
    let record_id = record_id.trim();
    let valid_length = record_id.len() == 15 || record_id.len() == 18;
    if !valid_length || !record_id.chars().all(|character| character.is_ascii_alphanumeric()) {
        return Err(AppError::Validation(format!(
            "'{record_id}' is not a valid CRM record id"
        )));
    }

    Ok(record_id)
}

fn require_fields(fields: &CrmRecordFields) -> AppResult<()> {
    if fields.is_empty() {
        return Err(AppError::Validation(
            "at least one field value is required".to_owned(),
        ));
    }
    for field in fields.keys() {
        CrmApiName::new(field.as_str())?;
    }

    Ok(())
}
