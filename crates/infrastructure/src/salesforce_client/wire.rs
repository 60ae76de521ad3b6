use chrono::NaiveDate;
use opsdash_domain::{Assignment, HistoricalHours, Opportunity, TimecardRow};
use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub(super) struct TokenResponse {
    pub access_token: String,
    pub instance_url: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct QueryPage<T> {
    pub records: Vec<T>,
    pub done: bool,
    pub next_records_url: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase", bound(deserialize = "T: Deserialize<'de>"))]
pub(super) struct SearchResponse<T> {
    #[serde(default)]
    pub search_records: Vec<T>,
}

#[derive(Debug, Deserialize)]
pub(super) struct SaveResult {
    pub id: String,
    pub success: bool,
    #[serde(default)]
    pub errors: Vec<serde_json::Value>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub(super) struct NamedReference {
    pub name: Option<String>,
}

fn reference_name(reference: Option<NamedReference>) -> Option<String> {
    reference.and_then(|reference| reference.name)
}

#[derive(Debug, Deserialize)]
pub(super) struct AssignmentRecord {
    #[serde(rename = "Id")]
    id: String,
    #[serde(rename = "Name")]
    name: String,
    #[serde(rename = "Project__r")]
    project: Option<NamedReference>,
    #[serde(rename = "Account__r")]
    account: Option<NamedReference>,
    #[serde(rename = "Start_Date__c")]
    start_date: Option<NaiveDate>,
    #[serde(rename = "End_Date__c")]
    end_date: Option<NaiveDate>,
    #[serde(rename = "Allocation__c")]
    allocation: Option<f64>,
    #[serde(rename = "Status__c")]
    status: Option<String>,
}

impl From<AssignmentRecord> for Assignment {
    fn from(record: AssignmentRecord) -> Self {
        Self {
            id: record.id,
            name: record.name,
            project_name: reference_name(record.project),
            account_name: reference_name(record.account),
            start_date: record.start_date,
            end_date: record.end_date,
            allocation_percent: record.allocation,
            status: record.status,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub(super) struct OpportunityRecord {
    id: String,
    name: String,
    account: Option<NamedReference>,
    stage_name: String,
    amount: Option<f64>,
    probability: Option<f64>,
    close_date: Option<NaiveDate>,
    owner: Option<NamedReference>,
}

impl From<OpportunityRecord> for Opportunity {
    fn from(record: OpportunityRecord) -> Self {
        Self {
            id: record.id,
            name: record.name,
            account_name: reference_name(record.account),
            stage: record.stage_name,
            amount: record.amount,
            probability: record.probability,
            close_date: record.close_date,
            owner_name: reference_name(record.owner),
        }
    }
}

#[derive(Debug, Deserialize)]
pub(super) struct TimecardRecord {
    #[serde(rename = "Id")]
    id: String,
    #[serde(rename = "Project__r")]
    project: Option<NamedReference>,
    #[serde(rename = "Week_Start__c")]
    week_start: NaiveDate,
    #[serde(rename = "Total_Hours__c")]
    total_hours: Option<f64>,
    #[serde(rename = "Billable__c", default)]
    billable: bool,
    #[serde(rename = "Status__c")]
    status: Option<String>,
}

impl From<TimecardRecord> for TimecardRow {
    fn from(record: TimecardRecord) -> Self {
        Self {
            id: record.id,
            project_name: reference_name(record.project),
            week_start: record.week_start,
            total_hours: record.total_hours.unwrap_or_default(),
            billable: record.billable,
            status: record.status,
        }
    }
}

#[derive(Debug, Deserialize)]
pub(super) struct HistoricalHoursRecord {
    #[serde(rename = "Date__c")]
    date: NaiveDate,
    #[serde(rename = "Billable_Hours__c")]
    billable_hours: Option<f64>,
    #[serde(rename = "Available_Hours__c")]
    available_hours: Option<f64>,
}

impl From<HistoricalHoursRecord> for HistoricalHours {
    fn from(record: HistoricalHoursRecord) -> Self {
        Self {
            date: record.date,
            billable_hours: record.billable_hours.unwrap_or_default(),
            available_hours: record.available_hours.unwrap_or_default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::{SearchResponse, TokenResponse};

    #[test]
    fn search_without_records_is_empty() {
        let response = serde_json::from_value::<SearchResponse<TokenResponse>>(json!({}));
        assert_eq!(response.map(|body| body.search_records.len()).ok(), Some(0));
    }

    #[test]
    fn search_records_decode_into_types_without_default() {
        let response = serde_json::from_value::<SearchResponse<TokenResponse>>(json!({
            "searchRecords": [{"access_token": "T1", "instance_url": "https://acme.my"}]
        }));
        let Ok(response) = response else {
            panic!("search response should decode");
        };
        assert_eq!(response.search_records[0].access_token, "T1");
    }
}
