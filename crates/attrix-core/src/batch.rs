//! Batch orchestrator: drives the report client and row transformer over an
//! inbound batch of work items.
//!
//! The wire contract is positional: requests carry `data` as 4-tuples
//! `[id, app_token, start_date, end_date]` and responses carry 2-tuples
//! `[id, payload_string]`, one per input tuple, in the same order. Every
//! failure is folded into payload content; `process` itself never fails.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use time::format_description::BorrowedFormatItem;
use time::macros::format_description;
use time::Date;

use crate::catalog;
use crate::client::{ReportClient, ReportQuery, REPORT_ENDPOINT};
use crate::error::ReportError;
use crate::http::{HttpAuth, HttpClient};
use crate::transform::{transform_row, OutputRow};

const DATE_FORMAT: &[BorrowedFormatItem<'static>] = format_description!("[year]-[month]-[day]");

type WorkItemTuple = (Value, String, String, String);
type BatchEntryTuple = (Value, String);

/// One unit of work: fetch and transform the report for an app over a date
/// range. The id is opaque and echoed back verbatim.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "WorkItemTuple", into = "WorkItemTuple")]
pub struct WorkItem {
    pub id: Value,
    pub app_token: String,
    pub start_date: String,
    pub end_date: String,
}

impl WorkItem {
    pub fn new(
        id: impl Into<Value>,
        app_token: impl Into<String>,
        start_date: impl Into<String>,
        end_date: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            app_token: app_token.into(),
            start_date: start_date.into(),
            end_date: end_date.into(),
        }
    }

    /// Item-scoped validation; a bad token or date fails only this item.
    pub fn validate(&self) -> Result<(), ReportError> {
        if self.app_token.trim().is_empty() {
            return Err(ReportError::invalid_item("app token must not be empty"));
        }
        let start = parse_report_date(&self.start_date)?;
        let end = parse_report_date(&self.end_date)?;
        if end < start {
            return Err(ReportError::invalid_item(format!(
                "date range {}:{} is inverted",
                self.start_date, self.end_date
            )));
        }
        Ok(())
    }
}

impl From<WorkItemTuple> for WorkItem {
    fn from((id, app_token, start_date, end_date): WorkItemTuple) -> Self {
        Self {
            id,
            app_token,
            start_date,
            end_date,
        }
    }
}

impl From<WorkItem> for WorkItemTuple {
    fn from(item: WorkItem) -> Self {
        (item.id, item.app_token, item.start_date, item.end_date)
    }
}

/// Inbound batch. A missing `data` field is an empty batch.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct BatchRequest {
    #[serde(default)]
    pub data: Vec<WorkItem>,
}

/// One response entry: the echoed id plus a JSON-encoded payload string —
/// an array of output rows on success, `{"error": "..."}` on failure.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "BatchEntryTuple", into = "BatchEntryTuple")]
pub struct BatchEntry {
    pub id: Value,
    pub payload: String,
}

impl From<BatchEntryTuple> for BatchEntry {
    fn from((id, payload): BatchEntryTuple) -> Self {
        Self { id, payload }
    }
}

impl From<BatchEntry> for BatchEntryTuple {
    fn from(entry: BatchEntry) -> Self {
        (entry.id, entry.payload)
    }
}

/// Outbound batch: same length, order, and ids as the request, unless a
/// top-level failure collapsed it into one synthetic entry with id `0`.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct BatchResponse {
    pub data: Vec<BatchEntry>,
}

impl BatchResponse {
    /// Single synthetic error entry keyed id `0`, used for failures outside
    /// the per-item boundary.
    pub fn top_level_error(message: impl AsRef<str>) -> Self {
        Self {
            data: vec![BatchEntry {
                id: Value::from(0),
                payload: error_payload(message.as_ref()),
            }],
        }
    }
}

/// Sequential batch processor. Items run strictly in input order, one at a
/// time; the only shared state across items is the precomputed metric list
/// and the credential.
pub struct BatchProcessor {
    http_client: Arc<dyn HttpClient>,
    api_token: Option<String>,
    base_url: String,
}

impl BatchProcessor {
    pub fn new(http_client: Arc<dyn HttpClient>, api_token: Option<String>) -> Self {
        Self {
            http_client,
            api_token,
            base_url: String::from(REPORT_ENDPOINT),
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Parses a raw request body and processes it. Malformed overall input
    /// collapses to the synthetic id-`0` entry rather than an error return.
    pub async fn process_request(&self, body: &str) -> BatchResponse {
        match serde_json::from_str::<BatchRequest>(body) {
            Ok(request) => self.process(&request).await,
            Err(error) => BatchResponse::top_level_error(format!("batch error: {error}")),
        }
    }

    /// Processes every work item independently. Infallible by design: the
    /// caller always receives a structurally valid response.
    pub async fn process(&self, request: &BatchRequest) -> BatchResponse {
        let Some(token) = self
            .api_token
            .as_deref()
            .filter(|token| !token.trim().is_empty())
        else {
            return BatchResponse::top_level_error(
                "batch error: API bearer token is not configured",
            );
        };

        let client = ReportClient::with_http_client(
            Arc::clone(&self.http_client),
            HttpAuth::BearerToken(token.to_owned()),
        )
        .with_base_url(self.base_url.clone());

        let metrics = catalog::all_metrics();

        let mut entries = Vec::with_capacity(request.data.len());
        for item in &request.data {
            let payload = match process_item(&client, &metrics, item).await {
                Ok(payload) => payload,
                Err(error) => error_payload(&error.to_string()),
            };
            entries.push(BatchEntry {
                id: item.id.clone(),
                payload,
            });
        }

        BatchResponse { data: entries }
    }
}

async fn process_item(
    client: &ReportClient,
    metrics: &[String],
    item: &WorkItem,
) -> Result<String, ReportError> {
    item.validate()?;

    let query = ReportQuery::new(
        &item.app_token,
        &item.start_date,
        &item.end_date,
        metrics.to_vec(),
    );
    let raw_rows = client.fetch_report(&query).await?;
    let rows: Vec<OutputRow> = raw_rows.iter().map(transform_row).collect();

    serde_json::to_string(&rows).map_err(|error| ReportError::malformed(error.to_string()))
}

fn parse_report_date(value: &str) -> Result<Date, ReportError> {
    Date::parse(value, DATE_FORMAT)
        .map_err(|_| ReportError::invalid_item(format!("date '{value}' is not YYYY-MM-DD")))
}

fn error_payload(message: &str) -> String {
    serde_json::json!({ "error": message }).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn work_items_deserialize_from_positional_tuples() {
        let request: BatchRequest = serde_json::from_value(json!({
            "data": [[7, "app123", "2025-01-01", "2025-01-03"]]
        }))
        .expect("tuple form must parse");

        assert_eq!(
            request.data,
            vec![WorkItem::new(7, "app123", "2025-01-01", "2025-01-03")]
        );
    }

    #[test]
    fn entries_serialize_as_positional_tuples() {
        let response = BatchResponse {
            data: vec![BatchEntry {
                id: Value::from(7),
                payload: String::from("[]"),
            }],
        };

        assert_eq!(
            serde_json::to_value(&response).expect("response serializes"),
            json!({ "data": [[7, "[]"]] })
        );
    }

    #[test]
    fn missing_data_field_is_an_empty_batch() {
        let request: BatchRequest =
            serde_json::from_value(json!({})).expect("empty object must parse");
        assert!(request.data.is_empty());
    }

    #[test]
    fn validate_rejects_malformed_dates() {
        let item = WorkItem::new(1, "app123", "2025-13-01", "2025-01-03");
        let error = item.validate().expect_err("month 13 must fail");
        assert!(matches!(error, ReportError::InvalidItem(_)));

        let item = WorkItem::new(1, "app123", "01-01-2025", "2025-01-03");
        assert!(item.validate().is_err());
    }

    #[test]
    fn validate_rejects_inverted_ranges_and_empty_tokens() {
        let inverted = WorkItem::new(1, "app123", "2025-01-03", "2025-01-01");
        assert!(inverted.validate().is_err());

        let blank = WorkItem::new(1, "  ", "2025-01-01", "2025-01-03");
        assert!(blank.validate().is_err());

        let valid = WorkItem::new(1, "app123", "2025-01-01", "2025-01-01");
        assert!(valid.validate().is_ok());
    }

    #[test]
    fn top_level_error_is_one_entry_with_id_zero() {
        let response = BatchResponse::top_level_error("batch error: boom");

        assert_eq!(response.data.len(), 1);
        assert_eq!(response.data[0].id, Value::from(0));
        let payload: Value =
            serde_json::from_str(&response.data[0].payload).expect("payload is JSON");
        assert_eq!(payload, json!({ "error": "batch error: boom" }));
    }
}
