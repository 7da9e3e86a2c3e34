//! Report client: builds the outbound report query and performs the remote
//! call against the reports-service endpoint.

use std::sync::Arc;

use crate::catalog;
use crate::error::ReportError;
use crate::http::{HttpAuth, HttpClient, HttpRequest, ReqwestHttpClient};

/// Fixed reports-service endpoint; only the first page it returns is used.
pub const REPORT_ENDPOINT: &str = "https://automate.adjust.com/reports-service/report";

/// Per-call network timeout. The report service can take a while to
/// aggregate wide date ranges.
pub const REPORT_TIMEOUT_MS: u64 = 120_000;

const DEFAULT_CURRENCY: &str = "USD";
const ATTRIBUTION_TYPE: &str = "click,impression";
const AD_SPEND_MODE: &str = "network";

/// One loosely-typed report row exactly as returned upstream; fields may be
/// absent or null.
pub type RawReportRow = serde_json::Map<String, serde_json::Value>;

/// Outbound report query, constructed fresh per work item.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportQuery {
    pub app_token: String,
    pub start_date: String,
    pub end_date: String,
    pub dimensions: Vec<String>,
    pub metrics: Vec<String>,
    pub currency: String,
}

impl ReportQuery {
    /// Builds a query over the full dimension catalog with the supplied
    /// metric list and the default currency.
    pub fn new(
        app_token: impl Into<String>,
        start_date: impl Into<String>,
        end_date: impl Into<String>,
        metrics: Vec<String>,
    ) -> Self {
        Self {
            app_token: app_token.into(),
            start_date: start_date.into(),
            end_date: end_date.into(),
            dimensions: catalog::DIMENSIONS
                .iter()
                .map(|dimension| (*dimension).to_owned())
                .collect(),
            metrics,
            currency: String::from(DEFAULT_CURRENCY),
        }
    }

    pub fn with_currency(mut self, currency: impl Into<String>) -> Self {
        self.currency = currency.into();
        self
    }

    /// Encodes the query parameters the reports service expects: comma-joined
    /// dimensions and metrics, `date_period` as `start:end`, the app token as
    /// an "in" filter, and the fixed attribution/spend settings.
    pub fn to_query_string(&self) -> String {
        let date_period = format!("{}:{}", self.start_date, self.end_date);
        let pairs: [(&str, String); 7] = [
            ("dimensions", self.dimensions.join(",")),
            ("metrics", self.metrics.join(",")),
            ("date_period", date_period),
            ("app_token__in", self.app_token.clone()),
            ("currency", self.currency.clone()),
            ("attribution_type", String::from(ATTRIBUTION_TYPE)),
            ("ad_spend_mode", String::from(AD_SPEND_MODE)),
        ];

        pairs
            .iter()
            .map(|(name, value)| format!("{name}={}", urlencoding::encode(value)))
            .collect::<Vec<_>>()
            .join("&")
    }
}

/// Authenticated client for the reports-service endpoint. No retries and no
/// pagination traversal.
#[derive(Clone)]
pub struct ReportClient {
    http_client: Arc<dyn HttpClient>,
    auth: HttpAuth,
    base_url: String,
}

impl ReportClient {
    pub fn new(api_token: impl Into<String>) -> Self {
        Self::with_http_client(
            Arc::new(ReqwestHttpClient::new()),
            HttpAuth::BearerToken(api_token.into()),
        )
    }

    pub fn with_http_client(http_client: Arc<dyn HttpClient>, auth: HttpAuth) -> Self {
        Self {
            http_client,
            auth,
            base_url: String::from(REPORT_ENDPOINT),
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Fetches one report page and returns its `rows` array, empty when the
    /// body has none. Non-success statuses and unreadable bodies surface as
    /// item-scoped errors.
    pub async fn fetch_report(&self, query: &ReportQuery) -> Result<Vec<RawReportRow>, ReportError> {
        let endpoint = format!("{}?{}", self.base_url, query.to_query_string());
        let request = HttpRequest::get(endpoint)
            .with_auth(&self.auth)
            .with_timeout_ms(REPORT_TIMEOUT_MS);

        let response = self
            .http_client
            .execute(request)
            .await
            .map_err(|error| ReportError::transport(error.message()))?;

        if !response.is_success() {
            return Err(ReportError::api(response.status, snippet(&response.body)));
        }

        parse_rows(&response.body)
    }
}

fn parse_rows(body: &str) -> Result<Vec<RawReportRow>, ReportError> {
    let value: serde_json::Value =
        serde_json::from_str(body).map_err(|error| ReportError::malformed(error.to_string()))?;

    match value.get("rows") {
        None => Ok(Vec::new()),
        Some(serde_json::Value::Array(rows)) => rows
            .iter()
            .map(|row| {
                row.as_object()
                    .cloned()
                    .ok_or_else(|| ReportError::malformed("report row is not an object"))
            })
            .collect(),
        Some(_) => Err(ReportError::malformed("'rows' field is not an array")),
    }
}

// Upstream error bodies can be arbitrarily large HTML pages; keep the first
// part only for the error payload.
fn snippet(body: &str) -> String {
    const MAX_LEN: usize = 200;
    let trimmed = body.trim();
    match trimmed.char_indices().nth(MAX_LEN) {
        Some((index, _)) => format!("{}…", &trimmed[..index]),
        None => trimmed.to_owned(),
    }
}
