//! Reporting client: the only place with network I/O.
//!
//! [`ReportingClient`] is the seam the fetcher talks to;
//! [`HttpReportingClient`] speaks the GA4 Data API `runReport` wire format.

use async_trait::async_trait;
use ga_core::{DimensionFilter, QuerySpec, RawRow, MAX_ROW_LIMIT};
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::auth::TokenSource;
use crate::error::FetchError;

pub const DEFAULT_BASE_URL: &str = "https://analyticsdata.googleapis.com/v1beta";
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// A provider request built from a validated [`QuerySpec`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportRequest {
    pub property_id: String,
    pub dimensions: Vec<String>,
    pub metrics: Vec<String>,
    pub start_date: String,
    pub end_date: String,
    /// Already clamped to [`MAX_ROW_LIMIT`]
    pub limit: u64,
    pub filters: Vec<DimensionFilter>,
}

impl ReportRequest {
    pub fn from_spec(property_id: &str, spec: &QuerySpec) -> Self {
        Self {
            property_id: property_id.to_string(),
            dimensions: spec.dimensions.clone(),
            metrics: spec.metrics.clone(),
            start_date: spec.start_date.clone(),
            end_date: spec.end_date.clone(),
            limit: spec.limit.min(MAX_ROW_LIMIT),
            filters: spec.parsed_filters(),
        }
    }

    /// One-row `sessions` query used to check a connection.
    pub fn probe(property_id: &str) -> Self {
        Self::from_spec(property_id, &QuerySpec::new(Vec::<String>::new(), ["sessions"], "yesterday", "today").with_limit(1))
    }

    pub fn resource_name(&self) -> String {
        format!("properties/{}", self.property_id)
    }
}

/// Rows as the provider returned them.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReportResponse {
    pub rows: Vec<RawRow>,
    pub row_count: Option<u64>,
}

#[async_trait]
pub trait ReportingClient: Send + Sync {
    async fn run_report(&self, request: &ReportRequest) -> Result<ReportResponse, FetchError>;
}

// ---------------------------------------------------------------------------
// Wire format
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct WireRequest<'a> {
    date_ranges: Vec<WireDateRange<'a>>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    dimensions: Vec<WireName<'a>>,
    metrics: Vec<WireName<'a>>,
    limit: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    dimension_filter: Option<WireFilterExpression<'a>>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct WireDateRange<'a> {
    start_date: &'a str,
    end_date: &'a str,
}

#[derive(Debug, Serialize)]
struct WireName<'a> {
    name: &'a str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
enum WireFilterExpression<'a> {
    AndGroup { expressions: Vec<WireFilterExpression<'a>> },
    Filter(WireFilter<'a>),
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct WireFilter<'a> {
    field_name: &'a str,
    string_filter: WireStringFilter<'a>,
}

#[derive(Debug, Serialize)]
struct WireStringFilter<'a> {
    value: &'a str,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct WireResponse {
    #[serde(default)]
    rows: Vec<WireRow>,
    #[serde(default)]
    row_count: Option<u64>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct WireRow {
    #[serde(default)]
    dimension_values: Vec<WireValue>,
    #[serde(default)]
    metric_values: Vec<WireValue>,
}

#[derive(Debug, Default, Deserialize)]
struct WireValue {
    #[serde(default)]
    value: String,
}

#[derive(Debug, Deserialize)]
struct WireErrorBody {
    error: WireErrorDetail,
}

#[derive(Debug, Deserialize)]
struct WireErrorDetail {
    #[serde(default)]
    message: String,
}

impl<'a> WireRequest<'a> {
    fn from_request(request: &'a ReportRequest) -> Self {
        let dimension_filter = if request.filters.is_empty() {
            None
        } else {
            Some(WireFilterExpression::AndGroup {
                expressions: request
                    .filters
                    .iter()
                    .map(|f| {
                        WireFilterExpression::Filter(WireFilter {
                            field_name: &f.field,
                            string_filter: WireStringFilter { value: &f.value },
                        })
                    })
                    .collect(),
            })
        };

        Self {
            date_ranges: vec![WireDateRange { start_date: &request.start_date, end_date: &request.end_date }],
            dimensions: request.dimensions.iter().map(|name| WireName { name }).collect(),
            metrics: request.metrics.iter().map(|name| WireName { name }).collect(),
            limit: request.limit,
            dimension_filter,
        }
    }
}

impl From<WireResponse> for ReportResponse {
    fn from(wire: WireResponse) -> Self {
        Self {
            rows: wire
                .rows
                .into_iter()
                .map(|row| RawRow {
                    dimension_values: row.dimension_values.into_iter().map(|v| v.value).collect(),
                    metric_values: row.metric_values.into_iter().map(|v| v.value).collect(),
                })
                .collect(),
            row_count: wire.row_count,
        }
    }
}

// ---------------------------------------------------------------------------
// HTTP client
// ---------------------------------------------------------------------------

/// GA4 Data API client authenticated as a service account.
pub struct HttpReportingClient {
    base_url: String,
    http: reqwest::Client,
    tokens: TokenSource,
}

impl HttpReportingClient {
    pub fn new(base_url: &str, http: reqwest::Client, tokens: TokenSource) -> Self {
        Self { base_url: base_url.trim_end_matches('/').to_string(), http, tokens }
    }

    fn url(&self, request: &ReportRequest) -> String {
        format!("{}/{}:runReport", self.base_url, request.resource_name())
    }
}

#[async_trait]
impl ReportingClient for HttpReportingClient {
    async fn run_report(&self, request: &ReportRequest) -> Result<ReportResponse, FetchError> {
        let token = self.tokens.access_token().await?;
        let body = WireRequest::from_request(request);

        let response = self
            .http
            .post(self.url(request))
            .bearer_auth(token)
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<WireErrorBody>(&text)
                .map(|body| body.error.message)
                .unwrap_or(text);
            return Err(FetchError::Provider { status: status.as_u16(), message });
        }

        let wire: WireResponse = response
            .json()
            .await
            .map_err(|e| FetchError::Decode(e.to_string()))?;
        Ok(wire.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_limit_clamped() {
        let spec = QuerySpec::new(["date"], ["sessions"], "7daysAgo", "today").with_limit(250_000);
        assert_eq!(ReportRequest::from_spec("123", &spec).limit, MAX_ROW_LIMIT);
    }

    #[test]
    fn test_wire_request_shape() {
        let spec = QuerySpec::new(["pagePath"], ["screenPageViews"], "2024-01-01", "today")
            .with_limit(50)
            .with_filter("pagePath==/home")
            .with_filter("country==Chile")
            .with_filter("garbage");
        let request = ReportRequest::from_spec("987", &spec);
        assert_eq!(request.resource_name(), "properties/987");

        let value = serde_json::to_value(WireRequest::from_request(&request)).unwrap();
        assert_eq!(
            value,
            json!({
                "dateRanges": [{"startDate": "2024-01-01", "endDate": "today"}],
                "dimensions": [{"name": "pagePath"}],
                "metrics": [{"name": "screenPageViews"}],
                "limit": 50,
                "dimensionFilter": {"andGroup": {"expressions": [
                    {"filter": {"fieldName": "pagePath", "stringFilter": {"value": "/home"}}},
                    {"filter": {"fieldName": "country", "stringFilter": {"value": "Chile"}}}
                ]}}
            })
        );
    }

    #[test]
    fn test_probe_has_no_dimensions() {
        let value = serde_json::to_value(WireRequest::from_request(&ReportRequest::probe("1"))).unwrap();
        assert!(value.get("dimensions").is_none());
        assert_eq!(value["limit"], 1);
        assert_eq!(value["dateRanges"][0]["startDate"], "yesterday");
    }

    #[test]
    fn test_wire_response_decoding() {
        let wire: WireResponse = serde_json::from_value(json!({
            "dimensionHeaders": [{"name": "date"}],
            "metricHeaders": [{"name": "sessions", "type": "TYPE_INTEGER"}],
            "rows": [
                {"dimensionValues": [{"value": "20240101"}], "metricValues": [{"value": "12"}]}
            ],
            "rowCount": 1
        }))
        .unwrap();
        let response: ReportResponse = wire.into();
        assert_eq!(response.rows, vec![RawRow::new(["20240101"], ["12"])]);
        assert_eq!(response.row_count, Some(1));
    }

    #[test]
    fn test_empty_response_has_no_rows() {
        let wire: WireResponse = serde_json::from_value(json!({"kind": "analyticsData#runReport"})).unwrap();
        assert!(ReportResponse::from(wire).rows.is_empty());
    }
}
