//! API Handlers
//!
//! Every tool answers with a tagged `FetchResult`: 200 on success, 422 on
//! failure, with the same `status` / `error` / `suggestion` body the core
//! produces.
use axum::{extract::State, http::StatusCode, Json};
use ga_core::{catalog, Failure, FetchResult, QuerySpec};
use ga_fetch::FetchError;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::SharedState;

const DEFAULT_START: &str = "7daysAgo";
const DEFAULT_END: &str = "today";
const DEFAULT_TOOL_LIMIT: u64 = 1000;

#[derive(Debug, Deserialize)]
pub struct AuthenticateRequest {
    /// Service-account JSON, or a path ending in `.json`
    pub service_account_json: String,
    pub property_id: String,
}

#[derive(Debug, Default, Deserialize)]
pub struct DateRangeArg {
    pub start_date: Option<String>,
    pub end_date: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct AnalyticsDataRequest {
    pub dimensions: Vec<String>,
    pub metrics: Vec<String>,
    #[serde(default)]
    pub date_range: Option<DateRangeArg>,
    pub limit: Option<u64>,
    #[serde(default)]
    pub filters: Vec<String>,
}

impl AnalyticsDataRequest {
    pub fn into_spec(self) -> QuerySpec {
        let range = self.date_range.unwrap_or_default();
        let mut spec = QuerySpec::new(
            self.dimensions,
            self.metrics,
            range.start_date.as_deref().unwrap_or(DEFAULT_START),
            range.end_date.as_deref().unwrap_or(DEFAULT_END),
        )
        .with_limit(self.limit.unwrap_or(DEFAULT_TOOL_LIMIT));
        spec.filters = self.filters;
        spec
    }
}

#[derive(Debug, Deserialize)]
pub struct ReportTextRequest {
    pub text: String,
}

#[derive(Debug, Serialize)]
pub struct DimensionList {
    pub available_dimensions: Vec<String>,
}

#[derive(Debug, Serialize)]
pub struct MetricList {
    pub available_metrics: Vec<String>,
}

fn respond<T: Serialize>(state: &SharedState, tool: &str, result: FetchResult<T>) -> (StatusCode, Json<Value>) {
    state.metrics().record(tool, result.is_success());
    let status = if result.is_success() { StatusCode::OK } else { StatusCode::UNPROCESSABLE_ENTITY };
    match serde_json::to_value(&result) {
        Ok(body) => (status, Json(body)),
        Err(err) => {
            tracing::error!(%tool, error = %err, "response serialization failed");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({ "status": "failure", "error": err.to_string() })),
            )
        }
    }
}

fn not_authenticated<T>() -> FetchResult<T> {
    FetchResult::Failure(Failure::from_error(&FetchError::NotAuthenticated))
}

pub async fn authenticate(
    State(state): State<SharedState>,
    Json(payload): Json<AuthenticateRequest>,
) -> (StatusCode, Json<Value>) {
    let result = state.open_session(&payload.property_id, &payload.service_account_json).await;
    respond(&state, "authenticate", result)
}

pub async fn analytics_data(
    State(state): State<SharedState>,
    Json(payload): Json<AnalyticsDataRequest>,
) -> (StatusCode, Json<Value>) {
    let spec = payload.into_spec();
    let result = match state.session.lock().await.as_mut() {
        Some(generator) => generator.fetcher_mut().fetch(&spec).await,
        None => not_authenticated(),
    };
    respond(&state, "analytics-data", result)
}

pub async fn dimensions(State(state): State<SharedState>) -> (StatusCode, Json<Value>) {
    let list = DimensionList { available_dimensions: catalog::known_dimensions() };
    respond(&state, "dimensions", FetchResult::Success(list))
}

pub async fn metrics(State(state): State<SharedState>) -> (StatusCode, Json<Value>) {
    let list = MetricList { available_metrics: catalog::known_metrics() };
    respond(&state, "metrics", FetchResult::Success(list))
}

pub async fn property(State(state): State<SharedState>) -> (StatusCode, Json<Value>) {
    let result = match state.session.lock().await.as_ref() {
        Some(generator) => FetchResult::Success(generator.fetcher().property_info()),
        None => FetchResult::failure(
            "No property ID set",
            Some("Call authenticate with a service account and property ID".to_string()),
        ),
    };
    respond(&state, "property", result)
}

pub async fn test_connection(State(state): State<SharedState>) -> (StatusCode, Json<Value>) {
    let result = match state.session.lock().await.as_ref() {
        Some(generator) => generator.fetcher().test_connection().await,
        None => not_authenticated(),
    };
    respond(&state, "test-connection", result)
}

pub async fn report(
    State(state): State<SharedState>,
    Json(payload): Json<ReportTextRequest>,
) -> (StatusCode, Json<Value>) {
    let result = match state.session.lock().await.as_mut() {
        Some(generator) => generator.generate(&payload.text).await,
        None => not_authenticated(),
    };
    respond(&state, "report", result)
}

pub async fn health() -> (StatusCode, Json<Value>) {
    (
        StatusCode::OK,
        Json(json!({
            "status": "ok",
            "version": env!("CARGO_PKG_VERSION"),
            "time": chrono::Utc::now().to_rfc3339(),
        })),
    )
}

pub async fn prometheus_metrics(State(state): State<SharedState>) -> (StatusCode, String) {
    match state.metrics().encode() {
        Ok(text) => (StatusCode::OK, text),
        Err(err) => (StatusCode::INTERNAL_SERVER_ERROR, err.to_string()),
    }
}
