//! GA API /v1: tool-invocation endpoints over the report core
pub mod config;
pub mod handlers;
pub mod metrics;
pub mod middleware;

use std::sync::Arc;

use axum::{
    routing::{get, post},
    Router,
};
use ga_core::{CredentialDocument, Failure, FetchResult};
use ga_fetch::{AuthSummary, Connector, Fetcher, GoogleConnector, RetryPolicy};
use ga_intent::Grammar;
use ga_report::ReportGenerator;
use tokio::sync::Mutex;
use tower_http::trace::TraceLayer;

pub use config::{AppConfig, ConfigError};
pub use metrics::ToolMetrics;

/// Shared server state. The session holds at most one authenticated
/// pipeline; requests against it are serialized by the mutex.
pub struct AppState {
    session: Mutex<Option<ReportGenerator>>,
    grammar: Grammar,
    retry: RetryPolicy,
    default_limit: u64,
    connector: Arc<dyn Connector>,
    metrics: ToolMetrics,
}

impl AppState {
    pub fn new(grammar: Grammar, metrics: ToolMetrics) -> Self {
        Self {
            session: Mutex::new(None),
            grammar,
            retry: RetryPolicy::default(),
            default_limit: ga_core::DEFAULT_ROW_LIMIT,
            connector: Arc::new(GoogleConnector::default()),
            metrics,
        }
    }

    pub fn from_config(config: &AppConfig) -> Result<Self, ConfigError> {
        let metrics = ToolMetrics::new().map_err(|err| ConfigError::Invalid(format!("metrics registry: {}", err)))?;
        let mut state = Self::new(config.grammar()?, metrics);
        state.retry = config.retry;
        state.default_limit = config.default_limit;
        Ok(state)
    }

    pub fn with_connector(mut self, connector: Arc<dyn Connector>) -> Self {
        self.connector = connector;
        self
    }

    pub fn with_retry_policy(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    pub fn metrics(&self) -> &ToolMetrics {
        &self.metrics
    }

    /// Authenticate a new pipeline and make it the session. A failed
    /// attempt leaves any previous session in place.
    pub async fn open_session(&self, property_id: &str, credentials: &str) -> FetchResult<AuthSummary> {
        let document = match CredentialDocument::from_source(credentials) {
            Ok(document) => document,
            Err(err) => return FetchResult::Failure(Failure::from_error(&err)),
        };

        let mut fetcher = Fetcher::new(property_id, document)
            .with_connector(self.connector.clone())
            .with_retry_policy(self.retry);

        let outcome = fetcher.authenticate().await;
        if outcome.is_success() {
            let generator = ReportGenerator::new(fetcher, self.grammar.clone()).with_limit(self.default_limit);
            *self.session.lock().await = Some(generator);
        }
        outcome
    }
}

pub type SharedState = Arc<AppState>;

pub fn create_app(state: SharedState) -> Router {
    Router::new()
        .route("/v1/tools/authenticate", post(handlers::authenticate))
        .route("/v1/tools/analytics-data", post(handlers::analytics_data))
        .route("/v1/tools/dimensions", get(handlers::dimensions))
        .route("/v1/tools/metrics", get(handlers::metrics))
        .route("/v1/tools/property", get(handlers::property))
        .route("/v1/tools/test-connection", post(handlers::test_connection))
        .route("/v1/report", post(handlers::report))
        .route("/v1/health", get(handlers::health))
        .route("/metrics", get(handlers::prometheus_metrics))
        .layer(axum::middleware::from_fn(middleware::log_requests))
        .layer(middleware::cors())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

pub async fn run(addr: &str, state: SharedState) -> std::io::Result<()> {
    let app = create_app(state);
    let listener = tokio::net::TcpListener::bind(addr).await?;

    tracing::info!("GA API listening on {}", addr);
    axum::serve(listener, app).await
}
