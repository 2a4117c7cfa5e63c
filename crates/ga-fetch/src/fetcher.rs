//! Resilient fetcher: session-scoped client, validation, bounded retries.
//!
//! A [`Fetcher`] owns everything one analysis session needs: the property,
//! the credential document, and (once authenticated) the reporting client.
//! It is not meant to be shared between concurrent requests; give each its
//! own instance or wrap it in a lock.

use async_trait::async_trait;
use ga_core::records::normalize_rows;
use ga_core::validation::validate_query;
use ga_core::{CredentialDocument, Dataset, Failure, FetchResult, Metadata, QuerySpec, ServiceAccount, Suggest};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;

use crate::auth::TokenSource;
use crate::client::{HttpReportingClient, ReportRequest, ReportingClient, DEFAULT_BASE_URL, DEFAULT_TIMEOUT};
use crate::error::FetchError;

pub const RETRY_SUGGESTION: &str = "Try reducing the date range or number of dimensions/metrics";

/// Builds an authenticated client from a validated identity.
#[async_trait]
pub trait Connector: Send + Sync {
    async fn connect(&self, account: &ServiceAccount) -> Result<Arc<dyn ReportingClient>, FetchError>;
}

/// Connects to the public GA4 Data API.
#[derive(Debug, Clone)]
pub struct GoogleConnector {
    pub base_url: String,
    pub timeout: Duration,
}

impl Default for GoogleConnector {
    fn default() -> Self {
        Self { base_url: DEFAULT_BASE_URL.to_string(), timeout: DEFAULT_TIMEOUT }
    }
}

#[async_trait]
impl Connector for GoogleConnector {
    async fn connect(&self, account: &ServiceAccount) -> Result<Arc<dyn ReportingClient>, FetchError> {
        let http = reqwest::Client::builder().timeout(self.timeout).build()?;
        let tokens = TokenSource::new(account.clone(), http.clone())?;
        // Surface bad keys and revoked accounts now rather than mid-retry.
        tokens.access_token().await?;
        Ok(Arc::new(HttpReportingClient::new(&self.base_url, http, tokens)))
    }
}

/// Where backoff delays go.
#[async_trait]
pub trait Sleeper: Send + Sync {
    async fn sleep(&self, duration: Duration);
}

#[derive(Debug, Clone, Copy, Default)]
pub struct TokioSleeper;

#[async_trait]
impl Sleeper for TokioSleeper {
    async fn sleep(&self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }
}

/// Attempt ceiling and exponential backoff base.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RetryPolicy {
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,
    #[serde(default = "default_base_delay_ms")]
    pub base_delay_ms: u64,
}

fn default_max_attempts() -> u32 {
    3
}

fn default_base_delay_ms() -> u64 {
    1000
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self { max_attempts: default_max_attempts(), base_delay_ms: default_base_delay_ms() }
    }
}

impl RetryPolicy {
    /// Delay before attempt `attempt_index` (0-based): `base * 2^index`.
    pub fn delay_before(&self, attempt_index: u32) -> Duration {
        let factor = 1u64.checked_shl(attempt_index).unwrap_or(u64::MAX);
        Duration::from_millis(self.base_delay_ms.saturating_mul(factor))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthSummary {
    pub property_id: String,
    pub client_email: String,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConnectionReport {
    pub property_id: String,
    pub test_rows: usize,
    /// First `sessions` value of the probe, if any row came back
    pub sessions: Option<String>,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PropertyInfo {
    pub property_id: String,
    pub resource_name: String,
    pub authenticated: bool,
    pub service_account: Option<String>,
}

pub struct Fetcher {
    property_id: String,
    credentials: CredentialDocument,
    connector: Arc<dyn Connector>,
    sleeper: Arc<dyn Sleeper>,
    retry: RetryPolicy,
    client: Option<Arc<dyn ReportingClient>>,
    client_email: Option<String>,
}

impl Fetcher {
    pub fn new(property_id: impl Into<String>, credentials: CredentialDocument) -> Self {
        Self {
            property_id: property_id.into(),
            credentials,
            connector: Arc::new(GoogleConnector::default()),
            sleeper: Arc::new(TokioSleeper),
            retry: RetryPolicy::default(),
            client: None,
            client_email: None,
        }
    }

    pub fn with_connector(mut self, connector: Arc<dyn Connector>) -> Self {
        self.connector = connector;
        self
    }

    pub fn with_sleeper(mut self, sleeper: Arc<dyn Sleeper>) -> Self {
        self.sleeper = sleeper;
        self
    }

    pub fn with_retry_policy(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    pub fn property_id(&self) -> &str {
        &self.property_id
    }

    pub fn is_authenticated(&self) -> bool {
        self.client.is_some()
    }

    /// Validate the credential document and build the client. Never retried.
    pub async fn authenticate(&mut self) -> FetchResult<AuthSummary> {
        match self.connect().await {
            Ok(_) => FetchResult::Success(AuthSummary {
                property_id: self.property_id.clone(),
                client_email: self.client_email.clone().unwrap_or_default(),
                message: format!("Successfully authenticated with GA4 property {}", self.property_id),
            }),
            Err(err) => FetchResult::Failure(Failure::from_error(&err)),
        }
    }

    async fn connect(&mut self) -> Result<Arc<dyn ReportingClient>, FetchError> {
        let account = self.credentials.validate().map_err(|err| {
            tracing::error!(error = %err, "credential document rejected");
            FetchError::from(err)
        })?;

        let client = self.connector.connect(&account).await.map_err(|err| {
            tracing::error!(error = %err, property = %self.property_id, "authentication failed");
            err
        })?;

        tracing::info!(property = %self.property_id, email = %account.client_email, "authenticated");
        self.client = Some(client.clone());
        self.client_email = Some(account.client_email);
        Ok(client)
    }

    async fn ensure_client(&mut self) -> Result<Arc<dyn ReportingClient>, FetchError> {
        match &self.client {
            Some(client) => Ok(client.clone()),
            None => self.connect().await,
        }
    }

    /// Validate, authenticate if needed, run with retries, normalize.
    pub async fn fetch(&mut self, spec: &QuerySpec) -> FetchResult<Dataset> {
        if let Err(err) = validate_query(spec) {
            tracing::debug!(error = %err, "query rejected before dispatch");
            return FetchResult::Failure(Failure::from_error(&err));
        }

        let client = match self.ensure_client().await {
            Ok(client) => client,
            Err(err) => return FetchResult::Failure(Failure::from_error(&err)),
        };

        let request = ReportRequest::from_spec(&self.property_id, spec);
        let attempts = self.retry.max_attempts.max(1);
        let mut last_error = None;

        for attempt in 0..attempts {
            if attempt > 0 {
                let delay = self.retry.delay_before(attempt);
                tracing::debug!(attempt = attempt + 1, delay_ms = delay.as_millis() as u64, "backing off");
                self.sleeper.sleep(delay).await;
            }

            match client.run_report(&request).await {
                Ok(response) => {
                    let data = normalize_rows(&response.rows, &spec.dimensions, &spec.metrics);
                    tracing::info!(rows = data.len(), attempt = attempt + 1, "report fetched");
                    return FetchResult::Success(Dataset {
                        row_count: data.len(),
                        data,
                        metadata: Metadata {
                            dimensions: spec.dimensions.clone(),
                            metrics: spec.metrics.clone(),
                            date_range: spec.date_range_label(),
                            property_id: self.property_id.clone(),
                        },
                    });
                }
                Err(err) if err.is_structural() => {
                    tracing::warn!(attempt = attempt + 1, error = %err, "fetch rejected; not retrying");
                    return FetchResult::Failure(Failure::from_error(&err));
                }
                Err(err) => {
                    tracing::warn!(attempt = attempt + 1, error = %err, "fetch attempt failed");
                    last_error = Some(err);
                }
            }
        }

        let error = last_error.map_or_else(|| "Max retries exceeded".to_string(), |e| e.to_string());
        FetchResult::Failure(Failure::new(error).with_suggestion(RETRY_SUGGESTION))
    }

    /// One-row probe against an established client.
    pub async fn test_connection(&self) -> FetchResult<ConnectionReport> {
        let Some(client) = &self.client else {
            return FetchResult::Failure(Failure::from_error(&FetchError::NotAuthenticated));
        };

        match client.run_report(&ReportRequest::probe(&self.property_id)).await {
            Ok(response) => {
                let sessions = response.rows.first().and_then(|row| row.metric_values.first()).cloned();
                FetchResult::Success(ConnectionReport {
                    property_id: self.property_id.clone(),
                    test_rows: response.rows.len(),
                    message: format!(
                        "Connection test successful! Property ID: {}, Sessions: {}",
                        self.property_id,
                        sessions.as_deref().unwrap_or("No data")
                    ),
                    sessions,
                })
            }
            Err(err) => {
                tracing::error!(error = %err, "connection test failed");
                let failure = Failure::new(format!("Connection test failed: {}", err));
                FetchResult::Failure(match err.suggestion() {
                    Some(hint) => failure.with_suggestion(hint),
                    None => failure,
                })
            }
        }
    }

    pub fn property_info(&self) -> PropertyInfo {
        PropertyInfo {
            property_id: self.property_id.clone(),
            resource_name: format!("properties/{}", self.property_id),
            authenticated: self.is_authenticated(),
            service_account: self.client_email.clone(),
        }
    }
}
