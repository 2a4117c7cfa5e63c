//! GA-REPORT: free-text request to annotated dataset
//!
//! ```text
//! "top pages this month"
//!     ↓ ga-intent   classify + resolve dates → QuerySpec
//!     ↓ ga-fetch    validate, authenticate, retry → rows
//!     ↓ ga-core     normalize rows → records
//!     ↓ ga-report   summary, insights, chart hints
//! Report
//! ```

pub mod insights;
pub mod summary;

pub use insights::{Insight, InsightKind};
pub use summary::{ChartHint, ChartKind, ExecutiveSummary};

use ga_core::{FetchResult, Metadata, NormalizedRecord, DEFAULT_ROW_LIMIT};
use ga_fetch::Fetcher;
use ga_intent::{Grammar, Intent};
use serde::{Deserialize, Serialize};
use tracing::Instrument;

/// Successful outcome of [`ReportGenerator::generate`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Report {
    pub request_id: String,
    pub intent: Intent,
    pub confidence: f64,
    pub data: Vec<NormalizedRecord>,
    pub row_count: usize,
    pub metadata: Metadata,
    pub executive_summary: ExecutiveSummary,
    pub summary_text: String,
    pub insights: Vec<Insight>,
    pub visualizations: Vec<ChartHint>,
}

pub struct ReportGenerator {
    fetcher: Fetcher,
    grammar: Grammar,
    limit: u64,
}

impl ReportGenerator {
    pub fn new(fetcher: Fetcher, grammar: Grammar) -> Self {
        Self { fetcher, grammar, limit: DEFAULT_ROW_LIMIT }
    }

    pub fn with_limit(mut self, limit: u64) -> Self {
        self.limit = limit;
        self
    }

    pub fn fetcher(&self) -> &Fetcher {
        &self.fetcher
    }

    pub fn fetcher_mut(&mut self) -> &mut Fetcher {
        &mut self.fetcher
    }

    pub fn grammar(&self) -> &Grammar {
        &self.grammar
    }

    /// Plan, fetch and annotate. Fetch failures come back verbatim.
    pub async fn generate(&mut self, text: &str) -> FetchResult<Report> {
        let request_id = uuid::Uuid::new_v4().to_string();
        let span = tracing::info_span!("report", request_id = %request_id);

        async {
            let plan = ga_intent::plan(text, &self.grammar);
            let spec = plan.spec.with_limit(self.limit);

            let dataset = match self.fetcher.fetch(&spec).await {
                FetchResult::Success(dataset) => dataset,
                FetchResult::Failure(failure) => {
                    tracing::info!(error = %failure.error, "report failed");
                    return FetchResult::Failure(failure);
                }
            };

            let intent = plan.intent.intent;
            let executive_summary = ExecutiveSummary::from_records(&dataset.data);
            let insights = insights::derive(intent, &dataset.data);
            let visualizations = summary::chart_hints(intent, &dataset.data);
            tracing::info!(rows = dataset.row_count, insights = insights.len(), "report ready");

            FetchResult::Success(Report {
                request_id: request_id.clone(),
                intent,
                confidence: plan.intent.confidence,
                summary_text: executive_summary.headline(),
                executive_summary,
                insights,
                visualizations,
                row_count: dataset.row_count,
                data: dataset.data,
                metadata: dataset.metadata,
            })
        }
        .instrument(span)
        .await
    }
}
