//! GA-INTENT: natural-language analytics requests to report queries
//!
//! Classifies a free-text request into one of a fixed set of analysis
//! intents, resolves the date range it talks about, and assembles the
//! resulting [`QuerySpec`].
//!
//! # Example
//!
//! ```
//! use ga_intent::{plan, Grammar, Intent};
//!
//! let plan = plan("Analyze top performing pages this month", &Grammar::builtin());
//! assert_eq!(plan.intent.intent, Intent::Pages);
//! assert_eq!(plan.spec.start_date, "30daysAgo");
//! ```

pub mod dates;
pub mod grammar;
pub mod matcher;
pub mod normalizer;

pub use dates::DateRange;
pub use grammar::{Grammar, GrammarError, Intent};
pub use matcher::IntentMatch;

use ga_core::{QuerySpec, DEFAULT_ROW_LIMIT};
use serde::{Deserialize, Serialize};

/// Everything derived from one request
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueryPlan {
    /// The request after normalization
    pub normalized: String,
    pub intent: IntentMatch,
    pub date_range: DateRange,
    pub spec: QuerySpec,
}

/// Classify a request and resolve its date range
pub fn plan(text: &str, grammar: &Grammar) -> QueryPlan {
    let normalized = normalizer::normalize(text);
    let intent = matcher::classify(&normalized, grammar);
    let date_range = dates::resolve(&normalized, &grammar.date_rules);

    let spec = QuerySpec::new(
        intent.dimensions.clone(),
        intent.metrics.clone(),
        &date_range.start_date,
        &date_range.end_date,
    )
    .with_limit(DEFAULT_ROW_LIMIT);

    tracing::info!(
        intent = %intent.intent,
        confidence = intent.confidence,
        start = %date_range.start_date,
        end = %date_range.end_date,
        "request planned"
    );

    QueryPlan { normalized, intent, date_range, spec }
}

/// Classify only
pub fn classify(text: &str, grammar: &Grammar) -> IntentMatch {
    matcher::classify(&normalizer::normalize(text), grammar)
}

/// Resolve the date range only
pub fn resolve_date_range(text: &str, grammar: &Grammar) -> DateRange {
    dates::resolve(&normalizer::normalize(text), &grammar.date_rules)
}
