//! Data Model: QuerySpec, RawRow, NormalizedRecord, Dataset
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::DEFAULT_ROW_LIMIT;

/// A structured report request.
///
/// Dimension and metric order is significant: response rows are aligned to
/// it positionally.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuerySpec {
    pub dimensions: Vec<String>,
    pub metrics: Vec<String>,
    /// Date token (`YYYY-MM-DD`, `NdaysAgo`, `today`, `yesterday`)
    pub start_date: String,
    pub end_date: String,
    #[serde(default = "default_limit")]
    pub limit: u64,
    /// Exact-match filters, `field==value`
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub filters: Vec<String>,
}

fn default_limit() -> u64 {
    DEFAULT_ROW_LIMIT
}

impl QuerySpec {
    pub fn new<D, M>(dimensions: D, metrics: M, start_date: &str, end_date: &str) -> Self
    where
        D: IntoIterator,
        D::Item: Into<String>,
        M: IntoIterator,
        M::Item: Into<String>,
    {
        Self {
            dimensions: dimensions.into_iter().map(Into::into).collect(),
            metrics: metrics.into_iter().map(Into::into).collect(),
            start_date: start_date.to_string(),
            end_date: end_date.to_string(),
            limit: DEFAULT_ROW_LIMIT,
            filters: Vec::new(),
        }
    }

    pub fn with_limit(mut self, limit: u64) -> Self {
        self.limit = limit;
        self
    }

    pub fn with_filter(mut self, filter: impl Into<String>) -> Self {
        self.filters.push(filter.into());
        self
    }

    /// `"<start> to <end>"`, as echoed in result metadata.
    pub fn date_range_label(&self) -> String {
        format!("{} to {}", self.start_date, self.end_date)
    }

    /// Parsed filters; malformed entries are skipped.
    pub fn parsed_filters(&self) -> Vec<DimensionFilter> {
        self.filters
            .iter()
            .filter_map(|raw| {
                let parsed = DimensionFilter::parse(raw);
                if parsed.is_none() {
                    tracing::debug!(filter = %raw, "ignoring filter without '=='");
                }
                parsed
            })
            .collect()
    }
}

/// Exact string match on one field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DimensionFilter {
    pub field: String,
    pub value: String,
}

impl DimensionFilter {
    pub fn parse(raw: &str) -> Option<Self> {
        let (field, value) = raw.split_once("==")?;
        let field = field.trim();
        if field.is_empty() {
            return None;
        }
        Some(Self { field: field.to_string(), value: value.to_string() })
    }
}

/// One provider row: dimension values then metric values, positionally
/// aligned to the request.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawRow {
    pub dimension_values: Vec<String>,
    pub metric_values: Vec<String>,
}

impl RawRow {
    pub fn new<D, M>(dimension_values: D, metric_values: M) -> Self
    where
        D: IntoIterator,
        D::Item: Into<String>,
        M: IntoIterator,
        M::Item: Into<String>,
    {
        Self {
            dimension_values: dimension_values.into_iter().map(Into::into).collect(),
            metric_values: metric_values.into_iter().map(Into::into).collect(),
        }
    }
}

/// A cleaned field value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
    Int(i64),
    Float(f64),
    Text(String),
}

impl FieldValue {
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Int(v) => Some(*v as f64),
            Self::Float(v) => Some(*v),
            Self::Text(_) => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Text(s) => Some(s),
            _ => None,
        }
    }
}

impl std::fmt::Display for FieldValue {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            Self::Int(v) => write!(f, "{}", v),
            Self::Float(v) => write!(f, "{}", v),
            Self::Text(s) => f.write_str(s),
        }
    }
}

/// Field name → cleaned value. Dimensions keep their names, `pagePath`
/// adds a `pagePath_raw` companion.
pub type NormalizedRecord = BTreeMap<String, FieldValue>;

/// What a successful fetch was asked for.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Metadata {
    pub dimensions: Vec<String>,
    pub metrics: Vec<String>,
    pub date_range: String,
    pub property_id: String,
}

/// Payload of a successful fetch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Dataset {
    pub data: Vec<NormalizedRecord>,
    pub row_count: usize,
    pub metadata: Metadata,
}
