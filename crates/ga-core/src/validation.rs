//! Query input validation against provider limits.
//!
//! Rules run in a fixed order and the first failure wins:
//! dimension count, metric count, metric allow-list, date tokens.

use lazy_static::lazy_static;
use regex::Regex;

use crate::catalog::{is_valid_metric, known_metrics};
use crate::data_model::QuerySpec;
use crate::error::ValidationError;

pub const MAX_DIMENSIONS: usize = 9;
pub const MAX_METRICS: usize = 10;

lazy_static! {
    /// `YYYY-MM-DD`
    static ref ISO_DATE: Regex = Regex::new(r"^[0-9]{4}-[0-9]{2}-[0-9]{2}$").unwrap();

    /// `NdaysAgo`
    static ref DAYS_AGO: Regex = Regex::new(r"^[0-9]+daysAgo$").unwrap();
}

/// Whether `token` is one of the accepted date-token syntaxes.
pub fn is_date_token(token: &str) -> bool {
    token == "today" || token == "yesterday" || ISO_DATE.is_match(token) || DAYS_AGO.is_match(token)
}

/// Validate raw query inputs. On success the inputs are used as-is.
pub fn validate_inputs(
    dimensions: &[String],
    metrics: &[String],
    start_date: &str,
    end_date: &str,
) -> Result<(), ValidationError> {
    if dimensions.len() > MAX_DIMENSIONS {
        return Err(ValidationError::TooManyDimensions {
            count: dimensions.len(),
            max: MAX_DIMENSIONS,
        });
    }

    if metrics.len() > MAX_METRICS {
        return Err(ValidationError::TooManyMetrics {
            count: metrics.len(),
            max: MAX_METRICS,
        });
    }

    let invalid: Vec<String> = metrics
        .iter()
        .filter(|m| !is_valid_metric(m))
        .cloned()
        .collect();
    if !invalid.is_empty() {
        return Err(ValidationError::UnknownMetrics { invalid, valid: known_metrics() });
    }

    for token in [start_date, end_date] {
        if !is_date_token(token) {
            return Err(ValidationError::InvalidDateToken { value: token.to_string() });
        }
    }

    Ok(())
}

/// Validate a whole [`QuerySpec`].
pub fn validate_query(spec: &QuerySpec) -> Result<(), ValidationError> {
    validate_inputs(&spec.dimensions, &spec.metrics, &spec.start_date, &spec.end_date)
}
