//! Response normalization.
//!
//! Turns positional provider rows into named, cleaned records. Nothing in
//! here fails: values that cannot be cleaned or coerced are kept as-is.

use chrono::NaiveDate;

use crate::data_model::{FieldValue, NormalizedRecord, RawRow};

pub const HOMEPAGE: &str = "Homepage";
pub const UNKNOWN_PAGE: &str = "Unknown Page";
pub const UNTITLED_PAGE: &str = "Untitled Page";
pub const NOT_SET: &str = "(not set)";

const MAX_PATH_CHARS: usize = 50;
const MAX_TITLE_CHARS: usize = 60;
const ELLIPSIS: &str = "...";

/// Suffix of the companion field holding the uncleaned `pagePath`.
pub const RAW_SUFFIX: &str = "_raw";

/// Normalize every row against the dimension/metric order of the request.
pub fn normalize_rows(rows: &[RawRow], dimensions: &[String], metrics: &[String]) -> Vec<NormalizedRecord> {
    rows.iter().map(|row| normalize_row(row, dimensions, metrics)).collect()
}

pub fn normalize_row(row: &RawRow, dimensions: &[String], metrics: &[String]) -> NormalizedRecord {
    let mut record = NormalizedRecord::new();

    for (name, value) in dimensions.iter().zip(&row.dimension_values) {
        match name.as_str() {
            "date" => {
                record.insert(name.clone(), FieldValue::Text(clean_date(value)));
            }
            "pagePath" => {
                record.insert(name.clone(), FieldValue::Text(clean_page_path(value)));
                record.insert(format!("{}{}", name, RAW_SUFFIX), FieldValue::Text(value.clone()));
            }
            "pageTitle" => {
                record.insert(name.clone(), FieldValue::Text(clean_page_title(value)));
            }
            _ => {
                record.insert(name.clone(), FieldValue::Text(value.clone()));
            }
        }
    }

    for (name, value) in metrics.iter().zip(&row.metric_values) {
        record.insert(name.clone(), coerce_metric(value));
    }

    if row.dimension_values.len() != dimensions.len() || row.metric_values.len() != metrics.len() {
        tracing::debug!(
            dimensions = row.dimension_values.len(),
            metrics = row.metric_values.len(),
            "row width differs from request; extra or missing cells skipped"
        );
    }

    record
}

/// `20240115` → `2024-01-15`; anything else is returned unchanged.
pub fn clean_date(value: &str) -> String {
    if value.len() != 8 || !value.bytes().all(|b| b.is_ascii_digit()) {
        return value.to_string();
    }
    let parse = |range: std::ops::Range<usize>| value[range].parse::<u32>().ok();
    let date = match (value[0..4].parse::<i32>().ok(), parse(4..6), parse(6..8)) {
        (Some(y), Some(m), Some(d)) => NaiveDate::from_ymd_opt(y, m, d),
        _ => None,
    };
    match date {
        Some(date) => date.format("%Y-%m-%d").to_string(),
        None => value.to_string(),
    }
}

pub fn clean_page_path(path: &str) -> String {
    if path.is_empty() || path == "/" {
        return HOMEPAGE.to_string();
    }
    if path.trim().is_empty() {
        return UNKNOWN_PAGE.to_string();
    }

    let without_query = path.split('?').next().unwrap_or_default();
    let trimmed = without_query.trim_end_matches('/');
    if trimmed.is_empty() {
        return HOMEPAGE.to_string();
    }

    truncate(trimmed, MAX_PATH_CHARS)
}

pub fn clean_page_title(title: &str) -> String {
    if title.trim().is_empty() || title == NOT_SET {
        return UNTITLED_PAGE.to_string();
    }
    truncate(title, MAX_TITLE_CHARS)
}

/// Integer unless the lexeme has a decimal point or exponent; text if
/// neither parse works or the float is not finite.
pub fn coerce_metric(value: &str) -> FieldValue {
    let lexeme = value.trim();
    let looks_float = lexeme.contains('.') || lexeme.contains('e') || lexeme.contains('E');
    let coerced = if looks_float {
        lexeme.parse::<f64>().ok().filter(|v| v.is_finite()).map(FieldValue::Float)
    } else {
        lexeme.parse::<i64>().ok().map(FieldValue::Int)
    };
    coerced.unwrap_or_else(|| FieldValue::Text(value.to_string()))
}

fn truncate(value: &str, max_chars: usize) -> String {
    if value.chars().count() <= max_chars {
        return value.to_string();
    }
    let keep = max_chars - ELLIPSIS.len();
    let mut out: String = value.chars().take(keep).collect();
    out.push_str(ELLIPSIS);
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn text(s: &str) -> FieldValue {
        FieldValue::Text(s.to_string())
    }

    #[test]
    fn test_date_reformatting() {
        assert_eq!(clean_date("20240115"), "2024-01-15");
        assert_eq!(clean_date("20241345"), "20241345");
        assert_eq!(clean_date("2024-01-15"), "2024-01-15");
        assert_eq!(clean_date("abcdefgh"), "abcdefgh");
    }

    #[test]
    fn test_page_path_cleaning() {
        assert_eq!(clean_page_path("/blog/post?utm=x"), "/blog/post");
        assert_eq!(clean_page_path(""), HOMEPAGE);
        assert_eq!(clean_page_path("/"), HOMEPAGE);
        assert_eq!(clean_page_path("///"), HOMEPAGE);
        assert_eq!(clean_page_path("/?ref=home"), HOMEPAGE);
        assert_eq!(clean_page_path("   "), UNKNOWN_PAGE);
        assert_eq!(clean_page_path("/docs/"), "/docs");
    }

    #[test]
    fn test_long_path_truncated() {
        let long = format!("/{}", "a".repeat(80));
        let cleaned = clean_page_path(&long);
        assert_eq!(cleaned.chars().count(), 50);
        assert!(cleaned.ends_with("..."));
        assert!(cleaned.starts_with("/aaa"));
    }

    #[test]
    fn test_page_title_cleaning() {
        assert_eq!(clean_page_title("(not set)"), UNTITLED_PAGE);
        assert_eq!(clean_page_title(" "), UNTITLED_PAGE);
        assert_eq!(clean_page_title("Pricing"), "Pricing");
        let long = "é".repeat(70);
        let cleaned = clean_page_title(&long);
        assert_eq!(cleaned.chars().count(), 60);
        assert!(cleaned.ends_with("..."));
    }

    #[test]
    fn test_metric_coercion() {
        assert_eq!(coerce_metric("123"), FieldValue::Int(123));
        assert_eq!(coerce_metric("1.5e2"), FieldValue::Float(150.0));
        assert_eq!(coerce_metric("0.25"), FieldValue::Float(0.25));
        assert_eq!(coerce_metric("n/a"), text("n/a"));
        assert_eq!(coerce_metric("none"), text("none"));
    }

    #[test]
    fn test_float_overflow_keeps_text() {
        assert_eq!(coerce_metric("1e400"), text("1e400"));
        assert_eq!(coerce_metric("-1.5E999"), text("-1.5E999"));
        assert_eq!(coerce_metric("1e300"), FieldValue::Float(1e300));
    }

    #[test]
    fn test_row_alignment_and_raw_companion() {
        let dims = vec!["pagePath".to_string(), "pageTitle".to_string()];
        let metrics = vec!["screenPageViews".to_string(), "sessions".to_string()];
        let rows = vec![RawRow::new(["/blog/post?utm=x", "(not set)"], ["42", "7"])];

        let records = normalize_rows(&rows, &dims, &metrics);
        let record = &records[0];
        assert_eq!(record["pagePath"], text("/blog/post"));
        assert_eq!(record["pagePath_raw"], text("/blog/post?utm=x"));
        assert_eq!(record["pageTitle"], text(UNTITLED_PAGE));
        assert_eq!(record["screenPageViews"], FieldValue::Int(42));
        assert_eq!(record["sessions"], FieldValue::Int(7));
    }

    #[test]
    fn test_other_dimensions_pass_through() {
        let dims = vec!["country".to_string()];
        let record = normalize_row(&RawRow::new(["  Brazil "], Vec::<String>::new()), &dims, &[]);
        assert_eq!(record["country"], text("  Brazil "));
    }

    #[test]
    fn test_short_row_skips_missing_cells() {
        let dims = vec!["date".to_string(), "country".to_string()];
        let metrics = vec!["sessions".to_string()];
        let record = normalize_row(&RawRow::new(["20240101"], ["3"]), &dims, &metrics);
        assert_eq!(record.len(), 2);
        assert!(!record.contains_key("country"));
    }
}
