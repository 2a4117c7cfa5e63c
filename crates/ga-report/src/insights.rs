//! Insight derivation over normalized records. Pure, no I/O.

use ga_core::records::HOMEPAGE;
use ga_core::NormalizedRecord;
use ga_intent::Intent;
use serde::{Deserialize, Serialize};

/// Data points needed for a week-over-week comparison.
pub const TREND_WINDOW: usize = 7;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InsightKind {
    Trend,
    PeakDay,
    TopSource,
    TopPage,
    HomepageShare,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Insight {
    pub kind: InsightKind,
    pub message: String,
    /// The headline number (percent change, sessions, views or share)
    pub value: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subject: Option<String>,
}

pub(crate) fn number(record: &NormalizedRecord, field: &str) -> Option<f64> {
    record.get(field).and_then(|v| v.as_f64())
}

fn text(record: &NormalizedRecord, field: &str) -> Option<String> {
    record.get(field).map(|v| v.to_string())
}

fn has_field(records: &[NormalizedRecord], field: &str) -> bool {
    records.iter().any(|r| r.contains_key(field))
}

/// First record with the largest numeric `field`.
fn max_by(records: &[NormalizedRecord], field: &str) -> Option<(usize, f64)> {
    let mut best: Option<(usize, f64)> = None;
    for (index, record) in records.iter().enumerate() {
        if let Some(value) = number(record, field) {
            if best.map_or(true, |(_, top)| value > top) {
                best = Some((index, value));
            }
        }
    }
    best
}

fn mean(values: &[f64]) -> f64 {
    values.iter().sum::<f64>() / values.len() as f64
}

/// Derive the insights that apply to `intent`.
pub fn derive(intent: Intent, records: &[NormalizedRecord]) -> Vec<Insight> {
    let mut insights = Vec::new();

    match intent {
        Intent::Traffic if has_field(records, "date") => {
            insights.extend(trend(records));
            insights.extend(peak_day(records));
        }
        Intent::Acquisition if has_field(records, "source") => {
            insights.extend(top_source(records));
        }
        Intent::Pages if has_field(records, "pagePath") => {
            insights.extend(top_page(records));
            insights.extend(homepage_share(records));
        }
        _ => {}
    }

    insights
}

/// Trailing week vs the week before, in date order.
pub fn trend(records: &[NormalizedRecord]) -> Option<Insight> {
    let mut series: Vec<(String, f64)> = records
        .iter()
        .filter_map(|r| Some((text(r, "date").unwrap_or_default(), number(r, "sessions")?)))
        .collect();
    if series.len() < TREND_WINDOW * 2 {
        return None;
    }
    series.sort_by(|a, b| a.0.cmp(&b.0));

    let values: Vec<f64> = series.into_iter().map(|(_, v)| v).collect();
    let split = values.len() - TREND_WINDOW;
    let recent = mean(&values[split..]);
    let previous = mean(&values[split - TREND_WINDOW..split]);
    if previous <= 0.0 {
        return None;
    }

    let change = (recent - previous) / previous * 100.0;
    let direction = if change > 0.0 {
        "increased"
    } else if change < 0.0 {
        "decreased"
    } else {
        "held steady"
    };
    let message = if change == 0.0 {
        "Traffic has held steady week-over-week".to_string()
    } else {
        format!("Traffic has {} by {:.1}% week-over-week", direction, change.abs())
    };

    Some(Insight { kind: InsightKind::Trend, message, value: change, subject: None })
}

pub fn peak_day(records: &[NormalizedRecord]) -> Option<Insight> {
    let (index, sessions) = max_by(records, "sessions")?;
    let date = text(&records[index], "date").unwrap_or_else(|| "N/A".to_string());
    Some(Insight {
        kind: InsightKind::PeakDay,
        message: format!("Peak traffic day: {} with {} sessions", date, group_thousands(sessions)),
        value: sessions,
        subject: Some(date),
    })
}

pub fn top_source(records: &[NormalizedRecord]) -> Option<Insight> {
    let (index, sessions) = max_by(records, "sessions")?;
    let source = text(&records[index], "source").unwrap_or_else(|| "(unknown)".to_string());
    Some(Insight {
        kind: InsightKind::TopSource,
        message: format!("Top traffic source: {} ({} sessions)", source, group_thousands(sessions)),
        value: sessions,
        subject: Some(source),
    })
}

pub fn top_page(records: &[NormalizedRecord]) -> Option<Insight> {
    let (index, views) = max_by(records, "screenPageViews")?;
    let page = text(&records[index], "pagePath").unwrap_or_else(|| "(unknown)".to_string());
    Some(Insight {
        kind: InsightKind::TopPage,
        message: format!("Most viewed page: {} ({} views)", page, group_thousands(views)),
        value: views,
        subject: Some(page),
    })
}

/// Homepage views as a share of all views; needs more than one row.
pub fn homepage_share(records: &[NormalizedRecord]) -> Option<Insight> {
    if records.len() < 2 {
        return None;
    }
    let is_home = |r: &NormalizedRecord| r.get("pagePath").and_then(|v| v.as_str()) == Some(HOMEPAGE);
    if !records.iter().any(is_home) {
        return None;
    }

    let total: f64 = records.iter().filter_map(|r| number(r, "screenPageViews")).sum();
    if total <= 0.0 {
        return None;
    }
    let home: f64 = records
        .iter()
        .filter(|r| is_home(r))
        .filter_map(|r| number(r, "screenPageViews"))
        .sum();
    let share = home / total * 100.0;

    Some(Insight {
        kind: InsightKind::HomepageShare,
        message: format!("Homepage accounts for {:.1}% of all page views", share),
        value: share,
        subject: Some(HOMEPAGE.to_string()),
    })
}

/// `1234567` → `1,234,567`; fractional values keep two decimals.
pub fn group_thousands(value: f64) -> String {
    if value.fract() != 0.0 {
        return format!("{:.2}", value);
    }
    let digits = format!("{}", value.abs() as u64);
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    if value < 0.0 {
        out.insert(0, '-');
    }
    out
}
