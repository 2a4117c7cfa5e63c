//! Executive summary and chart hints.
use ga_core::NormalizedRecord;
use ga_intent::Intent;
use serde::{Deserialize, Serialize};

use crate::insights::{group_thousands, number};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Period {
    pub from: String,
    pub to: String,
}

/// Headline totals; a figure is present only when its fields are.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ExecutiveSummary {
    pub period: Option<Period>,
    pub total_users: Option<f64>,
    pub total_sessions: Option<f64>,
    pub sessions_per_user: Option<f64>,
    pub total_page_views: Option<f64>,
    pub total_conversions: Option<f64>,
    /// Percent of users that converted
    pub conversion_rate: Option<f64>,
}

fn total(records: &[NormalizedRecord], field: &str) -> Option<f64> {
    if !records.iter().any(|r| r.contains_key(field)) {
        return None;
    }
    Some(records.iter().filter_map(|r| number(r, field)).sum())
}

impl ExecutiveSummary {
    pub fn from_records(records: &[NormalizedRecord]) -> Self {
        let dates: Vec<String> = records
            .iter()
            .filter_map(|r| r.get("date").map(|v| v.to_string()))
            .collect();
        let period = match (dates.iter().min(), dates.iter().max()) {
            (Some(from), Some(to)) => Some(Period { from: from.clone(), to: to.clone() }),
            _ => None,
        };

        let total_users = total(records, "totalUsers");
        let total_sessions = total(records, "sessions");
        let total_conversions = total(records, "conversions");
        let per_user = |value: Option<f64>, scale: f64| match (value, total_users) {
            (Some(v), Some(users)) if users > 0.0 => Some(v * scale / users),
            _ => None,
        };

        Self {
            period,
            total_users,
            total_sessions,
            sessions_per_user: per_user(total_sessions, 1.0),
            total_page_views: total(records, "screenPageViews"),
            total_conversions,
            conversion_rate: per_user(total_conversions, 100.0),
        }
    }

    /// One-line rendering, ` | ` separated.
    pub fn headline(&self) -> String {
        let mut parts = Vec::new();
        if let Some(period) = &self.period {
            parts.push(format!("Analysis Period: {} to {}", period.from, period.to));
        }
        if let Some(users) = self.total_users {
            parts.push(format!("Total Users: {}", group_thousands(users)));
        }
        if let Some(sessions) = self.total_sessions {
            parts.push(format!("Total Sessions: {}", group_thousands(sessions)));
        }
        if let Some(ratio) = self.sessions_per_user {
            parts.push(format!("Sessions per User: {:.2}", ratio));
        }
        if let Some(views) = self.total_page_views {
            parts.push(format!("Total Page Views: {}", group_thousands(views)));
        }
        if let Some(conversions) = self.total_conversions {
            parts.push(format!("Total Conversions: {}", group_thousands(conversions)));
        }
        if let Some(rate) = self.conversion_rate {
            parts.push(format!("Conversion Rate: {:.2}%", rate));
        }

        if parts.is_empty() {
            "No data available for analysis.".to_string()
        } else {
            parts.join(" | ")
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChartKind {
    TrafficTrend,
    SourceComparison,
    DeviceDistribution,
    PagePerformance,
}

/// Which chart suits the data; rendering is someone else's job.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChartHint {
    pub kind: ChartKind,
    pub dimension: String,
    pub metric: String,
}

pub fn chart_hints(intent: Intent, records: &[NormalizedRecord]) -> Vec<ChartHint> {
    let has = |field: &str| records.iter().any(|r| r.contains_key(field));
    let hint = |kind, dimension: &str, metric: &str| ChartHint {
        kind,
        dimension: dimension.to_string(),
        metric: metric.to_string(),
    };

    let chosen = match intent {
        Intent::Traffic if has("date") => Some(hint(ChartKind::TrafficTrend, "date", "sessions")),
        Intent::Acquisition if has("source") && has("sessions") => {
            Some(hint(ChartKind::SourceComparison, "source", "sessions"))
        }
        Intent::Technology if has("deviceCategory") && has("sessions") => {
            Some(hint(ChartKind::DeviceDistribution, "deviceCategory", "sessions"))
        }
        Intent::Pages if has("pagePath") && has("screenPageViews") => {
            Some(hint(ChartKind::PagePerformance, "pagePath", "screenPageViews"))
        }
        _ => None,
    };
    chosen.into_iter().collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use ga_core::FieldValue;

    fn record(fields: &[(&str, FieldValue)]) -> NormalizedRecord {
        fields.iter().map(|(k, v)| (k.to_string(), v.clone())).collect()
    }

    #[test]
    fn test_summary_totals() {
        let records = vec![
            record(&[
                ("date", FieldValue::Text("2024-01-02".into())),
                ("sessions", FieldValue::Int(1500)),
                ("totalUsers", FieldValue::Int(1000)),
            ]),
            record(&[
                ("date", FieldValue::Text("2024-01-01".into())),
                ("sessions", FieldValue::Int(500)),
                ("totalUsers", FieldValue::Int(600)),
            ]),
        ];
        let summary = ExecutiveSummary::from_records(&records);
        assert_eq!(summary.period, Some(Period { from: "2024-01-01".into(), to: "2024-01-02".into() }));
        assert_eq!(summary.total_sessions, Some(2000.0));
        assert_eq!(summary.sessions_per_user, Some(1.25));
        assert_eq!(summary.total_page_views, None);
        assert_eq!(
            summary.headline(),
            "Analysis Period: 2024-01-01 to 2024-01-02 | Total Users: 1,600 | Total Sessions: 2,000 | Sessions per User: 1.25"
        );
    }

    #[test]
    fn test_conversion_rate() {
        let records = vec![record(&[
            ("conversions", FieldValue::Int(25)),
            ("totalUsers", FieldValue::Int(1000)),
        ])];
        let summary = ExecutiveSummary::from_records(&records);
        assert_eq!(summary.conversion_rate, Some(2.5));
    }

    #[test]
    fn test_empty_headline() {
        assert_eq!(ExecutiveSummary::from_records(&[]).headline(), "No data available for analysis.");
    }

    #[test]
    fn test_chart_hints() {
        let records = vec![record(&[
            ("deviceCategory", FieldValue::Text("mobile".into())),
            ("sessions", FieldValue::Int(3)),
        ])];
        let hints = chart_hints(Intent::Technology, &records);
        assert_eq!(hints.len(), 1);
        assert_eq!(hints[0].kind, ChartKind::DeviceDistribution);
        assert!(chart_hints(Intent::Geography, &records).is_empty());
    }
}
