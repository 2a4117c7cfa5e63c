//! Known field names.

/// Metrics the validator accepts.
pub const VALID_METRICS: &[&str] = &[
    "sessions",
    "totalUsers",
    "newUsers",
    "activeUsers",
    "screenPageViews",
    "eventCount",
    "bounceRate",
    "engagementRate",
    "averageSessionDuration",
    "sessionsPerUser",
    "conversions",
    "totalRevenue",
    "transactions",
    "purchaseRevenue",
];

/// Commonly used dimensions. Not enforced: the provider owns the real set.
pub const KNOWN_DIMENSIONS: &[&str] = &[
    "date",
    "dateHour",
    "dateHourMinute",
    "dateMinute",
    "pagePath",
    "pageTitle",
    "pageReferrer",
    "source",
    "medium",
    "campaign",
    "deviceCategory",
    "operatingSystem",
    "browser",
    "country",
    "region",
    "city",
    "userType",
    "sessionDefaultChannelGroup",
    "landingPage",
    "exitPage",
    "eventName",
    "customEvent:event_name",
];

pub fn is_valid_metric(name: &str) -> bool {
    VALID_METRICS.contains(&name)
}

/// The metric allow-list, sorted.
pub fn known_metrics() -> Vec<String> {
    let mut metrics: Vec<String> = VALID_METRICS.iter().map(|m| m.to_string()).collect();
    metrics.sort();
    metrics
}

pub fn known_dimensions() -> Vec<String> {
    KNOWN_DIMENSIONS.iter().map(|d| d.to_string()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_metrics_sorted() {
        let metrics = known_metrics();
        let mut sorted = metrics.clone();
        sorted.sort();
        assert_eq!(metrics, sorted);
        assert_eq!(metrics.len(), VALID_METRICS.len());
    }

    #[test]
    fn test_metric_lookup_is_case_sensitive() {
        assert!(is_valid_metric("screenPageViews"));
        assert!(!is_valid_metric("screenpageviews"));
    }
}
