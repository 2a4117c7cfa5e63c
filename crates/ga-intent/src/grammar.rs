//! Intent grammar: keyword rules and date-phrase rules.
//!
//! Both lists are ordered. Intent ties and overlapping date phrases are
//! resolved by position, so loading never reorders anything.
//!
//! The built-in grammar mirrors `grammars/analytics-intents.yaml`; a file
//! with the same shape can replace it at runtime.

use ga_core::validation::is_date_token;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Fixed analysis categories.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Intent {
    Traffic,
    Pages,
    Acquisition,
    Technology,
    Geography,
    Ecommerce,
    Engagement,
}

impl Intent {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Traffic => "traffic",
            Self::Pages => "pages",
            Self::Acquisition => "acquisition",
            Self::Technology => "technology",
            Self::Geography => "geography",
            Self::Ecommerce => "ecommerce",
            Self::Engagement => "engagement",
        }
    }
}

impl std::fmt::Display for Intent {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Top-level grammar file structure
#[derive(Debug, Clone, Deserialize)]
pub struct GrammarFile {
    pub version: String,
    pub intents: Vec<IntentRule>,
    #[serde(default)]
    pub date_ranges: Vec<DateRule>,
}

/// Keywords that vote for one intent, and the query it implies.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IntentRule {
    pub intent: Intent,
    pub keywords: Vec<String>,
    /// Added to the intent's score for every keyword found
    pub weight: f64,
    pub dimensions: Vec<String>,
    pub metrics: Vec<String>,
}

/// Phrases that map to one date-token pair.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateRule {
    pub phrases: Vec<String>,
    pub start: String,
    pub end: String,
}

#[derive(Debug, Error)]
pub enum GrammarError {
    #[error("GRAMMAR/READ: {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("GRAMMAR/PARSE: {0}")]
    Parse(#[from] serde_yaml::Error),

    #[error("GRAMMAR/INVALID: {0}")]
    Invalid(String),
}

/// Compiled grammar ready for matching
#[derive(Debug, Clone, PartialEq)]
pub struct Grammar {
    pub version: String,
    pub intents: Vec<IntentRule>,
    pub date_rules: Vec<DateRule>,
}

impl Grammar {
    /// Load and check a grammar from a YAML file
    pub fn load(path: &str) -> Result<Self, GrammarError> {
        let content = std::fs::read_to_string(path).map_err(|source| GrammarError::Read {
            path: path.to_string(),
            source,
        })?;
        Self::from_yaml(&content)
    }

    /// A file without `date_ranges` keeps the built-in date rules.
    pub fn from_yaml(yaml: &str) -> Result<Self, GrammarError> {
        let file: GrammarFile = serde_yaml::from_str(yaml)?;

        let mut intents = Vec::with_capacity(file.intents.len());
        for mut rule in file.intents {
            if !(rule.weight > 0.0) {
                return Err(GrammarError::Invalid(format!(
                    "intent '{}' has non-positive weight {}",
                    rule.intent, rule.weight
                )));
            }
            if rule.keywords.is_empty() {
                return Err(GrammarError::Invalid(format!("intent '{}' has no keywords", rule.intent)));
            }
            rule.keywords = rule.keywords.iter().map(|k| k.to_lowercase()).collect();
            intents.push(rule);
        }

        let date_rules = if file.date_ranges.is_empty() {
            builtin_date_rules()
        } else {
            file.date_ranges
                .into_iter()
                .map(|mut rule| {
                    for token in [&rule.start, &rule.end] {
                        if !is_date_token(token) {
                            return Err(GrammarError::Invalid(format!(
                                "date rule {:?} maps to invalid token '{}'",
                                rule.phrases, token
                            )));
                        }
                    }
                    rule.phrases = rule.phrases.iter().map(|p| p.to_lowercase()).collect();
                    Ok(rule)
                })
                .collect::<Result<Vec<_>, _>>()?
        };

        Ok(Self { version: file.version, intents, date_rules })
    }

    pub fn builtin() -> Self {
        Self {
            version: "1.0".to_string(),
            intents: builtin_intents(),
            date_rules: builtin_date_rules(),
        }
    }
}

impl Default for Grammar {
    fn default() -> Self {
        Self::builtin()
    }
}

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

fn intent(intent: Intent, weight: f64, keywords: &[&str], dimensions: &[&str], metrics: &[&str]) -> IntentRule {
    IntentRule {
        intent,
        keywords: strings(keywords),
        weight,
        dimensions: strings(dimensions),
        metrics: strings(metrics),
    }
}

fn builtin_intents() -> Vec<IntentRule> {
    vec![
        intent(
            Intent::Traffic,
            0.9,
            &["traffic", "visitors", "sessions", "users", "visits"],
            &["date"],
            &["sessions", "totalUsers", "screenPageViews"],
        ),
        intent(
            Intent::Pages,
            0.95,
            &["pages", "page views", "content", "top pages", "popular pages"],
            &["pagePath", "pageTitle"],
            &["screenPageViews", "sessions"],
        ),
        intent(
            Intent::Acquisition,
            0.9,
            &["source", "referral", "campaign", "channel", "where", "how users found"],
            &["source", "medium", "sessionDefaultChannelGroup"],
            &["sessions", "totalUsers"],
        ),
        intent(
            Intent::Technology,
            0.85,
            &["device", "mobile", "desktop", "tablet", "platform"],
            &["deviceCategory", "operatingSystem"],
            &["sessions", "totalUsers"],
        ),
        intent(
            Intent::Geography,
            0.9,
            &["country", "location", "geographic", "region", "city"],
            &["country", "city"],
            &["sessions", "totalUsers"],
        ),
        intent(
            Intent::Ecommerce,
            0.95,
            &["conversion", "goal", "revenue", "purchase", "transaction"],
            &["date"],
            &["conversions", "totalRevenue", "transactions"],
        ),
        intent(
            Intent::Engagement,
            0.9,
            &["engagement", "bounce", "duration", "time", "interaction"],
            &["date"],
            &["engagementRate", "bounceRate", "averageSessionDuration"],
        ),
    ]
}

fn date_rule(phrases: &[&str], start: &str, end: &str) -> DateRule {
    DateRule { phrases: strings(phrases), start: start.to_string(), end: end.to_string() }
}

fn builtin_date_rules() -> Vec<DateRule> {
    vec![
        date_rule(&["last 90 days", "past 3 months", "quarterly"], "90daysAgo", "today"),
        date_rule(&["last 60 days", "past 2 months"], "60daysAgo", "today"),
        date_rule(&["last 30 days", "past month", "monthly"], "30daysAgo", "today"),
        date_rule(&["last 14 days", "past 2 weeks"], "14daysAgo", "today"),
        date_rule(&["last 7 days", "past week", "weekly"], "7daysAgo", "today"),
        date_rule(&["yesterday"], "yesterday", "yesterday"),
        date_rule(&["today"], "today", "today"),
        date_rule(&["this week"], "7daysAgo", "today"),
        date_rule(&["this month"], "30daysAgo", "today"),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_order() {
        let grammar = Grammar::builtin();
        let order: Vec<Intent> = grammar.intents.iter().map(|r| r.intent).collect();
        assert_eq!(
            order,
            vec![
                Intent::Traffic,
                Intent::Pages,
                Intent::Acquisition,
                Intent::Technology,
                Intent::Geography,
                Intent::Ecommerce,
                Intent::Engagement,
            ]
        );
        assert_eq!(grammar.date_rules[0].start, "90daysAgo");
    }

    #[test]
    fn test_yaml_without_dates_keeps_builtin_dates() {
        let grammar = Grammar::from_yaml(
            r#"
version: "2.0"
intents:
  - intent: geography
    keywords: ["Country"]
    weight: 1.0
    dimensions: [country]
    metrics: [sessions]
"#,
        )
        .unwrap();
        assert_eq!(grammar.intents[0].keywords, vec!["country"]);
        assert_eq!(grammar.date_rules, Grammar::builtin().date_rules);
    }

    #[test]
    fn test_rejects_bad_date_token() {
        let err = Grammar::from_yaml(
            r#"
version: "1.0"
intents:
  - intent: traffic
    keywords: [traffic]
    weight: 1.0
    dimensions: [date]
    metrics: [sessions]
date_ranges:
  - phrases: [fortnight]
    start: two weeks ago
    end: today
"#,
        )
        .unwrap_err();
        assert!(matches!(err, GrammarError::Invalid(_)));
    }

    #[test]
    fn test_rejects_zero_weight() {
        let err = Grammar::from_yaml(
            r#"
version: "1.0"
intents:
  - intent: traffic
    keywords: [traffic]
    weight: 0
    dimensions: [date]
    metrics: [sessions]
"#,
        )
        .unwrap_err();
        assert!(err.to_string().contains("non-positive"));
    }
}
