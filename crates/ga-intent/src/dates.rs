//! Date range resolution from free text.
//!
//! Rules are scanned in declaration order and the first rule with any
//! phrase contained in the text wins, however specific a later rule is.

use serde::{Deserialize, Serialize};

use crate::grammar::DateRule;

pub const DEFAULT_START: &str = "30daysAgo";
pub const DEFAULT_END: &str = "today";

/// A resolved pair of date tokens
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateRange {
    pub start_date: String,
    pub end_date: String,
    /// Phrase that selected the range; `None` for the default
    pub matched_phrase: Option<String>,
}

impl DateRange {
    pub fn default_range() -> Self {
        Self {
            start_date: DEFAULT_START.to_string(),
            end_date: DEFAULT_END.to_string(),
            matched_phrase: None,
        }
    }

    pub fn as_pair(&self) -> (&str, &str) {
        (&self.start_date, &self.end_date)
    }
}

/// Resolve normalized text to a date range
pub fn resolve(text: &str, rules: &[DateRule]) -> DateRange {
    for rule in rules {
        if let Some(phrase) = rule.phrases.iter().find(|p| text.contains(p.as_str())) {
            tracing::debug!(phrase = %phrase, start = %rule.start, end = %rule.end, "date phrase matched");
            return DateRange {
                start_date: rule.start.clone(),
                end_date: rule.end.clone(),
                matched_phrase: Some(phrase.clone()),
            };
        }
    }
    DateRange::default_range()
}
