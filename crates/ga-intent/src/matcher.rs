//! Intent classification.
//!
//! Every keyword of an intent found as a substring of the normalized
//! request adds the intent's weight to its score. The strictly highest
//! score wins; on ties the intent declared first is kept. No keyword hit
//! at all yields the traffic fallback.

use serde::{Deserialize, Serialize};

use crate::grammar::{Grammar, Intent};

pub const FALLBACK_CONFIDENCE: f64 = 0.5;

/// A classified request
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IntentMatch {
    pub intent: Intent,
    pub dimensions: Vec<String>,
    pub metrics: Vec<String>,
    /// Sum of keyword weights, or the fallback confidence
    pub confidence: f64,
    /// Keywords that contributed to the score
    pub matched_keywords: Vec<String>,
    /// True when nothing matched and the default was used
    pub fallback: bool,
}

impl IntentMatch {
    pub fn fallback() -> Self {
        Self {
            intent: Intent::Traffic,
            dimensions: vec!["date".to_string()],
            metrics: vec!["sessions".to_string(), "totalUsers".to_string()],
            confidence: FALLBACK_CONFIDENCE,
            matched_keywords: Vec::new(),
            fallback: true,
        }
    }
}

/// Classify already-normalized text against the grammar
pub fn classify(text: &str, grammar: &Grammar) -> IntentMatch {
    let mut best: Option<(usize, f64, Vec<String>)> = None;

    for (index, rule) in grammar.intents.iter().enumerate() {
        let hits: Vec<String> = rule
            .keywords
            .iter()
            .filter(|keyword| text.contains(keyword.as_str()))
            .cloned()
            .collect();
        let score = rule.weight * hits.len() as f64;

        tracing::debug!(intent = %rule.intent, score, ?hits, "intent scored");

        let beats_best = match &best {
            Some((_, best_score, _)) => score > *best_score,
            None => score > 0.0,
        };
        if beats_best {
            best = Some((index, score, hits));
        }
    }

    match best {
        Some((index, confidence, matched_keywords)) => {
            let rule = &grammar.intents[index];
            IntentMatch {
                intent: rule.intent,
                dimensions: rule.dimensions.clone(),
                metrics: rule.metrics.clone(),
                confidence,
                matched_keywords,
                fallback: false,
            }
        }
        None => IntentMatch::fallback(),
    }
}
