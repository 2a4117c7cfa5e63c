//! Tests against the shipped grammar file.

use ga_core::validation::validate_query;
use ga_intent::{classify, plan, resolve_date_range, Grammar, Intent};

const GRAMMAR_PATH: &str = "grammars/analytics-intents.yaml";

fn grammar_path() -> String {
    let manifest_dir = std::env::var("CARGO_MANIFEST_DIR").unwrap();
    let workspace_root = std::path::Path::new(&manifest_dir).parent().unwrap().parent().unwrap();
    workspace_root.join(GRAMMAR_PATH).to_string_lossy().to_string()
}

#[test]
fn test_shipped_file_matches_builtin() {
    let loaded = Grammar::load(&grammar_path()).unwrap();
    assert_eq!(loaded, Grammar::builtin());
}

#[test]
fn test_every_intent_plans_a_valid_query() {
    let grammar = Grammar::builtin();
    let requests = [
        ("website traffic last 30 days", Intent::Traffic),
        ("most popular pages", Intent::Pages),
        ("which campaign drove referral visits from each channel", Intent::Acquisition),
        ("mobile vs desktop split", Intent::Technology),
        ("sessions by country and city", Intent::Geography),
        ("revenue and purchase totals", Intent::Ecommerce),
        ("bounce and engagement", Intent::Engagement),
    ];

    for (text, expected) in requests {
        let plan = plan(text, &grammar);
        assert_eq!(plan.intent.intent, expected, "wrong intent for: {}", text);
        assert!(validate_query(&plan.spec).is_ok(), "invalid spec for: {}", text);
    }
}

#[test]
fn test_end_to_end_plan() {
    let plan = plan("Analyze top performing pages this month", &Grammar::builtin());
    assert_eq!(plan.spec.dimensions, vec!["pagePath", "pageTitle"]);
    assert_eq!(plan.spec.metrics, vec!["screenPageViews", "sessions"]);
    assert_eq!(plan.spec.date_range_label(), "30daysAgo to today");
    assert_eq!(plan.date_range.matched_phrase.as_deref(), Some("this month"));
}

#[test]
fn test_public_helpers_normalize() {
    let grammar = Grammar::builtin();
    assert_eq!(classify("TOP PAGES", &grammar).intent, Intent::Pages);
    let range = resolve_date_range("Past Week", &grammar);
    assert_eq!(range.as_pair(), ("7daysAgo", "today"));
}
