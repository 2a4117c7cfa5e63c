//! Crate-level properties of validation, credentials and normalization.

use ga_core::credentials::CredentialDocument;
use ga_core::records::normalize_rows;
use ga_core::validation::validate_inputs;
use ga_core::{FieldValue, RawRow, ValidationError};
use proptest::prelude::*;
use std::io::Write;

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

proptest! {
    #[test]
    fn prop_dimension_overflow_names_count(n in 10usize..64) {
        let dims: Vec<String> = (0..n).map(|i| format!("dim{}", i)).collect();
        let err = validate_inputs(&dims, &strings(&["sessions"]), "today", "today").unwrap_err();
        prop_assert!(err.to_string().contains(&n.to_string()));
    }

    #[test]
    fn prop_days_ago_tokens_accepted(n in 0u32..5000) {
        let token = format!("{}daysAgo", n);
        prop_assert!(validate_inputs(&[], &strings(&["sessions"]), &token, "today").is_ok());
    }

    #[test]
    fn prop_normalization_is_pure(path in "[/a-z?=]{0,70}", views in 0u32..100000) {
        let dims = strings(&["pagePath", "date"]);
        let metrics = strings(&["screenPageViews"]);
        let rows = vec![RawRow::new([path.clone(), "20240301".to_string()], [views.to_string()])];
        let first = normalize_rows(&rows, &dims, &metrics);
        let second = normalize_rows(&rows, &dims, &metrics);
        prop_assert_eq!(&first, &second);
        prop_assert_eq!(&first[0]["pagePath_raw"], &FieldValue::Text(path));
    }
}

#[test]
fn every_invalid_metric_is_named() {
    let err = validate_inputs(
        &[],
        &strings(&["bogusOne", "sessions", "bogusTwo"]),
        "2024-01-01",
        "2024-01-31",
    )
    .unwrap_err();
    match err {
        ValidationError::UnknownMetrics { invalid, .. } => {
            assert_eq!(invalid, strings(&["bogusOne", "bogusTwo"]));
        }
        other => panic!("unexpected error: {:?}", other),
    }
}

#[test]
fn credential_file_round_trip() {
    let mut file = tempfile::Builder::new().suffix(".json").tempfile().unwrap();
    write!(
        file,
        r#"{{"type":"service_account","project_id":"acme","private_key":"k","client_email":"svc@acme.iam.gserviceaccount.com","token_uri":"https://example.test/token"}}"#
    )
    .unwrap();

    let doc = CredentialDocument::from_source(file.path().to_str().unwrap()).unwrap();
    let account = doc.validate().unwrap();
    assert_eq!(account.client_email, "svc@acme.iam.gserviceaccount.com");
    assert_eq!(account.token_uri, "https://example.test/token");
}
