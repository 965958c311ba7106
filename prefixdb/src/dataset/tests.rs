//! Unit tests for dataset and entry parsing.

use rstest::rstest;
use serde_json::{Value, json};

use super::{Dataset, DatasetEntry, parse_network};
use crate::diagnostics::{DiagnosticKind, Diagnostics};
use crate::error::EngineError;
use crate::merge::MergeMethod;

fn parse_dataset(value: Value) -> (Result<Dataset, EngineError>, Diagnostics) {
    let mut diagnostics = Diagnostics::new();
    let result = Dataset::from_value(value, &mut diagnostics);
    (result, diagnostics)
}

#[rstest]
fn accepts_a_minimal_dataset() {
    let (result, diagnostics) = parse_dataset(json!({"dataset": []}));
    let dataset = result.expect("dataset parses");
    assert_eq!(dataset.version, None);
    assert!(dataset.schema.is_none());
    assert!(dataset.entries.is_empty());
    assert!(diagnostics.is_empty());
}

#[rstest]
#[case(json!({"version": "v2", "dataset": []}), "unsupported dataset version 'v2'")]
#[case(json!({"version": 1, "dataset": []}), "'version' must be a string")]
#[case(json!({"version": "v1"}), "no 'dataset' field found")]
#[case(json!({"dataset": {}}), "'dataset' must be an array")]
#[case(json!([]), "must contain a JSON object")]
fn rejects_malformed_datasets(#[case] raw: Value, #[case] fragment: &str) {
    let (result, _) = parse_dataset(raw);
    let err = result.expect_err("dataset must be rejected");
    assert!(matches!(err, EngineError::Validation { .. }));
    assert!(err.to_string().contains(fragment), "unexpected message: {err}");
}

#[rstest]
fn non_object_schema_is_ignored_with_a_warning() {
    let (result, diagnostics) = parse_dataset(json!({"schema": ["asn"], "dataset": []}));
    assert!(result.expect("dataset parses").schema.is_none());
    assert!(diagnostics.contains(DiagnosticKind::SchemaIgnored));
}

#[rstest]
fn malformed_json_is_a_json_error() {
    let mut diagnostics = Diagnostics::new();
    let err = Dataset::from_json_str("{", &mut diagnostics).expect_err("invalid JSON");
    assert!(matches!(err, EngineError::Json(_)));
}

#[rstest]
fn metadata_is_required_for_store_creation() {
    let (result, _) = parse_dataset(json!({"dataset": []}));
    let dataset = result.expect("dataset parses");
    let mut diagnostics = Diagnostics::new();
    let err = dataset
        .database_metadata(&mut diagnostics)
        .expect_err("metadata is missing");
    assert!(err.to_string().contains("no 'metadata' field"));
}

#[rstest]
#[case("192.168.1.0/24", "192.168.1.0/24")]
#[case("10.1.2.3/8", "10.0.0.0/8")]
#[case("2001:db8::1/32", "2001:db8::/32")]
#[case(" 1.1.1.0/24 ", "1.1.1.0/24")]
fn parses_cidr_notation(#[case] raw: &str, #[case] expected: &str) {
    assert_eq!(
        parse_network(raw).expect("valid CIDR").to_string(),
        expected
    );
}

#[rstest]
#[case("not-an-ip")]
#[case("1.1.1.1")]
#[case("1.1.1.0/33")]
#[case("300.1.1.0/24")]
fn rejects_invalid_cidr(#[case] raw: &str) {
    let err = parse_network(raw).expect_err("CIDR must be rejected");
    assert!(matches!(err, EngineError::Validation { .. }));
}

#[rstest]
fn entry_defaults_to_deep_merge() {
    let raw = json!({"network": "1.1.1.0/24", "data": {"asn": 13335}});
    let mut diagnostics = Diagnostics::new();
    let entry = DatasetEntry::parse(1, &raw, &mut diagnostics).expect("entry parses");

    assert_eq!(entry.method, MergeMethod::DeepMerge);
    assert!(entry.data.is_some());
    assert!(diagnostics.contains(DiagnosticKind::MethodDefaulted));
}

#[rstest]
fn data_takes_precedence_over_record() {
    let raw = json!({
        "network": "1.1.1.0/24",
        "method": "replace",
        "data": {"from": "data"},
        "record": {"from": "record"}
    });
    let mut diagnostics = Diagnostics::new();
    let entry = DatasetEntry::parse(1, &raw, &mut diagnostics).expect("entry parses");
    assert_eq!(
        entry.data.and_then(|data| data.get("from")),
        Some(&json!("data"))
    );
}

#[rstest]
fn null_data_falls_back_to_record() {
    let raw = json!({"network": "1.1.1.0/24", "method": "replace", "data": null, "record": {"asn": 1}});
    let mut diagnostics = Diagnostics::new();
    let entry = DatasetEntry::parse(1, &raw, &mut diagnostics).expect("entry parses");
    assert_eq!(
        entry.data.and_then(|data| data.get("asn")),
        Some(&json!(1))
    );
}

#[rstest]
fn record_is_accepted_as_an_alias() {
    let raw = json!({"network": "1.1.1.0/24", "method": "replace", "record": {"asn": 1}});
    let mut diagnostics = Diagnostics::new();
    let entry = DatasetEntry::parse(2, &raw, &mut diagnostics).expect("entry parses");
    assert!(entry.data.is_some());
    assert!(diagnostics.is_empty());
}

#[rstest]
#[case(json!("1.1.1.0/24"), "record 3: entry must be an object")]
#[case(json!({"data": {}}), "record 3: missing 'network'")]
#[case(json!({"network": 7}), "record 3: 'network' must be a string")]
#[case(
    json!({"network": "not-an-ip", "data": {}}),
    "record 3 (network: not-an-ip): invalid network 'not-an-ip'"
)]
#[case(
    json!({"network": "1.1.1.0/24", "method": 5}),
    "record 3 (network: 1.1.1.0/24): 'method' must be a string"
)]
#[case(
    json!({"network": "1.1.1.0/24", "data": [1]}),
    "record 3 (network: 1.1.1.0/24): 'data' must be an object"
)]
fn entry_errors_name_the_record(#[case] raw: Value, #[case] prefix: &str) {
    let mut diagnostics = Diagnostics::new();
    let err = DatasetEntry::parse(3, &raw, &mut diagnostics).expect_err("entry must be rejected");
    assert!(err.to_string().starts_with(prefix), "unexpected message: {err}");
}

#[rstest]
fn unknown_method_is_unsupported() {
    let raw = json!({"network": "1.1.1.0/24", "method": "unknown", "data": {}});
    let mut diagnostics = Diagnostics::new();
    let err = DatasetEntry::parse(4, &raw, &mut diagnostics).expect_err("method must be rejected");
    assert!(matches!(err, EngineError::UnsupportedMethod { .. }));
    assert!(err.to_string().starts_with("record 4 (network: 1.1.1.0/24): unsupported method 'unknown'"));
}
