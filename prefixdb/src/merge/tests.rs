//! Unit tests for the update semantics.

use ipnetwork::IpNetwork;
use rstest::{fixture, rstest};
use serde_json::{Value, json};

use super::{MergeMethod, apply, deep_merge, top_level_merge};
use crate::error::EngineError;
use crate::metadata::DatabaseMetadata;
use crate::store::{MemoryStore, Store, StoreOptions};
use crate::value::TypedValue;

const NETWORK: &str = "8.8.8.0/24";

fn typed(value: &Value) -> TypedValue {
    serde_json::from_value::<TypedValue>(typed_json(value)).expect("fixture converts")
}

/// Render plain JSON in the tagged layout `TypedValue` deserialises from.
fn typed_json(value: &Value) -> Value {
    match value {
        Value::Object(map) => json!({
            "map": map
                .iter()
                .map(|(key, value)| (key.clone(), typed_json(value)))
                .collect::<serde_json::Map<_, _>>()
        }),
        Value::Number(number) => json!({"int32": number}),
        Value::String(text) => json!({"string": text}),
        Value::Bool(flag) => json!({"bool": flag}),
        other => panic!("unsupported fixture value {other}"),
    }
}

fn network() -> IpNetwork {
    NETWORK.parse().expect("valid network literal")
}

fn current(store: &MemoryStore) -> Option<Value> {
    store
        .lookup("8.8.8.8".parse().expect("valid address literal"))
        .map(|(_, record)| record.to_json())
}

#[fixture]
fn store() -> MemoryStore {
    MemoryStore::create(DatabaseMetadata::new("Test", "merge"), StoreOptions::default())
}

#[rstest]
#[case("remove", MergeMethod::Remove)]
#[case("replace", MergeMethod::Replace)]
#[case("top_level_merge", MergeMethod::TopLevelMerge)]
#[case("deep_merge", MergeMethod::DeepMerge)]
fn parses_method_names(#[case] raw: &str, #[case] expected: MergeMethod) {
    assert_eq!(raw.parse::<MergeMethod>().ok(), Some(expected));
    assert_eq!(expected.as_str(), raw);
}

#[rstest]
fn unknown_methods_are_unsupported() {
    let err = "unknown".parse::<MergeMethod>().expect_err("must be rejected");
    assert!(matches!(err, EngineError::UnsupportedMethod { ref method, .. } if method == "unknown"));
}

#[rstest]
fn deep_merge_keeps_sibling_keys(mut store: MemoryStore) {
    apply(&mut store, network(), MergeMethod::DeepMerge, Some(typed(&json!({"a": 1, "b": 2}))))
        .expect("first merge");
    apply(&mut store, network(), MergeMethod::DeepMerge, Some(typed(&json!({"b": 3, "c": 4}))))
        .expect("second merge");

    assert_eq!(current(&store), Some(json!({"a": 1, "b": 3, "c": 4})));
}

#[rstest]
fn deep_merge_recurses_into_nested_maps() {
    let existing = typed(&json!({"geo": {"city": "Paris", "country": "FR"}, "asn": 1}));
    let incoming = typed(&json!({"geo": {"city": "Lyon"}}));

    assert_eq!(
        deep_merge(Some(&existing), &incoming).to_json(),
        json!({"geo": {"city": "Lyon", "country": "FR"}, "asn": 1})
    );
}

#[rstest]
fn incoming_scalars_replace_maps() {
    let existing = typed(&json!({"geo": {"city": "Paris"}}));
    let incoming = typed(&json!({"geo": "unknown"}));
    assert_eq!(
        deep_merge(Some(&existing), &incoming).to_json(),
        json!({"geo": "unknown"})
    );
}

#[rstest]
fn replace_discards_prior_structure(mut store: MemoryStore) {
    apply(&mut store, network(), MergeMethod::DeepMerge, Some(typed(&json!({"x": 1, "y": 2}))))
        .expect("merge");
    apply(&mut store, network(), MergeMethod::Replace, Some(typed(&json!({"x": 1}))))
        .expect("replace");

    assert_eq!(current(&store), Some(json!({"x": 1})));
}

#[rstest]
fn top_level_merge_replaces_whole_keys(mut store: MemoryStore) {
    apply(&mut store, network(), MergeMethod::Replace, Some(typed(&json!({"a": {"p": 0, "q": 9}, "b": 1}))))
        .expect("replace");
    apply(&mut store, network(), MergeMethod::TopLevelMerge, Some(typed(&json!({"a": {"p": 1}}))))
        .expect("top level merge");

    assert_eq!(current(&store), Some(json!({"a": {"p": 1}, "b": 1})));
}

#[rstest]
fn top_level_merge_without_existing_record_inserts() {
    let incoming = typed(&json!({"a": 1}));
    assert_eq!(top_level_merge(None, &incoming), incoming);
}

#[rstest]
fn remove_without_prior_record_is_a_no_op(mut store: MemoryStore) {
    apply(&mut store, network(), MergeMethod::Remove, None).expect("remove succeeds");
    assert!(store.is_empty());
}

#[rstest]
fn remove_deletes_the_record(mut store: MemoryStore) {
    apply(&mut store, network(), MergeMethod::Replace, Some(typed(&json!({"a": 1})))).expect("replace");
    apply(&mut store, network(), MergeMethod::Remove, None).expect("remove");
    assert_eq!(current(&store), None);
}

#[rstest]
#[case(MergeMethod::Replace)]
#[case(MergeMethod::TopLevelMerge)]
#[case(MergeMethod::DeepMerge)]
fn value_is_required_for_writes(mut store: MemoryStore, #[case] method: MergeMethod) {
    let err = apply(&mut store, network(), method, None).expect_err("value is required");
    assert!(matches!(err, EngineError::Validation { .. }));
    assert!(store.is_empty());
}

#[rstest]
fn store_errors_propagate() {
    let mut metadata = DatabaseMetadata::new("Test", "merge");
    metadata.ip_version = crate::metadata::IpVersion::V4;
    let mut store = MemoryStore::create(metadata, StoreOptions::default());
    let v6: IpNetwork = "2001:4860::/32".parse().expect("valid network literal");

    let err = apply(&mut store, v6, MergeMethod::Replace, Some(typed(&json!({"a": 1}))))
        .expect_err("IPv6 write into IPv4 store");
    assert!(matches!(err, EngineError::Store { .. }));
}
