//! Unit tests for entry context and error aggregation.

use std::sync::Arc;

use rstest::rstest;

use super::{EngineError, EntryContext, WithEntryContext};
use crate::convert::ConversionError;

#[rstest]
#[case(EntryContext::default(), "")]
#[case(EntryContext::entry(2), "record 2: ")]
#[case(EntryContext::with_network(3, "1.1.1.0/24"), "record 3 (network: 1.1.1.0/24): ")]
fn renders_entry_context(#[case] context: EntryContext, #[case] expected: &str) {
    assert_eq!(context.to_string(), expected);
}

#[rstest]
fn in_context_keeps_existing_context() {
    let err = EngineError::validation("missing 'data'")
        .in_context(EntryContext::entry(1))
        .in_context(EntryContext::entry(9));
    assert_eq!(err.context(), Some(&EntryContext::entry(1)));
    assert_eq!(err.to_string(), "record 1: missing 'data'");
}

#[rstest]
fn with_entry_context_converts_lower_level_errors() {
    let result: Result<(), ConversionError> = Err(ConversionError::DepthExceeded {
        path: "a.b".to_owned(),
        limit: 2,
    });
    let err = result
        .with_entry_context(EntryContext::with_network(5, "8.8.8.0/24"))
        .expect_err("error is preserved");

    assert!(matches!(err, EngineError::Conversion { .. }));
    assert!(err.to_string().starts_with("record 5 (network: 8.8.8.0/24): "));
}

#[rstest]
fn unsupported_method_lists_the_alternatives() {
    let err = EngineError::unsupported_method("upsert");
    assert_eq!(
        err.to_string(),
        "unsupported method 'upsert' (supported: remove, replace, top_level_merge, deep_merge)"
    );
}

#[rstest]
fn try_aggregate_of_nothing_is_none() {
    assert!(EngineError::try_aggregate(Vec::<EngineError>::new()).is_none());
}

#[rstest]
fn single_owned_error_is_returned_as_is() {
    let outcome = EngineError::try_aggregate(vec![EngineError::validation("only")]);
    assert!(matches!(outcome, Some(EngineError::Validation { .. })));
}

#[rstest]
fn single_shared_error_is_wrapped() {
    let shared = Arc::new(EngineError::validation("shared"));
    let _keep = Arc::clone(&shared);
    let outcome = EngineError::try_aggregate(vec![shared]);
    let Some(EngineError::Aggregate(failures)) = outcome else {
        panic!("expected Aggregate, got {outcome:?}");
    };
    assert_eq!(failures.len(), 1);
}

#[rstest]
fn aggregate_names_each_failing_entry() {
    let outcome = EngineError::try_aggregate(vec![
        EngineError::validation("missing 'network'").in_context(EntryContext::entry(1)),
        EngineError::unsupported_method("bogus")
            .in_context(EntryContext::with_network(4, "8.8.8.0/24")),
    ]);
    let Some(err @ EngineError::Aggregate(_)) = outcome else {
        panic!("expected Aggregate, got {outcome:?}");
    };
    assert_eq!(
        err.to_string(),
        "2 dataset entries failed:\n  record 1: missing 'network'\n  record 4 (network: 8.8.8.0/24): \
         unsupported method 'bogus' (supported: remove, replace, top_level_merge, deep_merge)"
    );
    if let EngineError::Aggregate(failures) = &err {
        assert_eq!(failures.entries().collect::<Vec<_>>(), vec![1, 4]);
    }
}

#[rstest]
fn failures_without_an_entry_are_marked_as_dataset_wide() {
    let outcome = EngineError::try_aggregate(vec![
        EngineError::validation("no 'dataset' field found in input data"),
        EngineError::validation("missing 'data'").in_context(EntryContext::entry(2)),
    ]);
    let Some(EngineError::Aggregate(failures)) = outcome else {
        panic!("expected Aggregate, got {outcome:?}");
    };
    assert_eq!(failures.entries().collect::<Vec<_>>(), vec![2]);
    assert!(
        failures
            .to_string()
            .starts_with("  dataset: no 'dataset' field found in input data\n  record 2: "),
        "{failures}"
    );
}
