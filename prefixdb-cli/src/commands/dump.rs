//! `prefixdb dump`: export a database as a dataset.

use std::io::Write;

use prefixdb::Dataset;
use prefixdb::store::{MemoryStore, Store, StoreOptions};
use serde_json::{Value, json};

use crate::cli::DumpArgs;
use crate::error::CliError;
use crate::{fs_helpers, output};

pub(super) fn run(args: &DumpArgs, out: &mut dyn Write) -> Result<(), CliError> {
    fs_helpers::require_input(&args.input, fs_helpers::DATABASE_EXTENSION)?;
    fs_helpers::require_extension(&args.output, fs_helpers::DATASET_EXTENSION)?;
    let store = MemoryStore::load(&args.input, StoreOptions::default())?;

    let entries = dataset_entries(&store);
    let count = entries.len();
    let document = Dataset::document(store.metadata(), entries);
    output::write_json_file(&args.output, &document)?;
    output::line(out, format_args!("dumped {count} entries to {}", args.output))
}

/// Records as `replace` entries and holes as `remove` entries, in replay order.
fn dataset_entries(store: &MemoryStore) -> Vec<Value> {
    store
        .entries()
        .map(|(network, record)| match record {
            Some(record) => json!({
                "network": network.to_string(),
                "method": "replace",
                "data": record.to_json(),
            }),
            None => json!({
                "network": network.to_string(),
                "method": "remove",
            }),
        })
        .collect()
}
