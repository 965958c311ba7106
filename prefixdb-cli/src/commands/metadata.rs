//! `prefixdb metadata`: show database metadata.

use std::io::Write;

use prefixdb::store::Store;
use serde_json::Value;

use crate::cli::MetadataArgs;
use crate::config::Settings;
use crate::error::CliError;
use crate::output;

pub(super) fn run(args: &MetadataArgs, settings: &Settings, out: &mut dyn Write) -> Result<(), CliError> {
    let store = super::load_store(&args.input, settings)?;
    let mut rendered = store.metadata().to_dataset_json();
    if let (Value::Object(fields), Some(epoch)) = (&mut rendered, store.build_epoch()) {
        fields.insert("BuildEpoch".to_owned(), Value::from(epoch));
    }
    output::render(&rendered, settings.format, out)
}
