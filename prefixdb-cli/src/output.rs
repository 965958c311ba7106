//! Output writers for `prefixdb`.

use std::io::Write;

use camino::Utf8Path;
use serde::Serialize;

use crate::cli::OutputFormat;
use crate::error::CliError;
use crate::fs_helpers;

/// Render `value` to `out` in `format`, ending with a newline.
pub fn render<T>(value: &T, format: OutputFormat, out: &mut dyn Write) -> Result<(), CliError>
where
    T: Serialize + ?Sized,
{
    match format {
        OutputFormat::Json => {
            serde_json::to_writer(&mut *out, value)?;
            writeln!(out).map_err(CliError::Output)
        }
        OutputFormat::JsonPretty => {
            serde_json::to_writer_pretty(&mut *out, value)?;
            writeln!(out).map_err(CliError::Output)
        }
        OutputFormat::Yaml => Ok(serde_yaml::to_writer(&mut *out, value)?),
    }
}

/// Write `value` as pretty JSON to a new or truncated file at `path`.
pub fn write_json_file<T>(path: &Utf8Path, value: &T) -> Result<(), CliError>
where
    T: Serialize + ?Sized,
{
    let mut file = fs_helpers::create_output(path)?;
    serde_json::to_writer_pretty(&mut file, value)?;
    writeln!(file).map_err(|io_err| CliError::Io {
        path: path.to_path_buf(),
        source: io_err,
    })
}

/// Write one line of human-readable text.
pub fn line(out: &mut dyn Write, text: impl std::fmt::Display) -> Result<(), CliError> {
    writeln!(out, "{text}").map_err(CliError::Output)
}

#[cfg(test)]
mod tests {
    use rstest::rstest;
    use serde_json::json;

    use super::render;
    use crate::cli::OutputFormat;

    fn rendered(format: OutputFormat) -> String {
        let mut out = Vec::new();
        render(&json!([{"query": "1.1.1.1", "records": []}]), format, &mut out)
            .expect("render succeeds");
        String::from_utf8(out).expect("UTF-8 output")
    }

    #[rstest]
    fn json_is_compact() {
        assert_eq!(rendered(OutputFormat::Json), "[{\"query\":\"1.1.1.1\",\"records\":[]}]\n");
    }

    #[rstest]
    fn pretty_json_indents_with_two_spaces() {
        let text = rendered(OutputFormat::JsonPretty);
        assert!(text.contains("\n  {\n    \"query\": \"1.1.1.1\""), "{text}");
        assert!(!text.contains('\t'));
        assert!(text.ends_with("]\n"));
    }

    #[rstest]
    fn yaml_lists_fields() {
        let text = rendered(OutputFormat::Yaml);
        assert!(text.starts_with("- query:"), "{text}");
        assert!(text.contains("1.1.1.1"), "{text}");
        assert!(text.contains("records: []"), "{text}");
    }
}
