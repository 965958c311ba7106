//! Structured, non-fatal findings collected while processing a dataset.
//!
//! The engine never prints. Anything worth telling the operator that does not
//! abort the run is recorded here and handed back to the caller, which decides
//! where it goes (the CLI forwards it to `tracing`).

use std::fmt;

/// Severity of a [`Diagnostic`].
#[derive(Clone, Copy, Debug, Eq, PartialEq, Ord, PartialOrd)]
pub enum Severity {
    /// A default was applied or a harmless adjustment was made.
    Info,
    /// Input was dropped or replaced by a lossy default.
    Warning,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Info => "info",
            Self::Warning => "warning",
        })
    }
}

/// Category of a [`Diagnostic`].
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum DiagnosticKind {
    /// A value did not match its schema type and the zero value was used.
    TypeMismatch,
    /// A field had a shape the store cannot hold and was dropped.
    UnsupportedFieldType,
    /// A schema entry had an unusable shape and was ignored.
    SchemaIgnored,
    /// A nested schema was declared but the field was not a record.
    NestedSchemaMismatch,
    /// An entry carried no `method`; `deep_merge` was used.
    MethodDefaulted,
    /// A metadata field was absent and its default was used.
    MetadataDefaulted,
    /// A metadata field is not honoured and was ignored.
    MetadataIgnored,
    /// An integer did not fit `int32` and was stored as `float64`.
    NumericWidened,
}

/// One non-fatal finding.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Diagnostic {
    /// How serious the finding is.
    pub severity: Severity,
    /// What kind of finding it is.
    pub kind: DiagnosticKind,
    /// 1-based dataset entry the finding belongs to, if any.
    pub entry: Option<usize>,
    /// Human-readable description.
    pub message: String,
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.entry {
            Some(entry) => write!(f, "[{}] record {entry}: {}", self.severity, self.message),
            None => write!(f, "[{}] {}", self.severity, self.message),
        }
    }
}

/// Ordered collection of [`Diagnostic`]s.
///
/// The collector remembers which entry is being processed so lower layers can
/// report findings without knowing their position in the dataset.
#[derive(Clone, Debug, Default)]
pub struct Diagnostics {
    records: Vec<Diagnostic>,
    entry: Option<usize>,
}

impl Diagnostics {
    /// Create an empty collector.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Attribute subsequent findings to the given 1-based entry.
    pub fn enter_entry(&mut self, entry: usize) {
        self.entry = Some(entry);
    }

    /// Stop attributing findings to an entry.
    pub fn leave_entry(&mut self) {
        self.entry = None;
    }

    /// Record a finding.
    pub fn push(&mut self, severity: Severity, kind: DiagnosticKind, message: impl Into<String>) {
        self.records.push(Diagnostic {
            severity,
            kind,
            entry: self.entry,
            message: message.into(),
        });
    }

    /// Record a warning.
    pub fn warn(&mut self, kind: DiagnosticKind, message: impl Into<String>) {
        self.push(Severity::Warning, kind, message);
    }

    /// Record an informational finding.
    pub fn info(&mut self, kind: DiagnosticKind, message: impl Into<String>) {
        self.push(Severity::Info, kind, message);
    }

    /// Iterate over collected findings in order.
    pub fn iter(&self) -> impl Iterator<Item = &Diagnostic> {
        self.records.iter()
    }

    /// Number of collected findings.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether nothing has been collected.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Whether any finding of `kind` has been collected.
    #[must_use]
    pub fn contains(&self, kind: DiagnosticKind) -> bool {
        self.records.iter().any(|record| record.kind == kind)
    }

    /// Move every finding out of `other` into `self`.
    pub fn extend(&mut self, other: Self) {
        self.records.extend(other.records);
    }

    /// Consume the collector, returning the findings.
    #[must_use]
    pub fn into_vec(self) -> Vec<Diagnostic> {
        self.records
    }
}

impl<'a> IntoIterator for &'a Diagnostics {
    type Item = &'a Diagnostic;
    type IntoIter = std::slice::Iter<'a, Diagnostic>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::{DiagnosticKind, Diagnostics, Severity};

    #[test]
    fn findings_carry_the_current_entry() {
        let mut diagnostics = Diagnostics::new();
        diagnostics.info(DiagnosticKind::MetadataDefaulted, "before");
        diagnostics.enter_entry(3);
        diagnostics.warn(DiagnosticKind::TypeMismatch, "inside");
        diagnostics.leave_entry();

        let records = diagnostics.into_vec();
        assert_eq!(records.len(), 2);
        assert_eq!(records.first().and_then(|r| r.entry), None);
        assert_eq!(records.get(1).and_then(|r| r.entry), Some(3));
        assert_eq!(records.get(1).map(|r| r.severity), Some(Severity::Warning));
    }

    #[test]
    fn display_mentions_the_record() {
        let mut diagnostics = Diagnostics::new();
        diagnostics.enter_entry(2);
        diagnostics.warn(DiagnosticKind::UnsupportedFieldType, "dropped 'tags'");
        let rendered = diagnostics.iter().map(ToString::to_string).collect::<Vec<_>>();
        assert_eq!(rendered, vec!["[warning] record 2: dropped 'tags'".to_owned()]);
    }
}
