//! Database metadata required to create a store.
//!
//! Datasets used for generation carry a `metadata` object naming the database
//! type, localised descriptions, IP version, languages and record size. Only
//! the first two are mandatory.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value, json};

use crate::diagnostics::{DiagnosticKind, Diagnostics};
use crate::error::{EngineError, EngineResult};

/// Address family a store is built for.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum IpVersion {
    /// IPv4 only.
    V4,
    /// IPv6, which also serves IPv4 lookups.
    #[default]
    V6,
}

impl TryFrom<u8> for IpVersion {
    type Error = String;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            4 => Ok(Self::V4),
            6 => Ok(Self::V6),
            other => Err(format!("unsupported IP version {other} (supported: 4, 6)")),
        }
    }
}

impl From<IpVersion> for u8 {
    fn from(value: IpVersion) -> Self {
        match value {
            IpVersion::V4 => 4,
            IpVersion::V6 => 6,
        }
    }
}

impl fmt::Display for IpVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", u8::from(*self))
    }
}

/// Size in bits of each node pointer in the persisted tree.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum RecordSize {
    /// 24-bit records.
    Bits24,
    /// 28-bit records.
    #[default]
    Bits28,
    /// 32-bit records.
    Bits32,
}

impl TryFrom<u8> for RecordSize {
    type Error = String;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            24 => Ok(Self::Bits24),
            28 => Ok(Self::Bits28),
            32 => Ok(Self::Bits32),
            other => Err(format!(
                "unsupported record size {other} (supported: 24, 28, 32)"
            )),
        }
    }
}

impl From<RecordSize> for u8 {
    fn from(value: RecordSize) -> Self {
        match value {
            RecordSize::Bits24 => 24,
            RecordSize::Bits28 => 28,
            RecordSize::Bits32 => 32,
        }
    }
}

/// Validated database metadata.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct DatabaseMetadata {
    /// Free-form database type, e.g. `GeoIP2-City`.
    pub database_type: String,
    /// Language code → description.
    pub description: BTreeMap<String, String>,
    /// Address family.
    pub ip_version: IpVersion,
    /// Languages the records are localised in.
    pub languages: Vec<String>,
    /// Node pointer width.
    pub record_size: RecordSize,
}

impl DatabaseMetadata {
    /// Metadata with the given type and an English description, defaults elsewhere.
    #[must_use]
    pub fn new(database_type: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            database_type: database_type.into(),
            description: [("en".to_owned(), description.into())].into(),
            ip_version: IpVersion::default(),
            languages: vec!["en".to_owned()],
            record_size: RecordSize::default(),
        }
    }

    /// Validate a dataset `metadata` object.
    ///
    /// `DatabaseType` and `Description` are required. `IPVersion` defaults to
    /// 6, `RecordSize` to 28 and `Languages` to `["en"]`; each default is
    /// reported as a diagnostic. `BuildEpoch` is ignored.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::Validation`] when a required field is missing or
    /// any field has the wrong type or an unsupported value.
    pub fn from_json(raw: &Value, diagnostics: &mut Diagnostics) -> EngineResult<Self> {
        let Value::Object(map) = raw else {
            return Err(EngineError::validation("metadata must be an object"));
        };

        if map.contains_key("BuildEpoch") {
            diagnostics.info(
                DiagnosticKind::MetadataIgnored,
                "BuildEpoch in metadata will be ignored",
            );
        }

        let database_type = match map.get("DatabaseType") {
            Some(Value::String(text)) => text.clone(),
            Some(_) => return Err(invalid("DatabaseType", "must be a string")),
            None => return Err(missing("DatabaseType")),
        };
        let description = parse_description(map)?;
        let ip_version = parse_ip_version(map, diagnostics)?;
        let languages = parse_languages(map, diagnostics)?;
        let record_size = parse_record_size(map, diagnostics)?;

        Ok(Self {
            database_type,
            description,
            ip_version,
            languages,
            record_size,
        })
    }

    /// Render in the dataset `metadata` layout accepted by [`Self::from_json`].
    #[must_use]
    pub fn to_dataset_json(&self) -> Value {
        json!({
            "DatabaseType": self.database_type,
            "Description": self.description,
            "IPVersion": u8::from(self.ip_version),
            "Languages": self.languages,
            "RecordSize": u8::from(self.record_size),
        })
    }
}

fn missing(field: &str) -> EngineError {
    EngineError::validation(format!("{field} is a required field in metadata"))
}

fn invalid(field: &str, message: &str) -> EngineError {
    EngineError::validation(format!("invalid value for {field} in metadata: {message}"))
}

fn parse_description(map: &Map<String, Value>) -> EngineResult<BTreeMap<String, String>> {
    let Some(raw) = map.get("Description") else {
        return Err(missing("Description"));
    };
    let Value::Object(entries) = raw else {
        return Err(invalid("Description", "must be an object of language → text"));
    };
    entries
        .iter()
        .map(|(language, raw_text)| match raw_text {
            Value::String(text) => Ok((language.clone(), text.clone())),
            _ => Err(invalid(
                "Description",
                &format!("entry '{language}' must be a string"),
            )),
        })
        .collect()
}

fn small_integer(map: &Map<String, Value>, field: &str) -> EngineResult<Option<u8>> {
    match map.get(field) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::Number(number)) => number
            .as_u64()
            .and_then(|value| u8::try_from(value).ok())
            .map(Some)
            .ok_or_else(|| invalid(field, "must be a small positive integer")),
        Some(_) => Err(invalid(field, "must be a number")),
    }
}

fn parse_ip_version(
    map: &Map<String, Value>,
    diagnostics: &mut Diagnostics,
) -> EngineResult<IpVersion> {
    match small_integer(map, "IPVersion")? {
        Some(value) => IpVersion::try_from(value).map_err(|message| invalid("IPVersion", &message)),
        None => {
            diagnostics.info(
                DiagnosticKind::MetadataDefaulted,
                "IPVersion is not provided in metadata, defaulting to 6 (an IPv6 database supports both IPv4 and IPv6 lookups)",
            );
            Ok(IpVersion::V6)
        }
    }
}

fn parse_record_size(
    map: &Map<String, Value>,
    diagnostics: &mut Diagnostics,
) -> EngineResult<RecordSize> {
    match small_integer(map, "RecordSize")? {
        Some(value) => {
            RecordSize::try_from(value).map_err(|message| invalid("RecordSize", &message))
        }
        None => {
            diagnostics.info(
                DiagnosticKind::MetadataDefaulted,
                "RecordSize is not provided in metadata, defaulting to 28",
            );
            Ok(RecordSize::Bits28)
        }
    }
}

fn parse_languages(
    map: &Map<String, Value>,
    diagnostics: &mut Diagnostics,
) -> EngineResult<Vec<String>> {
    match map.get("Languages") {
        None | Some(Value::Null) => {
            diagnostics.info(
                DiagnosticKind::MetadataDefaulted,
                "Languages is not provided in metadata, defaulting to English",
            );
            Ok(vec!["en".to_owned()])
        }
        Some(Value::Array(items)) => items
            .iter()
            .map(|item| match item {
                Value::String(language) => Ok(language.clone()),
                _ => Err(invalid("Languages", "every language must be a string")),
            })
            .collect(),
        Some(_) => Err(invalid("Languages", "must be a list of strings")),
    }
}
