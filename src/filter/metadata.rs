//! The `.github/custom.json` metadata document.

use std::fmt;
use std::fs;
use std::path::Path;

use serde_json::{Map, Value};

use crate::error::{ReportError, Result};

/// Location of the metadata document inside a working copy.
pub const METADATA_PATH: &str = ".github/custom.json";

pub const DEFAULT_REQUIRED_EXPORT: bool = true;
pub const DEFAULT_REQUIRED_STATUS: &str = "changes required";

/// Parsed metadata document. Only the top-level object is kept.
#[derive(Debug, Clone, PartialEq)]
pub struct RepoMetadata {
    fields: Map<String, Value>,
}

impl RepoMetadata {
    /// Read the metadata document under `root`.
    ///
    /// Returns `Ok(None)` when the file does not exist.
    pub fn load(root: &Path) -> Result<Option<Self>> {
        let path = root.join(METADATA_PATH);
        if !path.is_file() {
            return Ok(None);
        }
        let text = fs::read_to_string(&path)?;
        let value: Value = serde_json::from_str(&text).map_err(|e| ReportError::Metadata {
            path: path.clone(),
            message: e.to_string(),
        })?;
        match value {
            Value::Object(fields) => Ok(Some(Self { fields })),
            other => Err(ReportError::Metadata {
                path,
                message: format!("expected a JSON object, found {}", json_kind(&other)),
            }),
        }
    }

    /// The `export` flag, when it is a JSON boolean.
    pub fn export(&self) -> Option<bool> {
        self.fields.get("export").and_then(Value::as_bool)
    }

    /// The `status` string, when it is a JSON string.
    pub fn status(&self) -> Option<&str> {
        self.fields.get("status").and_then(Value::as_str)
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.fields.get(key)
    }
}

impl From<Map<String, Value>> for RepoMetadata {
    fn from(fields: Map<String, Value>) -> Self {
        Self { fields }
    }
}

/// The two values a metadata document must carry to be kept.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MetadataCriteria {
    pub export: bool,
    /// Compared ignoring case.
    pub status: String,
}

impl Default for MetadataCriteria {
    fn default() -> Self {
        Self {
            export: DEFAULT_REQUIRED_EXPORT,
            status: DEFAULT_REQUIRED_STATUS.into(),
        }
    }
}

/// Why a metadata document failed the criteria.
#[derive(Debug, Clone, PartialEq)]
pub enum Mismatch {
    Export { found: Option<Value> },
    Status { found: Option<Value> },
}

impl fmt::Display for Mismatch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (field, found) = match self {
            Mismatch::Export { found } => ("export", found),
            Mismatch::Status { found } => ("status", found),
        };
        match found {
            Some(value) => write!(f, "{} is {}", field, value),
            None => write!(f, "{} is missing", field),
        }
    }
}

impl MetadataCriteria {
    pub fn new(export: bool, status: impl Into<String>) -> Self {
        Self {
            export,
            status: status.into(),
        }
    }

    /// Check both predicates, export first.
    pub fn check(&self, metadata: &RepoMetadata) -> std::result::Result<(), Mismatch> {
        if metadata.export() != Some(self.export) {
            return Err(Mismatch::Export {
                found: metadata.get("export").cloned(),
            });
        }
        let status_ok = metadata
            .status()
            .is_some_and(|s| s.to_lowercase() == self.status.to_lowercase());
        if !status_ok {
            return Err(Mismatch::Status {
                found: metadata.get("status").cloned(),
            });
        }
        Ok(())
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
