//! Error types for repository reporting.

use std::path::PathBuf;
use thiserror::Error;

/// The main error type for report operations.
#[derive(Error, Debug)]
pub enum ReportError {
    #[error("Git error: {0}")]
    Git(#[from] git2::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid configuration: {0}")]
    Config(#[from] ConfigError),

    #[error("GitHub API error: {message}")]
    GitHub { message: String },

    #[error("HTTP request error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Clone failed for {repo}: {message}")]
    CloneError { repo: String, message: String },

    #[error("Malformed metadata at {path}: {message}")]
    Metadata { path: PathBuf, message: String },

    #[error("Spreadsheet error: {0}")]
    Xlsx(#[from] rust_xlsxwriter::XlsxError),

    #[error("Sheet cannot be written: {message}")]
    Sheet { message: String },

    #[error("No repositories found for {scope}")]
    NoRepositories { scope: String },
}

/// Configuration problems detected at startup, before any network call.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("missing access token: set one of {}", .vars.join(", "))]
    MissingToken { vars: Vec<String> },

    #[error("missing {what}: pass --{flag} or set one of {}", .vars.join(", "))]
    MissingScope {
        what: &'static str,
        flag: &'static str,
        vars: Vec<String>,
    },

    #[error("invalid value for {field}: {message}")]
    InvalidValue { field: &'static str, message: String },

    #[error(
        "property API '{0}' is a historical response shape and is not supported; use 'values' or 'none'"
    )]
    UnsupportedPropertyApi(String),

    #[error("unknown property API '{0}'; expected 'values' or 'none'")]
    UnknownPropertyApi(String),
}

/// A specialized Result type for report operations.
pub type Result<T> = std::result::Result<T, ReportError>;
