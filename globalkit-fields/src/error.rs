//! Error types for the globals registry

use std::path::PathBuf;
use thiserror::Error;

use crate::wellformed::SchemaIssue;

/// Result type for globals operations
pub type Result<T> = std::result::Result<T, GlobalsError>;

/// Errors that can occur in globals registry operations
#[derive(Debug, Error)]
pub enum GlobalsError {
    /// Global not found by slug
    #[error("global not found: {slug}")]
    GlobalNotFound { slug: String },

    /// Declaration failed its well-formedness checks
    #[error("global '{slug}' is malformed: {}", format_issues(.issues))]
    Malformed {
        slug: String,
        issues: Vec<SchemaIssue>,
    },

    /// Globals directory not found
    #[error("globals directory not found: {path}")]
    NotInitialized { path: PathBuf },

    /// Configuration could not be loaded
    #[error("configuration error: {0}")]
    Config(#[from] Box<figment::Error>),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// YAML serialization error
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml_ng::Error),

    /// JSON serialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl From<figment::Error> for GlobalsError {
    fn from(error: figment::Error) -> Self {
        GlobalsError::Config(Box::new(error))
    }
}

fn format_issues(issues: &[SchemaIssue]) -> String {
    issues
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}
