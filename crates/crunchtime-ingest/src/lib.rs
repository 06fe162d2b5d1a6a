//! # crunchtime-ingest
//!
//! Loading of goals, projects, milestones and tasks from JSON or TOML.
//!
//! This crate provides:
//! - Loosely typed raw records ([`raw`])
//! - Normalization into a consistent [`Workspace`] with repair warnings ([`normalize`])
//! - Format detection and file loading
//!
//! ## Example
//!
//! ```rust
//! use crunchtime_ingest::{parse_str, FileFormat};
//!
//! let input = r#"{
//!     "projects": [{"id": "site", "name": "Website", "deadline": "2024-06-30", "deadlineType": "hard"}],
//!     "milestones": [{"id": "design", "project": "site"}],
//!     "tasks": [{"id": "mockup", "milestone": "design", "duration": 6}]
//! }"#;
//!
//! let ingested = parse_str(input, FileFormat::Json).unwrap();
//! assert_eq!(ingested.workspace.schedulable_tasks().len(), 1);
//! assert!(ingested.warnings.is_empty());
//! ```

pub mod normalize;
pub mod raw;

pub use normalize::{normalize, EntityKind, IngestWarning, Ingested};
pub use raw::RawBatch;

use std::path::{Path, PathBuf};

use thiserror::Error;

/// Loading error
#[derive(Debug, Error)]
pub enum IngestError {
    #[error("Cannot read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid TOML: {0}")]
    Toml(#[from] toml::de::Error),
}

/// Supported input formats
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileFormat {
    Json,
    Toml,
}

/// Detect file format from extension; anything but `.toml` is JSON
pub fn detect_format(path: &Path) -> FileFormat {
    match path.extension().and_then(|e| e.to_str()) {
        Some(ext) if ext.eq_ignore_ascii_case("toml") => FileFormat::Toml,
        _ => FileFormat::Json,
    }
}

/// Deserialize raw records without normalizing them
pub fn read_batch(input: &str, format: FileFormat) -> Result<RawBatch, IngestError> {
    let batch = match format {
        FileFormat::Json => serde_json::from_str(input)?,
        FileFormat::Toml => {
            let table: toml::Table = toml::from_str(input)?;
            serde_json::from_value(raw::toml_to_json(toml::Value::Table(table)))?
        }
    };
    Ok(batch)
}

/// Parse and normalize a document
pub fn parse_str(input: &str, format: FileFormat) -> Result<Ingested, IngestError> {
    read_batch(input, format).map(normalize)
}

/// Load and normalize a file, choosing the format by extension
pub fn load_file(path: &Path) -> Result<Ingested, IngestError> {
    let content = std::fs::read_to_string(path).map_err(|source| IngestError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    tracing::debug!(path = %path.display(), "loading input");
    parse_str(&content, detect_format(path))
}
