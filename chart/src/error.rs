//! Error types for chart reading and parsing.

use std::path::PathBuf;

use thiserror::Error;

/// Errors that can occur while reading a chart directory.
#[derive(Debug, Error)]
pub enum ChartError {
    /// File exists but could not be read.
    #[error("failed to read {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// File is not valid YAML.
    #[error("malformed YAML in {}: {source}", .path.display())]
    MalformedYaml {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    /// File parsed, but its top-level document is not a mapping.
    #[error("{} does not contain a YAML mapping", .path.display())]
    NotAMapping { path: PathBuf },

    /// `Chart.yaml` is absent or empty.
    #[error("chart metadata not found: {} has no Chart.yaml content", .path.display())]
    MissingChartMetadata { path: PathBuf },

    /// `Chart.yaml` lacks a required field such as `name` or `version`.
    #[error("{} is missing required field '{field}'", .path.display())]
    MissingChartField { path: PathBuf, field: &'static str },

    /// `dependencies` is present but not a list of mappings.
    #[error("{}: dependencies must be a list of mappings", .path.display())]
    InvalidDependencies { path: PathBuf },
}

/// Convenience alias for results with [`ChartError`].
pub type Result<T> = std::result::Result<T, ChartError>;
