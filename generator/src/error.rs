//! Error types for analysis and artifact generation.
//!
//! Every failure here is fatal for the chart being generated: there is no
//! partial schema and no retry.

use helm_artifact_chart::ChartError;
use helm_artifact_core::ConfigPathConflict;
use thiserror::Error;

/// Failures reported by a [`ParameterAnalyzer`](crate::ParameterAnalyzer).
#[derive(Debug, Error)]
pub enum AnalyzerError {
    /// The analyzer could not be reached or its source could not be read.
    #[error("parameter analyzer unavailable: {0}")]
    Unavailable(String),

    /// The analyzer answered with something that is not an analysis mapping.
    #[error("invalid analysis results: {0}")]
    InvalidResults(String),

    /// The analyzer succeeded but classified no parameters.
    #[error("parameter analysis returned no results for chart '{0}'")]
    EmptyResults(String),

    /// The analyzer answered, but marked no chart parameter configurable.
    #[error("parameter analysis marked no parameter of chart '{0}' configurable")]
    NothingConfigurable(String),
}

/// Errors that can occur while generating schema and template documents.
#[derive(Debug, Error)]
pub enum GenerateError {
    /// Reading or parsing the chart failed.
    #[error(transparent)]
    Chart(#[from] ChartError),

    /// The parameter analyzer failed or left nothing to configure.
    #[error("parameter analysis failed: {0}")]
    Analyzer(#[from] AnalyzerError),

    /// Emitted YAML did not parse back to the document it was built from.
    #[error("{document} serialization failed round-trip validation: {detail}")]
    SerializationCorruption {
        document: &'static str,
        detail: String,
    },

    /// YAML serialization failure.
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// JSON serialization failure.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Two template parameters claim the same config location.
    #[error(transparent)]
    PathConflict(#[from] ConfigPathConflict),

    /// Generator configuration is incomplete or inconsistent.
    #[error("invalid configuration: {0}")]
    Config(String),

    /// File I/O failure.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Convenience alias for results with [`GenerateError`].
pub type Result<T> = std::result::Result<T, GenerateError>;
