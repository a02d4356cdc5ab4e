//! Tolerant YAML file reader.

use std::io;
use std::path::Path;

use serde_yaml::{Mapping, Value};
use tracing::{Span, error, warn};

use crate::error::{ChartError, Result};

/// Reads YAML files into mappings.
///
/// A missing file is not an error: it reads as an empty mapping and emits a
/// warning, since a chart may legitimately ship without `values.yaml`.
#[derive(Debug, Clone)]
pub struct YamlReader {
    span: Span,
}

impl Default for YamlReader {
    fn default() -> Self {
        Self {
            span: tracing::debug_span!("yaml_reader"),
        }
    }
}

impl YamlReader {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces the span that log events are recorded under.
    pub fn with_span(mut self, span: Span) -> Self {
        self.span = span;
        self
    }

    /// Reads `path` as a single YAML mapping.
    ///
    /// # Errors
    ///
    /// Returns [`ChartError::Io`] if the file exists but cannot be read,
    /// [`ChartError::MalformedYaml`] if it does not parse, or
    /// [`ChartError::NotAMapping`] if the document is a scalar or sequence.
    pub fn read(&self, path: &Path) -> Result<Mapping> {
        let _enter = self.span.enter();

        let text = match std::fs::read_to_string(path) {
            Ok(text) => text,
            Err(err) if err.kind() == io::ErrorKind::NotFound => {
                warn!(path = %path.display(), "YAML file not found, treating as empty");
                return Ok(Mapping::new());
            }
            Err(source) => {
                error!(path = %path.display(), error = %source, "Failed to read YAML file");
                return Err(ChartError::Io {
                    path: path.to_path_buf(),
                    source,
                });
            }
        };

        if is_blank_document(&text) {
            return Ok(Mapping::new());
        }

        let value: Value = serde_yaml::from_str(&text).map_err(|source| {
            error!(path = %path.display(), error = %source, "Malformed YAML");
            ChartError::MalformedYaml {
                path: path.to_path_buf(),
                source,
            }
        })?;

        match value {
            Value::Null => Ok(Mapping::new()),
            Value::Mapping(mapping) => Ok(mapping),
            _ => Err(ChartError::NotAMapping {
                path: path.to_path_buf(),
            }),
        }
    }
}

/// Whether `text` has nothing but whitespace, comments and document markers.
fn is_blank_document(text: &str) -> bool {
    text.lines().all(|line| {
        let line = line.trim();
        line.is_empty() || line.starts_with('#') || line == "---" || line == "..."
    })
}
