//! Chart directory parsing.
//!
//! Combines `Chart.yaml` metadata with the parameters extracted from
//! `values.yaml` into a single [`ChartData`].

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use helm_artifact_core::{ChartData, ValueNode};
use regex::Regex;
use serde_yaml::{Mapping, Value};
use tracing::{Span, debug, error, info, warn};

use crate::error::{ChartError, Result};
use crate::extractor::extract_parameters;
use crate::reader::YamlReader;

pub const CHART_FILE: &str = "Chart.yaml";
pub const VALUES_FILE: &str = "values.yaml";
/// Read when a chart ships no `values.yaml`.
pub const VALUES_FILE_ALT: &str = "values.yml";
pub const DEPENDENCY_CHARTS_DIR: &str = "charts";

/// `<name>-<semver>.tgz`, as written by `helm dependency update`.
static CHART_ARCHIVE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?P<name>.+?)-\d+\.\d+\.\d+(?:[-+][0-9A-Za-z.+-]*)?\.tgz$")
        .expect("static regex must compile")
});

/// Parser for one chart directory.
///
/// # Examples
///
/// ```no_run
/// use helm_artifact_chart::ChartParser;
///
/// let chart = ChartParser::new("charts/web").parse().unwrap();
/// println!("{} {} has {} parameters", chart.name(), chart.version(), chart.parameters().len());
/// ```
#[derive(Debug, Clone)]
pub struct ChartParser {
    chart_dir: PathBuf,
    reader: YamlReader,
    span: Span,
}

impl ChartParser {
    pub fn new(chart_dir: impl Into<PathBuf>) -> Self {
        let chart_dir = chart_dir.into();
        let span = tracing::info_span!("chart_parser", chart = %chart_dir.display());
        Self {
            reader: YamlReader::new().with_span(span.clone()),
            chart_dir,
            span,
        }
    }

    /// Replaces the span that log events are recorded under.
    pub fn with_span(mut self, span: Span) -> Self {
        self.reader = self.reader.with_span(span.clone());
        self.span = span;
        self
    }

    pub fn chart_dir(&self) -> &Path {
        &self.chart_dir
    }

    pub fn chart_file(&self) -> PathBuf {
        self.chart_dir.join(CHART_FILE)
    }

    /// `values.yaml`, or `values.yml` when only that one exists.
    pub fn values_file(&self) -> PathBuf {
        let primary = self.chart_dir.join(VALUES_FILE);
        if !primary.exists() {
            let alternate = self.chart_dir.join(VALUES_FILE_ALT);
            if alternate.is_file() {
                return alternate;
            }
        }
        primary
    }

    /// Parses the chart.
    ///
    /// # Errors
    ///
    /// Returns [`ChartError::MissingChartMetadata`] if `Chart.yaml` is absent
    /// or empty, [`ChartError::MissingChartField`] if it has no `name` or
    /// `version`, and propagates read/parse errors for either file. A missing
    /// `values.yaml` yields a chart with no parameters.
    pub fn parse(&self) -> Result<ChartData> {
        let chart_file = self.chart_file();
        let metadata = self.reader.read(&chart_file)?;

        let _enter = self.span.enter();
        if metadata.is_empty() {
            error!("Chart metadata is missing or empty");
            return Err(ChartError::MissingChartMetadata {
                path: self.chart_dir.clone(),
            });
        }

        let name = scalar_field(&metadata, "name").ok_or_else(|| {
            error!("Chart.yaml has no name");
            ChartError::MissingChartField {
                path: chart_file.clone(),
                field: "name",
            }
        })?;
        let version = scalar_field(&metadata, "version").ok_or_else(|| {
            error!("Chart.yaml has no version");
            ChartError::MissingChartField {
                path: chart_file.clone(),
                field: "version",
            }
        })?;
        let description = scalar_field(&metadata, "description");
        let dependencies = dependency_list(&metadata, &chart_file)?;

        let values = self.reader.read(&self.values_file())?;
        let parameters = extract_parameters(&ValueNode::map_from_yaml(values));

        info!(
            name = %name,
            version = %version,
            parameters = parameters.len(),
            dependencies = dependencies.len(),
            "Parsed chart"
        );

        Ok(ChartData::new(
            name,
            version,
            description,
            parameters,
            dependencies,
        ))
    }

    /// Names of declared dependencies with no local copy under `charts/`.
    ///
    /// A dependency is present when some `charts/*/Chart.yaml` declares its
    /// name, or when a `charts/<name>-<semver>.tgz` archive exists.
    pub fn missing_local_dependencies(&self, chart: &ChartData) -> Vec<String> {
        let vendored = self.vendored_chart_names();
        let _enter = self.span.enter();

        let mut missing = Vec::new();
        for name in chart.dependency_names() {
            if !vendored.contains(name) {
                warn!(dependency = name, "Dependency chart not found under charts/");
                missing.push(name.to_string());
            }
        }
        missing
    }

    /// Chart names vendored under `charts/`, unpacked or archived.
    fn vendored_chart_names(&self) -> BTreeSet<String> {
        let mut names = BTreeSet::new();
        let Ok(entries) = std::fs::read_dir(self.chart_dir.join(DEPENDENCY_CHARTS_DIR)) else {
            return names;
        };

        for path in entries.filter_map(|entry| entry.ok()).map(|entry| entry.path()) {
            if path.is_dir() {
                let metadata_file = path.join(CHART_FILE);
                if !metadata_file.is_file() {
                    debug!(path = %path.display(), "Skipping charts/ entry without Chart.yaml");
                    continue;
                }
                let name = self
                    .reader
                    .read(&metadata_file)
                    .inspect_err(|err| {
                        debug!(
                            path = %metadata_file.display(),
                            error = %err,
                            "Unreadable vendored chart"
                        );
                    })
                    .ok()
                    .and_then(|metadata| scalar_field(&metadata, "name"));
                match name {
                    Some(name) => {
                        names.insert(name);
                    }
                    None => debug!(path = %metadata_file.display(), "Vendored chart has no name"),
                }
            } else if let Some(name) = path
                .file_name()
                .and_then(|file| file.to_str())
                .and_then(archive_chart_name)
            {
                names.insert(name.to_string());
            }
        }
        names
    }
}

/// Chart name encoded in a `<name>-<semver>.tgz` file name.
fn archive_chart_name(file_name: &str) -> Option<&str> {
    CHART_ARCHIVE_RE
        .captures(file_name)
        .and_then(|caps| caps.name("name"))
        .map(|m| m.as_str())
}

/// Reads a scalar field as non-blank text; numbers and booleans are rendered.
fn scalar_field(metadata: &Mapping, field: &str) -> Option<String> {
    let text = match metadata.get(field)? {
        Value::String(s) => s.trim().to_string(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        _ => return None,
    };
    (!text.is_empty()).then_some(text)
}

fn dependency_list(metadata: &Mapping, chart_file: &Path) -> Result<Vec<Mapping>> {
    let invalid = || {
        error!("Chart.yaml dependencies are not a list of mappings");
        ChartError::InvalidDependencies {
            path: chart_file.to_path_buf(),
        }
    };

    match metadata.get("dependencies") {
        None | Some(Value::Null) => Ok(Vec::new()),
        Some(Value::Sequence(items)) => items
            .iter()
            .map(|item| item.as_mapping().cloned().ok_or_else(invalid))
            .collect(),
        Some(_) => Err(invalid()),
    }
}
