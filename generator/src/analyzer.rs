//! Parameter analysis seam.
//!
//! Schema generation asks a [`ParameterAnalyzer`] to classify all chart
//! parameters in one batched call. The analyzer decides which parameters are
//! configurable, which of those are required, and at what level and by whom
//! they may be edited.
//!
//! Two implementations ship with the crate:
//!
//! - [`RecordedAnalyzer`] replays a previously captured analysis file.
//! - [`ExposeAllAnalyzer`] marks every parameter configurable with fixed
//!   defaults, for offline runs.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use helm_artifact_core::ChartData;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::AnalysisDefaults;
use crate::error::AnalyzerError;

/// Classification of one parameter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParameterAnalysis {
    pub configurable: bool,
    pub required: bool,
    pub edit_level: String,
    pub managed_by: String,
}

/// Analysis keyed by dotted parameter name.
pub type AnalysisResults = BTreeMap<String, ParameterAnalysis>;

/// Summary counts over one analysis, for logging and reports.
///
/// `required` and the per-level/per-role breakdowns only count configurable
/// parameters, since nothing else reaches the schema.
///
/// # Examples
///
/// ```
/// use helm_artifact_generator::{AnalysisResults, AnalysisStats, ParameterAnalysis};
///
/// let mut results = AnalysisResults::new();
/// results.insert("a".into(), ParameterAnalysis {
///     configurable: true,
///     required: true,
///     edit_level: "deployment".into(),
///     managed_by: "operator".into(),
/// });
/// results.insert("b".into(), ParameterAnalysis {
///     configurable: false,
///     required: true,
///     edit_level: "design".into(),
///     managed_by: "publisher".into(),
/// });
///
/// let stats = AnalysisStats::from_results(&results);
/// assert_eq!((stats.total, stats.configurable, stats.required), (2, 1, 1));
/// assert_eq!(stats.by_edit_level.get("deployment"), Some(&1));
/// assert!(stats.by_edit_level.get("design").is_none());
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalysisStats {
    pub total: usize,
    pub configurable: usize,
    pub required: usize,
    pub by_edit_level: BTreeMap<String, usize>,
    pub by_managed_by: BTreeMap<String, usize>,
}

impl AnalysisStats {
    pub fn from_results(results: &AnalysisResults) -> Self {
        let mut stats = Self {
            total: results.len(),
            ..Self::default()
        };
        for analysis in results.values().filter(|a| a.configurable) {
            stats.configurable += 1;
            if analysis.required {
                stats.required += 1;
            }
            *stats
                .by_edit_level
                .entry(analysis.edit_level.clone())
                .or_default() += 1;
            *stats
                .by_managed_by
                .entry(analysis.managed_by.clone())
                .or_default() += 1;
        }
        stats
    }
}

/// Classifies chart parameters for schema generation.
///
/// Implementations receive the whole chart and must classify every parameter
/// they know about in a single call.
#[async_trait]
pub trait ParameterAnalyzer: Send + Sync {
    /// Classifies the parameters of `chart`.
    async fn analyze_parameters(&self, chart: &ChartData)
    -> Result<AnalysisResults, AnalyzerError>;

    /// Summarizes `results` for logging.
    fn analysis_stats(&self, results: &AnalysisResults) -> AnalysisStats {
        AnalysisStats::from_results(results)
    }
}

/// Replays an analysis captured in a YAML or JSON file.
///
/// The file is a mapping from parameter name to
/// `{configurable, required, edit_level, managed_by}`:
///
/// ```yaml
/// database.host:
///   configurable: true
///   required: true
///   edit_level: deployment
///   managed_by: operator
/// ```
///
/// The file is read on every call, so edits between runs are picked up.
#[derive(Debug, Clone)]
pub struct RecordedAnalyzer {
    path: PathBuf,
}

impl RecordedAnalyzer {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl ParameterAnalyzer for RecordedAnalyzer {
    async fn analyze_parameters(
        &self,
        chart: &ChartData,
    ) -> Result<AnalysisResults, AnalyzerError> {
        let text = tokio::fs::read_to_string(&self.path).await.map_err(|err| {
            AnalyzerError::Unavailable(format!("{}: {err}", self.path.display()))
        })?;

        if text.trim().is_empty() {
            return Ok(AnalysisResults::new());
        }

        let results: AnalysisResults = serde_yaml::from_str(&text).map_err(|err| {
            AnalyzerError::InvalidResults(format!("{}: {err}", self.path.display()))
        })?;

        let unknown = results
            .keys()
            .filter(|name| chart.parameter(name).is_none())
            .count();
        debug!(
            path = %self.path.display(),
            recorded = results.len(),
            unknown,
            "Loaded recorded parameter analysis"
        );
        Ok(results)
    }
}

/// Marks every chart parameter configurable with the configured defaults.
#[derive(Debug, Clone, Default)]
pub struct ExposeAllAnalyzer {
    defaults: AnalysisDefaults,
}

impl ExposeAllAnalyzer {
    pub fn new(defaults: AnalysisDefaults) -> Self {
        Self { defaults }
    }
}

#[async_trait]
impl ParameterAnalyzer for ExposeAllAnalyzer {
    async fn analyze_parameters(
        &self,
        chart: &ChartData,
    ) -> Result<AnalysisResults, AnalyzerError> {
        Ok(chart
            .parameters()
            .keys()
            .map(|name| {
                (
                    name.clone(),
                    ParameterAnalysis {
                        configurable: true,
                        required: self.defaults.required,
                        edit_level: self.defaults.edit_level.clone(),
                        managed_by: self.defaults.managed_by.clone(),
                    },
                )
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use helm_artifact_core::{ChartParameter, ParamType};

    fn chart(names: &[&str]) -> ChartData {
        let params = names
            .iter()
            .map(|name| {
                let segments: Vec<&str> = name.split('.').collect();
                (
                    name.to_string(),
                    ChartParameter::new(&segments, ParamType::String, None),
                )
            })
            .collect();
        ChartData::new("web", "1.0.0", None, params, Vec::new())
    }

    #[tokio::test]
    async fn test_expose_all_uses_defaults() {
        let analyzer = ExposeAllAnalyzer::new(AnalysisDefaults {
            required: false,
            edit_level: "design".into(),
            managed_by: "publisher".into(),
        });
        let results = analyzer
            .analyze_parameters(&chart(&["a", "b.c"]))
            .await
            .unwrap();
        assert_eq!(results.len(), 2);
        let b = &results["b.c"];
        assert!(b.configurable);
        assert!(!b.required);
        assert_eq!(b.edit_level, "design");
        assert_eq!(b.managed_by, "publisher");
    }

    #[tokio::test]
    async fn test_recorded_reads_yaml_and_json() {
        let dir = tempfile::tempdir().unwrap();
        let yaml = dir.path().join("analysis.yaml");
        std::fs::write(
            &yaml,
            concat!(
                "a:\n",
                "  configurable: true\n",
                "  required: false\n",
                "  edit_level: deployment\n",
                "  managed_by: operator\n",
            ),
        )
        .unwrap();
        let json = dir.path().join("analysis.json");
        std::fs::write(
            &json,
            concat!(
                r#"{"a": {"configurable": false, "required": false, "#,
                r#""edit_level": "design", "managed_by": "publisher"}}"#,
            ),
        )
        .unwrap();

        let from_yaml = RecordedAnalyzer::new(&yaml)
            .analyze_parameters(&chart(&["a"]))
            .await
            .unwrap();
        assert!(from_yaml["a"].configurable);

        let from_json = RecordedAnalyzer::new(&json)
            .analyze_parameters(&chart(&["a"]))
            .await
            .unwrap();
        assert!(!from_json["a"].configurable);
    }

    #[tokio::test]
    async fn test_recorded_missing_file_is_unavailable() {
        let dir = tempfile::tempdir().unwrap();
        let err = RecordedAnalyzer::new(dir.path().join("nope.yaml"))
            .analyze_parameters(&chart(&["a"]))
            .await
            .unwrap_err();
        assert!(matches!(err, AnalyzerError::Unavailable(_)));
    }

    #[tokio::test]
    async fn test_recorded_malformed_file_is_invalid() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("analysis.yaml");
        std::fs::write(&path, "a: [1, 2]\n").unwrap();
        let err = RecordedAnalyzer::new(&path)
            .analyze_parameters(&chart(&["a"]))
            .await
            .unwrap_err();
        assert!(matches!(err, AnalyzerError::InvalidResults(_)));
    }

    #[test]
    fn test_stats_break_down_by_role() {
        let mut results = AnalysisResults::new();
        for (name, role) in [("a", "operator"), ("b", "operator"), ("c", "publisher")] {
            results.insert(
                name.into(),
                ParameterAnalysis {
                    configurable: true,
                    required: name != "c",
                    edit_level: "deployment".into(),
                    managed_by: role.into(),
                },
            );
        }
        let stats = AnalysisStats::from_results(&results);
        assert_eq!(stats.required, 2);
        assert_eq!(stats.by_managed_by["operator"], 2);
        assert_eq!(stats.by_managed_by["publisher"], 1);
        assert_eq!(stats.by_edit_level["deployment"], 3);
    }
}
