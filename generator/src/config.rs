//! Generator configuration.
//!
//! Controls which analyzer classifies parameters, the defaults used by the
//! expose-all analyzer, the static dependency scaffold, and output file
//! names. Every section is optional.
//!
//! # Example YAML
//!
//! ```yaml
//! version: "1.0"
//! analyzer:
//!   mode: recorded
//!   results: analysis.yaml
//! defaults:
//!   required: true
//!   edit_level: deployment
//!   managed_by: operator
//! dependencies:
//!   solution_template_id: /common/1.0.0
//!   solution_template_version: 1.0.0
//! output:
//!   schema_file: schema.yaml
//!   template_file: template.yaml
//!   report_file: generation-report.json
//! ```

use std::io::{BufReader, BufWriter};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use helm_artifact_core::DependencyScaffold;
use serde::{Deserialize, Serialize};

use crate::analyzer::{ExposeAllAnalyzer, ParameterAnalyzer, RecordedAnalyzer};
use crate::error::{GenerateError, Result};

pub const CONFIG_VERSION: &str = "1.0";

/// Which analyzer classifies chart parameters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum AnalyzerMode {
    /// Replay a captured analysis file.
    #[default]
    Recorded,
    /// Mark every parameter configurable using [`AnalysisDefaults`].
    ExposeAll,
}

/// Analyzer selection.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalyzerConfig {
    pub mode: AnalyzerMode,
    /// Analysis file for [`AnalyzerMode::Recorded`].
    #[serde(skip_serializing_if = "Option::is_none")]
    pub results: Option<PathBuf>,
}

/// Classification applied by the expose-all analyzer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisDefaults {
    pub required: bool,
    pub edit_level: String,
    pub managed_by: String,
}

impl Default for AnalysisDefaults {
    fn default() -> Self {
        Self {
            required: true,
            edit_level: "deployment".to_string(),
            managed_by: "operator".to_string(),
        }
    }
}

/// Static values of the template's dependency block.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DependencyConfig {
    pub solution_template_id: String,
    pub solution_template_version: String,
}

impl Default for DependencyConfig {
    fn default() -> Self {
        Self {
            solution_template_id: "/common/1.0.0".to_string(),
            solution_template_version: "1.0.0".to_string(),
        }
    }
}

impl DependencyConfig {
    pub fn scaffold(&self) -> DependencyScaffold {
        DependencyScaffold {
            solution_template_id: self.solution_template_id.clone(),
            configs_to_be_injected: Vec::new(),
            solution_template_version: self.solution_template_version.clone(),
        }
    }
}

/// Output file names, relative to the output directory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    pub schema_file: String,
    pub template_file: String,
    pub report_file: String,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            schema_file: "schema.yaml".to_string(),
            template_file: "template.yaml".to_string(),
            report_file: "generation-report.json".to_string(),
        }
    }
}

/// Top-level generator configuration.
///
/// # Examples
///
/// ```
/// use helm_artifact_generator::{AnalyzerMode, GeneratorConfig};
///
/// let config: GeneratorConfig = serde_yaml::from_str("analyzer:\n  mode: expose-all\n").unwrap();
/// assert_eq!(config.analyzer.mode, AnalyzerMode::ExposeAll);
/// assert_eq!(config.defaults.edit_level, "deployment");
/// assert_eq!(config.output.schema_file, "schema.yaml");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneratorConfig {
    /// Configuration format version.
    pub version: String,
    pub analyzer: AnalyzerConfig,
    pub defaults: AnalysisDefaults,
    pub dependencies: DependencyConfig,
    pub output: OutputConfig,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            version: CONFIG_VERSION.to_string(),
            analyzer: AnalyzerConfig::default(),
            defaults: AnalysisDefaults::default(),
            dependencies: DependencyConfig::default(),
            output: OutputConfig::default(),
        }
    }
}

impl GeneratorConfig {
    /// Loads configuration from a YAML file.
    ///
    /// A relative `analyzer.results` path is resolved against the config
    /// file's directory.
    ///
    /// # Errors
    ///
    /// Returns [`GenerateError::Io`] if the file cannot be read, or
    /// [`GenerateError::Yaml`] if parsing fails.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let file = std::fs::File::open(path)?;
        let reader = BufReader::new(file);
        let mut config: Self = serde_yaml::from_reader(reader)?;

        if let (Some(results), Some(base)) = (&config.analyzer.results, path.parent()) {
            if results.is_relative() {
                config.analyzer.results = Some(base.join(results));
            }
        }
        Ok(config)
    }

    /// Saves the configuration as YAML.
    ///
    /// # Errors
    ///
    /// Returns [`GenerateError::Io`] if the file cannot be written, or
    /// [`GenerateError::Yaml`] if serialization fails.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let file = std::fs::File::create(path)?;
        let writer = BufWriter::new(file);
        serde_yaml::to_writer(writer, self)?;
        Ok(())
    }

    /// Builds the analyzer selected by [`AnalyzerConfig::mode`].
    ///
    /// # Errors
    ///
    /// Returns [`GenerateError::Config`] when recorded mode has no results
    /// file.
    pub fn build_analyzer(&self) -> Result<Arc<dyn ParameterAnalyzer>> {
        match self.analyzer.mode {
            AnalyzerMode::ExposeAll => Ok(Arc::new(ExposeAllAnalyzer::new(self.defaults.clone()))),
            AnalyzerMode::Recorded => {
                let results = self.analyzer.results.as_ref().ok_or_else(|| {
                    GenerateError::Config(
                        "recorded analyzer mode requires analyzer.results".to_string(),
                    )
                })?;
                Ok(Arc::new(RecordedAnalyzer::new(results)))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_yaml() -> &'static str {
        r#"
version: "1.0"
analyzer:
  mode: recorded
  results: analysis.yaml
defaults:
  required: false
  edit_level: design
  managed_by: publisher
dependencies:
  solution_template_id: /shared/2.0.0
  solution_template_version: 2.0.0
output:
  schema_file: s.yaml
  template_file: t.yaml
  report_file: r.json
"#
    }

    #[test]
    fn test_deserialize_complete() {
        let config: GeneratorConfig = serde_yaml::from_str(sample_yaml()).unwrap();
        assert_eq!(config.version, "1.0");
        assert_eq!(config.analyzer.mode, AnalyzerMode::Recorded);
        assert_eq!(config.analyzer.results, Some(PathBuf::from("analysis.yaml")));
        assert!(!config.defaults.required);
        assert_eq!(config.defaults.managed_by, "publisher");
        assert_eq!(config.dependencies.solution_template_id, "/shared/2.0.0");
        assert_eq!(config.output.report_file, "r.json");
    }

    #[test]
    fn test_deserialize_empty_uses_defaults() {
        let config: GeneratorConfig = serde_yaml::from_str("{}").unwrap();
        assert_eq!(config, GeneratorConfig::default());
        assert_eq!(config.dependencies.solution_template_id, "/common/1.0.0");
        assert_eq!(config.dependencies.solution_template_version, "1.0.0");
    }

    #[test]
    fn test_partial_section_keeps_other_defaults() {
        let config: GeneratorConfig =
            serde_yaml::from_str("defaults:\n  managed_by: publisher\n").unwrap();
        assert!(config.defaults.required);
        assert_eq!(config.defaults.edit_level, "deployment");
        assert_eq!(config.defaults.managed_by, "publisher");
    }

    #[test]
    fn test_recorded_without_results_is_config_error() {
        let config = GeneratorConfig::default();
        assert!(matches!(
            config.build_analyzer(),
            Err(GenerateError::Config(_))
        ));

        let mut expose = GeneratorConfig::default();
        expose.analyzer.mode = AnalyzerMode::ExposeAll;
        assert!(expose.build_analyzer().is_ok());
    }

    #[test]
    fn test_load_resolves_results_relative_to_config() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("generator.yaml");
        std::fs::write(&path, sample_yaml()).unwrap();

        let config = GeneratorConfig::load(&path).unwrap();
        assert_eq!(
            config.analyzer.results,
            Some(dir.path().join("analysis.yaml"))
        );
    }

    #[test]
    fn test_load_save_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("generator.yaml");

        let mut original = GeneratorConfig::default();
        original.analyzer.mode = AnalyzerMode::ExposeAll;
        original.defaults.required = false;
        original.save(&path).unwrap();

        let loaded = GeneratorConfig::load(&path).unwrap();
        assert_eq!(loaded, original);
    }
}
