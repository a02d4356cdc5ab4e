//! Schema generation.
//!
//! Consults the [`ParameterAnalyzer`] once per chart, then turns every
//! configurable parameter into a [`SchemaRule`]. Parameters the analyzer
//! left out or marked non-configurable are dropped without error, but a
//! schema left with no configurable parameter at all is rejected.

use std::collections::BTreeMap;
use std::sync::Arc;

use helm_artifact_core::{ChartData, SchemaDocument, SchemaRule};
use serde::Serialize;
use tracing::{Instrument, Span, debug, error, info};

use crate::analyzer::{AnalysisResults, AnalysisStats, ParameterAnalyzer};
use crate::error::{AnalyzerError, Result};
use crate::yaml::to_yaml_checked;

/// What happened to one chart parameter during the last generation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case", tag = "outcome")]
pub enum SchemaDebugInfo {
    /// Emitted into `rules.configs`.
    Included { required: bool },
    /// Analyzed, but not configurable.
    NotConfigurable,
    /// Absent from the analysis results.
    NotAnalyzed,
}

/// Generates schema documents for parsed charts.
///
/// Holds per-run scratch state ([`debug_info`](Self::debug_info),
/// [`stats`](Self::stats)) that is reset at the start of every generation.
///
/// # Examples
///
/// ```
/// use std::collections::BTreeMap;
/// use std::sync::Arc;
/// use helm_artifact_core::{ChartData, ChartParameter, ParamType};
/// use helm_artifact_generator::{AnalysisDefaults, ExposeAllAnalyzer, SchemaGenerator};
///
/// # tokio::runtime::Builder::new_current_thread().build().unwrap().block_on(async {
/// let mut params = BTreeMap::new();
/// params.insert("replicas".to_string(), ChartParameter::new(&["replicas"], ParamType::Int, None));
/// let chart = ChartData::new("web", "1.0.0", None, params, Vec::new());
///
/// let analyzer = ExposeAllAnalyzer::new(AnalysisDefaults::default());
/// let mut generator = SchemaGenerator::new(Arc::new(analyzer));
/// let yaml = generator.generate(&chart, "web-artifact", "1.0.0").await.unwrap();
/// assert!(yaml.contains("replicas"));
/// # });
/// ```
pub struct SchemaGenerator {
    analyzer: Arc<dyn ParameterAnalyzer>,
    debug_info: BTreeMap<String, SchemaDebugInfo>,
    stats: Option<AnalysisStats>,
    span: Span,
}

impl SchemaGenerator {
    pub fn new(analyzer: Arc<dyn ParameterAnalyzer>) -> Self {
        Self {
            analyzer,
            debug_info: BTreeMap::new(),
            stats: None,
            span: tracing::info_span!("schema_generator"),
        }
    }

    /// Replaces the span that log events are recorded under.
    pub fn with_span(mut self, span: Span) -> Self {
        self.span = span;
        self
    }

    /// Per-parameter outcome of the most recent generation.
    pub fn debug_info(&self) -> &BTreeMap<String, SchemaDebugInfo> {
        &self.debug_info
    }

    /// Analysis summary of the most recent generation.
    pub fn stats(&self) -> Option<&AnalysisStats> {
        self.stats.as_ref()
    }

    /// Parameters that were left out of the most recent schema.
    pub fn excluded_parameters(&self) -> Vec<String> {
        self.debug_info
            .iter()
            .filter(|(_, info)| !matches!(info, SchemaDebugInfo::Included { .. }))
            .map(|(name, _)| name.clone())
            .collect()
    }

    /// Generates the schema and returns it as YAML.
    ///
    /// # Errors
    ///
    /// Fails when the analyzer fails, returns no results or marks nothing
    /// configurable, or when the emitted YAML does not round-trip.
    pub async fn generate(
        &mut self,
        chart: &ChartData,
        name: &str,
        version: &str,
    ) -> Result<String> {
        let document = self.generate_document(chart, name, version).await?;
        let _enter = self.span.enter();
        to_yaml_checked(&document, "schema")
    }

    /// Generates the schema document without serializing it.
    ///
    /// The analyzer is called exactly once, covering every parameter.
    pub async fn generate_document(
        &mut self,
        chart: &ChartData,
        name: &str,
        version: &str,
    ) -> Result<SchemaDocument> {
        self.debug_info.clear();
        self.stats = None;

        let results = self.analyze(chart).instrument(self.span.clone()).await?;

        let span = self.span.clone();
        let _enter = span.enter();
        let stats = self.analyzer.analysis_stats(&results);
        info!(
            total = stats.total,
            configurable = stats.configurable,
            required = stats.required,
            "Parameter analysis complete"
        );
        self.stats = Some(stats);

        let document = self.build_document(chart, &results, name, version);
        if document.rules.configs.is_empty() {
            error!(chart = chart.name(), "No configurable parameters in schema");
            return Err(AnalyzerError::NothingConfigurable(chart.name().to_string()).into());
        }
        Ok(document)
    }

    async fn analyze(&self, chart: &ChartData) -> Result<AnalysisResults> {
        debug!(
            chart = chart.name(),
            parameters = chart.parameters().len(),
            "Requesting parameter analysis"
        );
        let results = self
            .analyzer
            .analyze_parameters(chart)
            .await
            .inspect_err(|err| {
                error!(chart = chart.name(), error = %err, "Parameter analysis failed");
            })?;

        if results.is_empty() {
            error!(chart = chart.name(), "Parameter analysis returned no results");
            return Err(AnalyzerError::EmptyResults(chart.name().to_string()).into());
        }
        Ok(results)
    }

    /// Maps analysis results onto a schema document.
    ///
    /// Records the outcome of each chart parameter in
    /// [`debug_info`](Self::debug_info).
    pub fn build_document(
        &mut self,
        chart: &ChartData,
        results: &AnalysisResults,
        name: &str,
        version: &str,
    ) -> SchemaDocument {
        let mut document = SchemaDocument::new(name, version);

        for (param_name, param) in chart.parameters() {
            let outcome = match results.get(param_name) {
                None => SchemaDebugInfo::NotAnalyzed,
                Some(analysis) if !analysis.configurable => SchemaDebugInfo::NotConfigurable,
                Some(analysis) => {
                    document.rules.configs.insert(
                        param_name.clone(),
                        SchemaRule {
                            param_type: param.param_type.clone(),
                            required: analysis.required,
                            editable_at: vec![analysis.edit_level.clone()],
                            editable_by: vec![analysis.managed_by.clone()],
                        },
                    );
                    SchemaDebugInfo::Included {
                        required: analysis.required,
                    }
                }
            };
            debug!(parameter = %param_name, outcome = ?outcome, "Schema rule decision");
            self.debug_info.insert(param_name.clone(), outcome);
        }

        for unknown in results.keys().filter(|n| chart.parameter(n).is_none()) {
            debug!(parameter = %unknown, "Ignoring analysis for parameter not in chart");
        }

        document
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use async_trait::async_trait;
    use helm_artifact_core::{ChartParameter, ParamType};

    use crate::analyzer::ParameterAnalysis;
    use crate::error::GenerateError;

    struct FixedAnalyzer {
        results: AnalysisResults,
        calls: AtomicUsize,
    }

    #[async_trait]
    impl ParameterAnalyzer for FixedAnalyzer {
        async fn analyze_parameters(
            &self,
            _chart: &ChartData,
        ) -> std::result::Result<AnalysisResults, AnalyzerError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(self.results.clone())
        }
    }

    struct FailingAnalyzer;

    #[async_trait]
    impl ParameterAnalyzer for FailingAnalyzer {
        async fn analyze_parameters(
            &self,
            _chart: &ChartData,
        ) -> std::result::Result<AnalysisResults, AnalyzerError> {
            Err(AnalyzerError::Unavailable("quota exceeded".into()))
        }
    }

    fn analysis(configurable: bool, required: bool) -> ParameterAnalysis {
        ParameterAnalysis {
            configurable,
            required,
            edit_level: "deployment".into(),
            managed_by: "operator".into(),
        }
    }

    fn chart() -> ChartData {
        let params = [
            ("db.host", ParamType::String),
            ("db.port", ParamType::Int),
            ("debug", ParamType::Boolean),
            ("tags", ParamType::Array(Box::new(ParamType::String))),
        ]
        .into_iter()
        .map(|(name, ty)| {
            let segments: Vec<&str> = name.split('.').collect();
            (name.to_string(), ChartParameter::new(&segments, ty, None))
        })
        .collect();
        ChartData::new("web", "1.0.0", None, params, Vec::new())
    }

    fn fixed(results: &[(&str, ParameterAnalysis)]) -> Arc<FixedAnalyzer> {
        Arc::new(FixedAnalyzer {
            results: results
                .iter()
                .map(|(n, a)| (n.to_string(), a.clone()))
                .collect(),
            calls: AtomicUsize::new(0),
        })
    }

    #[tokio::test]
    async fn test_only_configurable_parameters_are_emitted() {
        let analyzer = fixed(&[
            ("db.host", analysis(true, true)),
            ("db.port", analysis(true, false)),
            ("debug", analysis(false, true)),
        ]);
        let mut generator = SchemaGenerator::new(analyzer.clone());
        let doc = generator
            .generate_document(&chart(), "web-artifact", "2.0.0")
            .await
            .unwrap();

        assert_eq!(doc.name, "web-artifact");
        assert_eq!(doc.version, "2.0.0");
        assert_eq!(doc.rules.configs.len(), 2);
        let host = doc.rule("db.host").unwrap();
        assert!(host.required);
        assert_eq!(host.param_type, ParamType::String);
        assert_eq!(host.editable_at, vec!["deployment"]);
        assert_eq!(host.editable_by, vec!["operator"]);
        assert!(!doc.rule("db.port").unwrap().required);
        assert!(doc.rule("debug").is_none());
        assert!(doc.rule("tags").is_none());

        assert_eq!(analyzer.calls.load(Ordering::SeqCst), 1);
        assert_eq!(generator.debug_info()["debug"], SchemaDebugInfo::NotConfigurable);
        assert_eq!(generator.debug_info()["tags"], SchemaDebugInfo::NotAnalyzed);
        assert_eq!(generator.excluded_parameters(), vec!["debug", "tags"]);
        assert_eq!(generator.stats().unwrap().configurable, 2);
    }

    #[tokio::test]
    async fn test_empty_results_are_fatal() {
        let mut generator = SchemaGenerator::new(fixed(&[]));
        let err = generator
            .generate(&chart(), "web", "1.0.0")
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            GenerateError::Analyzer(AnalyzerError::EmptyResults(_))
        ));
    }

    #[tokio::test]
    async fn test_nothing_configurable_is_fatal() {
        let mut generator = SchemaGenerator::new(fixed(&[
            ("db.host", analysis(false, true)),
            ("unrelated", analysis(true, true)),
        ]));
        let err = generator
            .generate(&chart(), "web", "1.0.0")
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            GenerateError::Analyzer(AnalyzerError::NothingConfigurable(ref chart)) if chart == "web"
        ));
        assert_eq!(generator.debug_info()["db.host"], SchemaDebugInfo::NotConfigurable);
        assert_eq!(generator.excluded_parameters().len(), 4);
    }

    #[tokio::test]
    async fn test_analyzer_failure_propagates() {
        let mut generator = SchemaGenerator::new(Arc::new(FailingAnalyzer));
        let err = generator
            .generate(&chart(), "web", "1.0.0")
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            GenerateError::Analyzer(AnalyzerError::Unavailable(_))
        ));
        assert!(generator.debug_info().is_empty());
    }

    #[tokio::test]
    async fn test_generated_yaml_roundtrips() {
        let mut generator = SchemaGenerator::new(fixed(&[
            ("db.host", analysis(true, true)),
            ("tags", analysis(true, false)),
        ]));
        let chart = chart();
        let yaml = generator.generate(&chart, "web", "1.0.0").await.unwrap();

        let parsed: serde_yaml::Value = serde_yaml::from_str(&yaml).unwrap();
        assert_eq!(parsed["rules"]["configs"]["tags"]["type"], "array[string]");
        assert_eq!(parsed["rules"]["configs"]["db.host"]["editableAt"][0], "deployment");

        let mut results = AnalysisResults::new();
        results.insert("db.host".into(), analysis(true, true));
        results.insert("tags".into(), analysis(true, false));
        let expected = generator.build_document(&chart, &results, "web", "1.0.0");
        assert_eq!(SchemaDocument::from_yaml(&yaml).unwrap(), expected);
    }

    #[tokio::test]
    async fn test_debug_info_is_reset_between_charts() {
        let mut generator = SchemaGenerator::new(fixed(&[("db.host", analysis(true, true))]));
        generator.generate(&chart(), "web", "1.0.0").await.unwrap();
        assert_eq!(generator.debug_info().len(), 4);

        let mut params = BTreeMap::new();
        params.insert(
            "db.host".to_string(),
            ChartParameter::new(&["db", "host"], ParamType::String, None),
        );
        let other = ChartData::new("other", "0.1.0", None, params, Vec::new());
        generator.generate(&other, "other", "0.1.0").await.unwrap();
        assert_eq!(generator.debug_info().len(), 1);
    }
}
