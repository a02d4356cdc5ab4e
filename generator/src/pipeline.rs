//! End-to-end generation for one chart.

use std::sync::Arc;

use helm_artifact_chart::ChartParser;
use helm_artifact_core::{SchemaDocument, TemplateDocument};
use tracing::{Instrument, info};

use crate::analyzer::ParameterAnalyzer;
use crate::config::GeneratorConfig;
use crate::error::Result;
use crate::report::{GenerationReport, file_checksum, now_rfc3339};
use crate::schema::SchemaGenerator;
use crate::template::TemplateGenerator;
use crate::yaml::to_yaml_checked;

/// Everything produced by [`run_pipeline`].
///
/// Nothing is written to disk; callers decide where the artifacts go.
#[derive(Debug, Clone)]
pub struct ArtifactBundle {
    pub schema: SchemaDocument,
    pub schema_yaml: String,
    pub template: TemplateDocument,
    pub template_yaml: String,
    pub report: GenerationReport,
}

/// Parses the chart, generates its schema, then a template from that schema.
///
/// The stages run one after another. The only await is the single analyzer
/// call made by schema generation.
///
/// # Errors
///
/// Propagates the first failure of any stage.
pub async fn run_pipeline(
    parser: &ChartParser,
    analyzer: Arc<dyn ParameterAnalyzer>,
    config: &GeneratorConfig,
    name: &str,
    version: &str,
) -> Result<ArtifactBundle> {
    let span = tracing::info_span!("pipeline", artifact = name, version);

    let chart = parser.parse()?;
    let missing_dependencies = parser.missing_local_dependencies(&chart);

    let mut schema_generator = SchemaGenerator::new(analyzer)
        .with_span(tracing::info_span!(parent: &span, "schema_generator"));
    let schema = schema_generator
        .generate_document(&chart, name, version)
        .instrument(span.clone())
        .await?;

    let _enter = span.enter();
    let schema_yaml = to_yaml_checked(&schema, "schema")?;

    let template_generator = TemplateGenerator::from_config(&config.dependencies)
        .with_span(tracing::info_span!(parent: &span, "template_generator"));
    let template = template_generator.build_document(&chart, name, version, Some(&schema))?;
    let template_yaml = to_yaml_checked(&template, "template")?;

    let report = GenerationReport {
        artifact_name: name.to_string(),
        artifact_version: version.to_string(),
        chart_name: chart.name().to_string(),
        chart_version: chart.version().to_string(),
        generated_at: now_rfc3339(),
        parameter_count: chart.parameters().len(),
        schema_config_count: schema.rules.configs.len(),
        template_config_count: template.leaf_count(),
        excluded_parameters: schema_generator.excluded_parameters(),
        missing_dependencies,
        values_checksum: file_checksum(parser.values_file())?,
        analysis: schema_generator.stats().cloned(),
    };

    info!(
        chart = chart.name(),
        parameters = report.parameter_count,
        schema_configs = report.schema_config_count,
        template_configs = report.template_config_count,
        "Pipeline complete"
    );

    Ok(ArtifactBundle {
        schema,
        schema_yaml,
        template,
        template_yaml,
        report,
    })
}
