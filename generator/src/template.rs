//! Solution template generation.

use helm_artifact_core::{
    ChartData, DependencyScaffold, SchemaDocument, TemplateDocument, insert_config_path,
    placeholder,
};
use tracing::{Span, debug, info, warn};

use crate::config::DependencyConfig;
use crate::error::Result;
use crate::yaml::to_yaml_checked;

/// Generates solution templates.
///
/// Every required parameter of the schema becomes a
/// `${{$val(<param>)}}` placeholder nested by its dotted path. Without a
/// schema, every chart parameter is treated as required.
///
/// # Examples
///
/// ```
/// use std::collections::BTreeMap;
/// use helm_artifact_core::{ChartData, ChartParameter, ParamType};
/// use helm_artifact_generator::TemplateGenerator;
///
/// let mut params = BTreeMap::new();
/// let host = ChartParameter::new(&["db", "host"], ParamType::String, None);
/// params.insert("db.host".to_string(), host);
/// let chart = ChartData::new("web", "1.0.0", None, params, Vec::new());
///
/// let doc = TemplateGenerator::new().build_document(&chart, "web", "1.0.0", None).unwrap();
/// assert_eq!(doc.config("db.host"), Some("${{$val(db.host)}}"));
/// ```
#[derive(Debug, Clone)]
pub struct TemplateGenerator {
    scaffold: DependencyScaffold,
    span: Span,
}

impl Default for TemplateGenerator {
    fn default() -> Self {
        Self::from_config(&DependencyConfig::default())
    }
}

impl TemplateGenerator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Uses the dependency scaffold values from `config`.
    pub fn from_config(config: &DependencyConfig) -> Self {
        Self {
            scaffold: config.scaffold(),
            span: tracing::info_span!("template_generator"),
        }
    }

    pub fn with_span(mut self, span: Span) -> Self {
        self.span = span;
        self
    }

    /// Generates the template and returns it as YAML.
    ///
    /// # Errors
    ///
    /// Fails on conflicting parameter paths, or when the emitted YAML does
    /// not round-trip.
    pub fn generate(
        &self,
        chart: &ChartData,
        name: &str,
        version: &str,
        schema: Option<&SchemaDocument>,
    ) -> Result<String> {
        let document = self.build_document(chart, name, version, schema)?;
        let _enter = self.span.enter();
        to_yaml_checked(&document, "template")
    }

    /// Builds the template document without serializing it.
    pub fn build_document(
        &self,
        chart: &ChartData,
        name: &str,
        version: &str,
        schema: Option<&SchemaDocument>,
    ) -> Result<TemplateDocument> {
        let _enter = self.span.enter();
        let mut document = TemplateDocument::new(name, version);

        let required: Vec<&str> = match schema {
            Some(schema) => schema.required_parameters().collect(),
            None => {
                debug!(chart = chart.name(), "No schema given, templating every chart parameter");
                chart.parameters().keys().map(String::as_str).collect()
            }
        };

        for param in &required {
            if chart.parameter(param).is_none() {
                debug!(parameter = %param, "Templating parameter not present in chart values");
            }
            insert_config_path(&mut document.configs, param, placeholder(param))?;
        }

        if required.is_empty() {
            warn!(chart = chart.name(), "Template has no configs");
        }

        if chart.has_dependencies() {
            debug!(
                dependencies = ?chart.dependency_names(),
                "Adding dependency scaffold"
            );
            document.dependencies.push(self.scaffold.clone());
        }

        info!(
            configs = required.len(),
            dependencies = document.dependencies.len(),
            "Template built"
        );
        Ok(document)
    }
}
