//! Schema and solution template generation for parsed Helm charts.
//!
//! Given a [`ChartData`](helm_artifact_core::ChartData), this crate produces
//! two documents:
//!
//! - a **schema** ([`SchemaGenerator`]) listing which parameters an operator
//!   may configure, decided by a [`ParameterAnalyzer`] in one batched call;
//! - a **solution template** ([`TemplateGenerator`]) holding a
//!   `${{$val(<param>)}}` placeholder for every required schema parameter.
//!
//! Both are emitted as YAML and checked to parse back to the same document.
//! [`run_pipeline`] chains chart parsing, schema and template generation and
//! returns the results with a [`GenerationReport`].
//!
//! # Example
//!
//! ```no_run
//! use helm_artifact_chart::ChartParser;
//! use helm_artifact_generator::{GeneratorConfig, RecordedAnalyzer, run_pipeline};
//! use std::sync::Arc;
//!
//! # async fn example() -> helm_artifact_generator::Result<()> {
//! let parser = ChartParser::new("./my-chart");
//! let analyzer = Arc::new(RecordedAnalyzer::new("analysis.yaml"));
//! let config = GeneratorConfig::default();
//! let bundle = run_pipeline(&parser, analyzer, &config, "my-app", "1.0.0").await?;
//! println!("{}", bundle.schema_yaml);
//! # Ok(())
//! # }
//! ```

mod analyzer;
mod config;
mod error;
mod pipeline;
mod report;
mod schema;
mod template;
mod yaml;

pub use analyzer::{
    AnalysisResults, AnalysisStats, ExposeAllAnalyzer, ParameterAnalysis, ParameterAnalyzer,
    RecordedAnalyzer,
};
pub use config::{
    AnalysisDefaults, AnalyzerConfig, AnalyzerMode, CONFIG_VERSION, DependencyConfig,
    GeneratorConfig, OutputConfig,
};
pub use error::{AnalyzerError, GenerateError, Result};
pub use pipeline::{ArtifactBundle, run_pipeline};
pub use report::{GenerationReport, file_checksum};
pub use schema::{SchemaDebugInfo, SchemaGenerator};
pub use template::TemplateGenerator;
