//! Helm chart reading and parameter extraction.
//!
//! This crate turns a chart directory into a [`ChartData`]:
//!
//! - [`YamlReader`]: loads `Chart.yaml` / `values.yaml`; a missing file
//!   reads as an empty mapping.
//! - [`extract_parameters`]: walks the values tree and infers a
//!   [`ParamType`] per leaf.
//! - [`ChartParser`]: combines metadata and parameters, rejecting charts
//!   without a name or version.
//!
//! # Example
//!
//! ```no_run
//! use helm_artifact_chart::ChartParser;
//!
//! let chart = ChartParser::new("./my-chart").parse()?;
//! for (name, param) in chart.parameters() {
//!     println!("{name}: {}", param.param_type);
//! }
//! # Ok::<(), helm_artifact_chart::ChartError>(())
//! ```
//!
//! [`ChartData`]: helm_artifact_core::ChartData
//! [`ParamType`]: helm_artifact_core::ParamType

mod error;
mod extractor;
mod parser;
mod reader;

pub use error::{ChartError, Result};
pub use extractor::{extract_parameters, infer_type};
pub use parser::{CHART_FILE, ChartParser, DEPENDENCY_CHARTS_DIR, VALUES_FILE, VALUES_FILE_ALT};
pub use reader::YamlReader;
