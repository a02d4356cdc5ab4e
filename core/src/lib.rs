//! Core data model for Helm chart artifact generation.
//!
//! This crate defines the types passed between the chart parser and the
//! schema/template generators:
//!
//! - [`ValueNode`]: typed tree of a parsed `values.yaml`.
//! - [`ParamType`]: inferred parameter type (`boolean`, `int`, `float`,
//!   `string`, `array[T]`).
//! - [`ChartParameter`] / [`ChartData`]: chart metadata plus every leaf
//!   parameter keyed by its dotted path.
//! - [`SchemaDocument`]: which parameters are configurable, by whom and at
//!   what stage.
//! - [`TemplateDocument`]: required parameters expressed as
//!   `${{$val(<param>)}}` placeholders in a nested config tree.
//!
//! Validation ([`validate_schema`], [`validate_template`]) checks the
//! documents against each other before they're handed downstream.
//!
//! # Example
//!
//! ```
//! use helm_artifact_core::*;
//!
//! let mut template = TemplateDocument::new("web", "1.0.0");
//! insert_config_path(&mut template.configs, "db.host", placeholder("db.host")).unwrap();
//! assert_eq!(template.config("db.host"), Some("${{$val(db.host)}}"));
//! ```

mod schema;
mod template;
mod types;
mod validate;
mod value;

pub use schema::{SchemaDocument, SchemaRule, SchemaRules};
pub use template::{
    ConfigPathConflict, ConfigTree, DependencyScaffold, PLACEHOLDER_PREFIX, PLACEHOLDER_SUFFIX,
    TemplateDocument, TemplateSchemaRef, config_leaves, insert_config_path, parse_placeholder,
    placeholder,
};
pub use types::{ChartData, ChartParameter, ParamType, ParseParamTypeError};
pub use validate::{ValidationError, validate_schema, validate_template};
pub use value::{ValueMap, ValueNode, yaml_key_to_string};
