//! Generated solution template document and placeholder syntax.
//!
//! Every emitted config value is a placeholder of the form
//! `${{$val(<param>)}}`, resolved later by the downstream configuration
//! engine. Dotted parameter names expand into nested mappings:
//!
//! ```yaml
//! schema:
//!   name: my-artifact
//!   version: 1.0.0
//! configs:
//!   db:
//!     host: ${{$val(db.host)}}
//! ```

use std::collections::BTreeMap;
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub const PLACEHOLDER_PREFIX: &str = "${{$val(";
pub const PLACEHOLDER_SUFFIX: &str = ")}}";

static PLACEHOLDER_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\$\{\{\$val\(([^()]+)\)\}\}$").expect("static regex must compile")
});

/// Builds the placeholder expression for a parameter.
///
/// # Examples
///
/// ```
/// use helm_artifact_core::placeholder;
///
/// assert_eq!(placeholder("db.host"), "${{$val(db.host)}}");
/// ```
pub fn placeholder(param: &str) -> String {
    format!("{PLACEHOLDER_PREFIX}{param}{PLACEHOLDER_SUFFIX}")
}

/// Extracts the parameter name from a placeholder expression.
///
/// # Examples
///
/// ```
/// use helm_artifact_core::parse_placeholder;
///
/// assert_eq!(parse_placeholder("${{$val(db.host)}}"), Some("db.host"));
/// assert_eq!(parse_placeholder("db.host"), None);
/// ```
pub fn parse_placeholder(value: &str) -> Option<&str> {
    PLACEHOLDER_RE
        .captures(value)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str())
}

/// Nested config tree of a template.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ConfigTree {
    Leaf(String),
    Branch(BTreeMap<String, ConfigTree>),
}

/// Two dotted paths claim the same location, one as a value and one as a
/// parent mapping.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("config path '{path}' conflicts with existing path '{existing}'")]
pub struct ConfigPathConflict {
    pub path: String,
    pub existing: String,
}

/// Inserts `value` at the dotted `path`, creating intermediate mappings.
///
/// # Examples
///
/// ```
/// use std::collections::BTreeMap;
/// use helm_artifact_core::{ConfigTree, insert_config_path};
///
/// let mut configs = BTreeMap::new();
/// insert_config_path(&mut configs, "db.host", "h".into()).unwrap();
/// insert_config_path(&mut configs, "db.port", "p".into()).unwrap();
/// let ConfigTree::Branch(db) = &configs["db"] else { panic!("expected branch") };
/// assert_eq!(db.len(), 2);
///
/// assert!(insert_config_path(&mut configs, "db", "x".into()).is_err());
/// ```
pub fn insert_config_path(
    configs: &mut BTreeMap<String, ConfigTree>,
    path: &str,
    value: String,
) -> Result<(), ConfigPathConflict> {
    let segments: Vec<&str> = path.split('.').collect();
    let Some((last, parents)) = segments.split_last() else {
        return Ok(());
    };

    let mut level = configs;
    let mut walked = String::new();
    for segment in parents {
        if !walked.is_empty() {
            walked.push('.');
        }
        walked.push_str(segment);

        let node = level
            .entry((*segment).to_string())
            .or_insert_with(|| ConfigTree::Branch(BTreeMap::new()));
        level = match node {
            ConfigTree::Branch(children) => children,
            ConfigTree::Leaf(_) => {
                return Err(ConfigPathConflict {
                    path: path.to_string(),
                    existing: walked,
                });
            }
        };
    }

    if matches!(level.get(*last), Some(ConfigTree::Branch(_))) {
        return Err(ConfigPathConflict {
            path: path.to_string(),
            existing: format!("{path}.*"),
        });
    }
    level.insert((*last).to_string(), ConfigTree::Leaf(value));
    Ok(())
}

/// Collects `(dotted path, value)` for every leaf under `configs`.
pub fn config_leaves(configs: &BTreeMap<String, ConfigTree>) -> Vec<(String, &str)> {
    fn walk<'a>(
        prefix: &str,
        configs: &'a BTreeMap<String, ConfigTree>,
        out: &mut Vec<(String, &'a str)>,
    ) {
        for (key, node) in configs {
            let path = if prefix.is_empty() {
                key.clone()
            } else {
                format!("{prefix}.{key}")
            };
            match node {
                ConfigTree::Leaf(value) => out.push((path, value.as_str())),
                ConfigTree::Branch(children) => walk(&path, children, out),
            }
        }
    }

    let mut out = Vec::new();
    walk("", configs, &mut out);
    out
}

/// Reference from a template back to the schema it instantiates.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TemplateSchemaRef {
    pub name: String,
    pub version: String,
}

/// Static dependency block emitted for charts that declare dependencies.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DependencyScaffold {
    pub solution_template_id: String,
    #[serde(default)]
    pub configs_to_be_injected: Vec<String>,
    pub solution_template_version: String,
}

/// Top-level solution template document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TemplateDocument {
    pub schema: TemplateSchemaRef,
    #[serde(default)]
    pub configs: BTreeMap<String, ConfigTree>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub dependencies: Vec<DependencyScaffold>,
}

impl TemplateDocument {
    pub fn new(name: impl Into<String>, version: impl Into<String>) -> Self {
        Self {
            schema: TemplateSchemaRef {
                name: name.into(),
                version: version.into(),
            },
            configs: BTreeMap::new(),
            dependencies: Vec::new(),
        }
    }

    /// Parses a template document from YAML text.
    pub fn from_yaml(text: &str) -> Result<Self, serde_yaml::Error> {
        serde_yaml::from_str(text)
    }

    /// Looks up a leaf value by dotted path.
    pub fn config(&self, path: &str) -> Option<&str> {
        let mut segments = path.split('.');
        let first = segments.next()?;
        let mut node = self.configs.get(first)?;
        for segment in segments {
            node = match node {
                ConfigTree::Branch(children) => children.get(segment)?,
                ConfigTree::Leaf(_) => return None,
            };
        }
        match node {
            ConfigTree::Leaf(value) => Some(value),
            ConfigTree::Branch(_) => None,
        }
    }

    pub fn leaf_count(&self) -> usize {
        config_leaves(&self.configs).len()
    }
}
