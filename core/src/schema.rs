//! Generated schema document.
//!
//! The wire shape is:
//!
//! ```yaml
//! name: my-artifact
//! version: 1.0.0
//! rules:
//!   configs:
//!     db.host:
//!       type: string
//!       required: true
//!       editableAt: [deployment]
//!       editableBy: [operator]
//! ```

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::ParamType;

/// Rule describing who may set one parameter and when.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SchemaRule {
    #[serde(rename = "type")]
    pub param_type: ParamType,
    pub required: bool,
    pub editable_at: Vec<String>,
    pub editable_by: Vec<String>,
}

/// Container for the per-parameter rules.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchemaRules {
    #[serde(default)]
    pub configs: BTreeMap<String, SchemaRule>,
}

/// Top-level schema document.
///
/// # Examples
///
/// ```
/// use helm_artifact_core::{ParamType, SchemaDocument, SchemaRule};
///
/// let mut schema = SchemaDocument::new("web", "1.0.0");
/// schema.rules.configs.insert(
///     "db.host".into(),
///     SchemaRule {
///         param_type: ParamType::String,
///         required: true,
///         editable_at: vec!["deployment".into()],
///         editable_by: vec!["operator".into()],
///     },
/// );
/// assert_eq!(schema.required_parameters().collect::<Vec<_>>(), vec!["db.host"]);
///
/// let yaml = serde_yaml::to_string(&schema).unwrap();
/// assert!(yaml.contains("editableAt"));
/// assert_eq!(SchemaDocument::from_yaml(&yaml).unwrap(), schema);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchemaDocument {
    pub name: String,
    pub version: String,
    #[serde(default)]
    pub rules: SchemaRules,
}

impl SchemaDocument {
    pub fn new(name: impl Into<String>, version: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            version: version.into(),
            rules: SchemaRules::default(),
        }
    }

    /// Parses a schema document from YAML text.
    pub fn from_yaml(text: &str) -> Result<Self, serde_yaml::Error> {
        serde_yaml::from_str(text)
    }

    pub fn rule(&self, name: &str) -> Option<&SchemaRule> {
        self.rules.configs.get(name)
    }

    /// Names of parameters whose rule has `required: true`, in key order.
    pub fn required_parameters(&self) -> impl Iterator<Item = &str> {
        self.rules
            .configs
            .iter()
            .filter(|(_, rule)| rule.required)
            .map(|(name, _)| name.as_str())
    }
}
