//! Chart data model shared by the parser and the generators.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::ValueNode;

/// Inferred type of a chart parameter.
///
/// Rendered as `boolean`, `int`, `float`, `string` or `array[<T>]`.
///
/// # Examples
///
/// ```
/// use helm_artifact_core::ParamType;
///
/// let ty = ParamType::Array(Box::new(ParamType::Int));
/// assert_eq!(ty.to_string(), "array[int]");
/// assert_eq!("array[int]".parse::<ParamType>().unwrap(), ty);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ParamType {
    Boolean,
    Int,
    Float,
    String,
    Array(Box<ParamType>),
}

impl fmt::Display for ParamType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Boolean => write!(f, "boolean"),
            Self::Int => write!(f, "int"),
            Self::Float => write!(f, "float"),
            Self::String => write!(f, "string"),
            Self::Array(inner) => write!(f, "array[{inner}]"),
        }
    }
}

/// Error returned when a type string is not a known [`ParamType`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown parameter type: {0}")]
pub struct ParseParamTypeError(pub String);

impl FromStr for ParamType {
    type Err = ParseParamTypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        match s {
            "boolean" => Ok(Self::Boolean),
            "int" => Ok(Self::Int),
            "float" => Ok(Self::Float),
            "string" => Ok(Self::String),
            _ => s
                .strip_prefix("array[")
                .and_then(|rest| rest.strip_suffix(']'))
                .ok_or_else(|| ParseParamTypeError(s.to_string()))
                .and_then(|inner| inner.parse().map(|t| Self::Array(Box::new(t))))
                .map_err(|_| ParseParamTypeError(s.to_string())),
        }
    }
}

impl Serialize for ParamType {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for ParamType {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

/// One configurable leaf of a chart's `values.yaml`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartParameter {
    /// Dotted path of the leaf (e.g. `database.host`).
    pub name: String,
    #[serde(rename = "type")]
    pub param_type: ParamType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_value: Option<ValueNode>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default)]
    pub required: bool,
    /// Individual key segments, present only for nested leaves.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nested_path: Option<Vec<String>>,
}

impl ChartParameter {
    /// Creates a parameter from its path segments.
    ///
    /// # Examples
    ///
    /// ```
    /// use helm_artifact_core::{ChartParameter, ParamType};
    ///
    /// let param = ChartParameter::new(&["db", "host"], ParamType::String, None);
    /// assert_eq!(param.name, "db.host");
    /// assert_eq!(param.nested_path.as_deref(), Some(&["db".to_string(), "host".to_string()][..]));
    ///
    /// let top = ChartParameter::new(&["replicas"], ParamType::Int, None);
    /// assert!(top.nested_path.is_none());
    /// ```
    pub fn new(segments: &[&str], param_type: ParamType, default_value: Option<ValueNode>) -> Self {
        let nested_path = if segments.len() > 1 {
            Some(segments.iter().map(|s| s.to_string()).collect())
        } else {
            None
        };
        Self {
            name: segments.join("."),
            param_type,
            default_value,
            description: None,
            required: false,
            nested_path,
        }
    }
}

/// Parsed chart metadata and parameters.
///
/// Built once by the chart parser and read-only afterwards; all fields are
/// exposed through accessors.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartData {
    name: String,
    version: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    description: Option<String>,
    parameters: BTreeMap<String, ChartParameter>,
    dependencies: Vec<serde_yaml::Mapping>,
}

impl ChartData {
    pub fn new(
        name: impl Into<String>,
        version: impl Into<String>,
        description: Option<String>,
        parameters: BTreeMap<String, ChartParameter>,
        dependencies: Vec<serde_yaml::Mapping>,
    ) -> Self {
        Self {
            name: name.into(),
            version: version.into(),
            description,
            parameters,
            dependencies,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn version(&self) -> &str {
        &self.version
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    /// Parameters keyed by dotted path.
    pub fn parameters(&self) -> &BTreeMap<String, ChartParameter> {
        &self.parameters
    }

    pub fn parameter(&self, name: &str) -> Option<&ChartParameter> {
        self.parameters.get(name)
    }

    /// Dependency declarations from `Chart.yaml`, in declaration order.
    pub fn dependencies(&self) -> &[serde_yaml::Mapping] {
        &self.dependencies
    }

    pub fn has_dependencies(&self) -> bool {
        !self.dependencies.is_empty()
    }

    /// Names of declared dependencies that carry a string `name` key.
    pub fn dependency_names(&self) -> Vec<&str> {
        self.dependencies
            .iter()
            .filter_map(|dep| dep.get("name").and_then(|n| n.as_str()))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_param_type_display() {
        assert_eq!(ParamType::Boolean.to_string(), "boolean");
        assert_eq!(ParamType::Float.to_string(), "float");
        assert_eq!(
            ParamType::Array(Box::new(ParamType::Array(Box::new(ParamType::Int)))).to_string(),
            "array[array[int]]"
        );
    }

    #[test]
    fn test_param_type_rejects_unknown() {
        assert!("number".parse::<ParamType>().is_err());
        assert!("array[int".parse::<ParamType>().is_err());
        assert!("array[]".parse::<ParamType>().is_err());
    }

    #[test]
    fn test_param_type_serializes_as_plain_string() {
        let yaml = serde_yaml::to_string(&ParamType::Array(Box::new(ParamType::String))).unwrap();
        assert_eq!(yaml.trim(), "array[string]");
        let back: ParamType = serde_yaml::from_str("boolean").unwrap();
        assert_eq!(back, ParamType::Boolean);
    }

    #[test]
    fn test_dependency_names_skip_unnamed_entries() {
        let deps: Vec<serde_yaml::Mapping> =
            serde_yaml::from_str("- name: redis\n  version: 1.0.0\n- repository: x\n").unwrap();
        let chart = ChartData::new("app", "1.0.0", None, BTreeMap::new(), deps);
        assert!(chart.has_dependencies());
        assert_eq!(chart.dependency_names(), vec!["redis"]);
    }
}
