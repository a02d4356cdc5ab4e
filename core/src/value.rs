//! Typed representation of Helm values trees.
//!
//! YAML documents are parsed with [`serde_yaml`] and then converted into
//! [`ValueNode`], a closed sum type that the parameter extractor can match on
//! exhaustively.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// A key/value mapping inside a values tree.
pub type ValueMap = BTreeMap<String, ValueNode>;

/// One node of a values tree.
///
/// # Examples
///
/// ```
/// use helm_artifact_core::ValueNode;
///
/// let yaml: serde_yaml::Value = serde_yaml::from_str("replicas: 3\nenabled: true").unwrap();
/// let node = ValueNode::from(yaml);
/// let map = node.as_mapping().unwrap();
/// assert_eq!(map["replicas"], ValueNode::Int(3));
/// assert_eq!(map["enabled"], ValueNode::Bool(true));
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ValueNode {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    String(String),
    Array(Vec<ValueNode>),
    Mapping(ValueMap),
}

impl ValueNode {
    /// Returns the nested mapping when this node is a mapping.
    pub fn as_mapping(&self) -> Option<&ValueMap> {
        match self {
            Self::Mapping(map) => Some(map),
            _ => None,
        }
    }

    /// Converts a raw YAML mapping into a [`ValueMap`].
    ///
    /// Non-string keys are rendered to their scalar text form, so `1: x`
    /// becomes the key `"1"`.
    pub fn map_from_yaml(mapping: serde_yaml::Mapping) -> ValueMap {
        mapping
            .into_iter()
            .map(|(key, value)| (yaml_key_to_string(&key), ValueNode::from(value)))
            .collect()
    }
}

impl From<serde_yaml::Value> for ValueNode {
    fn from(value: serde_yaml::Value) -> Self {
        match value {
            serde_yaml::Value::Null => Self::Null,
            serde_yaml::Value::Bool(b) => Self::Bool(b),
            serde_yaml::Value::Number(n) => {
                if let Some(i) = n.as_i64() {
                    Self::Int(i)
                } else {
                    // u64 beyond i64::MAX and real floats both land here.
                    Self::Float(n.as_f64().unwrap_or(f64::NAN))
                }
            }
            serde_yaml::Value::String(s) => Self::String(s),
            serde_yaml::Value::Sequence(items) => {
                Self::Array(items.into_iter().map(ValueNode::from).collect())
            }
            serde_yaml::Value::Mapping(mapping) => Self::Mapping(Self::map_from_yaml(mapping)),
            serde_yaml::Value::Tagged(tagged) => ValueNode::from(tagged.value),
        }
    }
}

/// Renders a YAML mapping key as a string path segment.
pub fn yaml_key_to_string(key: &serde_yaml::Value) -> String {
    match key {
        serde_yaml::Value::String(s) => s.clone(),
        serde_yaml::Value::Bool(b) => b.to_string(),
        serde_yaml::Value::Number(n) => n.to_string(),
        serde_yaml::Value::Null => "null".to_string(),
        serde_yaml::Value::Tagged(tagged) => yaml_key_to_string(&tagged.value),
        other => serde_yaml::to_string(other)
            .map(|s| s.trim_end().to_string())
            .unwrap_or_default(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(yaml: &str) -> ValueNode {
        ValueNode::from(serde_yaml::from_str::<serde_yaml::Value>(yaml).unwrap())
    }

    #[test]
    fn test_scalars_convert_to_matching_variants() {
        let node = parse("a: true\nb: 7\nc: 1.5\nd: text\ne: ~");
        let map = node.as_mapping().unwrap();
        assert_eq!(map["a"], ValueNode::Bool(true));
        assert_eq!(map["b"], ValueNode::Int(7));
        assert_eq!(map["c"], ValueNode::Float(1.5));
        assert_eq!(map["d"], ValueNode::String("text".into()));
        assert_eq!(map["e"], ValueNode::Null);
    }

    #[test]
    fn test_non_string_keys_are_stringified() {
        let node = parse("1: one\ntrue: yes-value");
        let map = node.as_mapping().unwrap();
        assert!(map.contains_key("1"));
        assert!(map.contains_key("true"));
    }

    #[test]
    fn test_tagged_values_are_unwrapped() {
        let node = parse("port: !custom 8080");
        assert_eq!(node.as_mapping().unwrap()["port"], ValueNode::Int(8080));
    }

    #[test]
    fn test_huge_unsigned_becomes_float() {
        let node = parse("big: 18446744073709551615");
        assert!(matches!(
            node.as_mapping().unwrap()["big"],
            ValueNode::Float(_)
        ));
    }

    #[test]
    fn test_nested_sequences_and_mappings() {
        let node = parse("list:\n  - 1\n  - 2\nnested:\n  inner: {}\n");
        let map = node.as_mapping().unwrap();
        assert_eq!(
            map["list"],
            ValueNode::Array(vec![ValueNode::Int(1), ValueNode::Int(2)])
        );
        assert_eq!(
            map["nested"].as_mapping().unwrap()["inner"],
            ValueNode::Mapping(ValueMap::new())
        );
    }
}
