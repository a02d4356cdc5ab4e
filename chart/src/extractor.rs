//! Parameter extraction from a values tree.
//!
//! Walks nested mappings and produces one [`ChartParameter`] per leaf, keyed
//! by the `.`-joined path of its ancestor keys. Scalars, `null` and sequences
//! are leaves; mappings are descended into, so an empty mapping contributes
//! nothing.

use std::collections::BTreeMap;

use helm_artifact_core::{ChartParameter, ParamType, ValueMap, ValueNode};
use tracing::debug;

/// Infers the parameter type of a leaf value.
///
/// Sequences take their element type from the first element and default to
/// `array[string]` when empty. Anything that is not a boolean or number is
/// reported as `string`.
///
/// # Examples
///
/// ```
/// use helm_artifact_core::{ParamType, ValueNode};
/// use helm_artifact_chart::infer_type;
///
/// assert_eq!(infer_type(&ValueNode::Bool(true)), ParamType::Boolean);
/// assert_eq!(infer_type(&ValueNode::Array(vec![])).to_string(), "array[string]");
/// ```
pub fn infer_type(value: &ValueNode) -> ParamType {
    match value {
        ValueNode::Bool(_) => ParamType::Boolean,
        ValueNode::Int(_) => ParamType::Int,
        ValueNode::Float(_) => ParamType::Float,
        ValueNode::Array(items) => {
            let element = items.first().map_or(ParamType::String, infer_type);
            ParamType::Array(Box::new(element))
        }
        ValueNode::Null | ValueNode::String(_) | ValueNode::Mapping(_) => ParamType::String,
    }
}

/// Extracts every leaf of `values` as a [`ChartParameter`].
///
/// # Examples
///
/// ```
/// use helm_artifact_core::ValueNode;
/// use helm_artifact_chart::extract_parameters;
///
/// let raw = "db:\n  host: localhost\n  port: 5432\n";
/// let yaml: serde_yaml::Mapping = serde_yaml::from_str(raw).unwrap();
/// let params = extract_parameters(&ValueNode::map_from_yaml(yaml));
/// assert_eq!(params.len(), 2);
/// assert_eq!(params["db.port"].param_type.to_string(), "int");
/// ```
pub fn extract_parameters(values: &ValueMap) -> BTreeMap<String, ChartParameter> {
    let mut params = BTreeMap::new();
    let mut path = Vec::new();
    walk(values, &mut path, &mut params);
    params
}

fn walk<'a>(
    values: &'a ValueMap,
    path: &mut Vec<&'a str>,
    params: &mut BTreeMap<String, ChartParameter>,
) {
    for (key, value) in values {
        path.push(key.as_str());
        match value {
            ValueNode::Mapping(children) => walk(children, path, params),
            leaf => {
                let default_value = match leaf {
                    ValueNode::Null => None,
                    other => Some(other.clone()),
                };
                let param = ChartParameter::new(path, infer_type(leaf), default_value);
                debug!(
                    parameter = %param.name,
                    param_type = %param.param_type,
                    "Extracted parameter"
                );
                if let Some(previous) = params.insert(param.name.clone(), param) {
                    debug!(parameter = %previous.name, "Dotted key shadows an earlier parameter");
                }
            }
        }
        path.pop();
    }
}
