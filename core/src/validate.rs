//! Structural validation of generated schema and template documents.
//!
//! Catches documents that the downstream configuration engine would reject:
//! placeholders pointing at undeclared or optional parameters, malformed
//! placeholder text, and schema rules without an edit level or role.
//!
//! # Examples
//!
//! ```
//! use helm_artifact_core::*;
//!
//! let mut schema = SchemaDocument::new("web", "1.0.0");
//! schema.rules.configs.insert("db.host".into(), SchemaRule {
//!     param_type: ParamType::String,
//!     required: true,
//!     editable_at: vec!["deployment".into()],
//!     editable_by: vec!["operator".into()],
//! });
//! assert!(validate_schema(&schema).is_empty());
//!
//! let mut template = TemplateDocument::new("web", "1.0.0");
//! insert_config_path(&mut template.configs, "db.host", placeholder("db.host")).unwrap();
//! assert!(validate_template(&template, &schema).is_empty());
//!
//! insert_config_path(&mut template.configs, "db.port", placeholder("db.port")).unwrap();
//! assert_eq!(
//!     validate_template(&template, &schema),
//!     vec![ValidationError::UndeclaredParameter("db.port".into())]
//! );
//! ```

use thiserror::Error;

use crate::{SchemaDocument, TemplateDocument, config_leaves, parse_placeholder};

/// Schema/template validation errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// Schema or template name is empty or whitespace-only.
    #[error("artifact name cannot be empty")]
    EmptyName,
    /// Schema or template version is empty or whitespace-only.
    #[error("artifact version cannot be empty")]
    EmptyVersion,
    /// A parameter name has an empty segment (e.g. `db..host`).
    #[error("invalid parameter name: {0}")]
    InvalidParameterName(String),
    /// A schema rule lists no edit level.
    #[error("parameter {0} has no editableAt level")]
    MissingEditableAt(String),
    /// A schema rule lists no editing role.
    #[error("parameter {0} has no editableBy role")]
    MissingEditableBy(String),
    /// Template refers to a different schema name.
    #[error("template schema name '{template}' does not match schema '{schema}'")]
    NameMismatch { template: String, schema: String },
    /// Template refers to a different schema version.
    #[error("template schema version '{template}' does not match schema '{schema}'")]
    VersionMismatch { template: String, schema: String },
    /// A config leaf is not a `${{$val(...)}}` expression.
    #[error("config {path} is not a placeholder: {value}")]
    NotAPlaceholder { path: String, value: String },
    /// A placeholder references a parameter other than its own location.
    #[error("config {path} references parameter {referenced}")]
    PlaceholderMismatch { path: String, referenced: String },
    /// A config leaf has no schema rule.
    #[error("config {0} is not declared in the schema")]
    UndeclaredParameter(String),
    /// A config leaf maps to an optional schema rule.
    #[error("config {0} is not required by the schema")]
    NotRequired(String),
}

/// Validates a schema document.
///
/// Checks for empty name/version, empty parameter name segments, and rules
/// without an edit level or editing role.
pub fn validate_schema(schema: &SchemaDocument) -> Vec<ValidationError> {
    let mut errors = Vec::new();

    if schema.name.trim().is_empty() {
        errors.push(ValidationError::EmptyName);
    }
    if schema.version.trim().is_empty() {
        errors.push(ValidationError::EmptyVersion);
    }

    for (name, rule) in &schema.rules.configs {
        if name.split('.').any(|segment| segment.is_empty()) {
            errors.push(ValidationError::InvalidParameterName(name.clone()));
        }
        if rule.editable_at.iter().all(|level| level.trim().is_empty()) {
            errors.push(ValidationError::MissingEditableAt(name.clone()));
        }
        if rule.editable_by.iter().all(|role| role.trim().is_empty()) {
            errors.push(ValidationError::MissingEditableBy(name.clone()));
        }
    }

    errors
}

/// Validates a template against the schema it was generated from.
///
/// Every config leaf must be a placeholder naming its own dotted location,
/// and that parameter must be declared in the schema with `required: true`.
pub fn validate_template(
    template: &TemplateDocument,
    schema: &SchemaDocument,
) -> Vec<ValidationError> {
    let mut errors = Vec::new();

    if template.schema.name != schema.name {
        errors.push(ValidationError::NameMismatch {
            template: template.schema.name.clone(),
            schema: schema.name.clone(),
        });
    }
    if template.schema.version != schema.version {
        errors.push(ValidationError::VersionMismatch {
            template: template.schema.version.clone(),
            schema: schema.version.clone(),
        });
    }

    for (path, value) in config_leaves(&template.configs) {
        let Some(referenced) = parse_placeholder(value) else {
            errors.push(ValidationError::NotAPlaceholder {
                path,
                value: value.to_string(),
            });
            continue;
        };
        if referenced != path {
            errors.push(ValidationError::PlaceholderMismatch {
                path,
                referenced: referenced.to_string(),
            });
            continue;
        }
        match schema.rule(&path) {
            None => errors.push(ValidationError::UndeclaredParameter(path)),
            Some(rule) if !rule.required => errors.push(ValidationError::NotRequired(path)),
            Some(_) => {}
        }
    }

    errors
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{ParamType, SchemaRule, insert_config_path, placeholder};

    fn rule(required: bool) -> SchemaRule {
        SchemaRule {
            param_type: ParamType::String,
            required,
            editable_at: vec!["deployment".into()],
            editable_by: vec!["operator".into()],
        }
    }

    fn schema() -> SchemaDocument {
        let mut schema = SchemaDocument::new("web", "1.0.0");
        schema.rules.configs.insert("db.host".into(), rule(true));
        schema.rules.configs.insert("db.port".into(), rule(false));
        schema
    }

    #[test]
    fn test_schema_with_empty_name_and_version() {
        let errors = validate_schema(&SchemaDocument::new(" ", ""));
        assert!(errors.contains(&ValidationError::EmptyName));
        assert!(errors.contains(&ValidationError::EmptyVersion));
    }

    #[test]
    fn test_schema_rule_without_roles() {
        let mut schema = SchemaDocument::new("web", "1.0.0");
        let mut bad = rule(true);
        bad.editable_at.clear();
        bad.editable_by = vec![String::new()];
        schema.rules.configs.insert("a..b".into(), bad);

        let errors = validate_schema(&schema);
        assert!(errors.contains(&ValidationError::InvalidParameterName("a..b".into())));
        assert!(errors.contains(&ValidationError::MissingEditableAt("a..b".into())));
        assert!(errors.contains(&ValidationError::MissingEditableBy("a..b".into())));
    }

    #[test]
    fn test_template_optional_parameter_is_rejected() {
        let mut template = TemplateDocument::new("web", "1.0.0");
        insert_config_path(&mut template.configs, "db.port", placeholder("db.port")).unwrap();
        assert_eq!(
            validate_template(&template, &schema()),
            vec![ValidationError::NotRequired("db.port".into())]
        );
    }

    #[test]
    fn test_template_literal_and_mismatched_placeholders() {
        let mut template = TemplateDocument::new("web", "1.0.0");
        insert_config_path(&mut template.configs, "db.host", "localhost".into()).unwrap();
        insert_config_path(&mut template.configs, "other", placeholder("db.host")).unwrap();

        let errors = validate_template(&template, &schema());
        assert!(errors.iter().any(|e| matches!(
            e,
            ValidationError::NotAPlaceholder { path, .. } if path == "db.host"
        )));
        assert!(errors.iter().any(|e| matches!(
            e,
            ValidationError::PlaceholderMismatch { path, .. } if path == "other"
        )));
    }

    #[test]
    fn test_template_schema_reference_mismatch() {
        let template = TemplateDocument::new("api", "2.0.0");
        let errors = validate_template(&template, &schema());
        assert_eq!(errors.len(), 2);
        assert!(matches!(errors[0], ValidationError::NameMismatch { .. }));
        assert!(matches!(errors[1], ValidationError::VersionMismatch { .. }));
    }
}
