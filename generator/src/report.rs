//! Generation report written next to the artifacts.

use std::path::Path;

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::analyzer::AnalysisStats;
use crate::error::Result;

/// Summary of one pipeline run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenerationReport {
    pub artifact_name: String,
    pub artifact_version: String,
    pub chart_name: String,
    pub chart_version: String,
    /// RFC 3339 timestamp of the run.
    pub generated_at: String,
    /// Leaf parameters found in `values.yaml`.
    pub parameter_count: usize,
    pub schema_config_count: usize,
    pub template_config_count: usize,
    /// Chart parameters absent from the schema.
    #[serde(default)]
    pub excluded_parameters: Vec<String>,
    /// Declared dependencies with no vendored chart under `charts/`.
    #[serde(default)]
    pub missing_dependencies: Vec<String>,
    /// SHA-256 of `values.yaml`; absent when the chart has none.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub values_checksum: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub analysis: Option<AnalysisStats>,
}

impl GenerationReport {
    /// Serializes the report as pretty-printed JSON.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

/// Computes the SHA-256 hex digest of a file, or `None` if it doesn't exist.
///
/// # Errors
///
/// Returns [`GenerateError::Io`](crate::GenerateError::Io) if the file exists
/// but cannot be read.
pub fn file_checksum(path: impl AsRef<Path>) -> Result<Option<String>> {
    let path = path.as_ref();
    if !path.exists() {
        return Ok(None);
    }
    let bytes = std::fs::read(path)?;
    let hash = Sha256::digest(&bytes);
    Ok(Some(format!("{:x}", hash)))
}

pub(crate) fn now_rfc3339() -> String {
    chrono::Utc::now().to_rfc3339()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_checksum_of_known_content() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("values.yaml");
        std::fs::write(&path, "abc").unwrap();
        assert_eq!(
            file_checksum(&path).unwrap().as_deref(),
            Some("ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad")
        );
    }

    #[test]
    fn test_checksum_missing_file_is_none() {
        let dir = tempfile::tempdir().unwrap();
        assert_eq!(file_checksum(dir.path().join("values.yaml")).unwrap(), None);
    }

    #[test]
    fn test_report_json_omits_absent_fields() {
        let report = GenerationReport {
            artifact_name: "web".into(),
            artifact_version: "1.0.0".into(),
            chart_name: "web-app".into(),
            chart_version: "1.4.2".into(),
            generated_at: now_rfc3339(),
            parameter_count: 0,
            schema_config_count: 0,
            template_config_count: 0,
            excluded_parameters: Vec::new(),
            missing_dependencies: Vec::new(),
            values_checksum: None,
            analysis: None,
        };
        let json = report.to_json().unwrap();
        assert!(!json.contains("values_checksum"));
        assert!(!json.contains("analysis"));

        let parsed: GenerationReport = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, report);
    }
}
