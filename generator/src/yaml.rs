//! Round-trip checked YAML emission.
//!
//! Output is consumed by YAML 1.1 loaders, where plain `on`, `off`, `yes`,
//! `no`, `y` and `n` are booleans. `serde_yaml` follows YAML 1.2 and leaves
//! them unquoted, so such keys and scalars are quoted here before the
//! round-trip check. String `true`, `false` and `null` are already quoted by
//! `serde_yaml`; unquoted they are real booleans and nulls and stay as is.

use std::sync::LazyLock;

use regex::Regex;
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::error;

use crate::error::{GenerateError, Result};

/// Plain scalars YAML 1.1 reads as booleans but YAML 1.2 reads as strings.
const YAML11_BOOL: &str = r"(?i:y|yes|n|no|on|off)";

/// A block mapping key that is a bare YAML 1.1 boolean.
static KEYWORD_KEY_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(r"^(?P<lead> *(?:- )*)(?P<word>{YAML11_BOOL}):(?P<rest> .*)?$"))
        .expect("static regex must compile")
});

/// A mapping value or sequence item that is a bare YAML 1.1 boolean.
static KEYWORD_VALUE_RE: LazyLock<Regex> = LazyLock::new(|| {
    let key = r#"(?:[^\s'"\-][^:]*: |'(?:[^']|'')*': |"(?:[^"\\]|\\.)*": )"#;
    Regex::new(&format!(r"^(?P<lead> *(?:- )*{key}?)(?P<word>{YAML11_BOOL})$"))
        .expect("static regex must compile")
});

/// A line opening a literal or folded block scalar.
static BLOCK_SCALAR_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?:^ *|: |- )[|>][-+0-9]*$").expect("static regex must compile")
});

/// Serializes `document` and parses the text back, failing unless the
/// re-parsed value equals the original.
pub(crate) fn to_yaml_checked<T>(document: &T, kind: &'static str) -> Result<String>
where
    T: Serialize + DeserializeOwned + PartialEq,
{
    let text = quote_yaml11_booleans(&serde_yaml::to_string(document)?);

    let reparsed: T = serde_yaml::from_str(&text).map_err(|err| {
        error!(document = kind, error = %err, yaml = %text, "Emitted YAML does not parse");
        GenerateError::SerializationCorruption {
            document: kind,
            detail: err.to_string(),
        }
    })?;

    if reparsed != *document {
        error!(
            document = kind,
            yaml = %text,
            "Emitted YAML does not match the source document"
        );
        return Err(GenerateError::SerializationCorruption {
            document: kind,
            detail: "re-parsed document differs from the serialized one".to_string(),
        });
    }

    Ok(text)
}

/// Single-quotes plain keys and scalars that YAML 1.1 reads as booleans.
/// Block scalar content is copied untouched.
fn quote_yaml11_booleans(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut block_parent: Option<usize> = None;

    for line in text.lines() {
        let indent = line.len() - line.trim_start_matches(' ').len();
        if let Some(parent) = block_parent {
            if line.trim().is_empty() || indent > parent {
                out.push_str(line);
                out.push('\n');
                continue;
            }
            block_parent = None;
        }

        let line = KEYWORD_KEY_RE.replace(line, "$lead'$word':$rest");
        let line = KEYWORD_VALUE_RE.replace(&line, "$lead'$word'");
        if BLOCK_SCALAR_RE.is_match(&line) {
            block_parent = Some(indent);
        }
        out.push_str(&line);
        out.push('\n');
    }
    out
}
