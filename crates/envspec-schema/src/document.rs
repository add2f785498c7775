//! # Document Loading
//!
//! Turns specification text into the `serde_json::Value` model the
//! structural validator walks. Specifications are usually JSON; YAML is
//! accepted as well and converted to the same value model.
//!
//! | input | parsed as |
//! |-------|-----------|
//! | `.json`, `.umbrella` file | JSON only |
//! | `.yaml`, `.yml` file | YAML only |
//! | other file, or text | JSON, then YAML unless the text opens with `{` or `[` |
//!
//! Text that opens like a JSON document is never re-read as YAML, so a
//! stray or missing comma is reported as a JSON error.
//!
//! Loading only checks syntax. Whether the root is a mapping is decided
//! by the validator, where a non-mapping root is a contract violation.

use std::path::{Path, PathBuf};

use serde_json::Value;
use thiserror::Error;

/// Errors raised while reading or parsing a specification document.
#[derive(Debug, Error)]
pub enum DocumentError {
    /// The document file does not exist.
    #[error("specification not found: {path}")]
    NotFound { path: PathBuf },

    /// The document file could not be read.
    #[error("cannot read specification {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    /// The document is not valid JSON.
    #[error("specification was invalid JSON: {0}")]
    Json(#[from] serde_json::Error),

    /// The document is not valid YAML.
    #[error("specification was invalid YAML: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// Neither parser accepted the document.
    #[error("specification was invalid JSON ({json}) and invalid YAML ({yaml})")]
    Syntax {
        json: serde_json::Error,
        yaml: serde_yaml::Error,
    },

    /// YAML parsed but uses constructs the JSON value model cannot hold.
    #[error("specification cannot be represented as JSON: {0}")]
    Conversion(String),
}

/// Parse specification text of unknown format.
///
/// JSON is tried first. Text opening with `{` or `[` must be JSON; any
/// other text that is not JSON is parsed as YAML.
///
/// # Errors
///
/// Returns [`DocumentError::Json`] for malformed JSON-shaped text,
/// [`DocumentError::Syntax`] when neither parser accepts the text, and
/// [`DocumentError::Conversion`] for YAML values without a JSON
/// equivalent.
pub fn parse_document(text: &str) -> Result<Value, DocumentError> {
    let json_err = match serde_json::from_str(text) {
        Ok(value) => return Ok(value),
        Err(e) => e,
    };
    if looks_like_json(text) {
        return Err(DocumentError::Json(json_err));
    }

    tracing::debug!(error = %json_err, "not JSON, trying YAML");
    match serde_yaml::from_str::<serde_yaml::Value>(text) {
        Ok(yaml) => yaml_to_json_value(yaml),
        Err(yaml_err) => Err(DocumentError::Syntax {
            json: json_err,
            yaml: yaml_err,
        }),
    }
}

/// Parse text that must be JSON.
///
/// # Errors
///
/// Returns [`DocumentError::Json`] on any syntax error.
pub fn parse_json_document(text: &str) -> Result<Value, DocumentError> {
    Ok(serde_json::from_str(text)?)
}

/// Parse text that must be YAML.
///
/// # Errors
///
/// Returns [`DocumentError::Yaml`] on any syntax error and
/// [`DocumentError::Conversion`] for values without a JSON equivalent.
pub fn parse_yaml_document(text: &str) -> Result<Value, DocumentError> {
    let yaml: serde_yaml::Value = serde_yaml::from_str(text)?;
    yaml_to_json_value(yaml)
}

/// Read and parse a specification file, choosing the parser by extension.
///
/// # Errors
///
/// Returns [`DocumentError::NotFound`] or [`DocumentError::Io`] when the
/// file cannot be read, and a parse error otherwise.
pub fn load_document(path: &Path) -> Result<Value, DocumentError> {
    let content = std::fs::read_to_string(path).map_err(|e| {
        if e.kind() == std::io::ErrorKind::NotFound {
            DocumentError::NotFound {
                path: path.to_path_buf(),
            }
        } else {
            DocumentError::Io {
                path: path.to_path_buf(),
                source: e,
            }
        }
    })?;

    let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("");
    match ext {
        "json" | "umbrella" => parse_json_document(&content),
        "yaml" | "yml" => parse_yaml_document(&content),
        _ => parse_document(&content),
    }
}

fn looks_like_json(text: &str) -> bool {
    matches!(text.trim_start().as_bytes().first(), Some(b'{' | b'['))
}

fn yaml_to_json_value(yaml: serde_yaml::Value) -> Result<Value, DocumentError> {
    match yaml {
        serde_yaml::Value::Null => Ok(Value::Null),
        serde_yaml::Value::Bool(b) => Ok(Value::Bool(b)),
        serde_yaml::Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                Ok(Value::Number(i.into()))
            } else if let Some(u) = n.as_u64() {
                Ok(Value::Number(u.into()))
            } else if let Some(f) = n.as_f64() {
                serde_json::Number::from_f64(f)
                    .map(Value::Number)
                    .ok_or_else(|| DocumentError::Conversion(format!("non-finite number {f}")))
            } else {
                Err(DocumentError::Conversion(format!("unsupported number {n:?}")))
            }
        }
        serde_yaml::Value::String(s) => Ok(Value::String(s)),
        serde_yaml::Value::Sequence(seq) => seq
            .into_iter()
            .map(yaml_to_json_value)
            .collect::<Result<Vec<_>, _>>()
            .map(Value::Array),
        serde_yaml::Value::Mapping(map) => {
            let mut object = serde_json::Map::new();
            for (k, v) in map {
                let key = match k {
                    serde_yaml::Value::String(s) => s,
                    serde_yaml::Value::Number(n) => n.to_string(),
                    serde_yaml::Value::Bool(b) => b.to_string(),
                    other => {
                        return Err(DocumentError::Conversion(format!(
                            "unsupported mapping key {other:?}"
                        )))
                    }
                };
                object.insert(key, yaml_to_json_value(v)?);
            }
            Ok(Value::Object(object))
        }
        serde_yaml::Value::Tagged(tagged) => yaml_to_json_value(tagged.value),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn parses_json_text() {
        let value = parse_document(r#"{"kernel": {"name": "linux", "version": "3.10"}}"#).unwrap();
        assert_eq!(value["kernel"]["name"], "linux");
    }

    #[test]
    fn falls_back_to_yaml() {
        let text = "kernel:\n  name: linux\n  version: '3.10'\noutput:\n  files: [a, b]\n  dirs: []\n";
        let value = parse_document(text).unwrap();
        assert_eq!(value["kernel"]["version"], "3.10");
        assert_eq!(value["output"]["files"][1], "b");
    }

    #[test]
    fn yaml_numeric_keys_become_strings() {
        let value = parse_document("environ:\n  1: one\n  true: yes\n").unwrap();
        assert_eq!(value["environ"]["1"], "one");
        assert_eq!(value["environ"]["true"], "yes");
    }

    #[test]
    fn strict_json_rejects_yaml() {
        assert!(matches!(
            parse_json_document("kernel: linux"),
            Err(DocumentError::Json(_))
        ));
    }

    #[test]
    fn garbage_is_rejected() {
        assert!(matches!(
            parse_document("{ \"unterminated\": ["),
            Err(DocumentError::Json(_))
        ));
        assert!(matches!(
            parse_document("key: [unclosed\n  - item"),
            Err(DocumentError::Syntax { .. })
        ));
    }

    #[test]
    fn trailing_comma_is_invalid_json() {
        let err = parse_document(r#"{"comment": "x", "cmd": "ls",}"#).unwrap_err();
        assert!(matches!(err, DocumentError::Json(_)), "{err}");
        assert!(err.to_string().starts_with("specification was invalid JSON"));
    }

    #[test]
    fn missing_comma_is_invalid_json() {
        let err = parse_document(r#"{"comment": "x" "cmd": "ls"}"#).unwrap_err();
        assert!(matches!(err, DocumentError::Json(_)), "{err}");
    }

    #[test]
    fn malformed_json_files_are_not_read_as_yaml() {
        let dir = tempfile::tempdir().unwrap();
        for name in ["spec.json", "spec.umbrella"] {
            let path = dir.path().join(name);
            std::fs::write(&path, r#"{"comment": "x", "cmd": "ls",}"#).unwrap();
            assert!(
                matches!(load_document(&path), Err(DocumentError::Json(_))),
                "{name}"
            );
        }
    }

    #[test]
    fn yaml_flow_mapping_in_yaml_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("spec.yml");
        std::fs::write(&path, "{comment: x, cmd: ls,}").unwrap();
        let value = load_document(&path).unwrap();
        assert_eq!(value["cmd"], "ls");
    }

    #[test]
    fn scalar_root_still_parses() {
        // Rejecting non-mapping roots is the validator's job.
        assert_eq!(parse_document("[1, 2]").unwrap(), serde_json::json!([1, 2]));
    }

    #[test]
    fn load_missing_file_is_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let err = load_document(&dir.path().join("absent.umbrella")).unwrap_err();
        assert!(matches!(err, DocumentError::NotFound { .. }));
    }

    #[test]
    fn load_yaml_file_by_extension() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("spec.yaml");
        let mut file = std::fs::File::create(&path).unwrap();
        writeln!(file, "cmd: ./run.sh\ncomment: demo").unwrap();
        let value = load_document(&path).unwrap();
        assert_eq!(value["cmd"], "./run.sh");
    }

    #[test]
    fn load_umbrella_file_as_json() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("demo.umbrella");
        std::fs::write(&path, br#"{"comment": "demo"}"#).unwrap();
        assert_eq!(load_document(&path).unwrap()["comment"], "demo");
    }
}
