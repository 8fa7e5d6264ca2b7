//! Dataset files: a JSON array of objects or one object per line.

use std::fs;
use std::path::Path;

use query_core::{Document, Value};
use serde::{Deserialize, Serialize};

use crate::{StoreError, StoreResult};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DatasetFormat {
    /// Decide by extension, then by the first significant byte.
    #[default]
    Auto,
    Json,
    Jsonl,
}

impl DatasetFormat {
    fn resolve(self, path: &Path, raw: &str) -> Self {
        if self != DatasetFormat::Auto {
            return self;
        }
        match path.extension().and_then(|e| e.to_str()) {
            Some("jsonl") | Some("ndjson") => DatasetFormat::Jsonl,
            _ if raw.trim_start().starts_with('[') => DatasetFormat::Json,
            _ => DatasetFormat::Jsonl,
        }
    }
}

pub fn load_documents(path: &Path, format: DatasetFormat) -> StoreResult<Vec<Document>> {
    let raw = fs::read_to_string(path)
        .map_err(|e| StoreError::Load(format!("{}: {e}", path.display())))?;
    parse_documents(&raw, format.resolve(path, &raw))
        .map_err(|e| StoreError::Load(format!("{}: {e}", path.display())))
}

fn parse_documents(raw: &str, format: DatasetFormat) -> Result<Vec<Document>, String> {
    match format {
        DatasetFormat::Json => {
            let values: Vec<Value> = serde_json::from_str(raw).map_err(|e| e.to_string())?;
            values
                .into_iter()
                .enumerate()
                .map(|(i, v)| into_object(v).ok_or_else(|| format!("element {i} is not an object")))
                .collect()
        }
        _ => raw
            .lines()
            .enumerate()
            .filter(|(_, line)| !line.trim().is_empty())
            .map(|(i, line)| {
                let v: Value =
                    serde_json::from_str(line).map_err(|e| format!("line {}: {e}", i + 1))?;
                into_object(v).ok_or_else(|| format!("line {} is not an object", i + 1))
            })
            .collect(),
    }
}

fn into_object(v: Value) -> Option<Document> {
    match v {
        Value::Object(m) => Some(m),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn loads_json_array() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("sales.json");
        fs::write(&path, r#"[{"Transaction ID": 1}, {"Transaction ID": 2}]"#).unwrap();

        let docs = load_documents(&path, DatasetFormat::Auto).unwrap();
        assert_eq!(docs.len(), 2);
        assert_eq!(docs[1]["Transaction ID"], 2);
    }

    #[test]
    fn loads_json_lines_skipping_blanks() {
        let mut file = tempfile::Builder::new().suffix(".jsonl").tempfile().unwrap();
        writeln!(file, r#"{{"Transaction ID": 1}}"#).unwrap();
        writeln!(file).unwrap();
        writeln!(file, r#"{{"Transaction ID": 2}}"#).unwrap();

        let docs = load_documents(file.path(), DatasetFormat::Auto).unwrap();
        assert_eq!(docs.len(), 2);
    }

    #[test]
    fn rejects_non_objects_with_position() {
        let err = parse_documents("{\"a\":1}\n42\n", DatasetFormat::Jsonl).unwrap_err();
        assert!(err.contains("line 2"), "{err}");

        let err = parse_documents("[1]", DatasetFormat::Json).unwrap_err();
        assert!(err.contains("element 0"), "{err}");
    }

    #[test]
    fn missing_file_is_a_load_error() {
        let err = load_documents(Path::new("/definitely/not/here.json"), DatasetFormat::Json)
            .unwrap_err();
        assert!(matches!(err, StoreError::Load(_)));
    }
}
