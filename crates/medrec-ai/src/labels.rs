//! Class index → disease label mapping produced at training time.
//!
//! Stored as a JSON object keyed by the stringified class index, the same
//! shape as the `id2label` entry of a Hugging Face model config:
//!
//! ```json
//! {"0": "Fungal infection", "1": "Allergy"}
//! ```

use std::collections::BTreeMap;
use std::path::Path;

use thiserror::Error;
use tracing::info;

#[derive(Debug, Error)]
pub enum LabelError {
    #[error("read label index: {0}")]
    Io(#[from] std::io::Error),
    #[error("parse label index: {0}")]
    Json(#[from] serde_json::Error),
    #[error("label index key is not a class index: {0:?}")]
    BadKey(String),
    #[error("label index has no entry for class {0}")]
    MissingClass(usize),
}

/// Dense class-index → label table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LabelIndex {
    labels: Vec<String>,
}

impl LabelIndex {
    /// Build from labels already ordered by class index.
    pub fn from_labels(labels: Vec<String>) -> Self {
        Self { labels }
    }

    /// Parse `{"<index>": "<label>"}`. Indices must cover `0..n` without gaps.
    pub fn from_json(json: &str) -> Result<Self, LabelError> {
        let raw: BTreeMap<String, String> = serde_json::from_str(json)?;
        let mut by_index = BTreeMap::new();
        for (key, label) in raw {
            let idx: usize = key.trim().parse().map_err(|_| LabelError::BadKey(key.clone()))?;
            by_index.insert(idx, label);
        }

        let mut labels = Vec::with_capacity(by_index.len());
        for (expected, (idx, label)) in by_index.into_iter().enumerate() {
            if idx != expected {
                return Err(LabelError::MissingClass(expected));
            }
            labels.push(label);
        }
        Ok(Self { labels })
    }

    pub fn load(path: &Path) -> Result<Self, LabelError> {
        let json = std::fs::read_to_string(path)?;
        let index = Self::from_json(&json)?;
        info!(count = index.len(), path = %path.display(), "loaded label index");
        Ok(index)
    }

    pub fn to_json(&self) -> String {
        let map: BTreeMap<usize, &str> = self
            .labels
            .iter()
            .enumerate()
            .map(|(i, l)| (i, l.as_str()))
            .collect();
        // Integer keys serialize as strings; BTreeMap keeps them in numeric order.
        serde_json::to_string_pretty(&map).unwrap_or_else(|_| "{}".to_string())
    }

    pub fn write(&self, path: &Path) -> Result<(), LabelError> {
        std::fs::write(path, self.to_json())?;
        Ok(())
    }

    /// Label for a class index, trimmed of surrounding whitespace.
    pub fn get(&self, idx: usize) -> Option<&str> {
        self.labels.get(idx).map(|l| l.trim())
    }

    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.labels.iter().map(|l| l.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn parse_and_lookup() {
        let idx =
            LabelIndex::from_json(r#"{"1": "Allergy ", "0": "Fungal infection", "2": "GERD"}"#)
                .unwrap();
        assert_eq!(idx.len(), 3);
        assert_eq!(idx.get(0), Some("Fungal infection"));
        assert_eq!(idx.get(1), Some("Allergy"));
        assert_eq!(idx.get(3), None);
    }

    #[test]
    fn numeric_not_lexical_order() {
        let json = (0..12)
            .map(|i| format!("\"{i}\": \"L{i}\""))
            .collect::<Vec<_>>()
            .join(",");
        let idx = LabelIndex::from_json(&format!("{{{json}}}")).unwrap();
        assert_eq!(idx.get(10), Some("L10"));
        assert_eq!(idx.get(2), Some("L2"));
    }

    #[test]
    fn rejects_non_integer_keys() {
        let err = LabelIndex::from_json(r#"{"zero": "A"}"#).unwrap_err();
        assert!(matches!(err, LabelError::BadKey(_)));
    }

    #[test]
    fn rejects_gaps() {
        let err = LabelIndex::from_json(r#"{"0": "A", "2": "C"}"#).unwrap_err();
        assert!(matches!(err, LabelError::MissingClass(1)));
    }

    #[test]
    fn write_then_load() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("id2label.json");
        let idx = LabelIndex::from_labels(vec!["Fungal infection".into(), "Allergy".into()]);
        idx.write(&path).unwrap();

        let loaded = LabelIndex::load(&path).unwrap();
        assert_eq!(loaded, idx);
        assert!(std::fs::read_to_string(&path).unwrap().contains("\"1\": \"Allergy\""));
    }
}
