//! Inferent persistence
//!
//! Saves and loads a whole [`KnowledgeBase`] as one JSON document:
//!
//! ```text
//! {
//!   "database_facts": { "<name>": { "type", "description", "range", "enum" } },
//!   "database_rules": { "<name>": { "description", "antecedent", "consequent" } }
//! }
//! ```

pub mod document;

#[cfg(test)]
mod tests;

pub use document::{Document, FactRecord, RangeRecord};

use inferent_kb::{KbError, KnowledgeBase, ValueKind};
use std::path::{Path, PathBuf};

#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("failed to access {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed document: {0}")]
    Json(#[from] serde_json::Error),

    #[error("fact '{fact}': {source}")]
    InvalidFact {
        fact: String,
        #[source]
        source: KbError,
    },

    #[error("fact '{fact}': enumeration range #{min}..#{max} has no names to save")]
    UnnamedEnumRange { fact: String, min: usize, max: usize },

    #[error("fact '{fact}': {value} is not a valid {kind} value")]
    BadValue {
        fact: String,
        kind: ValueKind,
        value: String,
    },
}

pub type StorageResult<T> = Result<T, StorageError>;

pub fn to_json_string(kb: &KnowledgeBase) -> StorageResult<String> {
    let document = Document::from_knowledge_base(kb)?;
    Ok(serde_json::to_string_pretty(&document)?)
}

pub fn from_json_str(text: &str) -> StorageResult<KnowledgeBase> {
    let document: Document = serde_json::from_str(text)?;
    document.into_knowledge_base()
}

pub fn save(kb: &KnowledgeBase, path: &Path) -> StorageResult<()> {
    let text = to_json_string(kb)?;
    std::fs::write(path, text).map_err(|source| StorageError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    tracing::info!(
        path = %path.display(),
        facts = kb.facts.count(),
        rules = kb.rules.count(),
        "saved knowledge base"
    );
    Ok(())
}

pub fn load(path: &Path) -> StorageResult<KnowledgeBase> {
    let text = std::fs::read_to_string(path).map_err(|source| StorageError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let kb = from_json_str(&text)?;
    tracing::info!(
        path = %path.display(),
        facts = kb.facts.count(),
        rules = kb.rules.count(),
        "loaded knowledge base"
    );
    Ok(kb)
}
