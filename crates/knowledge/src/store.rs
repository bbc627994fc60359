//! The knowledge store: an ordered, validated, read-only list of topics.

use crate::scorer::{self, ScoredMatch};
use serde::Deserialize;
use std::collections::HashSet;
use std::path::Path;
use tensive_core::KnowledgeEntry;
use tensive_core::error::KnowledgeError;
use tracing::{debug, info};

const BUILTIN_CORPUS: &str = include_str!("../data/knowledge_base.toml");

#[derive(Debug, Deserialize)]
struct CorpusFile {
    #[serde(default)]
    entries: Vec<KnowledgeEntry>,
}

/// Read-only knowledge store.
///
/// Order is significant: it breaks score ties during ranking.
#[derive(Debug, Clone)]
pub struct KnowledgeStore {
    entries: Vec<KnowledgeEntry>,
}

impl KnowledgeStore {
    /// Build a store from entries.
    ///
    /// Keywords are lower-cased and trimmed, and blank keywords dropped.
    /// Fails on an empty title or content, or a title repeated ignoring case.
    pub fn new(entries: Vec<KnowledgeEntry>) -> Result<Self, KnowledgeError> {
        let mut seen = HashSet::new();
        let mut normalized = Vec::with_capacity(entries.len());

        for mut entry in entries {
            entry.title = entry.title.trim().to_string();
            if entry.title.is_empty() {
                return Err(KnowledgeError::InvalidEntry("entry has an empty title".into()));
            }
            if entry.content.trim().is_empty() {
                return Err(KnowledgeError::InvalidEntry(format!(
                    "'{}' has no content",
                    entry.title
                )));
            }
            if !seen.insert(entry.title.to_lowercase()) {
                return Err(KnowledgeError::InvalidEntry(format!(
                    "duplicate title '{}'",
                    entry.title
                )));
            }

            entry.keywords = entry
                .keywords
                .iter()
                .map(|k| k.trim().to_lowercase())
                .filter(|k| !k.is_empty())
                .collect();

            if entry.assets.as_ref().is_some_and(|a| a.is_empty()) {
                entry.assets = None;
            }

            normalized.push(entry);
        }

        Ok(Self {
            entries: normalized,
        })
    }

    /// The corpus compiled into the binary.
    pub fn builtin() -> Result<Self, KnowledgeError> {
        let store = Self::from_toml_str(BUILTIN_CORPUS)?;
        debug!(entries = store.len(), "Loaded built-in knowledge base");
        Ok(store)
    }

    /// Parse a TOML document of `[[entries]]` tables.
    pub fn from_toml_str(raw: &str) -> Result<Self, KnowledgeError> {
        let file: CorpusFile =
            toml::from_str(raw).map_err(|e| KnowledgeError::ParseError(e.to_string()))?;
        Self::new(file.entries)
    }

    /// Load a corpus file from disk.
    pub fn load_from(path: &Path) -> Result<Self, KnowledgeError> {
        let raw = std::fs::read_to_string(path).map_err(|e| KnowledgeError::ReadError {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;
        let store = Self::from_toml_str(&raw)?;
        info!(path = %path.display(), entries = store.len(), "Loaded knowledge base");
        Ok(store)
    }

    /// Use the file at `path` when given, otherwise the built-in corpus.
    pub fn load(path: Option<&Path>) -> Result<Self, KnowledgeError> {
        match path {
            Some(path) => Self::load_from(path),
            None => Self::builtin(),
        }
    }

    pub fn entries(&self) -> &[KnowledgeEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Look up an entry by title, ignoring case.
    pub fn get(&self, title: &str) -> Option<&KnowledgeEntry> {
        let wanted = title.trim().to_lowercase();
        self.entries
            .iter()
            .find(|e| e.title.to_lowercase() == wanted)
    }

    /// Rank every entry against `query`, best first.
    pub fn rank(&self, query: &str) -> Vec<ScoredMatch<'_>> {
        scorer::score(query, &self.entries)
    }
}
