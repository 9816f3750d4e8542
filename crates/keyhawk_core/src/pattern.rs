//! Pattern definitions loaded from a JSON pattern file.

use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::error::ConfigError;

/// A named secret detection pattern as declared in the pattern file.
///
/// The regex is kept as source text; compilation is deferred to scan time so
/// that one malformed pattern cannot prevent the rest from loading.
#[derive(Debug, Clone, Deserialize)]
pub struct PatternDef {
    /// Human-readable pattern name (e.g. `"Heroku API Key"`). Names are
    /// expected to be unique; if two definitions share a name, the later one
    /// wins the match-set slot.
    pub name: String,
    /// Regular expression source matching the secret.
    pub regex: String,
}

/// An ordered collection of pattern definitions.
///
/// Loaded from a JSON array of `{"name": ..., "regex": ...}` records.
/// Definition order is preserved and determines scan order.
#[derive(Debug, Clone, Default)]
pub struct PatternSet {
    defs: Vec<PatternDef>,
}

impl PatternSet {
    /// Loads pattern definitions from a JSON file.
    ///
    /// No regex validation happens here; invalid regexes surface as scan-time
    /// warnings instead.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = read_file(path)?;
        Self::from_json(path, &content)
    }

    /// Parses pattern definitions from a JSON string.
    pub fn from_json(path: &Path, content: &str) -> Result<Self, ConfigError> {
        let defs = serde_json::from_str(content).map_err(|source| ConfigError::Json {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(Self { defs })
    }

    /// Creates a pattern set directly from definitions.
    #[must_use]
    pub fn new(defs: Vec<PatternDef>) -> Self {
        Self { defs }
    }

    /// Returns the definitions in declaration order.
    #[must_use]
    pub fn defs(&self) -> &[PatternDef] {
        &self.defs
    }

    /// Returns the number of loaded definitions.
    #[must_use]
    pub fn len(&self) -> usize {
        self.defs.len()
    }

    /// Returns `true` if no definitions were loaded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.defs.is_empty()
    }
}

impl<'a> IntoIterator for &'a PatternSet {
    type Item = &'a PatternDef;
    type IntoIter = std::slice::Iter<'a, PatternDef>;

    fn into_iter(self) -> Self::IntoIter {
        self.defs.iter()
    }
}

fn read_file(path: &Path) -> Result<String, ConfigError> {
    std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })
}
