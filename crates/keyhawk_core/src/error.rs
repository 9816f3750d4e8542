use std::path::{Path, PathBuf};

use thiserror::Error;

/// Errors that can occur when loading pattern or verification-method sources.
///
/// All variants are fatal: without usable configuration there is nothing to
/// scan with, so callers report the error and terminate.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The source file could not be read from disk.
    #[error("failed to read '{path}': {source}")]
    Read {
        /// Path to the file that could not be read.
        path: PathBuf,
        /// The underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// The pattern definition file contained invalid JSON.
    #[error("failed to parse pattern definitions '{path}': {source}")]
    Json {
        /// Path to the file that could not be parsed.
        path: PathBuf,
        /// The underlying JSON deserialization error.
        #[source]
        source: serde_json::Error,
    },

    /// The verification-method file contained invalid YAML.
    #[error("failed to parse verification methods '{path}': {source}")]
    Yaml {
        /// Path to the file that could not be parsed.
        path: PathBuf,
        /// The underlying YAML deserialization error.
        #[source]
        source: serde_yaml::Error,
    },
}

impl ConfigError {
    /// Returns the file path associated with this error.
    #[must_use]
    pub fn path(&self) -> &Path {
        match self {
            Self::Read { path, .. } | Self::Json { path, .. } | Self::Yaml { path, .. } => path,
        }
    }
}

/// Errors that can occur when compiling a detection pattern.
#[derive(Debug, Error)]
pub enum PatternError {
    /// The pattern's regular expression failed to compile.
    ///
    /// Non-fatal: the scanner skips the offending pattern and continues.
    #[error("invalid regex in pattern '{name}': {source}")]
    InvalidRegex {
        /// Name of the pattern that failed (e.g. `"Slack Token"`).
        name: String,
        /// The underlying regex compilation error.
        #[source]
        source: regex::Error,
    },
}

/// Top-level error type for the keyhawk pipeline.
///
/// Unifies configuration and pattern errors into a single type for callers
/// that orchestrate the full scan-and-verify workflow.
#[derive(Debug, Error)]
pub enum KeyhawkError {
    /// A pattern or verification-method source could not be loaded.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// A pattern failed to compile.
    #[error(transparent)]
    Pattern(#[from] PatternError),
}
