//! Verification-method registry loaded from a YAML method file.

use std::collections::HashMap;
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use regex::Regex;
use serde::Deserialize;

use crate::error::ConfigError;

/// Placeholder replaced with the matched secret in a command template.
pub const TOKEN_PLACEHOLDER: &str = "$token$";

/// Placeholder replaced with the Mailchimp datacenter suffix.
pub const DC_PLACEHOLDER: &str = "$dc$";

/// The one pattern whose templates use a `$dc$` placeholder.
pub const MAILCHIMP_PATTERN: &str = "Mailchimp API Key";

/// Datacenter used for manual-command display when a Mailchimp token carries
/// no `usNN` suffix. Verification treats the missing suffix as invalid instead.
const DC_DISPLAY_FALLBACK: &str = "us1";

#[expect(clippy::expect_used, reason = "static pattern source; failure is a programmer error")]
static DC_SUFFIX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"us\d{1,2}$").expect("invalid datacenter suffix regex"));

#[derive(Debug, Deserialize)]
struct MethodsFile {
    tokens: Vec<MethodEntry>,
}

#[derive(Debug, Deserialize)]
struct MethodEntry {
    name: String,
    verification_method: String,
}

/// Lookup table from pattern name to verification command template.
///
/// Flattened from the YAML method file, which lists records under a `tokens:`
/// key with `name` and `verification_method` fields.
#[derive(Clone, Default)]
pub struct VerificationRegistry {
    methods: HashMap<String, String>,
}

impl VerificationRegistry {
    /// Loads verification methods from a YAML file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = read_file(path)?;
        Self::from_yaml(path, &content)
    }

    /// Parses verification methods from a YAML string.
    pub fn from_yaml(path: &Path, content: &str) -> Result<Self, ConfigError> {
        let file: MethodsFile = serde_yaml::from_str(content).map_err(|source| ConfigError::Yaml {
            path: path.to_path_buf(),
            source,
        })?;

        let methods = file
            .tokens
            .into_iter()
            .map(|entry| (entry.name, entry.verification_method))
            .collect();

        Ok(Self { methods })
    }

    /// Creates a registry directly from a name → template map.
    #[must_use]
    pub fn new(methods: HashMap<String, String>) -> Self {
        Self { methods }
    }

    /// Returns the command template registered for a pattern name, if any.
    #[must_use]
    pub fn template(&self, pattern: &str) -> Option<&str> {
        self.methods.get(pattern).map(String::as_str)
    }

    /// Returns `true` if a verification method exists for the pattern name.
    #[must_use]
    pub fn supports(&self, pattern: &str) -> bool {
        self.methods.contains_key(pattern)
    }

    /// Returns the number of registered methods.
    #[must_use]
    pub fn len(&self) -> usize {
        self.methods.len()
    }

    /// Returns `true` if no methods are registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.methods.is_empty()
    }

    /// Extracts the trailing `usNN` datacenter suffix from a Mailchimp token.
    #[must_use]
    pub fn datacenter(token: &str) -> Option<&str> {
        DC_SUFFIX.find(token).map(|m| m.as_str())
    }

    /// Renders the fully substituted command for manual testing.
    ///
    /// Display-only: a Mailchimp token without a datacenter suffix falls back
    /// to `us1` here, whereas verification rejects it outright.
    #[must_use]
    pub fn render_manual_command(&self, pattern: &str, token: &str) -> Option<String> {
        let template = self.methods.get(pattern)?;
        let mut command = template.replace(TOKEN_PLACEHOLDER, token);

        if pattern == MAILCHIMP_PATTERN {
            let dc = Self::datacenter(token).unwrap_or(DC_DISPLAY_FALLBACK);
            command = command.replace(DC_PLACEHOLDER, dc);
        }

        Some(command)
    }
}

impl fmt::Debug for VerificationRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("VerificationRegistry")
            .field("method_count", &self.methods.len())
            .finish_non_exhaustive()
    }
}

fn read_file(path: &Path) -> Result<String, ConfigError> {
    std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })
}
