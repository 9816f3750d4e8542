//! The scanning engine that matches patterns against the input text.

use std::collections::{BTreeMap, BTreeSet};

use regex::Regex;

use crate::error::PatternError;
use crate::pattern::PatternSet;

/// Deduplicated scan results, keyed by pattern name.
///
/// Every pattern supplied to the scanner appears exactly once as a key, even
/// when it produced no matches (or failed to compile), so report ordering is
/// stable across runs. The BTree representation keeps both pattern names and
/// matches in sorted order for rendering.
#[derive(Debug, Clone, Default)]
pub struct MatchSet {
    results: BTreeMap<String, BTreeSet<String>>,
}

impl MatchSet {
    fn ensure_pattern(&mut self, name: &str) {
        if !self.results.contains_key(name) {
            self.results.insert(name.to_string(), BTreeSet::new());
        }
    }

    fn record(&mut self, name: &str, matched: String) {
        self.ensure_pattern(name);
        if let Some(set) = self.results.get_mut(name) {
            set.insert(matched);
        }
    }

    /// Returns the deduplicated matches for a pattern name, if the pattern
    /// was scanned.
    #[must_use]
    pub fn matches(&self, name: &str) -> Option<&BTreeSet<String>> {
        self.results.get(name)
    }

    /// Iterates over `(pattern name, matches)` entries in sorted name order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &BTreeSet<String>)> {
        self.results.iter().map(|(name, set)| (name.as_str(), set))
    }

    /// Returns the number of pattern slots (matched or not).
    #[must_use]
    pub fn pattern_count(&self) -> usize {
        self.results.len()
    }

    /// Total unique matches across all patterns. The same literal string
    /// matched under two pattern names counts twice.
    #[must_use]
    pub fn total_matches(&self) -> usize {
        self.results.values().map(BTreeSet::len).sum()
    }

    /// Returns `true` if no pattern produced any match.
    #[must_use]
    pub fn is_all_empty(&self) -> bool {
        self.results.values().all(BTreeSet::is_empty)
    }
}

/// Per-pattern progress emitted while a scan runs.
///
/// The scanner itself never prints; callers render these events however
/// their front end requires.
#[derive(Debug)]
pub enum ScanEvent<'a> {
    /// The pattern matched `count` unique strings.
    Matched {
        /// Name of the pattern that matched.
        pattern: &'a str,
        /// Number of unique matches recorded for the pattern.
        count: usize,
    },
    /// The pattern matched nothing.
    NoMatches {
        /// Name of the pattern that matched nothing.
        pattern: &'a str,
    },
    /// The pattern's regex failed to compile and the pattern was skipped.
    Skipped {
        /// The compilation error, carrying the pattern name.
        error: PatternError,
    },
}

/// Scans text against a set of pattern definitions.
#[derive(Debug)]
pub struct Scanner {
    patterns: PatternSet,
}

impl Scanner {
    /// Creates a scanner over the given pattern set.
    #[must_use]
    pub fn new(patterns: PatternSet) -> Self {
        Self { patterns }
    }

    /// Returns the pattern set this scanner was built from.
    #[must_use]
    pub fn patterns(&self) -> &PatternSet {
        &self.patterns
    }

    /// Runs every pattern against `text`, deduplicating matches per pattern.
    ///
    /// Each regex is wrapped in word boundaries before compiling, so a match
    /// is never adjacent to a word character. A pattern whose regex fails to
    /// compile is skipped (surfaced as [`ScanEvent::Skipped`]); the rest of
    /// the scan proceeds. Every supplied pattern ends up as a key in the
    /// returned [`MatchSet`] regardless of outcome.
    pub fn scan(&self, text: &str, mut on_event: impl FnMut(ScanEvent<'_>)) -> MatchSet {
        let mut results = MatchSet::default();

        for def in &self.patterns {
            results.ensure_pattern(&def.name);

            let regex = match compile_anchored(&def.name, &def.regex) {
                Ok(regex) => regex,
                Err(error) => {
                    #[cfg(feature = "tracing")]
                    tracing::warn!(pattern = %def.name, %error, "skipping pattern");
                    on_event(ScanEvent::Skipped { error });
                    continue;
                }
            };

            let mut count = 0;
            for m in regex.find_iter(text) {
                results.record(&def.name, m.as_str().to_string());
                count += 1;
            }

            if count > 0 {
                on_event(ScanEvent::Matched {
                    pattern: &def.name,
                    count,
                });
            } else {
                on_event(ScanEvent::NoMatches { pattern: &def.name });
            }
        }

        results
    }
}

/// Compiles a pattern regex wrapped in word boundaries.
///
/// The source is grouped before anchoring so that top-level alternations
/// anchor as a whole rather than splitting the boundaries between branches.
fn compile_anchored(name: &str, regex: &str) -> Result<Regex, PatternError> {
    Regex::new(&format!(r"\b(?:{regex})\b")).map_err(|source| PatternError::InvalidRegex {
        name: name.to_string(),
        source,
    })
}
