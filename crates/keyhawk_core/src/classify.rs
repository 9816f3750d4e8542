//! Heuristic classification of verification command output.
//!
//! The heuristics are intentionally crude string checks, carried over from
//! the services these patterns target. Each pattern name maps to one
//! classifier so individual rules can be replaced without touching the
//! verifier's dispatch.

/// The pattern whose successful responses are a JSON array of app objects.
pub const HEROKU_PATTERN: &str = "Heroku API Key";

/// Decides whether a zero-exit verification response indicates a live secret.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Classifier {
    /// Heroku `/apps` responses: valid only when the body is an array of
    /// objects carrying `"id"` fields.
    HerokuAppList,
    /// Generic heuristic: valid when the body mentions `200`, `id`, or `ok`.
    StatusHeuristic,
}

impl Classifier {
    /// Selects the classifier for a pattern name.
    #[must_use]
    pub fn for_pattern(pattern: &str) -> Self {
        if pattern == HEROKU_PATTERN {
            Self::HerokuAppList
        } else {
            Self::StatusHeuristic
        }
    }

    /// Classifies captured stdout from a command that exited successfully.
    #[must_use]
    pub fn is_valid(self, stdout: &str) -> bool {
        match self {
            Self::HerokuAppList => stdout.starts_with('[') && stdout.contains("\"id\""),
            Self::StatusHeuristic => {
                let lower = stdout.to_lowercase();
                stdout.contains("200") || lower.contains("id") || lower.contains("ok")
            }
        }
    }
}
