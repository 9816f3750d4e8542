//! Concurrent verification of scanned matches against live services.

use std::collections::BTreeMap;
use std::fmt;
use std::time::Duration;

use rayon::prelude::*;

use crate::classify::Classifier;
use crate::exec::Invocation;
use crate::registry::{MAILCHIMP_PATTERN, VerificationRegistry};
use crate::scanner::MatchSet;

/// Tri-state result of verifying a single match.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// The service recognised the secret.
    Valid,
    /// The service rejected the secret, or verification could not run.
    Invalid,
    /// No verification method exists for the pattern.
    Unknown,
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Valid => write!(f, "valid"),
            Self::Invalid => write!(f, "invalid"),
            Self::Unknown => write!(f, "unknown"),
        }
    }
}

/// Verification outcomes keyed by `(pattern name, matched string)`.
///
/// Keying by the pair means the same literal string matched under two
/// pattern names verifies independently, rather than one outcome silently
/// overwriting the other.
pub type VerificationOutcomes = BTreeMap<(String, String), Outcome>;

/// Runs verification commands for every match in a [`MatchSet`].
///
/// Tasks are independent and run on the rayon thread pool, which defaults
/// to one worker per host core. Results are gathered into a single map
/// before reporting begins; a failing task degrades to [`Outcome::Invalid`]
/// without affecting its siblings.
#[derive(Debug)]
pub struct Verifier<'r> {
    registry: &'r VerificationRegistry,
    timeout: Duration,
}

impl<'r> Verifier<'r> {
    /// Default per-command deadline. Verification commands reach external
    /// services and can hang indefinitely without one.
    pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(15);

    /// Creates a verifier over the given method registry.
    #[must_use]
    pub fn new(registry: &'r VerificationRegistry) -> Self {
        Self {
            registry,
            timeout: Self::DEFAULT_TIMEOUT,
        }
    }

    /// Overrides the per-command deadline.
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Verifies every match concurrently and gathers the outcomes.
    ///
    /// `on_done` is invoked from worker threads as each task finishes, so it
    /// must be `Sync`; it exists for progress reporting.
    pub fn verify_all(
        &self,
        matches: &MatchSet,
        on_done: impl Fn(&str, &str, Outcome) + Sync,
    ) -> VerificationOutcomes {
        let tasks: Vec<(&str, &str)> = matches
            .iter()
            .flat_map(|(pattern, set)| set.iter().map(move |m| (pattern, m.as_str())))
            .collect();

        tasks
            .par_iter()
            .map(|&(pattern, token)| {
                let outcome = self.verify_one(pattern, token);
                on_done(pattern, token, outcome);
                ((pattern.to_string(), token.to_string()), outcome)
            })
            .collect()
    }

    /// Verifies a single `(pattern, match)` pair.
    pub fn verify_one(&self, pattern: &str, token: &str) -> Outcome {
        let Some(template) = self.registry.template(pattern) else {
            return Outcome::Unknown;
        };

        // A Mailchimp key without its datacenter suffix cannot address the
        // right API host; it is invalid without running anything.
        let datacenter = if pattern == MAILCHIMP_PATTERN {
            match VerificationRegistry::datacenter(token) {
                Some(dc) => Some(dc),
                None => return Outcome::Invalid,
            }
        } else {
            None
        };

        let invocation = match Invocation::from_template(template, token, datacenter) {
            Ok(invocation) => invocation,
            Err(_error) => {
                #[cfg(feature = "tracing")]
                tracing::warn!(%pattern, error = %_error, "unusable verification template");
                return Outcome::Invalid;
            }
        };

        match invocation.run(self.timeout) {
            Ok(output) if output.success => {
                if Classifier::for_pattern(pattern).is_valid(&output.stdout) {
                    Outcome::Valid
                } else {
                    Outcome::Invalid
                }
            }
            Ok(_) => Outcome::Invalid,
            Err(_error) => {
                #[cfg(feature = "tracing")]
                tracing::debug!(%pattern, error = %_error, "verification command failed");
                Outcome::Invalid
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::sync::Mutex;

    use super::*;
    use crate::pattern::{PatternDef, PatternSet};
    use crate::scanner::Scanner;

    fn registry(entries: &[(&str, &str)]) -> VerificationRegistry {
        let methods: HashMap<String, String> = entries
            .iter()
            .map(|&(name, template)| (name.to_string(), template.to_string()))
            .collect();
        VerificationRegistry::new(methods)
    }

    #[test]
    fn missing_method_yields_unknown() {
        let registry = registry(&[]);
        let verifier = Verifier::new(&registry);

        assert_eq!(verifier.verify_one("Test Key", "sk-ABCDEFGHIJ"), Outcome::Unknown);
    }

    #[test]
    fn generic_stub_with_200_yields_valid() {
        let registry = registry(&[("Test Key", "echo 200")]);
        let verifier = Verifier::new(&registry);

        assert_eq!(verifier.verify_one("Test Key", "sk-ABCDEFGHIJ"), Outcome::Valid);
    }

    #[test]
    fn generic_stub_with_ok_yields_valid() {
        let registry = registry(&[("Test Key", "echo Status OK")]);
        let verifier = Verifier::new(&registry);

        assert_eq!(verifier.verify_one("Test Key", "sk-ABCDEFGHIJ"), Outcome::Valid);
    }

    #[test]
    fn generic_stub_with_unrecognised_output_yields_invalid() {
        let registry = registry(&[("Test Key", "echo denied")]);
        let verifier = Verifier::new(&registry);

        assert_eq!(verifier.verify_one("Test Key", "sk-ABCDEFGHIJ"), Outcome::Invalid);
    }

    #[test]
    fn nonzero_exit_yields_invalid_regardless_of_output() {
        let registry = registry(&[("Test Key", "sh -c 'echo 200; exit 1'")]);
        let verifier = Verifier::new(&registry);

        assert_eq!(verifier.verify_one("Test Key", "sk-ABCDEFGHIJ"), Outcome::Invalid);
    }

    #[test]
    fn launch_failure_yields_invalid() {
        let registry = registry(&[("Test Key", "keyhawk-no-such-program-xyz $token$")]);
        let verifier = Verifier::new(&registry);

        assert_eq!(verifier.verify_one("Test Key", "sk-ABCDEFGHIJ"), Outcome::Invalid);
    }

    #[test]
    fn heroku_array_response_yields_valid() {
        let registry = registry(&[("Heroku API Key", r#"echo '[{"id":"123"}]'"#)]);
        let verifier = Verifier::new(&registry);

        assert_eq!(verifier.verify_one("Heroku API Key", "token"), Outcome::Valid);
    }

    #[test]
    fn heroku_object_response_yields_invalid() {
        let registry = registry(&[("Heroku API Key", r#"echo '{"id":"123"}'"#)]);
        let verifier = Verifier::new(&registry);

        assert_eq!(verifier.verify_one("Heroku API Key", "token"), Outcome::Invalid);
    }

    #[test]
    fn mailchimp_with_datacenter_runs_and_substitutes() {
        let registry = registry(&[("Mailchimp API Key", "echo dc=$dc$ status=200")]);
        let verifier = Verifier::new(&registry);

        assert_eq!(verifier.verify_one("Mailchimp API Key", "key-us20"), Outcome::Valid);
    }

    #[test]
    fn mailchimp_without_datacenter_is_invalid_without_executing() {
        // The stub would report valid if it ran, so an Invalid outcome
        // proves the short-circuit.
        let registry = registry(&[("Mailchimp API Key", "echo 200")]);
        let verifier = Verifier::new(&registry);

        assert_eq!(verifier.verify_one("Mailchimp API Key", "key-noDC"), Outcome::Invalid);
    }

    #[test]
    fn verification_is_idempotent_for_a_fixed_stub() {
        let registry = registry(&[("Test Key", "echo 200")]);
        let verifier = Verifier::new(&registry);

        let first = verifier.verify_one("Test Key", "sk-ABCDEFGHIJ");
        let second = verifier.verify_one("Test Key", "sk-ABCDEFGHIJ");
        assert_eq!(first, second);
    }

    #[test]
    fn verify_all_gathers_every_pair_and_reports_progress() {
        let registry = registry(&[("Hit", "echo 200")]);
        let scanner = Scanner::new(PatternSet::new(vec![
            PatternDef {
                name: "Hit".to_string(),
                regex: "sk-[A-Z]{4}".to_string(),
            },
            PatternDef {
                name: "Unverified".to_string(),
                regex: "tk-[A-Z]{4}".to_string(),
            },
        ]));
        let matches = scanner.scan("sk-AAAA sk-BBBB tk-CCCC", |_| {});

        let verifier = Verifier::new(&registry);
        let seen = Mutex::new(Vec::new());
        let outcomes = verifier.verify_all(&matches, |pattern, token, outcome| {
            seen.lock().unwrap().push((pattern.to_string(), token.to_string(), outcome));
        });

        assert_eq!(outcomes.len(), 3);
        assert_eq!(outcomes[&("Hit".to_string(), "sk-AAAA".to_string())], Outcome::Valid);
        assert_eq!(outcomes[&("Hit".to_string(), "sk-BBBB".to_string())], Outcome::Valid);
        assert_eq!(
            outcomes[&("Unverified".to_string(), "tk-CCCC".to_string())],
            Outcome::Unknown
        );
        assert_eq!(seen.lock().unwrap().len(), 3);
    }

    #[test]
    fn same_literal_under_two_patterns_verifies_independently() {
        let registry = registry(&[("Live", "echo 200"), ("Dead", "echo denied")]);
        let scanner = Scanner::new(PatternSet::new(vec![
            PatternDef {
                name: "Live".to_string(),
                regex: "sk-[A-Z]{4}".to_string(),
            },
            PatternDef {
                name: "Dead".to_string(),
                regex: "sk-[A-Z]{4}".to_string(),
            },
        ]));
        let matches = scanner.scan("sk-AAAA", |_| {});

        let verifier = Verifier::new(&registry);
        let outcomes = verifier.verify_all(&matches, |_, _, _| {});

        assert_eq!(outcomes[&("Live".to_string(), "sk-AAAA".to_string())], Outcome::Valid);
        assert_eq!(outcomes[&("Dead".to_string(), "sk-AAAA".to_string())], Outcome::Invalid);
    }
}
