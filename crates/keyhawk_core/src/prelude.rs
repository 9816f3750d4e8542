//! Convenience re-exports of the most commonly used types.

pub use crate::error::{ConfigError, KeyhawkError, PatternError};
pub use crate::pattern::{PatternDef, PatternSet};
pub use crate::registry::VerificationRegistry;
pub use crate::scanner::{MatchSet, ScanEvent, Scanner};
pub use crate::verifier::{Outcome, VerificationOutcomes, Verifier};
