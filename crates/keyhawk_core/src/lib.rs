//! Core scanning and verification engine for keyhawk.
//!
//! Scans text for substrings matching a configurable set of named regex
//! patterns, then optionally verifies each match against a live service by
//! running a per-pattern verification command.
//!
//! # Main Types
//!
//! - [`PatternSet`] - Named regex definitions loaded from the pattern file
//! - [`Scanner`] - Runs patterns against text, producing a [`MatchSet`]
//! - [`VerificationRegistry`] - Pattern name → verification command template
//! - [`Verifier`] - Runs verification commands concurrently
//!
//! # Error Handling
//!
//! This crate uses [`thiserror`] for structured, typed errors:
//!
//! - [`ConfigError`] - Pattern/method source loading failures (fatal)
//! - [`PatternError`] - Regex compilation failures (per-pattern, non-fatal)
//! - [`ExecError`] - Verification command failures (per-match, non-fatal)
//! - [`KeyhawkError`] - Top-level enum combining the fatal variants
//!
//! The CLI crate (`keyhawk_cli`) uses `anyhow` for error propagation.

/// Heuristic classification of verification command output.
pub mod classify;
/// Error types for configuration loading and pattern compilation.
pub mod error;
/// Structured, shell-free execution of verification commands.
pub mod exec;
/// Pattern definitions loaded from the JSON pattern file.
pub mod pattern;
/// Common re-exports for consumers.
pub mod prelude;
/// Verification-method registry loaded from the YAML method file.
pub mod registry;
/// The scanning engine and its match results.
pub mod scanner;
/// Concurrent verification dispatch.
pub mod verifier;

pub use classify::Classifier;
pub use error::{ConfigError, KeyhawkError, PatternError};
pub use exec::{ExecError, ExecOutput, Invocation};
pub use pattern::{PatternDef, PatternSet};
pub use registry::VerificationRegistry;
pub use scanner::{MatchSet, ScanEvent, Scanner};
pub use verifier::{Outcome, VerificationOutcomes, Verifier};

/// Default filename for the pattern definition file.
pub const PATTERNS_FILENAME: &str = "regex.json";

/// Default filename for the verification-method file.
pub const METHODS_FILENAME: &str = "verification_methods.yaml";
