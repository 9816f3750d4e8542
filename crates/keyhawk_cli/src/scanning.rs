//! Configuration loading and thread-pool setup.

use std::path::Path;

use anyhow::Context as _;
use keyhawk_core::prelude::*;

/// Loads pattern definitions from the pattern file.
pub fn load_patterns(path: &Path) -> anyhow::Result<PatternSet> {
    PatternSet::load(path).context("loading pattern definitions")
}

/// Loads the verification-method registry from the method file.
pub fn load_registry(path: &Path) -> anyhow::Result<VerificationRegistry> {
    VerificationRegistry::load(path).context("loading verification methods")
}

/// Reads the entire secrets file into memory as the scan subject.
pub fn read_secrets(path: &Path) -> anyhow::Result<String> {
    std::fs::read_to_string(path).with_context(|| format!("reading secrets file '{}'", path.display()))
}

/// Configures the global rayon thread pool with the requested number of
/// threads, if specified. Verification tasks run on this pool; it defaults
/// to one worker per host core.
pub fn configure_thread_pool(concurrency: Option<usize>) -> anyhow::Result<()> {
    if let Some(n) = concurrency {
        rayon::ThreadPoolBuilder::new()
            .num_threads(n)
            .build_global()
            .context("failed to configure thread pool")?;
    }
    Ok(())
}
