//! keyhawk - scans a text file for API keys and secrets using named regex
//! patterns, with optional live verification of each match.

mod report;
mod scanning;
mod ui;

use std::path::PathBuf;
use std::time::Duration;

use clap::{CommandFactory, FromArgMatches, Parser};
use console::style;
use keyhawk_core::prelude::*;
use keyhawk_core::{METHODS_FILENAME, PATTERNS_FILENAME};

use crate::ui::colors;

const REPO_URL: &str = "https://github.com/keyhawk-sec/keyhawk";

#[derive(Debug, Parser)]
#[command(
    name = "keyhawk",
    version,
    styles = ui::clap_styles(),
)]
struct Cli {
    /// Path to the secrets file to scan.
    #[arg(short, long)]
    file: PathBuf,

    /// Path to the pattern definition file (JSON array of name/regex records).
    #[arg(short, long, default_value = PATTERNS_FILENAME)]
    patterns: PathBuf,

    /// Path to the verification-method file (YAML).
    #[arg(short, long, default_value = METHODS_FILENAME)]
    methods: PathBuf,

    /// Validate found tokens against live services after scanning.
    #[arg(long)]
    validate: bool,

    /// Print fully substituted commands for manual testing.
    #[arg(long)]
    manual: bool,

    /// Number of parallel verification workers (defaults to host cores).
    #[arg(long)]
    concurrency: Option<usize>,

    /// Per-verification-command timeout in seconds.
    #[arg(long, default_value_t = 15)]
    timeout: u64,
}

fn main() {
    #[cfg(feature = "tracing")]
    {
        use tracing_subscriber::{EnvFilter, fmt, prelude::*};

        tracing_subscriber::registry()
            .with(fmt::layer().with_target(false).without_time())
            .with(EnvFilter::from_default_env())
            .init();
    }

    let cli = parse_cli();

    if let Err(e) = run(&cli) {
        ui::print_error(&format!("{e:#}"));
        std::process::exit(ui::exit::ERROR);
    }
}

fn parse_cli() -> Cli {
    let cmd = Cli::command().about(build_about()).after_help(build_after_help());

    let matches = cmd.get_matches();

    #[expect(clippy::expect_used, reason = "clap already validated args; this cannot fail")]
    Cli::from_arg_matches(&matches).expect("failed to parse arguments")
}

fn run(args: &Cli) -> anyhow::Result<()> {
    scanning::configure_thread_pool(args.concurrency)?;

    let patterns = scanning::load_patterns(&args.patterns)?;
    let text = scanning::read_secrets(&args.file)?;

    ui::print_info("Scanning patterns...");
    let scanner = Scanner::new(patterns);
    let matches = scanner.scan(&text, ui::print_scan_event);

    let registry = if args.validate || args.manual {
        Some(scanning::load_registry(&args.methods)?)
    } else {
        None
    };

    let outcomes = match (&registry, args.validate) {
        (Some(registry), true) => Some(run_verification(&matches, registry, args.timeout)),
        _ => None,
    };

    report::render(&matches, outcomes.as_ref(), args.manual, registry.as_ref());

    Ok(())
}

/// Verifies every match on the rayon pool, showing progress while the
/// commands run. Reporting waits for the full set of outcomes.
fn run_verification(matches: &MatchSet, registry: &VerificationRegistry, timeout_secs: u64) -> VerificationOutcomes {
    let total = matches.total_matches();
    if total == 0 {
        return VerificationOutcomes::new();
    }

    println!();
    ui::print_info(&format!(
        "Validating {total} {}...",
        ui::pluralise_word(total, "token", "tokens")
    ));

    let verifier = Verifier::new(registry).with_timeout(Duration::from_secs(timeout_secs));

    let pb = ui::create_verify_progress(total);
    let outcomes = verifier.verify_all(matches, |_, _, _| pb.inc(1));
    pb.finish_and_clear();

    outcomes
}

fn build_about() -> String {
    format!(
        r"
  {} scans a file for API keys and secrets using named regex patterns.

  Found tokens can be validated against their live services and printed
  with ready-to-run manual test commands.",
        colors::accent().apply_to("keyhawk").bold()
    )
}

fn build_after_help() -> String {
    format!(
        r"
  {}
    keyhawk -f dump.txt                       Scan a file
    keyhawk -f dump.txt --validate            Scan and validate tokens
    keyhawk -f dump.txt --manual              Print manual test commands
    keyhawk -f dump.txt -p my-patterns.json   Use a custom pattern file

  Learn more: {}",
        style("Examples:").bold(),
        colors::accent().apply_to(REPO_URL).underlined()
    )
}
