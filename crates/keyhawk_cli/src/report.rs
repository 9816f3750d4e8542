//! Renders scan and verification results as a terminal report.

use keyhawk_core::prelude::*;

use crate::ui::colors;

/// Prints the full report: per-pattern sections in lexicographic order,
/// matches sorted within each section, verification labels when outcomes
/// exist, optional manual test commands, and the unique-match total.
pub fn render(
    matches: &MatchSet,
    outcomes: Option<&VerificationOutcomes>,
    show_manual: bool,
    registry: Option<&VerificationRegistry>,
) {
    println!();
    println!("{}", colors::info().bold().apply_to("=== API Key Search Results ==="));

    for (pattern, set) in matches.iter() {
        if set.is_empty() {
            continue;
        }

        println!();
        println!(
            "{}",
            colors::success()
                .bold()
                .apply_to(format!("{pattern} (Found: {}):", set.len()))
        );

        for matched in set {
            print_match_line(pattern, matched, outcomes);

            if show_manual {
                print_manual_line(pattern, matched, registry);
            }
        }
    }

    if matches.is_all_empty() {
        println!(
            "{}",
            colors::warning().apply_to("No API keys or secrets found matching the specified patterns.")
        );
    } else {
        println!();
        println!(
            "{}",
            colors::info().apply_to(format!("Total unique matches found: {}", matches.total_matches()))
        );
    }

    println!("{}", colors::info().bold().apply_to("=============================="));
}

fn print_match_line(pattern: &str, matched: &str, outcomes: Option<&VerificationOutcomes>) {
    let outcome = outcomes.and_then(|o| o.get(&(pattern.to_string(), matched.to_string())).copied());

    match outcome {
        Some(Outcome::Valid) => {
            println!(
                "  - {} {}",
                colors::emphasis().apply_to(matched),
                colors::success().apply_to("[Valid]")
            );
        }
        Some(Outcome::Invalid) => {
            println!(
                "  - {} {}",
                colors::emphasis().apply_to(matched),
                colors::error().apply_to("[Invalid]")
            );
        }
        Some(Outcome::Unknown) => {
            println!(
                "{}",
                colors::warning().apply_to(format!("  - {matched} [No verification method]"))
            );
        }
        None => {
            println!("  - {}", colors::emphasis().apply_to(matched));
        }
    }
}

fn print_manual_line(pattern: &str, matched: &str, registry: Option<&VerificationRegistry>) {
    if let Some(command) = registry.and_then(|r| r.render_manual_command(pattern, matched)) {
        println!("    {}", colors::accent().apply_to(format!("Manual test: {command}")));
    }
}
