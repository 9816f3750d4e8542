//! End-to-end tests for verification and manual-command display.
//!
//! Verification methods are stubbed with `echo`/`sh` command templates so no
//! network access is required.

#![expect(clippy::expect_used, reason = "tests use expect for clearer failure messages")]

use std::fs;
use std::path::{Path, PathBuf};

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

fn keyhawk() -> Command {
    Command::new(env!("CARGO_BIN_EXE_keyhawk"))
}

fn write_fixture(dir: &TempDir, name: &str, content: &str) -> PathBuf {
    let path = dir.path().join(name);
    fs::write(&path, content).expect("writing fixture");
    path
}

fn full_args(patterns: &Path, secrets: &Path, methods: &Path) -> Vec<String> {
    vec![
        "--patterns".to_string(),
        patterns.display().to_string(),
        "--file".to_string(),
        secrets.display().to_string(),
        "--methods".to_string(),
        methods.display().to_string(),
    ]
}

const TEST_PATTERNS: &str = r#"[{"name": "Test Key", "regex": "sk-[A-Za-z0-9]{10}"}]"#;

#[test]
fn validate_labels_token_valid_on_stub_success() {
    let dir = TempDir::new().unwrap();
    let patterns = write_fixture(&dir, "regex.json", TEST_PATTERNS);
    let secrets = write_fixture(&dir, "secrets.txt", "sk-ABCDEFGHIJ");
    let methods = write_fixture(
        &dir,
        "methods.yaml",
        "tokens:\n  - name: \"Test Key\"\n    verification_method: \"echo checked $token$ status 200\"\n",
    );

    keyhawk()
        .args(full_args(&patterns, &secrets, &methods))
        .arg("--validate")
        .assert()
        .success()
        .stdout(predicate::str::contains("Validating 1 token..."))
        .stdout(predicate::str::contains("sk-ABCDEFGHIJ [Valid]"));
}

#[test]
fn validate_labels_token_invalid_on_stub_failure() {
    let dir = TempDir::new().unwrap();
    let patterns = write_fixture(&dir, "regex.json", TEST_PATTERNS);
    let secrets = write_fixture(&dir, "secrets.txt", "sk-ABCDEFGHIJ");
    let methods = write_fixture(
        &dir,
        "methods.yaml",
        "tokens:\n  - name: \"Test Key\"\n    verification_method: \"sh -c 'exit 1'\"\n",
    );

    keyhawk()
        .args(full_args(&patterns, &secrets, &methods))
        .arg("--validate")
        .assert()
        .success()
        .stdout(predicate::str::contains("sk-ABCDEFGHIJ [Invalid]"));
}

#[test]
fn validate_labels_unverifiable_token_explicitly() {
    let dir = TempDir::new().unwrap();
    let patterns = write_fixture(&dir, "regex.json", TEST_PATTERNS);
    let secrets = write_fixture(&dir, "secrets.txt", "sk-ABCDEFGHIJ");
    let methods = write_fixture(
        &dir,
        "methods.yaml",
        "tokens:\n  - name: \"Other Key\"\n    verification_method: \"echo 200\"\n",
    );

    keyhawk()
        .args(full_args(&patterns, &secrets, &methods))
        .arg("--validate")
        .assert()
        .success()
        .stdout(predicate::str::contains("sk-ABCDEFGHIJ [No verification method]"))
        .stdout(predicate::str::contains("[Invalid]").not());
}

#[test]
fn heroku_requires_array_shaped_response() {
    let dir = TempDir::new().unwrap();
    let patterns = write_fixture(
        &dir,
        "regex.json",
        r#"[{"name": "Heroku API Key", "regex": "hrku-[A-Za-z0-9]{8}"}]"#,
    );
    let secrets = write_fixture(&dir, "secrets.txt", "hrku-AAAABBBB");
    let methods = write_fixture(
        &dir,
        "methods.yaml",
        "tokens:\n  - name: \"Heroku API Key\"\n    verification_method: \"echo '{\\\"id\\\":\\\"123\\\"}'\"\n",
    );

    keyhawk()
        .args(full_args(&patterns, &secrets, &methods))
        .arg("--validate")
        .assert()
        .success()
        .stdout(predicate::str::contains("hrku-AAAABBBB [Invalid]"));
}

#[test]
fn mailchimp_without_datacenter_is_invalid() {
    let dir = TempDir::new().unwrap();
    let patterns = write_fixture(
        &dir,
        "regex.json",
        r#"[{"name": "Mailchimp API Key", "regex": "[a-z]{3}-noDC"}]"#,
    );
    let secrets = write_fixture(&dir, "secrets.txt", "key-noDC");
    let methods = write_fixture(
        &dir,
        "methods.yaml",
        "tokens:\n  - name: \"Mailchimp API Key\"\n    verification_method: \"echo 200 $dc$\"\n",
    );

    keyhawk()
        .args(full_args(&patterns, &secrets, &methods))
        .arg("--validate")
        .assert()
        .success()
        .stdout(predicate::str::contains("key-noDC [Invalid]"));
}

#[test]
fn manual_flag_prints_substituted_command() {
    let dir = TempDir::new().unwrap();
    let patterns = write_fixture(&dir, "regex.json", TEST_PATTERNS);
    let secrets = write_fixture(&dir, "secrets.txt", "sk-ABCDEFGHIJ");
    let methods = write_fixture(
        &dir,
        "methods.yaml",
        "tokens:\n  - name: \"Test Key\"\n    verification_method: \"curl -s https://example.com/check?key=$token$\"\n",
    );

    keyhawk()
        .args(full_args(&patterns, &secrets, &methods))
        .arg("--manual")
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "Manual test: curl -s https://example.com/check?key=sk-ABCDEFGHIJ",
        ))
        // Display only: nothing was executed, so no verification labels.
        .stdout(predicate::str::contains("[Valid]").not());
}

#[test]
fn manual_mailchimp_command_falls_back_to_us1() {
    let dir = TempDir::new().unwrap();
    let patterns = write_fixture(
        &dir,
        "regex.json",
        r#"[{"name": "Mailchimp API Key", "regex": "[a-z]{3}-noDC"}]"#,
    );
    let secrets = write_fixture(&dir, "secrets.txt", "key-noDC");
    let methods = write_fixture(
        &dir,
        "methods.yaml",
        "tokens:\n  - name: \"Mailchimp API Key\"\n    verification_method: \"curl -s https://$dc$.api.mailchimp.com/3.0/?apikey=$token$\"\n",
    );

    keyhawk()
        .args(full_args(&patterns, &secrets, &methods))
        .arg("--manual")
        .assert()
        .success()
        .stdout(predicate::str::contains("https://us1.api.mailchimp.com/3.0/?apikey=key-noDC"));
}

#[test]
fn missing_method_file_exits_with_config_error() {
    let dir = TempDir::new().unwrap();
    let patterns = write_fixture(&dir, "regex.json", TEST_PATTERNS);
    let secrets = write_fixture(&dir, "secrets.txt", "sk-ABCDEFGHIJ");

    keyhawk()
        .args(full_args(&patterns, &secrets, &dir.path().join("absent.yaml")))
        .arg("--validate")
        .assert()
        .code(2)
        .stderr(predicate::str::contains("loading verification methods"));
}

#[test]
fn malformed_method_file_exits_with_config_error() {
    let dir = TempDir::new().unwrap();
    let patterns = write_fixture(&dir, "regex.json", TEST_PATTERNS);
    let secrets = write_fixture(&dir, "secrets.txt", "sk-ABCDEFGHIJ");
    let methods = write_fixture(&dir, "methods.yaml", "tokens: [unclosed");

    keyhawk()
        .args(full_args(&patterns, &secrets, &methods))
        .arg("--validate")
        .assert()
        .code(2)
        .stderr(predicate::str::contains("failed to parse verification methods"));
}

#[test]
fn validate_with_concurrency_override_still_gathers_all_outcomes() {
    let dir = TempDir::new().unwrap();
    let patterns = write_fixture(
        &dir,
        "regex.json",
        r#"[{"name": "Test Key", "regex": "sk-[A-Za-z0-9]{10}"}]"#,
    );
    let secrets = write_fixture(&dir, "secrets.txt", "sk-AAAAAAAAAA sk-BBBBBBBBBB sk-CCCCCCCCCC");
    let methods = write_fixture(
        &dir,
        "methods.yaml",
        "tokens:\n  - name: \"Test Key\"\n    verification_method: \"echo ok $token$\"\n",
    );

    keyhawk()
        .args(full_args(&patterns, &secrets, &methods))
        .args(["--validate", "--concurrency", "2"])
        .assert()
        .success()
        .stdout(predicate::str::contains("sk-AAAAAAAAAA [Valid]"))
        .stdout(predicate::str::contains("sk-BBBBBBBBBB [Valid]"))
        .stdout(predicate::str::contains("sk-CCCCCCCCCC [Valid]"))
        .stdout(predicate::str::contains("Total unique matches found: 3"));
}
