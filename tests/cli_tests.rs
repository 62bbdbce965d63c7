//! Command-line behaviour of the `bibpmc` binary.
//!
//! None of these reach the network: every run fails validation or DOI
//! extraction before the first request.

use std::path::Path;
use std::process::{Command, Output};

fn bibpmc(dir: &Path, args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_bibpmc"))
        .current_dir(dir)
        .args(args)
        .env_remove("RUST_LOG")
        .output()
        .unwrap()
}

#[cfg(unix)]
fn assert_fatal(output: &Output) {
    assert_eq!(output.status.code(), Some(255));
}

#[cfg(not(unix))]
fn assert_fatal(output: &Output) {
    assert!(!output.status.success());
}

#[test]
fn test_help() {
    let dir = tempfile::tempdir().unwrap();
    let output = bibpmc(dir.path(), &["--help"]);

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Usage"));
    assert!(stdout.contains("--include-existing"));
    assert!(stdout.contains("--no-month-integer"));
    assert!(stdout.contains("--out-bib"));
    assert!(stdout.contains("--disable-file-logging"));
}

#[test]
fn test_version() {
    let dir = tempfile::tempdir().unwrap();
    let output = bibpmc(dir.path(), &["--version"]);

    assert!(output.status.success());
    assert!(String::from_utf8_lossy(&output.stdout).contains(env!("CARGO_PKG_VERSION")));
}

#[test]
fn test_missing_input_file() {
    let dir = tempfile::tempdir().unwrap();
    let output = bibpmc(
        dir.path(),
        &["tester@example.com", "missing.bib", "--disable-file-logging"],
    );

    assert_fatal(&output);
    assert!(String::from_utf8_lossy(&output.stderr).contains("missing.bib"));
}

#[test]
fn test_invalid_email() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("refs.bib"), "@article{a, doi = {10.1/x}}").unwrap();

    let output = bibpmc(
        dir.path(),
        &["not-an-email", "refs.bib", "--disable-file-logging"],
    );

    assert_fatal(&output);
    assert!(String::from_utf8_lossy(&output.stderr).contains("not-an-email"));
    assert!(!dir.path().join("refs_BibPMC.bib").exists());
}

#[test]
fn test_no_dois() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("refs.bib"), "@book{a, title = {T}}").unwrap();

    let output = bibpmc(dir.path(), &["tester@example.com", "refs.bib"]);

    assert_fatal(&output);
    assert!(String::from_utf8_lossy(&output.stderr).contains("No DOIs found"));

    // The log file records the same run
    let log = std::fs::read_to_string(dir.path().join("BibPMC.log")).unwrap();
    assert!(log.contains("No DOIs found"));
}

#[test]
fn test_disable_file_logging_removes_old_log() {
    let dir = tempfile::tempdir().unwrap();
    let log = dir.path().join("BibPMC.log");
    std::fs::write(&log, "previous run\n").unwrap();
    std::fs::write(dir.path().join("refs.bib"), "@book{a, title = {T}}").unwrap();

    let output = bibpmc(
        dir.path(),
        &["tester@example.com", "refs.bib", "--disable-file-logging"],
    );

    assert_fatal(&output);
    assert!(!log.exists());
    assert!(String::from_utf8_lossy(&output.stderr).contains("removed log file"));
}

#[test]
fn test_invalid_config_file() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("broken.toml"), "service = = 1").unwrap();

    let output = bibpmc(
        dir.path(),
        &[
            "tester@example.com",
            "refs.bib",
            "--config",
            "broken.toml",
            "--disable-file-logging",
        ],
    );

    assert_fatal(&output);
    assert!(String::from_utf8_lossy(&output.stderr).contains("configuration"));
}

#[test]
fn test_verbose_reports_config_file() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("bibpmc.toml"), "[output]\nsuffix = \"_ids.bib\"\n").unwrap();
    std::fs::write(dir.path().join("refs.bib"), "@book{a, title = {T}}").unwrap();

    let output = bibpmc(
        dir.path(),
        &["tester@example.com", "refs.bib", "-v", "--disable-file-logging"],
    );

    assert_fatal(&output);
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("using configuration file bibpmc.toml"));
}
