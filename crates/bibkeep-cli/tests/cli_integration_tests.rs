//! CLI integration tests
//!
//! These tests run the `bibkeep` binary in a scratch working directory and
//! check its output, exit status and the files it leaves behind.

use std::fs;
use std::path::Path;
use std::process::{Command, Output};
use tempfile::TempDir;

const MESSY: &str = "\
@ARTICLE{milner78, author={Robin Milner},
title = \"A Theory of Type Polymorphism in Programming\", year=1978}
";

fn setup_workspace() -> TempDir {
    let temp_dir = TempDir::new().unwrap();
    fs::write(temp_dir.path().join("refs.bib"), MESSY).unwrap();
    temp_dir
}

fn bibkeep(dir: &Path, args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_bibkeep"))
        .current_dir(dir)
        .args(args)
        .output()
        .expect("Failed to execute CLI")
}

fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).to_string()
}

fn stderr(output: &Output) -> String {
    String::from_utf8_lossy(&output.stderr).to_string()
}

/// Last whitespace-separated word of the first stdout line
fn reported_id(output: &Output) -> String {
    stdout(output)
        .lines()
        .next()
        .and_then(|line| line.split_whitespace().last())
        .unwrap()
        .to_string()
}

fn set_year(dir: &Path, year: &str) {
    let path = dir.join("refs.bib");
    let text = fs::read_to_string(&path).unwrap();
    let start = text.find("year").unwrap();
    let end = start + text[start..].find(',').unwrap();
    let updated = format!("{}year = {}{}", &text[..start], year, &text[end..]);
    fs::write(&path, updated).unwrap();
}

#[test]
fn test_cli_fmt_rewrites_file_canonically() {
    // Scenario: a hand-edited file is reformatted
    // When: `bibkeep fmt refs.bib`
    // Then: the file is rewritten with aligned fields and lowercase kinds

    let temp_dir = setup_workspace();

    let output = bibkeep(temp_dir.path(), &["fmt", "refs.bib"]);
    assert!(output.status.success(), "stderr: {}", stderr(&output));

    let text = fs::read_to_string(temp_dir.path().join("refs.bib")).unwrap();
    assert!(text.starts_with("@article{milner78,\n"));
    assert!(text.contains("  author = {Robin Milner},\n"));
    assert!(text.contains("  title  = \"A Theory of Type Polymorphism in Programming\",\n"));
    assert!(text.contains("  year   = 1978,\n"));
    assert!(text.ends_with("}\n"));
}

#[test]
fn test_cli_fmt_check_reports_unformatted_file() {
    // Scenario: --check never writes
    // When: `bibkeep fmt --check` runs before and after formatting
    // Then: it fails first, leaving the file alone, and passes afterwards

    let temp_dir = setup_workspace();

    let output = bibkeep(temp_dir.path(), &["fmt", "refs.bib", "--check"]);
    assert!(!output.status.success());
    assert!(stderr(&output).contains("is not formatted"));
    assert_eq!(
        fs::read_to_string(temp_dir.path().join("refs.bib")).unwrap(),
        MESSY
    );

    assert!(bibkeep(temp_dir.path(), &["fmt", "refs.bib"]).status.success());

    let output = bibkeep(temp_dir.path(), &["fmt", "refs.bib", "--check"]);
    assert!(output.status.success());
    assert!(stdout(&output).contains("is formatted"));
}

#[test]
fn test_cli_fmt_reports_decode_error() {
    // Scenario: malformed input
    // When: a quoted value closes a brace it never opened
    // Then: the command fails with the decode error code and position

    let temp_dir = TempDir::new().unwrap();
    fs::write(temp_dir.path().join("bad.bib"), "@misc{k, title = \"a}b\"}\n").unwrap();

    let output = bibkeep(temp_dir.path(), &["fmt", "bad.bib"]);
    assert_eq!(output.status.code(), Some(1));
    let err = stderr(&output);
    assert!(err.contains("Error:"));
    assert!(err.contains("ERR_DECODE"));
    assert!(err.contains("line 1"));
}

#[test]
fn test_cli_missing_file_fails() {
    let temp_dir = TempDir::new().unwrap();

    let output = bibkeep(temp_dir.path(), &["commit", "nowhere.bib"]);
    assert_eq!(output.status.code(), Some(1));
    assert!(stderr(&output).contains("ERR_NOT_FOUND"));
}

#[test]
fn test_cli_commit_undo_redo_cycle() {
    // Scenario: edit, commit, step back and forward
    // When: two commits are followed by undo and redo
    // Then: the working file follows the current commit

    let temp_dir = setup_workspace();
    let file = temp_dir.path().join("refs.bib");

    let output = bibkeep(temp_dir.path(), &["commit", "refs.bib"]);
    assert!(output.status.success(), "stderr: {}", stderr(&output));
    assert!(stdout(&output).starts_with("Initialized history of refs.bib at "));
    let root = reported_id(&output);
    assert_eq!(root.len(), 32);
    let original = fs::read_to_string(&file).unwrap();

    set_year(temp_dir.path(), "1979");
    let output = bibkeep(temp_dir.path(), &["commit", "refs.bib", "-m", "fix year"]);
    assert!(output.status.success(), "stderr: {}", stderr(&output));
    assert!(stdout(&output).contains(&format!("(parent: {})", root)));
    let edited = fs::read_to_string(&file).unwrap();
    assert!(edited.contains("year   = 1979"));

    let output = bibkeep(temp_dir.path(), &["undo", "refs.bib"]);
    assert!(output.status.success(), "stderr: {}", stderr(&output));
    assert!(stdout(&output).contains(&format!("to {}", root)));
    assert_eq!(fs::read_to_string(&file).unwrap(), original);

    let output = bibkeep(temp_dir.path(), &["redo", "refs.bib", "-n", "1"]);
    assert!(output.status.success(), "stderr: {}", stderr(&output));
    assert_eq!(fs::read_to_string(&file).unwrap(), edited);
}

#[test]
fn test_cli_commit_without_changes() {
    let temp_dir = setup_workspace();

    let first = bibkeep(temp_dir.path(), &["commit", "refs.bib"]);
    assert!(first.status.success());
    let root = reported_id(&first);

    let again = bibkeep(temp_dir.path(), &["commit", "refs.bib"]);
    assert!(again.status.success());
    assert_eq!(stdout(&again).trim(), format!("No changes since {}", root));
}

#[test]
fn test_cli_undo_past_root_is_a_warning() {
    // Scenario: refused navigation
    // When: undo is requested on a single-commit history
    // Then: a warning is printed, the exit status is 0 and the file is untouched

    let temp_dir = setup_workspace();
    assert!(bibkeep(temp_dir.path(), &["init", "refs.bib"]).status.success());
    let before = fs::read_to_string(temp_dir.path().join("refs.bib")).unwrap();

    let output = bibkeep(temp_dir.path(), &["undo", "refs.bib", "-n", "3"]);
    assert!(output.status.success());
    assert!(stderr(&output).contains("Warning:"));
    assert!(stderr(&output).contains("ERR_UNDO_PAST_ROOT"));
    assert_eq!(
        fs::read_to_string(temp_dir.path().join("refs.bib")).unwrap(),
        before
    );
}

#[test]
fn test_cli_untracked_document_is_a_warning() {
    let temp_dir = setup_workspace();

    let output = bibkeep(temp_dir.path(), &["log", "refs.bib"]);
    assert!(output.status.success());
    assert!(stderr(&output).contains("ERR_NOT_TRACKED"));
    assert!(!temp_dir.path().join("history").exists());
}

#[test]
fn test_cli_checkout_comment_and_show() {
    // Scenario: inspecting and restoring an older commit
    // When: the root commit is annotated, shown and checked out
    // Then: history lists the comment and the file returns to the root content

    let temp_dir = setup_workspace();
    let first = bibkeep(temp_dir.path(), &["commit", "refs.bib"]);
    assert!(first.status.success(), "stderr: {}", stderr(&first));
    let root = reported_id(&first);

    set_year(temp_dir.path(), "1980");
    assert!(bibkeep(temp_dir.path(), &["commit", "refs.bib"]).status.success());

    let output = bibkeep(temp_dir.path(), &["comment", "refs.bib", &root, "first import"]);
    assert!(output.status.success(), "stderr: {}", stderr(&output));

    let output = bibkeep(temp_dir.path(), &["show", "refs.bib", &root]);
    assert!(output.status.success());
    assert!(stdout(&output).contains("year   = 1978"));

    let output = bibkeep(temp_dir.path(), &["checkout", "refs.bib", &root]);
    assert!(output.status.success(), "stderr: {}", stderr(&output));
    let text = fs::read_to_string(temp_dir.path().join("refs.bib")).unwrap();
    assert!(text.contains("year   = 1978"));

    let output = bibkeep(temp_dir.path(), &["history", "refs.bib"]);
    assert!(output.status.success());
    let listing = stdout(&output);
    assert!(listing.contains(&format!("* {}", root)));
    assert!(listing.contains("first import"));
}

#[test]
fn test_cli_checkout_unknown_commit_is_a_warning() {
    let temp_dir = setup_workspace();
    assert!(bibkeep(temp_dir.path(), &["init", "refs.bib"]).status.success());

    let output = bibkeep(temp_dir.path(), &["checkout", "refs.bib", "deadbeef"]);
    assert!(output.status.success());
    assert!(stderr(&output).contains("ERR_INVALID_COMMIT"));
}

#[test]
fn test_cli_delete_and_ls() {
    let temp_dir = setup_workspace();
    fs::write(temp_dir.path().join("other.bib"), "").unwrap();
    fs::write(temp_dir.path().join("notes.txt"), "not a bibliography").unwrap();
    assert!(bibkeep(temp_dir.path(), &["init", "refs.bib"]).status.success());

    let output = bibkeep(temp_dir.path(), &["ls"]);
    assert!(output.status.success());
    assert_eq!(stdout(&output), "other.bib\nrefs.bib\ttracked\n");

    let output = bibkeep(temp_dir.path(), &["delete", "refs.bib"]);
    assert!(output.status.success());
    assert!(stdout(&output).contains("Deleted history of refs.bib"));

    let output = bibkeep(temp_dir.path(), &["delete", "refs.bib"]);
    assert!(output.status.success());
    assert!(stdout(&output).contains("No history to delete"));

    let output = bibkeep(temp_dir.path(), &["ls"]);
    assert_eq!(stdout(&output), "other.bib\nrefs.bib\n");
}

#[test]
fn test_cli_config_file_and_history_root_override() {
    // Scenario: configuration from a JSON file plus a flag override
    // When: the config sets an alignment and --history-root points elsewhere
    // Then: formatting uses the alignment and history lands in the override

    let temp_dir = setup_workspace();
    fs::write(
        temp_dir.path().join("bibkeep.json"),
        r#"{"align_column": 16}"#,
    )
    .unwrap();

    let output = bibkeep(
        temp_dir.path(),
        &[
            "--config",
            "bibkeep.json",
            "--history-root",
            "vault",
            "commit",
            "refs.bib",
        ],
    );
    assert!(output.status.success(), "stderr: {}", stderr(&output));

    let text = fs::read_to_string(temp_dir.path().join("refs.bib")).unwrap();
    assert!(text.contains("  author        = {Robin Milner},\n"));
    assert!(temp_dir
        .path()
        .join("vault")
        .join("hist_refs.bib")
        .join("tracker.json")
        .exists());
    assert!(!temp_dir.path().join("history").exists());

    let tracker: serde_json::Value = serde_json::from_str(
        &fs::read_to_string(
            temp_dir
                .path()
                .join("vault")
                .join("hist_refs.bib")
                .join("tracker.json"),
        )
        .unwrap(),
    )
    .unwrap();
    assert_eq!(tracker["BOTTOM"], tracker["TOP"]);
}

#[test]
fn test_cli_failed_commit_keeps_working_file() {
    // Scenario: commit against a damaged tracker
    // When: `bibkeep commit` cannot read the history
    // Then: it fails without reformatting the working file

    let temp_dir = setup_workspace();
    assert!(bibkeep(temp_dir.path(), &["init", "refs.bib"]).status.success());
    fs::write(
        temp_dir
            .path()
            .join("history")
            .join("hist_refs.bib")
            .join("tracker.json"),
        "{ not json",
    )
    .unwrap();

    let output = bibkeep(temp_dir.path(), &["commit", "refs.bib"]);
    assert_eq!(output.status.code(), Some(1));
    assert!(stderr(&output).contains("ERR_CORRUPT_TRACKER"));
    assert_eq!(
        fs::read_to_string(temp_dir.path().join("refs.bib")).unwrap(),
        MESSY
    );
}
