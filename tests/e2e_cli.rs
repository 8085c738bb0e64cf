//! E2E tests for the auxiliary commands.

mod common;

use assert_cmd::Command;
use common::cli::{ReportWorkspace, run_report};
use predicates::prelude::*;
use serde_json::Value;

#[test]
fn e2e_completions_cover_subcommands() {
    let workspace = ReportWorkspace::new();
    let run = run_report(&workspace, ["completions", "bash"]);
    assert!(run.status.success(), "completions failed: {}", run.stderr);
    for word in ["runreport", "render", "theme", "--json", "--slug-mode"] {
        assert!(run.stdout.contains(word), "missing {word}");
    }
}

#[test]
fn e2e_completions_write_to_file() {
    let workspace = ReportWorkspace::new();
    let run = run_report(&workspace, ["completions", "zsh", "-o", "_runreport"]);
    assert!(run.status.success(), "completions failed: {}", run.stderr);
    assert!(run.stderr.contains("Generated zsh completions"));
    assert!(workspace.read("_runreport").contains("#compdef runreport"));
}

#[test]
fn e2e_version_text_and_json() {
    let workspace = ReportWorkspace::new();
    let run = run_report(&workspace, ["version"]);
    assert!(run.status.success());
    assert!(run.stdout.starts_with(&format!("runreport {}", env!("CARGO_PKG_VERSION"))));

    let run = run_report(&workspace, ["version", "--json"]);
    let version: Value = serde_json::from_str(&run.stdout).expect("version JSON");
    assert_eq!(version["version"], env!("CARGO_PKG_VERSION"));
    assert!(version["vega_lite"].as_str().unwrap().starts_with("https://"));
}

#[test]
fn e2e_unknown_command_fails() {
    let workspace = ReportWorkspace::new();
    let run = run_report(&workspace, ["publish"]);
    assert!(!run.status.success());
}

#[test]
fn e2e_help_lists_commands() {
    Command::new(assert_cmd::cargo::cargo_bin!("runreport"))
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("render").and(predicate::str::contains("theme")));
}
