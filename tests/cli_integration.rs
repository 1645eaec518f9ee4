//! CLI integration tests for taskp
//!
//! These tests run the binary against real workspaces in temp directories,
//! from `init` through processing and inspecting documents.

use predicates::prelude::*;
use regex::Regex;
use serde_json::Value;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// Get a command instance for the taskp binary
fn taskp_cmd() -> assert_cmd::Command {
    let mut cmd = assert_cmd::Command::new(assert_cmd::cargo::cargo_bin!("taskp"));
    cmd.env_remove("RUST_LOG");
    cmd
}

/// Create a temporary directory and initialize a workspace
fn setup_workspace() -> TempDir {
    let dir = TempDir::new().unwrap();
    taskp_cmd().arg("init").arg(dir.path()).assert().success();
    dir
}

fn write(dir: &TempDir, name: &str, text: &str) -> PathBuf {
    let path = dir.path().join(name);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    fs::write(&path, text).unwrap();
    path
}

fn json_output(args: &[&str], cwd: &Path) -> Value {
    let output = taskp_cmd()
        .current_dir(cwd)
        .arg("--format")
        .arg("json")
        .args(args)
        .output()
        .unwrap();
    assert!(output.status.success(), "command failed: {:?}", args);
    serde_json::from_slice(&output.stdout).unwrap()
}

const DOC: &str = "[TASKS]
- Write the parser @alice
- Ship it

[ISSUES]
- old entry [gone.rs::3]

[USERS]
- alice
- albert
- bob

[SETTINGS]
Scanner.Keyword: TODO
Scanner.Keyword: FIXME
Scanner.Exclude: *.md
";

// =============================================================================
// Initialization Tests
// =============================================================================

#[test]
fn test_init_creates_config() {
    let dir = TempDir::new().unwrap();

    taskp_cmd()
        .arg("init")
        .arg(dir.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("Initialized taskpiea workspace"));

    assert!(dir.path().join("taskpiea.toml").is_file());
}

#[test]
fn test_init_is_idempotent() {
    let dir = TempDir::new().unwrap();

    taskp_cmd().arg("init").arg(dir.path()).assert().success();
    fs::write(dir.path().join("taskpiea.toml"), "[watch]\ndebounce_ms = 10\n").unwrap();
    taskp_cmd().arg("init").arg(dir.path()).assert().success();

    assert_eq!(
        fs::read_to_string(dir.path().join("taskpiea.toml")).unwrap(),
        "[watch]\ndebounce_ms = 10\n"
    );
}

// =============================================================================
// New Document Tests
// =============================================================================

#[test]
fn test_new_creates_starter_document_and_scans() {
    let dir = setup_workspace();
    write(&dir, "src/main.rs", "fn main() {\n    // TODO: parse args\n}\n");
    write(&dir, "README.md", "TODO: not scanned\n");

    taskp_cmd()
        .current_dir(dir.path())
        .arg("new")
        .assert()
        .success()
        .stdout(predicate::str::contains("Created tasks.taskp"));

    let text = fs::read_to_string(dir.path().join("tasks.taskp")).unwrap();
    assert!(text.contains("- Example task @alice [#A1B2C]"));
    assert!(text.contains("[ISSUES]\n- // TODO: parse args [src/main.rs::1]\n"));
    assert!(!text.contains("not scanned"));
}

#[test]
fn test_new_refuses_to_overwrite() {
    let dir = setup_workspace();
    write(&dir, "sprint.taskp", "mine");

    taskp_cmd()
        .current_dir(dir.path())
        .arg("new")
        .arg("sprint")
        .assert()
        .failure()
        .stderr(predicate::str::contains("already exists"));

    assert_eq!(fs::read_to_string(dir.path().join("sprint.taskp")).unwrap(), "mine");
}

// =============================================================================
// Process Tests
// =============================================================================

#[test]
fn test_process_assigns_ids_and_replaces_issues() {
    let dir = setup_workspace();
    let doc = write(&dir, "tasks.taskp", DOC);
    write(&dir, "src/lib.rs", "// FIXME: leaks\nlet todolist = 1;\n");
    write(&dir, "notes.md", "TODO: ignored\n");

    taskp_cmd()
        .arg("process")
        .arg(&doc)
        .assert()
        .success()
        .stdout(predicate::str::contains("2 task(s), 1 issue(s) (updated)"));

    let text = fs::read_to_string(&doc).unwrap();
    let tagged = Regex::new(r"(?m)^- Write the parser @alice \[#[A-Z0-9]{5}\]$").unwrap();
    assert!(tagged.is_match(&text));
    let tagged = Regex::new(r"(?m)^- Ship it \[#[A-Z0-9]{5}\]$").unwrap();
    assert!(tagged.is_match(&text));

    assert!(text.contains("[ISSUES]\n- // FIXME: leaks [src/lib.rs::0]\n[USERS]"));
    assert!(!text.contains("old entry"));
    assert!(!text.contains("ignored"));
    assert!(text.ends_with("[SETTINGS]\nScanner.Keyword: TODO\nScanner.Keyword: FIXME\nScanner.Exclude: *.md\n"));
}

#[test]
fn test_process_twice_is_stable() {
    let dir = setup_workspace();
    let doc = write(&dir, "tasks.taskp", DOC);
    write(&dir, "src/lib.rs", "// TODO: one\n");

    taskp_cmd().arg("process").arg(&doc).assert().success();
    let first = fs::read_to_string(&doc).unwrap();

    taskp_cmd()
        .arg("process")
        .arg(&doc)
        .assert()
        .success()
        .stdout(predicate::str::contains("(unchanged)"));
    assert_eq!(fs::read_to_string(&doc).unwrap(), first);
}

#[test]
fn test_process_regenerates_duplicate_ids() {
    let dir = setup_workspace();
    let doc = write(&dir, "tasks.taskp", "[TASKS]\n- a [#AAAAA]\n- b [#AAAAA]\n");

    taskp_cmd().arg("process").arg("--no-scan").arg(&doc).assert().success();

    let text = fs::read_to_string(&doc).unwrap();
    let lines: Vec<&str> = text.lines().collect();
    assert_eq!(lines[1], "- a [#AAAAA]");
    assert!(lines[2].starts_with("- b [#"));
    assert_ne!(lines[2], "- b [#AAAAA]");
}

#[test]
fn test_process_no_scan_keeps_issues() {
    let dir = setup_workspace();
    let doc = write(&dir, "tasks.taskp", DOC);
    write(&dir, "src/lib.rs", "// TODO: new\n");

    taskp_cmd().arg("process").arg("--no-scan").arg(&doc).assert().success();

    let text = fs::read_to_string(&doc).unwrap();
    assert!(text.contains("- old entry [gone.rs::3]"));
    assert!(!text.contains("TODO: new"));
}

#[test]
fn test_process_dry_run_prints_without_writing() {
    let dir = setup_workspace();
    let doc = write(&dir, "tasks.taskp", DOC);
    write(&dir, "src/lib.rs", "// TODO: new\n");

    taskp_cmd()
        .arg("process")
        .arg("--dry-run")
        .arg(&doc)
        .assert()
        .success()
        .stdout(predicate::str::contains("- // TODO: new [src/lib.rs::0]"));

    assert_eq!(fs::read_to_string(&doc).unwrap(), DOC);
}

#[test]
fn test_process_json_report() {
    let dir = setup_workspace();
    let doc = write(&dir, "tasks.taskp", DOC);
    write(&dir, "src/lib.rs", "// TODO: one\n// todo: two\n// TODOLIST three\n");

    let report = json_output(&["process", doc.to_str().unwrap()], dir.path());

    assert_eq!(report["issues"], 2);
    assert_eq!(report["written"], true);
    assert_eq!(report["tasks"].as_array().unwrap().len(), 2);
    assert_eq!(report["links"][1]["file"], "src/lib.rs");
    assert_eq!(report["links"][1]["line"], 1);
}

#[test]
fn test_process_without_issues_section_skips_scan() {
    let dir = setup_workspace();
    let doc = write(&dir, "tasks.taskp", "[TASKS]\n- a [#00001]\n\n[SETTINGS]\nScanner.Keyword: TODO\n");
    write(&dir, "src/lib.rs", "// TODO: one\n");

    taskp_cmd()
        .arg("process")
        .arg(&doc)
        .assert()
        .success()
        .stdout(predicate::str::contains("0 issue(s) (unchanged)"));
}

#[test]
fn test_process_missing_document_fails() {
    let dir = setup_workspace();

    taskp_cmd()
        .arg("process")
        .arg(dir.path().join("missing.taskp"))
        .assert()
        .failure()
        .stderr(predicate::str::contains("Error:"));
}

// =============================================================================
// Inspection Tests
// =============================================================================

#[test]
fn test_tasks_lists_without_writing() {
    let dir = setup_workspace();
    let doc = write(&dir, "tasks.taskp", "[TASKS]\n- a [#0000A]\n- b\n");

    let tasks = json_output(&["tasks", doc.to_str().unwrap()], dir.path());
    let tasks = tasks.as_array().unwrap();
    assert_eq!(tasks.len(), 2);
    assert_eq!(tasks[0]["name"], "a");
    assert_eq!(tasks[0]["id"], "0000A");
    assert_eq!(tasks[0]["generated"], false);
    assert_eq!(tasks[1]["name"], "b");
    assert_eq!(tasks[1]["generated"], true);

    assert_eq!(fs::read_to_string(&doc).unwrap(), "[TASKS]\n- a [#0000A]\n- b\n");
}

#[test]
fn test_tasks_marks_unsaved_ids() {
    let dir = setup_workspace();
    let doc = write(&dir, "tasks.taskp", "[TASKS]\n- a [#0000A]\n- b\n");

    taskp_cmd()
        .arg("tasks")
        .arg(&doc)
        .assert()
        .success()
        .stdout("0000A\ta\n-----\tb\n");

    taskp_cmd().arg("process").arg("--no-scan").arg(&doc).assert().success();

    taskp_cmd()
        .arg("tasks")
        .arg(&doc)
        .assert()
        .success()
        .stdout(predicate::str::contains("-----").not());
}

#[test]
fn test_users_lists_users() {
    let dir = setup_workspace();
    let doc = write(&dir, "tasks.taskp", DOC);

    taskp_cmd()
        .arg("users")
        .arg(&doc)
        .assert()
        .success()
        .stdout("alice\nalbert\nbob\n");
}

#[test]
fn test_complete_filters_after_at() {
    let dir = setup_workspace();
    let doc = write(&dir, "tasks.taskp", DOC);

    taskp_cmd()
        .arg("complete")
        .arg(&doc)
        .arg("- Review @al")
        .assert()
        .success()
        .stdout("alice\nalbert\n");

    taskp_cmd()
        .arg("complete")
        .arg(&doc)
        .arg("- Review ")
        .assert()
        .success()
        .stdout("");
}

#[test]
fn test_links_lists_issue_targets() {
    let dir = setup_workspace();
    let doc = write(&dir, "tasks.taskp", DOC);

    let links = json_output(&["links", doc.to_str().unwrap()], dir.path());
    let links = links.as_array().unwrap();
    assert_eq!(links.len(), 1);
    assert_eq!(links[0]["document_line"], 5);
    assert_eq!(links[0]["file"], "gone.rs");
    assert_eq!(links[0]["line"], 3);
}
