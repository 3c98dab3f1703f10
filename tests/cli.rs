//! Drives the `revu` binary the way a user would.

use std::path::Path;
use std::process::{Command, Output};

use tempfile::TempDir;

fn revu(dir: &Path, args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_revu"))
        .current_dir(dir)
        .arg("--color")
        .arg("never")
        .args(args)
        .env_remove("RUST_LOG")
        .output()
        .expect("failed to run revu")
}

fn stdout(output: &Output) -> String {
    String::from_utf8(output.stdout.clone()).unwrap()
}

#[test]
fn test_cli_workflow() {
    let dir = TempDir::new().unwrap();

    let init = revu(dir.path(), &["init"]);
    assert!(init.status.success());
    assert!(stdout(&init).contains("Initialized empty revu repository"));

    let again = revu(dir.path(), &["init"]);
    assert!(again.status.success());
    assert!(stdout(&again).contains("Already initialized"));

    std::fs::write(dir.path().join("hello.txt"), "hi\n").unwrap();
    let add = revu(dir.path(), &["add", "hello.txt"]);
    assert!(add.status.success());
    let add_out = stdout(&add);
    let mut lines = add_out.lines();
    assert_eq!(lines.next().unwrap().len(), 64);
    assert_eq!(lines.next().unwrap(), "Added hello.txt");

    let commit = revu(dir.path(), &["commit", "first"]);
    assert!(commit.status.success());
    let commit_out = stdout(&commit);
    let digest = commit_out
        .trim()
        .strip_prefix("Commit Successfully created: ")
        .unwrap()
        .to_string();

    let log = revu(dir.path(), &["log"]);
    let log_out = stdout(&log);
    assert!(log_out.contains(&format!("Commit: {}", digest)));
    assert!(log_out.contains("first"));

    let show = revu(dir.path(), &["show", &digest]);
    assert!(show.status.success());
    let show_out = stdout(&show);
    assert!(show_out.contains("File: hello.txt"));
    assert!(show_out.contains("First Commit"));
}

#[test]
fn test_cli_errors_exit_nonzero() {
    let dir = TempDir::new().unwrap();

    let uninitialized = revu(dir.path(), &["log"]);
    assert!(!uninitialized.status.success());
    assert!(String::from_utf8_lossy(&uninitialized.stderr).contains("not a revu repository"));

    assert!(revu(dir.path(), &["init"]).status.success());

    let missing = revu(dir.path(), &["add", "missing.txt"]);
    assert!(!missing.status.success());
    assert!(String::from_utf8_lossy(&missing.stderr).contains("failed to read missing.txt"));

    let bad_digest = revu(dir.path(), &["show", "xyz"]);
    assert!(!bad_digest.status.success());
}
