use std::fs;
use std::io::Write;
use std::os::unix::fs::PermissionsExt;
use std::path::Path;
use std::process::{Command, Output, Stdio};

use tempfile::TempDir;

fn run_script(home: &Path, script: &str) -> Output {
    run_bytes(home, script.as_bytes())
}

fn run_bytes(home: &Path, input: &[u8]) -> Output {
    let mut child = Command::new(env!("CARGO_BIN_EXE_tsh"))
        .env("HOME", home)
        .env_remove("RUST_LOG")
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .unwrap();

    child
        .stdin
        .take()
        .unwrap()
        .write_all(input)
        .unwrap();
    child.wait_with_output().unwrap()
}

fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).into_owned()
}

fn stderr(output: &Output) -> String {
    String::from_utf8_lossy(&output.stderr).into_owned()
}

#[test]
fn test_cd_then_pwd_without_prompt() {
    let home = TempDir::new().unwrap();
    let output = run_script(home.path(), "cd /tmp\npwd\n");

    let tmp = fs::canonicalize("/tmp").unwrap();
    assert!(output.status.success());
    assert_eq!(stdout(&output), format!("{}\n", tmp.display()));
}

#[test]
fn test_output_redirection() {
    let home = TempDir::new().unwrap();
    let out = home.path().join("out.txt");
    let output = run_script(home.path(), &format!("echo hi > {}\n", out.display()));

    assert!(output.status.success());
    assert_eq!(fs::read_to_string(&out).unwrap(), "hi\n");
    assert_eq!(stdout(&output), "");
}

#[test]
fn test_missing_input_reports_and_continues() {
    let home = TempDir::new().unwrap();
    let missing = home.path().join("missing.txt");
    let script = format!("cat < {}\ncd /\npwd\n", missing.display());
    let output = run_script(home.path(), &script);

    assert!(output.status.success());
    assert!(stderr(&output).contains("cannot read"));
    assert_eq!(stdout(&output), "/\n");
}

#[test]
fn test_cd_usage_error() {
    let home = TempDir::new().unwrap();
    let output = run_script(home.path(), "cd\ncd a b\n");

    assert!(output.status.success());
    assert_eq!(stderr(&output).matches("usage:").count(), 2);
}

#[test]
fn test_unknown_command() {
    let home = TempDir::new().unwrap();
    let output = run_script(home.path(), "definitely-not-a-command-xyz\n");

    assert!(output.status.success());
    assert!(stderr(&output).contains("command not found: definitely-not-a-command-xyz"));
}

#[test]
fn test_help_lists_builtins() {
    let home = TempDir::new().unwrap();
    let output = run_script(home.path(), "?\n");

    let listing = stdout(&output);
    let names: Vec<_> = listing
        .lines()
        .filter_map(|l| l.split(" - ").next())
        .collect();
    assert_eq!(names, vec!["?", "exit", "pwd", "cd"]);
}

#[test]
fn test_exit_stops_reading() {
    let home = TempDir::new().unwrap();
    let output = run_script(home.path(), "exit\npwd\n");

    assert_eq!(output.status.code(), Some(0));
    assert_eq!(stdout(&output), "");
}

#[test]
fn test_startup_file_sets_path() {
    let home = TempDir::new().unwrap();
    let bin = home.path().join("bin");
    fs::create_dir(&bin).unwrap();
    let tool = bin.join("only-in-rc");
    fs::write(&tool, "#!/bin/sh\necho from-rc\n").unwrap();
    fs::set_permissions(&tool, fs::Permissions::from_mode(0o755)).unwrap();
    fs::write(home.path().join(".tshrc"), "PATH=$HOME/bin:$PATH\n").unwrap();

    let output = run_script(home.path(), "only-in-rc\n");

    assert!(output.status.success());
    assert_eq!(stdout(&output), "from-rc\n");
}

#[test]
fn test_nonzero_status_is_reported() {
    let home = TempDir::new().unwrap();
    let output = run_script(home.path(), "sh -c false\n");

    assert!(output.status.success());
    assert!(stderr(&output).contains("Process exited with status"));
}

#[test]
fn test_version_flag() {
    let output = Command::new(env!("CARGO_BIN_EXE_tsh"))
        .arg("--version")
        .output()
        .unwrap();

    assert!(output.status.success());
    assert!(stdout(&output).starts_with("tsh "));
}

#[test]
fn test_invalid_utf8_line_does_not_end_the_loop() {
    let home = TempDir::new().unwrap();
    let output = run_bytes(home.path(), b"echo \xff\ncd /\npwd\n");

    assert!(output.status.success());
    assert_eq!(stdout(&output), "\u{fffd}\n/\n");
}

#[test]
fn test_exec_failure_reports_os_error() {
    let home = TempDir::new().unwrap();
    let notes = home.path().join("notes.txt");
    fs::write(&notes, "just text\n").unwrap();
    fs::set_permissions(&notes, fs::Permissions::from_mode(0o644)).unwrap();

    let output = run_script(home.path(), &format!("{}\n", notes.display()));

    assert!(output.status.success());
    let expected = format!(
        "tsh: cannot execute {}: os error {}",
        notes.display(),
        libc::EACCES
    );
    assert!(stderr(&output).contains(&expected), "{}", stderr(&output));
}

