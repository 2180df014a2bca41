use std::fs;
use std::path::Path;
use std::process::{Command, Output, Stdio};

use tempfile::TempDir;

const LOG: &str = r#"{"session_id":"s1","timestamp":"2024-01-01T00:00:00","from":"claude_code","to":"clawbot","message":"Deploy the api"}
{"session_id":"s2","timestamp":"2024-01-01T00:00:02","from":"clawbot","to":"claude_code","message":"deploy done"}
{"session_id":"s1","timestamp":"2024-01-01T00:00:05","from":"clawbot","to":"claude_code","message":"ack"}
"#;

/// Run the binary against `log` with an isolated home and config dir.
fn run(home: &Path, log: &Path, args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_collab_session"))
        .arg("--no-color")
        .args(args)
        .env("HOME", home)
        .env("XDG_CONFIG_HOME", home.join("config"))
        .env("COLLAB_FILE", log)
        .env_remove("RUST_LOG")
        .output()
        .unwrap()
}

fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).into_owned()
}

fn setup() -> (TempDir, std::path::PathBuf) {
    let dir = TempDir::new().unwrap();
    let log = dir.path().join("collab").join("collaboration.jsonl");
    fs::create_dir_all(log.parent().unwrap()).unwrap();
    fs::write(&log, LOG).unwrap();
    (dir, log)
}

#[test]
fn test_missing_log_reports_no_history() {
    let dir = TempDir::new().unwrap();
    let log = dir.path().join("absent.jsonl");

    for args in [&["list"][..], &["tail"], &["stats"]] {
        let output = run(dir.path(), &log, args);
        assert!(output.status.success());
        assert!(stdout(&output).contains("No collaboration history yet."));
    }

    let output = run(dir.path(), &log, &["search", "x"]);
    assert!(output.status.success());
    assert!(stdout(&output).contains("No results for 'x'"));

    assert!(!log.exists());
}

#[test]
fn test_default_command_is_list() {
    let (dir, log) = setup();

    let output = run(dir.path(), &log, &[]);

    assert!(output.status.success());
    let out = stdout(&output);
    assert!(out.contains("2 session(s) total, 3 events"));
    assert!(out.find("s1").unwrap() < out.find("s2").unwrap());
}

#[test]
fn test_unknown_command_prints_usage() {
    let (dir, log) = setup();

    for args in [&["frobnicate"][..], &["show"], &["export"], &["search"], &["help"]] {
        let output = run(dir.path(), &log, args);
        assert!(output.status.success());
        assert!(stdout(&output).contains("Usage:"));
    }
}

#[test]
fn test_show_not_found_exits_zero() {
    let (dir, log) = setup();

    let output = run(dir.path(), &log, &["show", "nope"]);

    assert!(output.status.success());
    assert!(stdout(&output).contains("Session 'nope' not found."));
}

#[test]
fn test_tail_rejects_non_numeric_count() {
    let (dir, log) = setup();

    let output = run(dir.path(), &log, &["tail", "ten"]);

    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("ten"));
}

#[test]
fn test_search_joins_keyword_words() {
    let (dir, log) = setup();

    let output = run(dir.path(), &log, &["search", "deploy", "the"]);

    assert!(output.status.success());
    let out = stdout(&output);
    assert!(out.contains("Search results for 'deploy the' (1 found)"));
    assert!(out.contains("Session: s1"));
}

#[test]
fn test_export_writes_file_next_to_log() {
    let (dir, log) = setup();

    let output = run(dir.path(), &log, &["export", "s1"]);

    assert!(output.status.success());
    let exported = log.parent().unwrap().join("export_s1.txt");
    let text = fs::read_to_string(&exported).unwrap();
    assert!(text.starts_with("ClaudeXClaw Collaboration Session Export\nSession ID: s1\n"));
    assert!(text.contains("Claude Code → Clawbot\nDeploy the api\n"));
    let out = stdout(&output);
    assert!(out.contains(&text));
    assert!(out.contains("Exported to:"));
}

#[test]
fn test_stats_json_output() {
    let (dir, log) = setup();

    let output = run(dir.path(), &log, &["stats", "--json"]);

    assert!(output.status.success());
    let stats: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(stats["total_events"], 3);
    assert_eq!(stats["sessions"], 2);
    assert_eq!(stats["by_direction"]["clawbot → claude_code"], 2);
    assert_eq!(stats["first_event"], "2024-01-01T00:00:00");
}

#[test]
fn test_config_file_selects_log() {
    let (dir, log) = setup();
    let config_dir = dir.path().join("config").join("collab");
    fs::create_dir_all(&config_dir).unwrap();
    fs::write(
        config_dir.join("config.toml"),
        format!("log_file = {:?}\n", log.display().to_string()),
    )
    .unwrap();

    let output = Command::new(env!("CARGO_BIN_EXE_collab_session"))
        .args(["list", "--no-color"])
        .env("HOME", dir.path())
        .env("XDG_CONFIG_HOME", dir.path().join("config"))
        .env_remove("COLLAB_FILE")
        .env_remove("RUST_LOG")
        .output()
        .unwrap();

    assert!(output.status.success());
    assert!(stdout(&output).contains("2 session(s) total, 3 events"));
}

#[test]
fn test_extra_arguments_after_command_are_ignored() {
    let (dir, log) = setup();

    let output = run(dir.path(), &log, &["show", "s1", "extra"]);
    assert!(output.status.success());
    assert!(stdout(&output).contains("Session: s1"));

    let output = run(dir.path(), &log, &["stats", "extra"]);
    assert!(output.status.success());
    assert!(stdout(&output).contains("Total events:      3"));

    let output = run(dir.path(), &log, &["list", "extra"]);
    assert!(output.status.success());
    assert!(stdout(&output).contains("2 session(s) total, 3 events"));

    let output = run(dir.path(), &log, &["tail", "1", "extra"]);
    assert!(output.status.success());
    assert!(stdout(&output).contains("Last 1 collaboration events"));

    let output = run(dir.path(), &log, &["export", "s1", "extra"]);
    assert!(output.status.success());
    assert!(log.parent().unwrap().join("export_s1.txt").exists());
}

#[test]
fn test_search_echoes_keyword_lowercased() {
    let (dir, log) = setup();

    let output = run(dir.path(), &log, &["search", "DEPLOY"]);

    assert!(output.status.success());
    assert!(stdout(&output).contains("Search results for 'deploy' (2 found)"));
}

#[test]
fn test_closed_reader_exits_cleanly() {
    let (dir, log) = setup();

    let mut child = Command::new(env!("CARGO_BIN_EXE_collab_session"))
        .args(["--no-color", "list"])
        .env("HOME", dir.path())
        .env("XDG_CONFIG_HOME", dir.path().join("config"))
        .env("COLLAB_FILE", &log)
        .env_remove("RUST_LOG")
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .unwrap();
    drop(child.stdout.take());

    let output = child.wait_with_output().unwrap();

    assert!(output.status.success());
    assert!(!String::from_utf8_lossy(&output.stderr).contains("panicked"));
}
