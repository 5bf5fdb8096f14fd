//! End-to-end tests driving the `tat` binary against a temp database.

use std::io::Write;
use std::path::Path;
use std::process::{Command, Output};

use tempfile::{NamedTempFile, TempDir};

fn tat_binary() -> String {
    env!("CARGO_BIN_EXE_tat").to_string()
}

/// A temp database plus a config file pointing at it.
struct Env {
    _dir: TempDir,
    config: NamedTempFile,
}

impl Env {
    fn new() -> Self {
        let dir = TempDir::new().unwrap();
        let db_path = dir.path().join("data").join("tat.db");

        let mut config = NamedTempFile::new().unwrap();
        writeln!(config, r#"database_path = "{}""#, db_path.display()).unwrap();
        config.flush().unwrap();

        Self { _dir: dir, config }
    }

    fn config_path(&self) -> &Path {
        self.config.path()
    }

    fn run(&self, args: &[&str]) -> Output {
        Command::new(tat_binary())
            .env_remove("TAT_DATABASE_PATH")
            .env_remove("RUST_LOG")
            .arg("--config")
            .arg(self.config_path())
            .args(args)
            .output()
            .expect("failed to run tat")
    }

    fn stdout(&self, args: &[&str]) -> String {
        let output = self.run(args);
        assert!(
            output.status.success(),
            "tat {args:?} failed: {}",
            String::from_utf8_lossy(&output.stderr)
        );
        String::from_utf8(output.stdout).unwrap()
    }
}

#[test]
fn test_backfilled_log_summaries_and_delete() {
    let env = Env::new();

    env.stdout(&["add", "work", "start", "--at", "2025-01-01T10:00:00Z"]);
    env.stdout(&["add", "work", "end", "--at", "2025-01-01T10:30:00Z"]);
    env.stdout(&["add", "email", "start", "--at", "2025-01-01T11:00:00Z"]);
    env.stdout(&["add", "email", "end", "--at", "2025-01-01T11:05:00Z"]);

    let summary = env.stdout(&["summary", "--json"]);
    let parsed: serde_json::Value = serde_json::from_str(&summary).unwrap();
    assert_eq!(
        parsed,
        serde_json::json!([
            {"task_name": "email", "total_secs": 300},
            {"task_name": "work", "total_secs": 1800},
        ])
    );

    // Deleting the End of "work" reopens it and leaves "email" untouched.
    let deleted = env.stdout(&["delete", "2"]);
    assert_eq!(deleted.trim(), "Deleted event 2.");

    let summary = env.stdout(&["summary", "--json"]);
    let parsed: serde_json::Value = serde_json::from_str(&summary).unwrap();
    assert_eq!(
        parsed,
        serde_json::json!([{"task_name": "email", "total_secs": 300}])
    );

    let history = env.stdout(&["history", "--json"]);
    let parsed: serde_json::Value = serde_json::from_str(&history).unwrap();
    let open: Vec<&serde_json::Value> = parsed
        .as_array()
        .unwrap()
        .iter()
        .filter(|entry| entry["end"].is_null())
        .collect();
    assert_eq!(open.len(), 1);
    assert_eq!(open[0]["task_name"], "work");
}

#[test]
fn test_start_stop_across_invocations() {
    let env = Env::new();

    let started = env.stdout(&["start", "deep work"]);
    assert!(started.starts_with("Started 'deep work' at "), "{started}");

    let status = env.stdout(&["status"]);
    assert!(status.contains("Running: deep work since "), "{status}");

    // A second start is rejected without writing anything.
    let rejected = env.stdout(&["start", "other"]);
    assert_eq!(
        rejected.trim(),
        "Nothing to do: task 'deep work' is already running."
    );

    let stopped = env.stdout(&["stop"]);
    assert!(stopped.starts_with("Stopped 'deep work' after "), "{stopped}");

    let records = env.stdout(&["records", "deep work", "--json"]);
    let parsed: serde_json::Value = serde_json::from_str(&records).unwrap();
    let actions: Vec<&str> = parsed
        .as_array()
        .unwrap()
        .iter()
        .map(|event| event["action"].as_str().unwrap())
        .collect();
    assert_eq!(actions, vec!["start", "end"]);

    let records = env.stdout(&["records", "other", "--json"]);
    assert_eq!(records.trim(), "[]");

    let again = env.stdout(&["stop"]);
    assert_eq!(again.trim(), "Nothing to do: no task running.");
}

#[test]
fn test_delete_missing_event_is_a_notice() {
    let env = Env::new();
    let output = env.stdout(&["delete", "99"]);
    assert_eq!(output.trim(), "Event 99 was already removed.");
}

#[test]
fn test_audit_reports_orphan_end() {
    let env = Env::new();
    env.stdout(&["add", "work", "end", "--at", "2025-01-01T09:00:00Z"]);

    let audit = env.stdout(&["audit"]);
    assert_eq!(
        audit.trim(),
        "- orphan end: event 1 (work) has no open start, ignored"
    );

    let summary = env.stdout(&["summary"]);
    assert_eq!(summary.trim(), "No completed tasks yet.");
}

#[test]
fn test_watch_with_tick_limit() {
    let env = Env::new();
    let output = env.stdout(&["watch", "--ticks", "1"]);
    assert_eq!(output, "No task\n");
}

#[test]
fn test_unwritable_database_fails_command() {
    let dir = TempDir::new().unwrap();
    // A directory where the database file should be.
    let db_path = dir.path().join("tat.db");
    std::fs::create_dir_all(&db_path).unwrap();

    let mut config = NamedTempFile::new().unwrap();
    writeln!(config, r#"database_path = "{}""#, db_path.display()).unwrap();
    config.flush().unwrap();

    let output = Command::new(tat_binary())
        .env_remove("TAT_DATABASE_PATH")
        .arg("--config")
        .arg(config.path())
        .arg("summary")
        .output()
        .unwrap();

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("failed to open"), "{stderr}");
}
