//! Basic CLI E2E tests.
//!
//! Every test runs the built `inkwell` binary against its own temporary
//! data directory.

use std::io::Write;
use std::process::{Command, Stdio};
use std::thread;
use std::time::{Duration, Instant};

use tempfile::TempDir;

/// Longest any single command may run before the test fails.
const DEADLINE: Duration = Duration::from_secs(20);

/// Run a CLI command and return (stdout, stderr, exit code).
///
/// Panics if the process is still running after [`DEADLINE`].
fn run_cli(dir: &TempDir, args: &[&str], stdin: Option<&str>) -> (String, String, i32) {
    let mut child = Command::new(env!("CARGO_BIN_EXE_inkwell"))
        .args(args)
        .env("INKWELL_DATA_DIR", dir.path())
        .env_remove("INKWELL_LOG")
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .expect("Failed to execute CLI command");

    {
        let mut pipe = child.stdin.take().expect("stdin");
        if let Some(input) = stdin {
            pipe.write_all(input.as_bytes()).expect("write stdin");
        }
    }

    let started = Instant::now();
    while child.try_wait().expect("poll CLI").is_none() {
        if started.elapsed() > DEADLINE {
            let _ = child.kill();
            panic!("CLI command {args:?} did not exit within {DEADLINE:?}");
        }
        thread::sleep(Duration::from_millis(50));
    }

    let output = child.wait_with_output().expect("wait for CLI");
    let stdout = String::from_utf8_lossy(&output.stdout).to_string();
    let stderr = String::from_utf8_lossy(&output.stderr).to_string();
    let code = output.status.code().unwrap_or(-1);
    (stdout, stderr, code)
}

fn run_ok(dir: &TempDir, args: &[&str]) -> String {
    let (stdout, stderr, code) = run_cli(dir, args, None);
    assert_eq!(code, 0, "CLI command failed: {args:?}\n{stderr}");
    stdout
}

fn json(stdout: &str) -> serde_json::Value {
    serde_json::from_str(stdout).expect("Failed to parse JSON output")
}

fn event_types(stdout: &str) -> Vec<String> {
    stdout
        .lines()
        .filter_map(|line| serde_json::from_str::<serde_json::Value>(line).ok())
        .filter_map(|v| v["type"].as_str().map(str::to_string))
        .collect()
}

fn full_session_input() -> String {
    let words: Vec<String> = (0..310).map(|i| format!("word{i}")).collect();
    format!("{}\n:done\n", words.join(" "))
}

#[test]
fn test_config_defaults() {
    let dir = TempDir::new().unwrap();
    let config = json(&run_ok(&dir, &["config", "list"]));
    assert_eq!(config["writing"]["word_target"], 300);
    assert_eq!(config["writing"]["mode"], "normal");
    assert_eq!(config["history"]["retention_days"], 90);
}

#[test]
fn test_config_set_and_get() {
    let dir = TempDir::new().unwrap();
    run_ok(&dir, &["config", "set", "writing.mode", "zen"]);
    assert_eq!(run_ok(&dir, &["config", "get", "writing.mode"]).trim(), "zen");

    run_ok(&dir, &["config", "reset"]);
    assert_eq!(run_ok(&dir, &["config", "get", "writing.mode"]).trim(), "normal");
}

#[test]
fn test_config_unknown_key_fails() {
    let dir = TempDir::new().unwrap();
    let (_, stderr, code) = run_cli(&dir, &["config", "get", "writing.colour"], None);
    assert_ne!(code, 0);
    assert!(stderr.contains("unknown config key: writing.colour"), "{stderr}");
    let (_, _, code) = run_cli(&dir, &["config", "set", "nope", "1"], None);
    assert_ne!(code, 0);
}

#[test]
fn test_today_without_session() {
    let dir = TempDir::new().unwrap();
    let today = json(&run_ok(&dir, &["today"]));
    assert_eq!(today["status"], "none");
}

#[test]
fn test_write_complete_and_mood() {
    let dir = TempDir::new().unwrap();
    let (stdout, stderr, code) = run_cli(&dir, &["write"], Some(&full_session_input()));
    assert_eq!(code, 0, "write failed: {stderr}");
    let events = event_types(&stdout);
    assert_eq!(events.first().map(String::as_str), Some("SessionStarted"));
    assert!(events.iter().any(|t| t == "SessionCompleted"));

    let today = json(&run_ok(&dir, &["today"]));
    assert_eq!(today["status"], "completed");
    assert_eq!(today["word_count"], 310);

    let mood = run_ok(&dir, &["mood", "4", "--note", "steady pace"]);
    assert_eq!(event_types(&mood), vec!["MoodRecorded".to_string()]);

    let summary = json(&run_ok(&dir, &["history", "summary"]));
    assert_eq!(summary["total_sessions"], 1);
    assert_eq!(summary["total_words"], 310);
    assert_eq!(summary["current_streak"], 1);

    // One sitting per day.
    let (_, _, code) = run_cli(&dir, &["write"], Some(":done\n"));
    assert_ne!(code, 0);
}

#[test]
fn test_write_interrupted_leaves_draft() {
    let dir = TempDir::new().unwrap();
    run_ok(&dir, &["config", "set", "gauge.grace_delay_secs", "0"]);
    run_ok(&dir, &["config", "set", "gauge.decay_per_sec", "250"]);

    let (stdout, stderr, code) = run_cli(&dir, &["write"], Some("just a few words\n"));
    assert_eq!(code, 0, "write failed: {stderr}");
    assert!(event_types(&stdout).iter().any(|t| t == "SessionInterrupted"));

    let drafts = json(&run_ok(&dir, &["history", "drafts"]));
    let drafts = drafts.as_array().expect("drafts array");
    assert_eq!(drafts.len(), 1);
    assert_eq!(drafts[0]["text"], "just a few words");

    let today = json(&run_ok(&dir, &["today"]));
    assert_eq!(today["status"], "interrupted");
}

#[test]
fn test_write_completes_on_eof_after_target() {
    let dir = TempDir::new().unwrap();
    let words: Vec<String> = (0..310).map(|i| format!("word{i}")).collect();
    let input = format!("{}\n", words.join(" "));

    let (stdout, stderr, code) = run_cli(&dir, &["write"], Some(&input));
    assert_eq!(code, 0, "write failed: {stderr}");
    assert!(event_types(&stdout).iter().any(|t| t == "SessionCompleted"));

    let today = json(&run_ok(&dir, &["today"]));
    assert_eq!(today["status"], "completed");
    assert_eq!(today["word_count"], 310);
}

#[test]
fn test_write_in_zen_mode_exits_on_eof() {
    let dir = TempDir::new().unwrap();
    run_ok(&dir, &["config", "set", "writing.mode", "zen"]);

    let (stdout, stderr, code) = run_cli(&dir, &["write"], Some("a few words\n"));
    assert_eq!(code, 0, "write failed: {stderr}");
    let events = event_types(&stdout);
    assert_eq!(events.last().map(String::as_str), Some("SessionReset"));

    let today = json(&run_ok(&dir, &["today"]));
    assert_eq!(today["status"], "none");
}

#[test]
fn test_mood_requires_completed_session() {
    let dir = TempDir::new().unwrap();
    let (_, _, code) = run_cli(&dir, &["mood", "3"], None);
    assert_ne!(code, 0);
    let (_, _, code) = run_cli(&dir, &["mood", "9"], None);
    assert_ne!(code, 0);
}

#[test]
fn test_premium_toggle() {
    let dir = TempDir::new().unwrap();
    assert_eq!(json(&run_ok(&dir, &["premium", "status"]))["premium"], false);
    assert_eq!(json(&run_ok(&dir, &["premium", "on"]))["premium"], true);
    assert_eq!(json(&run_ok(&dir, &["premium", "status"]))["premium"], true);
    assert_eq!(json(&run_ok(&dir, &["premium", "off"]))["premium"], false);
}

#[test]
fn test_history_on_empty_store() {
    let dir = TempDir::new().unwrap();
    let summary = json(&run_ok(&dir, &["history", "summary"]));
    assert_eq!(summary["total_sessions"], 0);
    assert_eq!(summary["longest_streak"], 0);
    assert_eq!(json(&run_ok(&dir, &["history", "locked"])), serde_json::json!([]));

    let (_, _, code) = run_cli(&dir, &["history", "show", "2020-01-01"], None);
    assert_ne!(code, 0);
}
