use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;
use tempfile::TempDir;

fn chatran_binary() -> PathBuf {
    PathBuf::from(env!("CARGO_BIN_EXE_chatran"))
}

fn setup_test_env(backend: &str) -> (TempDir, PathBuf) {
    let tmp = TempDir::new().unwrap();
    let root = tmp.path().to_path_buf();

    fs::write(
        root.join("data.json"),
        r#"[
  {"input": "سلام", "output": "سلام، حالت چطوره؟"},
  {"input": "اسمت چیه", "output": "من چتران هستم."}
]"#,
    )
    .unwrap();
    fs::write(
        root.join("data.yaml"),
        "- input: هوا امروز\n  output: هوا امروز آفتابی است.\n",
    )
    .unwrap();

    let history_file = if backend == "sqlite" {
        "state/history.sqlite"
    } else {
        "state/history.json"
    };
    let config_content = format!(
        r#"[corpus]
sources = [{{ path = "data.json" }}, {{ path = "data.yaml" }}, {{ path = "missing.json" }}]

[history]
backend = "{}"
path = "{}"

[server]
bind = "127.0.0.1:0"
"#,
        backend, history_file
    );

    let config_path = root.join("chatran.toml");
    fs::write(&config_path, config_content).unwrap();

    (tmp, config_path)
}

fn run_chatran(config_path: &Path, args: &[&str]) -> (String, String, bool) {
    let binary = chatran_binary();
    let output = Command::new(&binary)
        .arg("--config")
        .arg(config_path.to_str().unwrap())
        .args(args)
        .env_remove("PORT")
        .output()
        .unwrap_or_else(|e| panic!("Failed to run chatran binary at {:?}: {}", binary, e));

    let stdout = String::from_utf8_lossy(&output.stdout).to_string();
    let stderr = String::from_utf8_lossy(&output.stderr).to_string();
    (stdout, stderr, output.status.success())
}

#[test]
fn test_ask_matches_corpus() {
    let (_tmp, config_path) = setup_test_env("json");
    let (stdout, stderr, success) = run_chatran(&config_path, &["ask", "سلام"]);
    assert!(success, "ask failed: stderr={}", stderr);
    assert_eq!(stdout.trim(), "سلام، حالت چطوره؟");
}

#[test]
fn test_ask_matches_yaml_source() {
    let (_tmp, config_path) = setup_test_env("json");
    let (stdout, _, success) = run_chatran(&config_path, &["ask", "هوا امروز چطوره؟"]);
    assert!(success);
    assert_eq!(stdout.trim(), "هوا امروز آفتابی است.");
}

#[test]
fn test_ask_code_request_falls_back() {
    let (_tmp, config_path) = setup_test_env("json");
    let (stdout, _, success) = run_chatran(&config_path, &["ask", "کد پایتون میخوام"]);
    assert!(success);
    assert_eq!(
        stdout.trim(),
        "می‌تونم نمونه کد برات تولید کنم — بگو به چه زبان و چه کاری."
    );
}

#[test]
fn test_ask_question_template() {
    let (_tmp, config_path) = setup_test_env("json");
    let (stdout, _, success) = run_chatran(&config_path, &["ask", "چرا آسمان آبی است؟"]);
    assert!(success);
    assert_eq!(stdout.trim(), "سوال خوبی پرسیدی دربارهٔ \"چرا\".");
}

#[test]
fn test_ask_records_history() {
    let (tmp, config_path) = setup_test_env("json");
    run_chatran(&config_path, &["ask", "سلام"]);
    run_chatran(&config_path, &["ask", "خداحافظ"]);

    let raw = fs::read_to_string(tmp.path().join("state/history.json")).unwrap();
    let history: serde_json::Value = serde_json::from_str(&raw).unwrap();
    let entries = history.as_array().unwrap();
    assert_eq!(entries.len(), 4);
    assert_eq!(entries[0]["role"], "user");
    assert_eq!(entries[0]["text"], "سلام");
    assert_eq!(entries[1]["role"], "bot");
    assert_eq!(entries[1]["text"], "سلام، حالت چطوره؟");
    assert!(entries[3]["time"].as_i64().unwrap() >= entries[0]["time"].as_i64().unwrap());

    let (stdout, _, success) = run_chatran(&config_path, &["status"]);
    assert!(success);
    assert!(stdout.contains("Corpus:      3 entries"), "{}", stdout);
    assert!(stdout.contains("History:     4 entries"), "{}", stdout);
    assert!(stdout.contains("missing"), "{}", stdout);
}

#[test]
fn test_dry_run_does_not_record() {
    let (tmp, config_path) = setup_test_env("json");
    let (_, _, success) = run_chatran(&config_path, &["ask", "سلام", "--dry-run"]);
    assert!(success);
    assert!(!tmp.path().join("state/history.json").exists());
}

#[test]
fn test_history_command_with_sqlite_backend() {
    let (_tmp, config_path) = setup_test_env("sqlite");
    run_chatran(&config_path, &["ask", "سلام"]);
    run_chatran(&config_path, &["ask", "اسمت چیه"]);

    let (stdout, stderr, success) = run_chatran(&config_path, &["history", "--limit", "2"]);
    assert!(success, "history failed: {}", stderr);
    let lines: Vec<&str> = stdout.lines().collect();
    assert_eq!(lines.len(), 2, "{}", stdout);
    assert!(lines[0].contains("user") && lines[0].contains("اسمت چیه"));
    assert!(lines[1].contains("bot") && lines[1].contains("من چتران هستم."));
}

#[test]
fn test_empty_history_message() {
    let (_tmp, config_path) = setup_test_env("json");
    let (stdout, _, success) = run_chatran(&config_path, &["history"]);
    assert!(success);
    assert!(stdout.contains("No history recorded."));
}

#[test]
fn test_corrupt_history_is_not_fatal() {
    let (tmp, config_path) = setup_test_env("json");
    fs::create_dir_all(tmp.path().join("state")).unwrap();
    fs::write(tmp.path().join("state/history.json"), "not json").unwrap();

    let (stdout, _, success) = run_chatran(&config_path, &["ask", "سلام"]);
    assert!(success);
    assert_eq!(stdout.trim(), "سلام، حالت چطوره؟");
}

#[test]
fn test_invalid_config_fails() {
    let tmp = TempDir::new().unwrap();
    let config_path = tmp.path().join("chatran.toml");
    fs::write(&config_path, "[corpus]\nsources = [{ path = \"corpus.csv\" }]\n").unwrap();

    let (_, stderr, success) = run_chatran(&config_path, &["status"]);
    assert!(!success);
    assert!(stderr.contains("corpus.csv"), "{}", stderr);
}

#[test]
fn test_missing_config_uses_defaults() {
    let tmp = TempDir::new().unwrap();
    let output = Command::new(chatran_binary())
        .current_dir(tmp.path())
        .args(["--config", "nope.toml", "ask", "کد پایتون میخوام", "--dry-run"])
        .env_remove("PORT")
        .output()
        .unwrap();
    assert!(output.status.success());
    assert!(String::from_utf8_lossy(&output.stdout).contains("نمونه کد"));
}
