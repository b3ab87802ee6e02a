//! End-to-end tests for the `tb` binary

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

/// `tb` isolated from the user's config, logs and API keys
fn tb(home: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("tb").unwrap();
    cmd.current_dir(home.path())
        .env("XDG_DATA_HOME", home.path().join("data"))
        .env("XDG_CONFIG_HOME", home.path().join("config"))
        .env("NO_COLOR", "1")
        .env_remove("GROQ_API_KEY")
        .env_remove("TASKBOARD_MODEL")
        .env_remove("RUST_LOG");
    cmd
}

fn seed(home: &TempDir, json: &str) -> std::path::PathBuf {
    let dir = home.path().join("tasks");
    std::fs::create_dir_all(&dir).unwrap();
    std::fs::write(dir.join("tasks.json"), json).unwrap();
    dir
}

#[test]
fn test_list_groups_by_column() {
    let home = TempDir::new().unwrap();
    let dir = seed(
        &home,
        r#"[{"id":1,"title":"Fix bug","description":"in module X","status":"DOING"},
            {"id":2,"title":"Write docs","description":"for the API","status":"TO-DO"}]"#,
    );

    tb(&home)
        .arg("--data-dir")
        .arg(&dir)
        .arg("list")
        .assert()
        .success()
        .stdout(predicate::str::contains("TO-DO (1)"))
        .stdout(predicate::str::contains("DOING (1)"))
        .stdout(predicate::str::contains("DONE (0)"))
        .stdout(predicate::str::contains("Fix bug"))
        .stdout(predicate::str::contains("in module X"))
        .stdout(predicate::str::contains("Write docs"));
}

#[test]
fn test_list_with_corrupted_file_is_empty() {
    let home = TempDir::new().unwrap();
    let dir = seed(&home, "{not json");

    tb(&home)
        .args(["list", "-d"])
        .arg(&dir)
        .assert()
        .success()
        .stdout(predicate::str::contains("TO-DO (0)"))
        .stdout(predicate::str::contains("DOING (0)"));
}

#[test]
fn test_list_with_missing_dir_is_empty() {
    let home = TempDir::new().unwrap();

    tb(&home)
        .arg("-d")
        .arg(home.path().join("nowhere"))
        .arg("list")
        .assert()
        .success()
        .stdout(predicate::str::contains("DONE (0)"));
}

#[test]
fn test_ask_without_api_key_reports_error() {
    let home = TempDir::new().unwrap();
    let dir = seed(&home, "[]");

    tb(&home)
        .arg("-d")
        .arg(&dir)
        .args(["ask", "What are my tasks?"])
        .assert()
        .failure()
        .stdout(predicate::str::contains("Sorry, I encountered an error"))
        .stderr(predicate::str::contains("GROQ_API_KEY"));
}

#[test]
fn test_version_flag() {
    let home = TempDir::new().unwrap();

    tb(&home)
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains(env!("CARGO_PKG_VERSION")));
}
