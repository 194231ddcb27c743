//! Integration tests for CLI commands
//!
//! Tests for prefs and lint against a mocked analysis backend.

use assert_cmd::Command;
use predicates::prelude::*;
use serde_json::{Value, json};
use std::fs;
use tempfile::TempDir;
use wiremock::matchers::{body_string_contains, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const MODEL_PATH: &str = "/v1beta/models/gemini-2.5-flash:generateContent";

/// Helper to create a command for the reelint CLI
fn reelint_cmd(dir: &TempDir) -> Command {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_reelint"));
    cmd.current_dir(dir.path());
    cmd
}

fn read_prefs(dir: &TempDir) -> Value {
    let content = fs::read_to_string(dir.path().join(".reelint/preferences.json")).unwrap();
    serde_json::from_str(&content).unwrap()
}

mod prefs_command {
    use super::*;

    #[test]
    fn list_is_empty_without_file() {
        let dir = TempDir::new().unwrap();
        reelint_cmd(&dir)
            .args(["prefs", "list"])
            .assert()
            .success()
            .stdout(predicate::str::contains("No preferences for default"));
    }

    #[test]
    fn down_then_up_keeps_original() {
        let dir = TempDir::new().unwrap();

        reelint_cmd(&dir)
            .args(["prefs", "down", "weak_hook", "--user", "alice"])
            .assert()
            .success()
            .stdout(predicate::str::contains("weak_hook: moderate (was critical)"));

        reelint_cmd(&dir)
            .args(["prefs", "down", "weak_hook", "--user", "alice"])
            .assert()
            .success()
            .stdout(predicate::str::contains("weak_hook: minor (was critical)"));

        reelint_cmd(&dir)
            .args(["prefs", "up", "weak_hook", "--user", "alice"])
            .assert()
            .success()
            .stdout(predicate::str::contains("weak_hook: moderate (was critical)"));

        let prefs = read_prefs(&dir);
        assert_eq!(prefs["alice"]["weak_hook"]["severity"], "moderate");
        assert_eq!(prefs["alice"]["weak_hook"]["original_severity"], "critical");

        reelint_cmd(&dir)
            .args(["prefs", "list", "--user", "alice"])
            .assert()
            .success()
            .stdout(predicate::str::contains("weak_hook"))
            .stdout(predicate::str::contains("moderate"));
    }

    #[test]
    fn up_past_critical_fails() {
        let dir = TempDir::new().unwrap();
        reelint_cmd(&dir)
            .args(["prefs", "up", "poor_audio"])
            .assert()
            .code(2)
            .stderr(predicate::str::contains("already at critical"));
    }

    #[test]
    fn ai_issue_needs_from() {
        let dir = TempDir::new().unwrap();

        reelint_cmd(&dir)
            .args(["prefs", "down", "ai_k0fh1i"])
            .assert()
            .code(2)
            .stderr(predicate::str::contains("--from"));

        reelint_cmd(&dir)
            .args(["prefs", "down", "ai_k0fh1i", "--from", "minor"])
            .assert()
            .success()
            .stdout(predicate::str::contains("ai_k0fh1i: ignored (was minor)"));
    }

    #[test]
    fn set_validates_severity() {
        let dir = TempDir::new().unwrap();

        reelint_cmd(&dir)
            .args(["prefs", "set", "dead_air", "loud"])
            .assert()
            .code(2)
            .stderr(predicate::str::contains("Invalid severity"));

        reelint_cmd(&dir)
            .args(["prefs", "set", "dead_air", "ignored"])
            .assert()
            .success()
            .stdout(predicate::str::contains("dead_air: ignored (was minor)"));

        reelint_cmd(&dir)
            .args(["prefs", "set", "dead_air", "Ignored"])
            .assert()
            .code(2)
            .stderr(predicate::str::contains("Invalid severity"));
    }

    #[test]
    fn set_ai_issue_needs_original() {
        let dir = TempDir::new().unwrap();

        reelint_cmd(&dir)
            .args(["prefs", "set", "ai_k0fh1i", "minor"])
            .assert()
            .code(2)
            .stderr(predicate::str::contains("--original"))
            .stderr(predicate::str::contains("--from").not());

        reelint_cmd(&dir)
            .args(["prefs", "set", "ai_k0fh1i", "minor", "--original", "moderate"])
            .assert()
            .success()
            .stdout(predicate::str::contains("ai_k0fh1i: minor (was moderate)"));
    }

    #[test]
    fn reset_removes_override() {
        let dir = TempDir::new().unwrap();

        reelint_cmd(&dir)
            .args(["prefs", "set", "dead_air", "critical"])
            .assert()
            .success();

        reelint_cmd(&dir)
            .args(["prefs", "reset", "dead_air"])
            .assert()
            .success()
            .stdout(predicate::str::contains("dead_air: reset"));

        reelint_cmd(&dir)
            .args(["prefs", "reset", "dead_air"])
            .assert()
            .success()
            .stdout(predicate::str::contains("no preference stored"));
    }

    #[test]
    fn custom_prefs_file() {
        let dir = TempDir::new().unwrap();

        reelint_cmd(&dir)
            .args(["prefs", "down", "dead_air", "--prefs", "team.json"])
            .assert()
            .success();

        assert!(dir.path().join("team.json").is_file());
        assert!(!dir.path().join(".reelint/preferences.json").exists());
    }
}

mod lint_command {
    use super::*;

    async fn mock_backend() -> MockServer {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path(MODEL_PATH))
            .and(body_string_contains("Classify this short-form video"))
            .respond_with(ResponseTemplate::new(500).set_body_string("classifier down"))
            .mount(&server)
            .await;

        let findings = json!({"findings": [
            {"rule_id": "weak_hook", "message": "Logo intro", "evidence": "0:00-0:03", "severity": "critical", "category": "hook"},
            {"message": "Hook is too slow", "severity": "moderate", "category": "hook_strength"},
            {"message": "", "severity": "minor", "category": "hook"}
        ]});
        Mock::given(method("POST"))
            .and(path(MODEL_PATH))
            .and(body_string_contains("Rules:"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "candidates": [{"content": {"parts": [{"text": findings.to_string()}]}}]
            })))
            .mount(&server)
            .await;

        server
    }

    fn project(server: &MockServer) -> TempDir {
        let dir = TempDir::new().unwrap();
        let config = json!({
            "analyzer": {"base_url": server.uri(), "api_key_env": "REELINT_TEST_KEY"}
        });
        fs::write(dir.path().join(".reelint.json"), config.to_string()).unwrap();
        dir
    }

    fn lint_cmd(dir: &TempDir) -> Command {
        let mut cmd = reelint_cmd(dir);
        cmd.env("REELINT_TEST_KEY", "test-key");
        cmd
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn critical_violation_exits_with_one() {
        let server = mock_backend().await;
        let dir = project(&server);

        let output = lint_cmd(&dir)
            .args([
                "lint",
                "https://youtu.be/abc",
                "--format",
                "talking_head",
                "--output",
                "json",
            ])
            .output()
            .unwrap();

        assert_eq!(output.status.code(), Some(1));
        let result: Value = serde_json::from_slice(&output.stdout).unwrap();
        assert_eq!(result["format"], "talking_head");
        assert_eq!(result["source"], "https://youtu.be/abc");
        assert_eq!(result["violations"][0]["issue_key"], "weak_hook");
        assert_eq!(result["violations"][1]["issue_key"], "ai_k0fh1i");
        // critical (-10) + moderate (-5)
        assert_eq!(result["scores"]["hook_strength"], 85);
        assert_eq!(result["dropped_findings"], 1);
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn user_preferences_apply() {
        let server = mock_backend().await;
        let dir = project(&server);

        for _ in 0..2 {
            reelint_cmd(&dir)
                .args(["prefs", "down", "weak_hook", "--user", "bob"])
                .assert()
                .success();
        }
        reelint_cmd(&dir)
            .args(["prefs", "down", "ai_k0fh1i", "--from", "moderate", "--user", "bob"])
            .assert()
            .success();

        let output = lint_cmd(&dir)
            .args([
                "lint",
                "https://youtu.be/abc",
                "--format",
                "talking_head",
                "--user",
                "bob",
                "--output",
                "json",
            ])
            .output()
            .unwrap();

        assert_eq!(output.status.code(), Some(0));
        let result: Value = serde_json::from_slice(&output.stdout).unwrap();
        let weak_hook = result["violations"]
            .as_array()
            .unwrap()
            .iter()
            .find(|v| v["issue_key"] == "weak_hook")
            .unwrap();
        assert_eq!(weak_hook["severity"], "minor");
        assert_eq!(weak_hook["original_severity"], "critical");
        // minor (-2) + minor (-2)
        assert_eq!(result["scores"]["hook_strength"], 96);
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn auto_format_falls_back_to_other() {
        let server = mock_backend().await;
        let dir = project(&server);

        lint_cmd(&dir)
            .args(["lint", "https://youtu.be/abc"])
            .assert()
            .code(1)
            .stdout(predicate::str::contains("(other)"))
            .stdout(predicate::str::contains("[weak_hook]"));
    }
}
