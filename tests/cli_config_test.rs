//! Integration tests for configuration handling.
//!
//! Covers `mot config show/set/path`, the KDL file on disk, and the
//! server-url precedence chain (flag > env > config > default).

mod common;

use common::TestEnv;
use predicates::prelude::*;
use serde_json::json;

#[test]
fn test_config_show_defaults() {
    let env = TestEnv::new();

    env.mot_unwired()
        .args(["config", "show"])
        .assert()
        .success()
        .stdout(predicate::str::contains("http://localhost:8080"))
        .stdout(predicate::str::contains("\"source\":\"default\""));
}

#[test]
fn test_config_set_server_url_then_show() {
    let env = TestEnv::new();

    env.mot_unwired()
        .args(["config", "set", "server-url", "https://club.example.org"])
        .assert()
        .success();

    env.mot_unwired()
        .args(["config", "show"])
        .assert()
        .success()
        .stdout(predicate::str::contains("https://club.example.org"))
        .stdout(predicate::str::contains("\"source\":\"config\""));

    // The value landed in config.kdl
    let written = std::fs::read_to_string(env.config_dir.path().join("config.kdl")).unwrap();
    assert!(written.contains("server-url"));
    assert!(written.contains("https://club.example.org"));
}

#[test]
fn test_config_set_rejects_invalid_server_url() {
    let env = TestEnv::new();

    env.mot_unwired()
        .args(["config", "set", "server-url", "club.example.org"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("server-url"));
}

#[test]
fn test_config_set_rejects_unknown_key() {
    let env = TestEnv::new();

    env.mot_unwired()
        .args(["config", "set", "colour-scheme", "mauve"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("unknown config key"));
}

#[test]
fn test_config_set_rejects_invalid_output_format() {
    let env = TestEnv::new();

    env.mot_unwired()
        .args(["config", "set", "output-format", "yaml"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("output-format"));
}

#[test]
fn test_config_path_reports_location() {
    let env = TestEnv::new();

    env.mot_unwired()
        .args(["-H", "config", "path"])
        .assert()
        .success()
        .stdout(predicate::str::contains("config.kdl"));
}

#[test]
fn test_env_var_beats_config_file() {
    let env = TestEnv::new();
    env.server.set_tree(json!([]));

    // Config points at a dead server; MOT_SERVER (set by mot()) must win
    env.mot_unwired()
        .args(["config", "set", "server-url", "http://127.0.0.1:1"])
        .assert()
        .success();

    env.mot().arg("tree").assert().success();

    env.mot()
        .args(["config", "show"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"source\":\"env:MOT_SERVER\""));
}

#[test]
fn test_server_flag_beats_env_var() {
    let env = TestEnv::new();
    env.server.set_tree(json!([]));

    let url = env.server.url();
    env.mot()
        .env("MOT_SERVER", "http://127.0.0.1:1")
        .args(["--server", url.as_str(), "tree"])
        .assert()
        .success();
}

#[test]
fn test_configured_output_format_human() {
    let env = TestEnv::new();
    env.server.set_tree(json!([]));

    env.mot()
        .args(["config", "set", "output-format", "human"])
        .assert()
        .success();

    env.mot()
        .arg("tree")
        .assert()
        .success()
        .stdout(predicate::str::contains("No codes defined"));
}

#[test]
fn test_default_menu_flows_into_add() {
    let env = TestEnv::new();
    env.server.set_tree(json!([]));
    env.server.stub("POST", "/api/codes", 201, "{}");

    env.mot()
        .args(["config", "set", "default-menu", "learning"])
        .assert()
        .success();

    env.mot().args(["add", "Archive"]).assert().success();

    let requests = env.server.requests();
    let post = requests.iter().find(|r| r.method == "POST").unwrap();
    assert_eq!(post.body_json()["menuName"], json!("Learning"));
}
