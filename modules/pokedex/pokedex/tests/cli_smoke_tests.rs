#![allow(clippy::unwrap_used, clippy::expect_used, clippy::non_ascii_literal)]

//! CLI smoke tests for the pokedex-server binary

use std::process::{Command, Stdio};
use std::time::Duration;
use tempfile::TempDir;
use tokio::time::timeout;

fn run_pokedex_server(args: &[&str]) -> std::process::Output {
    Command::new(env!("CARGO_BIN_EXE_pokedex-server"))
        .args(args)
        .env_remove("RUST_LOG")
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .output()
        .expect("Failed to execute pokedex-server")
}

fn write_file(dir: &TempDir, name: &str, content: &str) -> String {
    let path = dir.path().join(name);
    std::fs::write(&path, content).unwrap();
    path.to_string_lossy().into_owned()
}

#[test]
fn test_cli_help_command() {
    let output = run_pokedex_server(&["--help"]);

    assert!(output.status.success(), "Help command should succeed");

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("pokedex-server"), "Should contain binary name");
    assert!(stdout.contains("Usage:"), "Should contain usage information");
    assert!(stdout.contains("run"), "Should contain 'run' subcommand");
    assert!(stdout.contains("check"), "Should contain 'check' subcommand");
    assert!(stdout.contains("--config"), "Should mention config option");
    assert!(stdout.contains("--listen"), "Should mention listen option");
}

#[test]
fn test_cli_check_with_builtin_catalog() {
    let output = run_pokedex_server(&["check"]);

    assert!(
        output.status.success(),
        "check should succeed: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Configuration is valid"));
    assert!(stdout.contains("151 records"), "{stdout}");
}

#[test]
fn test_cli_print_config_applies_overrides() {
    let temp_dir = TempDir::new().unwrap();
    let config = write_file(
        &temp_dir,
        "pokedex.yaml",
        "listen_addr: \"127.0.0.1:6000\"\nimage_base_url: \"https://cdn.test/\"\n",
    );

    let output = run_pokedex_server(&[
        "--config",
        &config,
        "--listen",
        "127.0.0.1:7000",
        "--print-config",
    ]);

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("127.0.0.1:7000"), "CLI wins over file: {stdout}");
    assert!(!stdout.contains("127.0.0.1:6000"), "{stdout}");
    assert!(stdout.contains("https://cdn.test/"), "{stdout}");
}

#[test]
fn test_cli_env_override() {
    let output = Command::new(env!("CARGO_BIN_EXE_pokedex-server"))
        .arg("--print-config")
        .env("POKEDEX__LISTEN_ADDR", "127.0.0.1:6100")
        .output()
        .expect("Failed to execute pokedex-server");

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("127.0.0.1:6100"), "{stdout}");
}

#[test]
fn test_cli_missing_config_file_fails() {
    let output = run_pokedex_server(&["--config", "/definitely/not/here.yaml", "check"]);

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("does not exist"), "{stderr}");
}

#[test]
fn test_cli_malformed_catalog_stops_startup() {
    let temp_dir = TempDir::new().unwrap();
    let catalog = write_file(
        &temp_dir,
        "catalog.yaml",
        "- { name: \"Pikachu\", value: \"Électrique, Pikachu\" }\n",
    );
    let config = write_file(
        &temp_dir,
        "pokedex.yaml",
        &format!("catalog_path: \"{catalog}\"\n"),
    );

    let output = run_pokedex_server(&["--config", &config, "--listen", "127.0.0.1:0", "run"]);

    assert!(!output.status.success(), "bad catalog must not start a server");
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("Pikachu"), "{stderr}");
}

#[tokio::test]
async fn test_cli_run_keeps_serving() {
    let mut child = tokio::process::Command::new(env!("CARGO_BIN_EXE_pokedex-server"))
        .args(["--listen", "127.0.0.1:0", "run"])
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .kill_on_drop(true)
        .spawn()
        .unwrap();

    let still_running = timeout(Duration::from_millis(1500), child.wait()).await;
    assert!(still_running.is_err(), "server should keep running until signalled");

    child.kill().await.unwrap();
}
