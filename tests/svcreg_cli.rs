use std::{
    fs,
    path::{Path, PathBuf},
    process::{Command, Output},
};

fn write_config(dir: &Path, file_name: &str, content: &str) -> PathBuf {
    let config_path = dir.join(file_name);
    fs::write(&config_path, content).expect("write config");
    config_path
}

fn write_valid_config(dir: &Path, file_name: &str) -> PathBuf {
    write_config(
        dir,
        file_name,
        r#"
name = "svcreg-cli-test"
env = "test"

[bind.http]
advertised_host = "localhost"
ip = "127.0.0.1"
port = 39999

[registry]
url = "http://localhost:3000/services"

[registry.heartbeat]
interval_secs = 3
max_attempts = 3
retry_backoff_secs = 1

[client]
required_services = ["LogService"]

[log_service]
file = "./distributed.log"

[observability.log]
output = "console"
"#,
    )
}

fn run_svcreg(args: &[&str], current_dir: Option<&Path>) -> Output {
    let mut cmd = Command::new(PathBuf::from(env!("CARGO_BIN_EXE_svcreg")));
    cmd.args(args);
    if let Some(dir) = current_dir {
        cmd.current_dir(dir);
    }
    cmd.output().expect("run svcreg command")
}

#[test]
fn svcreg_test_command_accepts_explicit_valid_config() {
    let temp = tempfile::tempdir().expect("temp dir");
    let config_path = write_valid_config(temp.path(), "valid.toml");
    let output = run_svcreg(&["test", config_path.to_str().expect("utf8 path")], None);

    assert!(
        output.status.success(),
        "command should succeed, stderr: {}",
        String::from_utf8_lossy(&output.stderr)
    );
}

#[test]
fn svcreg_test_command_finds_default_config_in_current_directory() {
    let temp = tempfile::tempdir().expect("temp dir");
    write_valid_config(temp.path(), "config.toml");
    let output = run_svcreg(&["test"], Some(temp.path()));

    assert!(
        output.status.success(),
        "command should succeed, stderr: {}",
        String::from_utf8_lossy(&output.stderr)
    );
}

#[test]
fn svcreg_test_command_accepts_warning_only_config() {
    let temp = tempfile::tempdir().expect("temp dir");
    let config_path = write_config(
        temp.path(),
        "warning.toml",
        "name = \"svcreg-warning\"\n[bind.http]\nport = 0\n",
    );
    let output = run_svcreg(&["test", config_path.to_str().expect("utf8 path")], None);

    assert!(
        output.status.success(),
        "warnings must not fail the check, stderr: {}",
        String::from_utf8_lossy(&output.stderr)
    );
}

#[test]
fn svcreg_test_command_fails_for_missing_custom_config_path() {
    let temp = tempfile::tempdir().expect("temp dir");
    let missing_path = temp.path().join("missing.toml");
    let output = run_svcreg(&["test", missing_path.to_str().expect("utf8 path")], None);
    let stderr = String::from_utf8_lossy(&output.stderr);

    assert!(!output.status.success(), "command should fail");
    assert!(
        stderr.contains("Config file not found"),
        "unexpected stderr: {stderr}"
    );
}

#[test]
fn svcreg_test_command_fails_when_no_default_config_exists() {
    let temp = tempfile::tempdir().expect("temp dir");
    let output = run_svcreg(&["test"], Some(temp.path()));
    let stderr = String::from_utf8_lossy(&output.stderr);

    assert!(!output.status.success(), "command should fail");
    assert!(
        stderr.contains("No configuration file found"),
        "unexpected stderr: {stderr}"
    );
}

#[test]
fn svcreg_test_command_fails_for_invalid_config_content() {
    let temp = tempfile::tempdir().expect("temp dir");
    let bad_path = write_config(temp.path(), "bad.toml", "name = \"broken\"\nenv = [\n");

    let output = run_svcreg(&["test", bad_path.to_str().expect("utf8 path")], None);
    let stderr = String::from_utf8_lossy(&output.stderr);

    assert!(!output.status.success(), "command should fail");
    assert!(
        stderr.contains("配置解析失败"),
        "unexpected stderr: {stderr}"
    );
}

#[test]
fn svcreg_test_command_fails_for_validation_errors() {
    let temp = tempfile::tempdir().expect("temp dir");
    let config_path = write_config(
        temp.path(),
        "invalid.toml",
        "name = \"svcreg-invalid\"\n[registry]\nurl = \"localhost:3000\"\n",
    );
    let output = run_svcreg(&["test", config_path.to_str().expect("utf8 path")], None);
    let stderr = String::from_utf8_lossy(&output.stderr);

    assert!(!output.status.success(), "command should fail");
    assert!(stderr.contains("配置验证失败"), "unexpected stderr: {stderr}");
}

#[test]
fn svcreg_registry_command_fails_for_missing_config() {
    let temp = tempfile::tempdir().expect("temp dir");
    let missing_path = temp.path().join("missing.toml");
    let output = run_svcreg(
        &["registry", "--config", missing_path.to_str().expect("utf8 path")],
        None,
    );

    assert!(!output.status.success(), "command should fail");
}
