//! Error scenario integration tests

use std::process::Command;

fn recplay_bin() -> Command {
    let mut command = Command::new(env!("CARGO_BIN_EXE_recplay"));
    command.env("NO_COLOR", "1");
    command
}

/// Client invocation pointed at a socket nobody listens on
fn client_without_daemon(args: &[&str]) -> std::process::Output {
    let dir = tempfile::tempdir().unwrap();
    recplay_bin()
        .args(args)
        .env("RECPLAY_SOCKET", dir.path().join("absent.sock"))
        .env("XDG_CONFIG_HOME", dir.path())
        .output()
        .expect("Failed to execute command")
}

#[test]
fn client_commands_fail_without_daemon() {
    for args in [
        &["start-record"][..],
        &["stop-record"],
        &["start-play", "/tmp/a.wav"],
        &["resume"],
        &["pause"],
        &["seek", "5"],
        &["stop-play"],
        &["status"],
        &["listen"],
    ] {
        let output = client_without_daemon(args);
        assert_eq!(output.status.code(), Some(1), "{:?}", args);
        let stderr = String::from_utf8_lossy(&output.stderr);
        assert!(
            stderr.contains("No daemon running"),
            "Expected missing daemon error for {:?}, got: {}",
            args,
            stderr
        );
    }
}

#[test]
fn socket_flag_overrides_env() {
    let dir = tempfile::tempdir().unwrap();
    let flagged = dir.path().join("flagged.sock");
    let output = recplay_bin()
        .args(["status", "--socket", flagged.to_str().unwrap()])
        .env("RECPLAY_SOCKET", dir.path().join("env.sock"))
        .env("XDG_CONFIG_HOME", dir.path())
        .output()
        .expect("Failed to execute command");

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("flagged.sock"), "got: {}", stderr);
}

#[test]
fn seek_requires_seconds() {
    let output = recplay_bin()
        .args(["seek"])
        .output()
        .expect("Failed to execute command");
    assert_eq!(output.status.code(), Some(2));
}

#[test]
fn config_get_unknown_key() {
    let output = recplay_bin()
        .args(["config", "get", "unknown_key"])
        .output()
        .expect("Failed to execute command");

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(
        stderr.contains("Unknown") || stderr.contains("Valid"),
        "Expected error about unknown key, got: {}",
        stderr
    );
}

#[test]
fn config_set_unknown_key() {
    let dir = tempfile::tempdir().unwrap();
    let output = recplay_bin()
        .args(["config", "set", "unknown_key", "value"])
        .env("XDG_CONFIG_HOME", dir.path())
        .output()
        .expect("Failed to execute command");

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(
        stderr.contains("Unknown") || stderr.contains("Valid"),
        "Expected error about unknown key, got: {}",
        stderr
    );
}

#[test]
fn config_set_invalid_duration() {
    let dir = tempfile::tempdir().unwrap();
    let output = recplay_bin()
        .args(["config", "set", "recorder.max_duration", "invalid"])
        .env("XDG_CONFIG_HOME", dir.path())
        .output()
        .expect("Failed to execute command");

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(
        stderr.contains("Invalid") || stderr.contains("duration"),
        "Expected error about invalid duration, got: {}",
        stderr
    );
}

#[test]
fn config_set_invalid_channels() {
    let dir = tempfile::tempdir().unwrap();
    let output = recplay_bin()
        .args(["config", "set", "recorder.channels", "5"])
        .env("XDG_CONFIG_HOME", dir.path())
        .output()
        .expect("Failed to execute command");

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("1 or 2"), "got: {}", stderr);
}

#[test]
fn config_set_invalid_boolean() {
    let dir = tempfile::tempdir().unwrap();
    let output = recplay_bin()
        .args(["config", "set", "playback.progress_while_paused", "maybe"])
        .env("XDG_CONFIG_HOME", dir.path())
        .output()
        .expect("Failed to execute command");

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(
        stderr.contains("true") || stderr.contains("false"),
        "Expected error about invalid boolean, got: {}",
        stderr
    );
}

#[test]
fn config_list_with_no_file() {
    let dir = tempfile::tempdir().unwrap();
    let output = recplay_bin()
        .args(["config", "list"])
        .env("XDG_CONFIG_HOME", dir.path())
        .output()
        .expect("Failed to execute command");

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("not set"), "got: {}", stdout);
    assert!(stdout.contains("recorder.max_duration"), "got: {}", stdout);
}
