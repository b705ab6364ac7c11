#![cfg(unix)]

use curlwrap::http::{CommandBuilder, CurlClient, NormalizedResponse, RequestSpec, Transport};
use flate2::Compression;
use flate2::write::GzEncoder;
use serde_json::json;
use std::fs;
use std::io::Write;
use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tempfile::TempDir;

/// 写入一个可执行脚本，充当 curl
fn fake_curl(dir: &Path, name: &str, body: &str) -> PathBuf {
    let path = dir.join(name);
    fs::write(&path, format!("#!/bin/sh\n{}\n", body)).unwrap();
    fs::set_permissions(&path, fs::Permissions::from_mode(0o755)).unwrap();
    path
}

fn request() -> curlwrap::http::CurlCommand {
    CommandBuilder::default().build(&RequestSpec::new("https://example.com/"))
}

fn client(program: &Path) -> CurlClient {
    CurlClient::new().with_program(program.to_string_lossy().to_string())
}

#[tokio::test]
async fn test_slow_process_times_out() {
    let temp_dir = TempDir::new().unwrap();
    let script = fake_curl(temp_dir.path(), "slow", "sleep 5");

    let response = client(&script)
        .with_timeout(Duration::from_millis(200))
        .execute(&request())
        .await;

    assert_eq!(response, NormalizedResponse::TimedOut);
    assert_eq!(response.to_value(), json!({"Timeout": true}));
}

#[tokio::test]
async fn test_gzipped_json_is_decoded() {
    let temp_dir = TempDir::new().unwrap();
    let body_path = temp_dir.path().join("body.gz");
    let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
    encoder
        .write_all(br#"{"trackResponse":{"shipment":[]}}"#)
        .unwrap();
    fs::write(&body_path, encoder.finish().unwrap()).unwrap();

    let script = fake_curl(
        temp_dir.path(),
        "gzip",
        &format!("cat '{}'", body_path.display()),
    );
    let response = client(&script).execute(&request()).await;

    assert_eq!(
        response,
        NormalizedResponse::Json(json!({"trackResponse": {"shipment": []}}))
    );
}

#[tokio::test]
async fn test_stdout_wins_over_stderr() {
    let temp_dir = TempDir::new().unwrap();
    let script = fake_curl(
        temp_dir.path(),
        "noisy",
        "echo '{\"ok\":1}'\necho '  % Total    % Received' >&2",
    );

    let response = client(&script).execute(&request()).await;
    assert_eq!(response, NormalizedResponse::Json(json!({"ok": 1})));
}

#[tokio::test]
async fn test_stderr_used_when_stdout_empty() {
    let temp_dir = TempDir::new().unwrap();
    let script = fake_curl(
        temp_dir.path(),
        "failing",
        "echo 'curl: (6) Could not resolve host' >&2\nexit 6",
    );

    let response = client(&script).execute(&request()).await;
    let text = response.text().unwrap();
    assert!(text.contains("Could not resolve host"));
}

#[tokio::test]
async fn test_missing_program_is_no_data() {
    let response = CurlClient::new()
        .with_program("/nonexistent/curlwrap-test-curl")
        .execute(&request())
        .await;

    assert!(response.is_no_data());
    assert_eq!(response.to_value(), json!({}));
}

#[tokio::test]
async fn test_arguments_are_passed_verbatim() {
    let temp_dir = TempDir::new().unwrap();
    let script = fake_curl(temp_dir.path(), "echo-args", r#"printf '%s\n' "$@""#);

    let spec = RequestSpec::new("https://example.com/?a=1&b=2").with_header("x-note", "it's fine");
    let command = CommandBuilder::default().build(&spec);
    let response = client(&script).execute(&command).await;

    let text = response.text().unwrap().into_owned();
    let lines: Vec<&str> = text.lines().collect();
    assert_eq!(
        lines,
        vec![
            "https://example.com/?a=1&b=2",
            "-H",
            "x-note: it's fine",
            "-H",
            "cookie: ",
        ]
    );
}

#[tokio::test]
async fn test_retries_after_timeout() {
    let temp_dir = TempDir::new().unwrap();
    let counter = temp_dir.path().join("attempts");
    let script = fake_curl(
        temp_dir.path(),
        "counting",
        &format!("echo x >> '{}'\nsleep 5", counter.display()),
    );

    let response = client(&script)
        .with_timeout(Duration::from_millis(300))
        .with_retries(2)
        .execute(&request())
        .await;

    assert!(response.is_timeout());
    let attempts = fs::read_to_string(&counter).unwrap();
    assert_eq!(attempts.lines().count(), 3);
}

#[tokio::test]
async fn test_download_runs_in_download_dir() {
    let temp_dir = TempDir::new().unwrap();
    let download_dir = TempDir::new().unwrap();
    let script = fake_curl(temp_dir.path(), "download", "sleep 1\necho data > TestVideo.webm");

    let command =
        CommandBuilder::default().build(&RequestSpec::new("https://s1.example/TestVideo.webm").save_to_file());
    let response = client(&script)
        .with_timeout(Duration::from_millis(100))
        .with_download_dir(Some(download_dir.path().to_path_buf()))
        .execute(&command)
        .await;

    // 下载不受超时限制
    assert!(!response.is_timeout());
    assert!(download_dir.path().join("TestVideo.webm").exists());
}
