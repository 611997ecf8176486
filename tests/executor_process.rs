//! Tests for the process executor against stub binaries.
//!
//! Real dig output is simulated with small shell scripts so the tests
//! exercise exit-code and stream handling without touching the network.

#![cfg(unix)]

use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};
use std::time::Duration;

use digger::{parse, DigError, DigExecutor, QueryOptions};
use tempfile::TempDir;

/// Writes an executable shell script and returns its path.
fn stub(dir: &TempDir, name: &str, body: &str) -> PathBuf {
    let path = dir.path().join(name);
    std::fs::write(&path, format!("#!/bin/sh\n{body}\n")).expect("Failed to write stub");
    let mut perms = std::fs::metadata(&path).unwrap().permissions();
    perms.set_mode(0o755);
    std::fs::set_permissions(&path, perms).unwrap();
    path
}

fn executor_for(path: &Path) -> DigExecutor {
    DigExecutor::with_program(path.to_str().unwrap())
}

const CANNED_OUTPUT: &str = r#"cat <<'EOF'
;; ->>HEADER<<- opcode: QUERY, status: NOERROR, id: 7

;; ANSWER SECTION:
example.com.	300	IN	A	93.184.216.34

;; Query time: 21 msec
;; SERVER: 1.1.1.1#53(1.1.1.1)
EOF"#;

#[tokio::test]
async fn missing_binary_reports_tool_unavailable() {
    let executor = DigExecutor::with_program("/nonexistent/digger-test-dig");
    assert!(!executor.check_dig_available().await);

    let (output, error) = executor
        .run_query(&QueryOptions::new("example.com", "A"))
        .await;
    assert!(output.is_empty());
    assert!(matches!(error, Some(DigError::ToolUnavailable)));
}

#[tokio::test]
async fn availability_is_probed_once() {
    let dir = tempfile::tempdir().unwrap();
    let marker = dir.path().join("probes");
    let path = stub(
        &dir,
        "dig",
        &format!("echo probe >> {}\nexit 0", marker.display()),
    );
    let executor = executor_for(&path);

    assert!(executor.check_dig_available().await);
    assert!(executor.check_dig_available().await);
    // A clone shares the cache.
    assert!(executor.clone().check_dig_available().await);

    let probes = std::fs::read_to_string(&marker).unwrap();
    assert_eq!(probes.lines().count(), 1);
}

#[tokio::test]
async fn successful_query_returns_stdout() {
    let dir = tempfile::tempdir().unwrap();
    let path = stub(&dir, "dig", CANNED_OUTPUT);
    let executor = executor_for(&path);

    let (output, error) = executor
        .run_query(&QueryOptions::new("example.com", "A"))
        .await;
    assert!(error.is_none(), "unexpected error: {error:?}");

    let response = parse(&output, "example.com", "A");
    assert_eq!(response.status, "NOERROR");
    assert_eq!(response.answer_section.len(), 1);
    assert_eq!(response.query_time_ms, Some(21));
    assert_eq!(response.server.as_deref(), Some("1.1.1.1"));
}

#[tokio::test]
async fn nonzero_exit_with_stdout_is_success() {
    // NXDOMAIN responses print a valid body with a non-zero exit code
    // on some dig versions.
    let dir = tempfile::tempdir().unwrap();
    let path = stub(
        &dir,
        "dig",
        "echo ';; ->>HEADER<<- opcode: QUERY, status: NXDOMAIN, id: 3'\nexit 9",
    );
    let executor = executor_for(&path);

    let (output, error) = executor
        .run_query(&QueryOptions::new("nosuch.example", "A"))
        .await;
    assert!(error.is_none());
    assert_eq!(parse(&output, "nosuch.example", "A").status, "NXDOMAIN");
}

#[tokio::test]
async fn network_errors_are_normalized() {
    let dir = tempfile::tempdir().unwrap();
    let path = stub(
        &dir,
        "dig",
        "if [ \"$1\" = -v ]; then exit 0; fi\necho 'Connection timed out; no servers could be reached' >&2\nexit 9",
    );
    let executor = executor_for(&path);

    let (output, error) = executor
        .run_query(&QueryOptions::new("example.com", "A"))
        .await;
    assert!(output.is_empty());
    assert!(matches!(error, Some(DigError::NetworkUnreachable)));
}

#[tokio::test]
async fn generic_failure_carries_stderr_text() {
    let dir = tempfile::tempdir().unwrap();
    let path = stub(
        &dir,
        "dig",
        "if [ \"$1\" = -v ]; then exit 0; fi\necho 'some dig failure' >&2\nexit 1",
    );
    let executor = executor_for(&path);

    let (_, error) = executor
        .run_query(&QueryOptions::new("example.com", "A"))
        .await;
    match error {
        Some(DigError::CommandFailed(message)) => assert_eq!(message, "some dig failure"),
        other => panic!("expected CommandFailed, got {other:?}"),
    }
}

#[tokio::test]
async fn silent_failure_gets_generic_message() {
    let dir = tempfile::tempdir().unwrap();
    let path = stub(&dir, "dig", "if [ \"$1\" = -v ]; then exit 0; fi\nexit 1");
    let executor = executor_for(&path);

    let (_, error) = executor
        .run_query(&QueryOptions::new("example.com", "A"))
        .await;
    assert!(matches!(error, Some(DigError::CommandFailed(_))));
}

#[tokio::test]
async fn slow_query_times_out() {
    let dir = tempfile::tempdir().unwrap();
    let path = stub(
        &dir,
        "dig",
        "if [ \"$1\" = -v ]; then exit 0; fi\nsleep 5\nexit 0",
    );
    let executor = executor_for(&path);

    let (output, error) = executor
        .execute_dig_sync(
            &QueryOptions::new("example.com", "A"),
            Duration::from_millis(200),
        )
        .await;
    assert!(output.is_empty());
    assert!(matches!(error, Some(DigError::Timeout)));
}

#[test]
fn blank_domain_fails_synchronously() {
    // No runtime involved: the invalid-input path fires the callback
    // before any task is spawned.
    let executor = DigExecutor::with_program("/nonexistent/digger-test-dig");
    let (tx, rx) = std::sync::mpsc::channel();

    executor.execute_dig(QueryOptions::new("   ", "A"), move |output, error| {
        tx.send((output, error)).unwrap();
    });

    let (output, error) = rx.try_recv().expect("callback should fire synchronously");
    assert!(output.is_empty());
    assert!(matches!(error, Some(DigError::EmptyDomain)));
}

#[tokio::test]
async fn callback_delivers_result_from_spawned_task() {
    let dir = tempfile::tempdir().unwrap();
    let path = stub(&dir, "dig", CANNED_OUTPUT);
    let executor = executor_for(&path);
    let (tx, rx) = tokio::sync::oneshot::channel();

    executor.execute_dig(QueryOptions::new(" example.com ", "a"), move |output, error| {
        let _ = tx.send((output, error));
    });

    let (output, error) = rx.await.expect("callback never fired");
    assert!(error.is_none());
    assert!(output.contains("ANSWER SECTION"));
}

#[tokio::test]
async fn concurrent_queries_each_complete() {
    let dir = tempfile::tempdir().unwrap();
    let path = stub(&dir, "dig", CANNED_OUTPUT);
    let executor = executor_for(&path);

    let mut receivers = Vec::new();
    for _ in 0..4 {
        let (tx, rx) = tokio::sync::oneshot::channel();
        executor.execute_dig(QueryOptions::new("example.com", "A"), move |output, error| {
            let _ = tx.send((output, error));
        });
        receivers.push(rx);
    }

    for rx in receivers {
        let (output, error) = rx.await.expect("callback never fired");
        assert!(error.is_none());
        assert!(!output.is_empty());
    }
}
