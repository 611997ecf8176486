//! Runs dig out-of-process without blocking the caller.
//!
//! Each query is spawned as its own tokio task; the completion callback
//! fires exactly once when the subprocess finishes, times out, or fails.
//! Queries are independent: no ordering between concurrent queries, no
//! coalescing of identical ones, and no cancellation once dispatched.

use std::process::Stdio;
use std::sync::Arc;
use std::time::Duration;

use log::{debug, warn};
use tokio::process::Command;
use tokio::sync::OnceCell;
use tokio::time::timeout;

use crate::command::{build_command, QueryOptions};
use crate::config::{AVAILABILITY_PROBE_TIMEOUT, DIG_TIMEOUT};
use crate::error_handling::DigError;

/// Executes dig subprocesses with a cached availability check.
///
/// Cloning is cheap and clones share the availability cache. The flag is
/// computed once per executor lifetime, so installing dig mid-session is
/// not detected until a new executor is constructed.
#[derive(Debug, Clone)]
pub struct DigExecutor {
    program: String,
    timeout: Duration,
    available: Arc<OnceCell<bool>>,
}

impl Default for DigExecutor {
    fn default() -> Self {
        Self::new()
    }
}

impl DigExecutor {
    pub fn new() -> Self {
        Self::with_program("dig")
    }

    /// Uses an alternate binary in place of `dig` (tests, packaging).
    pub fn with_program(program: &str) -> Self {
        DigExecutor {
            program: program.to_string(),
            timeout: DIG_TIMEOUT,
            available: Arc::new(OnceCell::new()),
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Whether the dig binary can be run at all.
    ///
    /// Probes `dig -v` once and caches the result. dig exits non-zero
    /// for `-v`, so only a spawn failure or probe timeout counts as
    /// unavailable.
    pub async fn check_dig_available(&self) -> bool {
        *self
            .available
            .get_or_init(|| async {
                let probe = Command::new(&self.program)
                    .arg("-v")
                    .stdin(Stdio::null())
                    .kill_on_drop(true)
                    .output();
                match timeout(AVAILABILITY_PROBE_TIMEOUT, probe).await {
                    Ok(Ok(output)) => {
                        debug!(
                            "{} -v probe: exit {:?}",
                            self.program,
                            output.status.code()
                        );
                        true
                    }
                    Ok(Err(e)) => {
                        warn!("{} is not available: {e}", self.program);
                        false
                    }
                    Err(_) => {
                        warn!("{} -v probe timed out", self.program);
                        false
                    }
                }
            })
            .await
    }

    /// Dispatches a query onto the runtime and delivers the result
    /// through `callback`, which fires exactly once.
    ///
    /// An empty or whitespace-only domain is reported synchronously via
    /// the callback with empty output; no task is spawned. The callback
    /// itself is a required by-value argument, so the original design's
    /// "missing callback" programmer error cannot occur here.
    pub fn execute_dig<F>(&self, options: QueryOptions, callback: F)
    where
        F: FnOnce(String, Option<DigError>) + Send + 'static,
    {
        if options.domain.trim().is_empty() {
            callback(String::new(), Some(DigError::EmptyDomain));
            return;
        }

        let mut options = options;
        options.domain = options.domain.trim().to_string();
        options.record_type = options.record_type.trim().to_uppercase();

        let executor = self.clone();
        tokio::spawn(async move {
            let (output, error) = executor.run_query(&options).await;
            callback(output, error);
        });
    }

    /// Runs a query to completion with the executor's default timeout.
    pub async fn run_query(&self, options: &QueryOptions) -> (String, Option<DigError>) {
        self.execute_dig_sync(options, self.timeout).await
    }

    /// Synchronous-variant logic: runs the subprocess and returns the
    /// `(output, error)` pair directly, with an explicit timeout so
    /// tests and tooling can use a shorter one.
    pub async fn execute_dig_sync(
        &self,
        options: &QueryOptions,
        timeout_after: Duration,
    ) -> (String, Option<DigError>) {
        if !self.check_dig_available().await {
            return (String::new(), Some(DigError::ToolUnavailable));
        }

        let argv = build_command(options);
        debug!("executing: {}", argv.join(" "));

        let run = Command::new(&self.program)
            .args(&argv[1..])
            .stdin(Stdio::null())
            .kill_on_drop(true)
            .output();

        let output = match timeout(timeout_after, run).await {
            Err(_) => return (String::new(), Some(DigError::Timeout)),
            Ok(Err(e)) => return (String::new(), Some(DigError::Spawn(e))),
            Ok(Ok(output)) => output,
        };

        let stdout = String::from_utf8_lossy(&output.stdout).to_string();
        let stderr = String::from_utf8_lossy(&output.stderr);

        // dig exits non-zero for NXDOMAIN and friends while still
        // printing a valid structured body; non-empty stdout counts as
        // success regardless of the exit code. Intentional, do not
        // tighten.
        if output.status.success() || !stdout.trim().is_empty() {
            return (stdout, None);
        }

        let message = stderr.trim();
        debug!(
            "dig failed: exit {:?}, stderr: {message}",
            output.status.code()
        );

        let lowered = message.to_lowercase();
        let error = if lowered.contains("network unreachable")
            || lowered.contains("connection timed out")
        {
            DigError::NetworkUnreachable
        } else if message.is_empty() {
            DigError::CommandFailed("no error output".to_string())
        } else {
            DigError::CommandFailed(message.to_string())
        };

        (String::new(), Some(error))
    }
}
