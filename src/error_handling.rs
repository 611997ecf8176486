//! Error types for query execution and record construction.

use thiserror::Error;

/// Errors produced while executing a dig query.
///
/// None of these cross the callback boundary as panics: the executor
/// delivers them as the error half of an `(output, error)` pair.
#[derive(Error, Debug)]
pub enum DigError {
    /// The domain argument was empty or whitespace-only.
    #[error("domain name cannot be empty")]
    EmptyDomain,

    /// The dig binary could not be located or run.
    #[error("dig command is not available; install bind-utils (or dnsutils on Debian/Ubuntu)")]
    ToolUnavailable,

    /// The subprocess exceeded the configured timeout.
    #[error("DNS query timed out; please check your network connection")]
    Timeout,

    /// stderr indicated an unreachable network or a connection timeout.
    #[error("network connection failed; please check your internet connection")]
    NetworkUnreachable,

    /// Non-zero exit with no usable stdout; message derived from stderr.
    #[error("dig command failed: {0}")]
    CommandFailed(String),

    /// Launching the subprocess itself failed.
    #[error("failed to launch dig: {0}")]
    Spawn(#[from] std::io::Error),
}

/// Invariant violations raised by the fallible record constructors.
///
/// The parser filters malformed lines before construction, so these
/// indicate a parser bug rather than an expected runtime condition.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum RecordError {
    /// TTL must be non-negative.
    #[error("TTL must be non-negative, got {0}")]
    NegativeTtl(i64),

    /// MX priority must be non-negative.
    #[error("MX priority must be non-negative, got {0}")]
    NegativePriority(i64),
}
