//! digger library: DNS lookup via the external `dig` tool.
//!
//! The crate shells out to `dig`, captures its textual output, and
//! parses it into a structured [`DigResponse`], alongside a durable
//! query history. It is not a DNS resolver: it depends on dig's output
//! format and does no wire-protocol work of its own.
//!
//! # Example
//!
//! ```no_run
//! use digger::{parse, DigExecutor, QueryOptions};
//!
//! # #[tokio::main]
//! # async fn main() {
//! let executor = DigExecutor::new();
//! let options = QueryOptions::new("example.com", "A");
//! let (output, error) = executor.run_query(&options).await;
//! if error.is_none() {
//!     let response = parse(&output, "example.com", "A");
//!     println!("{} records, status {}", response.total_records(), response.status);
//! }
//! # }
//! ```

pub mod command;
pub mod config;
pub mod error_handling;
pub mod executor;
pub mod history;
pub mod initialization;
pub mod models;
pub mod parser;

pub use command::{build_command, QueryOptions};
pub use config::Settings;
pub use error_handling::{DigError, RecordError};
pub use executor::DigExecutor;
pub use history::{HistoryEntry, HistoryStats, QueryHistory};
pub use models::{DigResponse, DnsRecord, MxRecord, RecordType, ResourceRecord};
pub use parser::{parse, supported_record_types, validate_domain};

/// Explicitly constructed application context: settings, executor and
/// history wired together, replacing any global state.
#[derive(Debug)]
pub struct Digger {
    pub settings: Settings,
    pub executor: DigExecutor,
    pub history: QueryHistory,
}

impl Digger {
    /// Builds a context from the per-user settings and history files.
    pub fn new() -> Self {
        let settings = Settings::load_default();
        let history = QueryHistory::open(settings.history_limit);
        Self::with_components(settings, history)
    }

    /// Wires together explicit components (tests, embedding).
    ///
    /// Applies the retention policy hooks the settings layer owns:
    /// capacity via `set_max_entries` and, when enabled, age-based
    /// cleanup.
    pub fn with_components(settings: Settings, mut history: QueryHistory) -> Self {
        history.set_max_entries(settings.history_limit);
        if settings.auto_cleanup_enabled {
            history.cleanup_old_entries(i64::from(settings.cleanup_days));
        }
        let executor = DigExecutor::new().with_timeout(settings.query_timeout());
        Digger {
            settings,
            executor,
            history,
        }
    }

    /// Records a completed query into history, honoring the
    /// `save_queries` setting.
    pub fn record_query(&mut self, response: &DigResponse, nameserver: Option<&str>) {
        if !self.settings.save_queries {
            return;
        }
        self.history.add_entry(
            &response.query_domain,
            response.query_type,
            nameserver,
            &response.status,
            response.query_time_ms,
        );
    }
}

impl Default for Digger {
    fn default() -> Self {
        Self::new()
    }
}
