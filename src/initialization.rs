//! Logger initialization.

use std::io::Write;

use colored::Colorize;
use log::LevelFilter;

/// Initializes `env_logger` with colored level output.
///
/// `RUST_LOG` is read first and the explicit `level` overrides it, so
/// `RUST_LOG=debug` works for quick debugging while `--log-level` keeps
/// the final say. Uses `try_init` so tests can call this repeatedly.
pub fn init_logger_with(level: LevelFilter) {
    let mut builder = env_logger::Builder::from_default_env();
    builder.filter_level(level);
    builder.format(|buf, record| {
        let level = record.level();
        let colored_level = match level {
            log::Level::Error => level.to_string().red(),
            log::Level::Warn => level.to_string().yellow(),
            log::Level::Info => level.to_string().green(),
            log::Level::Debug => level.to_string().blue(),
            log::Level::Trace => level.to_string().purple(),
        };
        writeln!(
            buf,
            "{} [{}] {}",
            record.target().cyan(),
            colored_level,
            record.args()
        )
    });
    let _ = builder.try_init();
}
