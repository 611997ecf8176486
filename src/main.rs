//! Command-line entry point.
//!
//! A thin wrapper around the `digger` library: parses arguments,
//! initializes the logger, runs a query or renders the history, and
//! prints human-readable output. All core functionality lives in the
//! library crate.

use anyhow::{bail, Result};
use clap::{Args, Parser, Subcommand};
use std::process;

use digger::config::LogLevel;
use digger::initialization::init_logger_with;
use digger::{parse, validate_domain, DigResponse, Digger, QueryOptions, RecordType};

#[derive(Debug, Parser)]
#[command(name = "digger", about = "DNS lookup via dig with structured output and history")]
struct Cli {
    /// Log level
    #[arg(long, value_enum, default_value = "warn")]
    log_level: LogLevel,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Run a DNS query
    Query(QueryArgs),
    /// Show or manage query history
    History(HistoryArgs),
}

#[derive(Debug, Args)]
struct QueryArgs {
    /// Domain name to query (or address with --reverse)
    domain: String,

    /// Record type (A, AAAA, CNAME, MX, NS, SOA, TXT); defaults to the
    /// configured default type
    #[arg(short = 't', long)]
    record_type: Option<String>,

    /// DNS server to query instead of the system default
    #[arg(short = 'n', long)]
    nameserver: Option<String>,

    /// Reverse lookup (dig -x)
    #[arg(short = 'x', long)]
    reverse: bool,

    /// Trace the delegation path from the root servers
    #[arg(long)]
    trace: bool,

    /// Terse output (+short)
    #[arg(long)]
    short: bool,
}

#[derive(Debug, Args)]
struct HistoryArgs {
    /// Filter entries by domain substring
    #[arg(long)]
    search: Option<String>,

    /// Maximum number of entries to show
    #[arg(long)]
    limit: Option<usize>,

    /// Show aggregate statistics instead of entries
    #[arg(long)]
    stats: bool,

    /// Clear all history
    #[arg(long)]
    clear: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logger_with(cli.log_level.into());

    let mut app = Digger::new();

    match cli.command {
        Command::Query(args) => run_query(&mut app, args).await,
        Command::History(args) => show_history(&mut app, args),
    }
}

async fn run_query(app: &mut Digger, args: QueryArgs) -> Result<()> {
    if !args.reverse && !validate_domain(&args.domain) {
        bail!("'{}' is not a valid domain name", args.domain);
    }

    let record_type = args
        .record_type
        .unwrap_or_else(|| app.settings.default_record_type.clone());

    let mut options = QueryOptions::new(args.domain.trim(), &record_type);
    options.nameserver = args.nameserver.clone();
    options.reverse_lookup = args.reverse;
    options.trace = args.trace;
    options.short = args.short;

    let timeout = app.settings.query_timeout();
    let (output, error) = app.executor.execute_dig_sync(&options, timeout).await;

    if let Some(error) = error {
        if app.settings.save_queries {
            app.history.add_entry(
                &options.domain,
                RecordType::from_query(&record_type),
                options.nameserver.as_deref(),
                "FAILED",
                None,
            );
        }
        eprintln!("digger error: {error}");
        process::exit(1);
    }

    if options.short {
        // +short output is not line-structured; print it as-is.
        print!("{output}");
        return Ok(());
    }

    let response = parse(&output, &options.domain, &record_type);
    print_response(&response);
    app.record_query(&response, options.nameserver.as_deref());

    Ok(())
}

fn print_response(response: &DigResponse) {
    println!(
        "{} {} -> {} ({} record{})",
        response.query_domain,
        response.query_type,
        response.status,
        response.total_records(),
        if response.total_records() == 1 { "" } else { "s" },
    );

    for (title, section) in [
        ("ANSWER", &response.answer_section),
        ("AUTHORITY", &response.authority_section),
        ("ADDITIONAL", &response.additional_section),
    ] {
        if section.is_empty() {
            continue;
        }
        println!("\n{title}:");
        for record in section {
            println!(
                "  {}  {}  {}  {}  {}",
                record.name(),
                record.ttl(),
                record.record_class(),
                record.record_type(),
                record.value(),
            );
        }
    }

    println!();
    if let Some(ms) = response.query_time_ms {
        println!("Query time: {ms} ms");
    }
    if let Some(server) = &response.server {
        println!("Server: {server}");
    }
}

fn show_history(app: &mut Digger, args: HistoryArgs) -> Result<()> {
    if args.clear {
        app.history.clear_history();
        println!("History cleared");
        return Ok(());
    }

    if args.stats {
        let stats = app.history.get_stats();
        println!("Total queries:  {}", stats.total_queries);
        println!("Unique domains: {}", stats.unique_domains);
        println!(
            "Most common:    {}",
            stats.most_common_type.as_deref().unwrap_or("-")
        );
        println!("Success rate:   {:.1}%", stats.success_rate);
        for (record_type, count) in &stats.type_distribution {
            println!("  {record_type}: {count}");
        }
        return Ok(());
    }

    let entries = match args.search {
        Some(query) => app.history.search_history(&query),
        None => app.history.get_entries(args.limit),
    };

    if entries.is_empty() {
        println!("No history entries");
        return Ok(());
    }

    for entry in entries.iter().take(args.limit.unwrap_or(usize::MAX)) {
        println!(
            "{}  {}  {}  {}{}",
            entry.timestamp.format("%Y-%m-%d %H:%M:%S"),
            entry.record_type,
            entry.domain,
            entry.status,
            match entry.query_time_ms {
                Some(ms) => format!("  {ms} ms"),
                None => String::new(),
            },
        );
    }

    Ok(())
}
