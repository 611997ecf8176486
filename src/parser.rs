//! Parses raw dig output into a [`DigResponse`].
//!
//! Parsing never fails: unparsable record lines are dropped and wholly
//! empty output becomes a NODATA response. The section scan is a single
//! pass with a current-section state; metadata (status, query time,
//! server) is extracted by independent pattern searches over the full
//! text. Those searches also see skipped comment lines, which is fine
//! for dig's fixed output format but is a coupling to it.

use lazy_static::lazy_static;
use regex::Regex;

use crate::models::{DigResponse, DnsRecord, MxRecord, RecordType, ResourceRecord};

lazy_static! {
    /// Record line grammar: name ttl class type value.
    static ref RECORD_PATTERN: Regex =
        Regex::new(r"^(\S+)\s+(\d+)\s+(IN|CH|HS)\s+(\w+)\s+(.+)$").unwrap();
    static ref STATUS_PATTERN: Regex = Regex::new(r"status:\s*(\w+)").unwrap();
    static ref QUERY_TIME_PATTERN: Regex = Regex::new(r"Query time:\s*(\d+)\s*msec").unwrap();
    static ref SERVER_PATTERN: Regex = Regex::new(r"SERVER:\s*([^#\s]+)").unwrap();
    static ref ANSWER_SECTION_PATTERN: Regex =
        Regex::new(r"^\s*;;\s*ANSWER SECTION:\s*$").unwrap();
    static ref AUTHORITY_SECTION_PATTERN: Regex =
        Regex::new(r"^\s*;;\s*AUTHORITY SECTION:\s*$").unwrap();
    static ref ADDITIONAL_SECTION_PATTERN: Regex =
        Regex::new(r"^\s*;;\s*ADDITIONAL SECTION:\s*$").unwrap();
    static ref DOMAIN_PATTERN: Regex = Regex::new(r"^[A-Za-z0-9.-]+$").unwrap();
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Section {
    None,
    Answer,
    Authority,
    Additional,
}

/// Parses complete dig output into a structured response.
///
/// `domain` and `record_type` are the values the query was issued with;
/// they are echoed into the response (unknown record types echo as A).
pub fn parse(output: &str, domain: &str, record_type: &str) -> DigResponse {
    let query_type = RecordType::from_query(record_type);

    if output.trim().is_empty() {
        return DigResponse::empty(domain, query_type, "NODATA");
    }

    let mut response = DigResponse::empty(domain, query_type, &extract_status(output));
    response.query_time_ms = extract_query_time(output);
    response.server = extract_server(output);

    let mut current_section = Section::None;

    for line in output.trim().lines() {
        let line = line.trim();

        if line.is_empty() {
            continue;
        }

        // Plain commentary; section headers are handled below.
        if line.starts_with(';') && !line.contains("SECTION:") {
            continue;
        }

        if ANSWER_SECTION_PATTERN.is_match(line) {
            current_section = Section::Answer;
            continue;
        }
        if AUTHORITY_SECTION_PATTERN.is_match(line) {
            current_section = Section::Authority;
            continue;
        }
        if ADDITIONAL_SECTION_PATTERN.is_match(line) {
            current_section = Section::Additional;
            continue;
        }

        let section_records = match current_section {
            Section::None => continue,
            Section::Answer => &mut response.answer_section,
            Section::Authority => &mut response.authority_section,
            Section::Additional => &mut response.additional_section,
        };
        if let Some(record) = parse_record_line(line) {
            section_records.push(record);
        }
    }

    response
}

/// Parses one record line; `None` for anything malformed or unknown.
fn parse_record_line(line: &str) -> Option<ResourceRecord> {
    let captures = RECORD_PATTERN.captures(line)?;

    let name = captures.get(1)?.as_str();
    let ttl: i64 = captures.get(2)?.as_str().parse().ok()?;
    let record_class = captures.get(3)?.as_str();
    let type_code = captures.get(4)?.as_str();
    let value = captures.get(5)?.as_str();

    if type_code == "MX" {
        return parse_mx_record(name, ttl, record_class, value);
    }

    let record_type = RecordType::from_str(type_code)?;
    DnsRecord::new(name, ttl, record_class, record_type, value)
        .ok()
        .map(ResourceRecord::Generic)
}

/// MX values must split into exactly a numeric priority and a server.
fn parse_mx_record(
    name: &str,
    ttl: i64,
    record_class: &str,
    value: &str,
) -> Option<ResourceRecord> {
    let mut parts = value.splitn(2, char::is_whitespace);
    let priority: i64 = parts.next()?.trim().parse().ok()?;
    let mail_server = parts.next()?.trim();
    if mail_server.is_empty() {
        return None;
    }

    MxRecord::new(name, ttl, record_class, priority, mail_server, value)
        .ok()
        .map(ResourceRecord::Mx)
}

fn extract_status(output: &str) -> String {
    STATUS_PATTERN
        .captures(output)
        .map(|c| c[1].to_string())
        .unwrap_or_else(|| "NOERROR".to_string())
}

fn extract_query_time(output: &str) -> Option<u32> {
    QUERY_TIME_PATTERN
        .captures(output)
        .and_then(|c| c[1].parse().ok())
}

fn extract_server(output: &str) -> Option<String> {
    SERVER_PATTERN.captures(output).map(|c| {
        // Strip any #port suffix dig appends to the server address.
        let server = c[1].split('#').next().unwrap_or(&c[1]);
        server.trim().to_string()
    })
}

/// Syntactic domain-name sanity check; it does not guarantee the domain
/// resolves.
pub fn validate_domain(domain: &str) -> bool {
    let domain = domain.trim();

    if domain.is_empty() || domain.len() > 253 {
        return false;
    }
    if !DOMAIN_PATTERN.is_match(domain) {
        return false;
    }
    if domain.contains("..") {
        return false;
    }
    if domain.starts_with('.')
        || domain.ends_with('.')
        || domain.starts_with('-')
        || domain.ends_with('-')
    {
        return false;
    }

    true
}

/// Record type codes a query may be issued with.
pub fn supported_record_types() -> Vec<&'static str> {
    RecordType::all()
}
