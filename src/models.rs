//! Structured representation of a dig response.
//!
//! Records come out of the parser as a tagged sum: either a generic
//! resource record or an MX record carrying its parsed priority and
//! mail server. Constructors are fallible so that invalid field values
//! surface as data (`RecordError`) rather than panics.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum::IntoEnumIterator;
use strum_macros::EnumIter as EnumIterMacro;

use crate::error_handling::RecordError;

/// Supported DNS record types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIterMacro, Serialize, Deserialize)]
pub enum RecordType {
    A,
    AAAA,
    CNAME,
    MX,
    NS,
    SOA,
    TXT,
}

impl RecordType {
    pub fn as_str(&self) -> &'static str {
        match self {
            RecordType::A => "A",
            RecordType::AAAA => "AAAA",
            RecordType::CNAME => "CNAME",
            RecordType::MX => "MX",
            RecordType::NS => "NS",
            RecordType::SOA => "SOA",
            RecordType::TXT => "TXT",
        }
    }

    /// Parses a record type code. Case-insensitive; unknown codes are `None`.
    pub fn from_str(s: &str) -> Option<Self> {
        match s.trim().to_uppercase().as_str() {
            "A" => Some(RecordType::A),
            "AAAA" => Some(RecordType::AAAA),
            "CNAME" => Some(RecordType::CNAME),
            "MX" => Some(RecordType::MX),
            "NS" => Some(RecordType::NS),
            "SOA" => Some(RecordType::SOA),
            "TXT" => Some(RecordType::TXT),
            _ => None,
        }
    }

    /// Resolves the record type requested for a query.
    ///
    /// Unknown codes fall back to `A`. This fallback applies only to the
    /// echoed query type, never to parsing a record's own type.
    pub fn from_query(s: &str) -> Self {
        Self::from_str(s).unwrap_or(RecordType::A)
    }

    /// All supported type codes, in declaration order.
    pub fn all() -> Vec<&'static str> {
        Self::iter().map(|t| t.as_str()).collect()
    }
}

impl std::fmt::Display for RecordType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

fn strip_trailing_dot(s: &str) -> String {
    s.trim_end_matches('.').to_string()
}

/// A single generic resource record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DnsRecord {
    /// Owner name, trailing dot stripped.
    pub name: String,
    /// Time-to-live in seconds.
    pub ttl: u32,
    /// Record class, usually "IN".
    pub record_class: String,
    pub record_type: RecordType,
    /// Record data, trailing dot stripped.
    pub value: String,
}

impl DnsRecord {
    /// Builds a record, rejecting a negative TTL.
    pub fn new(
        name: &str,
        ttl: i64,
        record_class: &str,
        record_type: RecordType,
        value: &str,
    ) -> Result<Self, RecordError> {
        if ttl < 0 {
            return Err(RecordError::NegativeTtl(ttl));
        }
        Ok(DnsRecord {
            name: strip_trailing_dot(name),
            ttl: ttl as u32,
            record_class: record_class.to_string(),
            record_type,
            value: strip_trailing_dot(value),
        })
    }
}

/// A mail-exchange record with its priority and mail server split out.
///
/// The record type is MX by construction; `value` keeps the raw
/// "priority server" text as it appeared in the output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MxRecord {
    pub name: String,
    pub ttl: u32,
    pub record_class: String,
    /// Preference ranking; lower is more preferred.
    pub priority: u16,
    /// Mail server host, trailing dot stripped.
    pub mail_server: String,
    /// Raw "priority server" text.
    pub value: String,
}

impl MxRecord {
    /// Builds an MX record, rejecting a negative TTL or priority.
    pub fn new(
        name: &str,
        ttl: i64,
        record_class: &str,
        priority: i64,
        mail_server: &str,
        value: &str,
    ) -> Result<Self, RecordError> {
        if ttl < 0 {
            return Err(RecordError::NegativeTtl(ttl));
        }
        if priority < 0 {
            return Err(RecordError::NegativePriority(priority));
        }
        Ok(MxRecord {
            name: strip_trailing_dot(name),
            ttl: ttl as u32,
            record_class: record_class.to_string(),
            priority: priority as u16,
            mail_server: strip_trailing_dot(mail_server),
            value: strip_trailing_dot(value),
        })
    }

    pub fn record_type(&self) -> RecordType {
        RecordType::MX
    }
}

/// One resource record from any response section.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResourceRecord {
    Generic(DnsRecord),
    Mx(MxRecord),
}

impl ResourceRecord {
    pub fn name(&self) -> &str {
        match self {
            ResourceRecord::Generic(r) => &r.name,
            ResourceRecord::Mx(r) => &r.name,
        }
    }

    pub fn ttl(&self) -> u32 {
        match self {
            ResourceRecord::Generic(r) => r.ttl,
            ResourceRecord::Mx(r) => r.ttl,
        }
    }

    pub fn record_class(&self) -> &str {
        match self {
            ResourceRecord::Generic(r) => &r.record_class,
            ResourceRecord::Mx(r) => &r.record_class,
        }
    }

    pub fn record_type(&self) -> RecordType {
        match self {
            ResourceRecord::Generic(r) => r.record_type,
            ResourceRecord::Mx(r) => r.record_type(),
        }
    }

    pub fn value(&self) -> &str {
        match self {
            ResourceRecord::Generic(r) => &r.value,
            ResourceRecord::Mx(r) => &r.value,
        }
    }
}

/// Complete result of one dig query.
///
/// Constructed once per completed query by the parser and immutable
/// afterwards. Section order preserves appearance order in the output.
#[derive(Debug, Clone)]
pub struct DigResponse {
    /// Queried domain, trailing dot stripped.
    pub query_domain: String,
    pub query_type: RecordType,
    /// When the output was parsed (not dig's own WHEN line).
    pub query_time: DateTime<Utc>,
    /// Responding server without its `#port` suffix.
    pub server: Option<String>,
    pub query_time_ms: Option<u32>,
    /// Status code such as NOERROR, NXDOMAIN, SERVFAIL, NODATA.
    pub status: String,
    pub answer_section: Vec<ResourceRecord>,
    pub authority_section: Vec<ResourceRecord>,
    pub additional_section: Vec<ResourceRecord>,
}

impl DigResponse {
    /// Builds a response with no records, used for blank output and as
    /// the base the parser fills in.
    pub fn empty(query_domain: &str, query_type: RecordType, status: &str) -> Self {
        DigResponse {
            query_domain: strip_trailing_dot(query_domain),
            query_type,
            query_time: Utc::now(),
            server: None,
            query_time_ms: None,
            status: status.to_string(),
            answer_section: Vec::new(),
            authority_section: Vec::new(),
            additional_section: Vec::new(),
        }
    }

    /// Total records across all three sections.
    pub fn total_records(&self) -> usize {
        self.answer_section.len() + self.authority_section.len() + self.additional_section.len()
    }

    pub fn has_answer(&self) -> bool {
        !self.answer_section.is_empty()
    }

    pub fn is_successful(&self) -> bool {
        self.status == "NOERROR"
    }
}
