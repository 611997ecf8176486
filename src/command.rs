//! Builds the argument vector for the dig subprocess.

/// One query as requested by the caller, before any execution.
#[derive(Debug, Clone, Default)]
pub struct QueryOptions {
    pub domain: String,
    pub record_type: String,
    /// DNS server to target, overriding the system default.
    pub nameserver: Option<String>,
    /// Reverse lookup (`dig -x`); the record type is ignored in this mode.
    pub reverse_lookup: bool,
    /// Trace the delegation path from the root servers.
    pub trace: bool,
    /// Terse output (`+short`); not line-structured, so the parser's
    /// structured-output flags are omitted.
    pub short: bool,
}

impl QueryOptions {
    pub fn new(domain: &str, record_type: &str) -> Self {
        QueryOptions {
            domain: domain.to_string(),
            record_type: record_type.to_string(),
            ..Default::default()
        }
    }
}

/// Flags selecting only the sections and statistics the parser expects.
const STRUCTURED_OUTPUT_FLAGS: &[&str] = &[
    "+noall",
    "+answer",
    "+authority",
    "+additional",
    "+stats",
    "+comments",
    "+cmd",
];

/// Builds the dig argument vector for a query. Pure function; the first
/// element is always the `dig` command token.
pub fn build_command(options: &QueryOptions) -> Vec<String> {
    let mut cmd = vec!["dig".to_string()];

    if let Some(nameserver) = &options.nameserver {
        let nameserver = nameserver.trim();
        if !nameserver.is_empty() {
            cmd.push(format!("@{nameserver}"));
        }
    }

    if options.reverse_lookup {
        cmd.push("-x".to_string());
        cmd.push(options.domain.clone());
    } else {
        cmd.push(options.domain.clone());
        cmd.push(options.record_type.trim().to_uppercase());
    }

    if options.trace {
        cmd.push("+trace".to_string());
    }

    if options.short {
        cmd.push("+short".to_string());
    } else {
        cmd.extend(STRUCTURED_OUTPUT_FLAGS.iter().map(|f| f.to_string()));
    }

    cmd
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn basic_query() {
        let cmd = build_command(&QueryOptions::new("example.com", "a"));
        assert_eq!(
            cmd,
            vec![
                "dig",
                "example.com",
                "A",
                "+noall",
                "+answer",
                "+authority",
                "+additional",
                "+stats",
                "+comments",
                "+cmd",
            ]
        );
    }

    #[test]
    fn nameserver_is_prefixed_and_trimmed() {
        let mut options = QueryOptions::new("example.com", "MX");
        options.nameserver = Some(" 8.8.8.8 ".to_string());
        let cmd = build_command(&options);
        assert_eq!(cmd[1], "@8.8.8.8");
        assert_eq!(cmd[2], "example.com");
        assert_eq!(cmd[3], "MX");
    }

    #[test]
    fn blank_nameserver_is_ignored() {
        let mut options = QueryOptions::new("example.com", "A");
        options.nameserver = Some("   ".to_string());
        let cmd = build_command(&options);
        assert_eq!(cmd[1], "example.com");
    }

    #[test]
    fn reverse_lookup_ignores_record_type() {
        let mut options = QueryOptions::new("8.8.8.8", "MX");
        options.reverse_lookup = true;
        let cmd = build_command(&options);
        assert_eq!(&cmd[..3], &["dig", "-x", "8.8.8.8"]);
        assert!(!cmd.contains(&"MX".to_string()));
    }

    #[test]
    fn trace_flag_precedes_output_flags() {
        let mut options = QueryOptions::new("example.com", "NS");
        options.trace = true;
        let cmd = build_command(&options);
        assert_eq!(cmd[3], "+trace");
        assert_eq!(cmd[4], "+noall");
    }

    #[test]
    fn short_replaces_structured_output_flags() {
        let mut options = QueryOptions::new("example.com", "A");
        options.short = true;
        let cmd = build_command(&options);
        assert_eq!(cmd.last().unwrap(), "+short");
        assert!(!cmd.contains(&"+noall".to_string()));
        assert!(!cmd.contains(&"+comments".to_string()));
    }
}
