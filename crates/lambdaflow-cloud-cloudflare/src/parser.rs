//! `wrangler dns list` output parser

use crate::wrangler::DnsRecord;
use lambdaflow_config::DnsConfig;

/// Result of looking a record up in a listing
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecordLookup {
    Absent,
    Found(DnsRecord),
}

impl RecordLookup {
    pub fn record(&self) -> Option<&DnsRecord> {
        match self {
            RecordLookup::Found(record) => Some(record),
            RecordLookup::Absent => None,
        }
    }
}

fn tokens(line: &str) -> impl Iterator<Item = &str> {
    line.split(|c: char| c.is_whitespace() || c == '|' || c == '│')
        .filter(|t| !t.is_empty())
}

fn is_header(line: &str) -> bool {
    matches!(tokens(line).next(), Some("ID" | "id"))
}

fn exact_match(line: &str, full_domain: &str, record_type: &str) -> bool {
    let mut has_domain = false;
    let mut has_type = false;
    for token in tokens(line) {
        // FQDN 表記の末尾 '.' は無視
        let token = token.trim_end_matches('.');
        has_domain |= token == full_domain;
        has_type |= token == record_type;
    }
    has_domain && has_type
}

/// Find the record for `full_domain` / `record_type` in a listing
///
/// A line holding both values as whole tokens wins. Lines that do not split
/// into columns fall back to a substring match on both values. The record id is the first token
/// of the matched line. Content and TTL come from `config`, not the listing.
pub fn parse_list_output(
    output: &str,
    full_domain: &str,
    record_type: &str,
    config: &DnsConfig,
) -> RecordLookup {
    let candidates = || {
        output
            .lines()
            .filter(|line| !line.trim().is_empty() && !is_header(line))
    };

    let line = candidates()
        .find(|line| exact_match(line, full_domain, record_type))
        .or_else(|| {
            candidates().find(|line| {
                tokens(line).nth(1).is_none()
                    && line.contains(full_domain)
                    && line.contains(record_type)
            })
        });

    let Some(line) = line else {
        return RecordLookup::Absent;
    };
    let Some(id) = tokens(line).next() else {
        return RecordLookup::Absent;
    };

    tracing::debug!(id = %id, line = %line.trim(), "Matched DNS record");

    RecordLookup::Found(DnsRecord {
        id: Some(id.to_string()),
        record_type: record_type.to_string(),
        name: full_domain.to_string(),
        content: config.record_value.clone(),
        ttl: config.ttl,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> DnsConfig {
        DnsConfig {
            api_token: "token".to_string(),
            account_id: "account".to_string(),
            domain: "example.com".to_string(),
            subdomain: Some("api".to_string()),
            record_type: "A".to_string(),
            record_value: "203.0.113.10".to_string(),
            ttl: 300,
        }
    }

    #[test]
    fn test_found() {
        let output = "ID  TYPE  TTL  NAME\nabc123  A  100  api.example.com\n";
        let lookup = parse_list_output(output, "api.example.com", "A", &config());

        let record = lookup.record().unwrap();
        assert_eq!(record.id.as_deref(), Some("abc123"));
        assert_eq!(record.name, "api.example.com");
        // リスト側の TTL ではなく設定値
        assert_eq!(record.ttl, 300);
        assert_eq!(record.content, "203.0.113.10");
    }

    #[test]
    fn test_absent() {
        assert_eq!(
            parse_list_output("", "api.example.com", "A", &config()),
            RecordLookup::Absent
        );

        let output = "abc123  CNAME  300  www.example.com\n";
        assert_eq!(
            parse_list_output(output, "api.example.com", "A", &config()),
            RecordLookup::Absent
        );
    }

    #[test]
    fn test_exact_token_preferred_over_substring() {
        let output = "\
zzz999  A  300  myapi.example.com
abc123  A  300  api.example.com
";
        let lookup = parse_list_output(output, "api.example.com", "A", &config());
        assert_eq!(lookup.record().unwrap().id.as_deref(), Some("abc123"));
    }

    #[test]
    fn test_substring_fallback() {
        // 区切りが無く完全一致できない場合は部分一致
        let output = "rec42:A:api.example.com:203.0.113.10\n";
        let lookup = parse_list_output(output, "api.example.com", "A", &config());
        assert_eq!(lookup.record().unwrap().id.as_deref(), Some("rec42:A:api.example.com:203.0.113.10"));
    }

    #[test]
    fn test_columns_require_exact_tokens() {
        let output = "zzz999  A  300  myapi.example.com\n";
        assert_eq!(
            parse_list_output(output, "api.example.com", "A", &config()),
            RecordLookup::Absent
        );

        // "CNAME" は "A" を含むが別タイプ
        let output = "cn1  CNAME  300  api.example.com\n";
        assert_eq!(
            parse_list_output(output, "api.example.com", "A", &config()),
            RecordLookup::Absent
        );
    }

    #[test]
    fn test_table_output() {
        let output = "\
┌────────┬──────┬──────────────────┐
│ id     │ type │ name             │
├────────┼──────┼──────────────────┤
│ abc123 │ A    │ api.example.com. │
└────────┴──────┴──────────────────┘
";
        let lookup = parse_list_output(output, "api.example.com", "A", &config());
        assert_eq!(lookup.record().unwrap().id.as_deref(), Some("abc123"));
    }

    #[test]
    fn test_header_never_matches() {
        let output = "ID  A  api.example.com\n";
        assert_eq!(
            parse_list_output(output, "api.example.com", "A", &config()),
            RecordLookup::Absent
        );
    }
}
