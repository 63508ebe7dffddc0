//! Port-43 WHOIS look-ups.
//!
//! Registry answers are free-form `Label: value` text whose labels differ per
//! registry, so every field is read from a list of known labels in priority
//! order.

use chrono::{DateTime, NaiveDate, Utc};
use log::debug;
use whois_rust::{WhoIs, WhoIsLookupOptions};

use crate::error::{ToolboxError, ToolboxResult};
use crate::types::WhoisRecord;

/// TLD to registry WHOIS server map.
const WHOIS_SERVERS: &str = include_str!("whois_servers.json");

const REGISTRAR_LABELS: &[&str] = &[
    "registrar",
    "registrar name",
    "sponsoring registrar",
    "registrar organization",
];
const CREATED_LABELS: &[&str] = &[
    "creation date",
    "created date",
    "created on",
    "created",
    "registration date",
    "registration time",
];
const EXPIRY_LABELS: &[&str] = &[
    "registry expiry date",
    "registrar registration expiration date",
    "expiration date",
    "expiry date",
    "expires on",
    "expires",
    "expiration time",
    "paid-till",
];
const UPDATED_LABELS: &[&str] = &["updated date", "last updated", "last modified", "changed"];
const NAME_SERVER_LABELS: &[&str] = &["name server", "nameserver", "nserver", "name servers"];
const STATUS_LABELS: &[&str] = &["domain status", "status", "state"];

/// Date layouts seen in registry answers besides RFC 3339.
const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%d-%b-%Y", "%Y.%m.%d", "%d.%m.%Y", "%Y/%m/%d"];

/// Query the registry WHOIS server for `domain`.
pub async fn whois_lookup(domain: &str) -> ToolboxResult<WhoisRecord> {
    let client = WhoIs::from_string(WHOIS_SERVERS).map_err(|e| {
        ToolboxError::NetworkError(format!("Failed to initialize WHOIS client: {e}"))
    })?;

    let options = WhoIsLookupOptions::from_string(domain)
        .map_err(|e| ToolboxError::ValidationError(format!("Invalid domain: {e}")))?;

    debug!("[WHOIS] Querying {domain}");
    let raw = client
        .lookup_async(options)
        .await
        .map_err(|e| ToolboxError::NetworkError(format!("WHOIS query failed: {e}")))?;

    Ok(parse_whois(domain, &raw, Utc::now()))
}

fn parse_whois(domain: &str, raw: &str, now: DateTime<Utc>) -> WhoisRecord {
    let pairs = label_pairs(raw);
    let expiration_date = first_value(&pairs, EXPIRY_LABELS);

    WhoisRecord {
        domain: domain.to_string(),
        registrar: first_value(&pairs, REGISTRAR_LABELS),
        creation_date: first_value(&pairs, CREATED_LABELS),
        days_until_expiry: expiration_date
            .as_deref()
            .and_then(parse_registry_date)
            .map(|expiry| (expiry - now.date_naive()).num_days()),
        expiration_date,
        updated_date: first_value(&pairs, UPDATED_LABELS),
        name_servers: unique_tokens(&pairs, NAME_SERVER_LABELS, |ns| {
            ns.trim_end_matches('.').to_lowercase()
        }),
        status: unique_tokens(&pairs, STATUS_LABELS, str::to_string),
        raw: raw.to_string(),
    }
}

/// `(label, value)` pairs in answer order, labels lower-cased. Comment
/// lines and labels without a value are dropped.
fn label_pairs(raw: &str) -> Vec<(String, String)> {
    raw.lines()
        .map(str::trim)
        .filter(|line| !line.starts_with(['%', '#', '>']))
        .filter_map(|line| line.split_once(':'))
        .map(|(label, value)| (label.trim().to_lowercase(), value.trim().to_string()))
        .filter(|(label, value)| !label.is_empty() && !value.is_empty())
        .collect()
}

/// Value of the highest-priority label present.
fn first_value(pairs: &[(String, String)], labels: &[&str]) -> Option<String> {
    labels.iter().find_map(|label| {
        pairs
            .iter()
            .find(|(l, _)| l == label)
            .map(|(_, value)| value.clone())
    })
}

/// First word of every value under any of `labels`, normalised and deduplicated.
fn unique_tokens(
    pairs: &[(String, String)],
    labels: &[&str],
    normalize: impl Fn(&str) -> String,
) -> Vec<String> {
    let mut tokens: Vec<String> = Vec::new();
    for (_, value) in pairs.iter().filter(|(l, _)| labels.contains(&l.as_str())) {
        let Some(word) = value.split_whitespace().next() else {
            continue;
        };
        let token = normalize(word);
        if !token.is_empty() && !tokens.contains(&token) {
            tokens.push(token);
        }
    }
    tokens
}

fn parse_registry_date(value: &str) -> Option<NaiveDate> {
    let value = value.trim();
    if let Ok(parsed) = DateTime::parse_from_rfc3339(value) {
        return Some(parsed.with_timezone(&Utc).date_naive());
    }

    let day = value.split_whitespace().next()?.split('T').next()?;
    DATE_FORMATS
        .iter()
        .find_map(|format| NaiveDate::parse_from_str(day, format).ok())
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::panic)]
mod tests {
    use super::*;

    const VERISIGN_ANSWER: &str = "\
   Domain Name: EXAMPLE.COM
   Registry Domain ID: 2336799_DOMAIN_COM-VRSN
   Registrar WHOIS Server: whois.iana.org
   Updated Date: 2024-08-14T07:01:34Z
   Creation Date: 1995-08-14T04:00:00Z
   Registry Expiry Date: 2025-08-13T04:00:00Z
   Registrar: RESERVED-Internet Assigned Numbers Authority
   Domain Status: clientDeleteProhibited https://icann.org/epp#clientDeleteProhibited
   Domain Status: clientTransferProhibited https://icann.org/epp#clientTransferProhibited
   Name Server: A.IANA-SERVERS.NET
   Name Server: B.IANA-SERVERS.NET
>>> Last update of whois database: 2024-09-01T10:00:00Z <<<
";

    const NIRA_ANSWER: &str = "\
% NiRA WHOIS
Domain Name: example.com.ng
Registrar: Web4Africa Ltd
Creation Date: 2019-03-02
Expiration Date: 2025-03-02
Domain Status: ok
Name Server: ns1.web4africa.net.
Name Server: NS1.WEB4AFRICA.NET
";

    fn at(date: &str) -> DateTime<Utc> {
        DateTime::parse_from_rfc3339(date)
            .unwrap()
            .with_timezone(&Utc)
    }

    #[test]
    fn test_parse_verisign_answer() {
        let record = parse_whois("example.com", VERISIGN_ANSWER, at("2025-08-01T12:00:00Z"));

        assert_eq!(
            record.registrar.as_deref(),
            Some("RESERVED-Internet Assigned Numbers Authority")
        );
        assert_eq!(record.creation_date.as_deref(), Some("1995-08-14T04:00:00Z"));
        assert_eq!(record.updated_date.as_deref(), Some("2024-08-14T07:01:34Z"));
        assert_eq!(record.days_until_expiry, Some(12));
        assert_eq!(
            record.name_servers,
            vec!["a.iana-servers.net", "b.iana-servers.net"]
        );
        assert_eq!(
            record.status,
            vec!["clientDeleteProhibited", "clientTransferProhibited"]
        );
    }

    #[test]
    fn test_registrar_whois_server_is_not_registrar() {
        let record = parse_whois("example.com", VERISIGN_ANSWER, Utc::now());
        assert_ne!(record.registrar.as_deref(), Some("whois.iana.org"));
    }

    #[test]
    fn test_parse_plain_dates_and_dedup_name_servers() {
        let record = parse_whois("example.com.ng", NIRA_ANSWER, at("2025-03-05T00:00:00Z"));

        assert_eq!(record.registrar.as_deref(), Some("Web4Africa Ltd"));
        assert_eq!(record.expiration_date.as_deref(), Some("2025-03-02"));
        assert_eq!(record.days_until_expiry, Some(-3));
        assert_eq!(record.name_servers, vec!["ns1.web4africa.net"]);
        assert_eq!(record.status, vec!["ok"]);
    }

    #[test]
    fn test_comment_lines_are_ignored() {
        let pairs = label_pairs("% Status: comment\n# Registrar: nobody\nRegistrar: Real One");
        assert_eq!(pairs, vec![("registrar".to_string(), "Real One".to_string())]);
    }

    #[test]
    fn test_first_value_respects_label_priority() {
        let pairs = label_pairs("Created: 2001-01-01\nCreation Date: 2000-01-01");
        assert_eq!(
            first_value(&pairs, CREATED_LABELS).as_deref(),
            Some("2000-01-01")
        );
    }

    #[test]
    fn test_unreadable_expiry_has_no_day_count() {
        let record = parse_whois("example.ng", "Expiry Date: soon", Utc::now());
        assert_eq!(record.expiration_date.as_deref(), Some("soon"));
        assert!(record.days_until_expiry.is_none());
    }

    #[test]
    fn test_parse_registry_date_formats() {
        let expected = NaiveDate::from_ymd_opt(2025, 3, 2).unwrap();
        for value in [
            "2025-03-02T10:00:00Z",
            "2025-03-02",
            "02-Mar-2025",
            "2025.03.02",
            "02.03.2025",
            "2025-03-02 10:00:00 UTC",
        ] {
            assert_eq!(parse_registry_date(value), Some(expected), "{value}");
        }
    }

    #[test]
    fn test_empty_answer() {
        let record = parse_whois("example.com", "", Utc::now());
        assert!(record.registrar.is_none());
        assert!(record.name_servers.is_empty());
        assert!(record.status.is_empty());
    }

    #[test]
    fn test_server_map_is_loadable() {
        assert!(WhoIs::from_string(WHOIS_SERVERS).is_ok());
    }

    #[tokio::test]
    #[ignore = "requires network access"]
    async fn test_whois_lookup_real() {
        let record = whois_lookup("google.com")
            .await
            .unwrap_or_else(|e| panic!("WHOIS lookup failed: {e}"));
        assert!(record.registrar.is_some());
        assert!(!record.name_servers.is_empty());
    }
}
